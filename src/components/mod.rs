use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod chat_panel;
pub mod status_bar;

pub use chat_panel::{ChatPanel, HitTarget, PanelView};
pub use status_bar::StatusBar;

/// A piece of chrome drawn into a fixed area of the frame.
pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect);
}
