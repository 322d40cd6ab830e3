use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::theme;
use crate::ui::{UiFrame, truncate_to_width};

/// One-line bar under the host screen: key hints on the right and a
/// transient notice (login results, errors) on the left.
pub struct StatusBar {
    left: String,
    right: String,
    style: Style,
    notice: Option<(String, Instant)>,
    notice_ttl: Duration,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            style: Style::default().fg(theme::status_fg()),
            notice: None,
            notice_ttl: Duration::from_secs(5),
        }
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// Show `text` in place of the left label until it expires.
    pub fn notify<T: Into<String>>(&mut self, text: T) {
        let text = text.into();
        tracing::debug!(notice = %text, "status notice");
        self.notice = Some((text, Instant::now()));
    }

    pub fn set_notice_ttl(&mut self, ttl: Duration) {
        self.notice_ttl = ttl;
    }

    /// The text currently shown on the left, dropping an expired notice.
    pub fn left_text(&mut self) -> &str {
        if self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= self.notice_ttl)
        {
            self.notice = None;
        }
        match &self.notice {
            Some((text, _)) => text,
            None => &self.left,
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Component for StatusBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let (x, y) = (area.x, area.y);
        let width = area.width as usize;
        let style = self.style;

        let left = truncate_to_width(self.left_text(), width);
        frame.set_string(area, x, y, &left, style);

        if !self.right.is_empty() {
            let right = truncate_to_width(&self.right, width);
            let right_width = right.width();
            let left_width = left.width();
            if right_width + left_width < width {
                let start_x = x.saturating_add((width - right_width) as u16);
                frame.set_string(area, start_x, y, &right, style);
            }
        }
    }
}
