//! Renders the assistant as a bubble or a floating panel and remembers where
//! each interactive part landed so pointer events can be routed back.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use textwrap::Options;
use textwrap::word_splitters::WordSplitter;
use unicode_width::UnicodeWidthStr;

use crate::chat::{Role, SAMPLE_QUESTIONS, Transcript};
use crate::layout::{CellSize, GeometryState, rect_contains};
use crate::theme;
use crate::ui::UiFrame;

pub const TITLE: &str = "Virtual Shopping Assistant";
pub const BUBBLE_LABEL: &str = "💬 Assistant";
pub const PLACEHOLDER: &str = "Type your question… (Alt+Enter for a new line)";
pub const TIP: &str = "Tip: include budget and use-case for better recommendations.";
const RESET_LABEL: &str = "[Reset]";
const MINIMIZE_LABEL: &str = "[—]";
const RESIZE_GLYPH: &str = "↘";
const INPUT_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Bubble,
    Header,
    Reset,
    Minimize,
    Sample(usize),
    Transcript,
    Input,
    Send,
    ResizeCorner,
}

/// Everything the panel needs for one frame, borrowed from the widget.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub geometry: &'a GeometryState,
    pub cell: CellSize,
    pub transcript: &'a Transcript,
    pub input: &'a str,
    pub sending: bool,
    pub username: Option<&'a str>,
    pub dragging: bool,
}

#[derive(Debug, Default)]
pub struct ChatPanel {
    /// Lines scrolled up from the newest message.
    scroll_back: usize,
    max_scroll: usize,
    regions: Vec<(Rect, HitTarget)>,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    /// Topmost interactive part under the cell, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| rect_contains(*rect, column, row))
            .map(|(_, target)| *target)
    }

    fn mark(&mut self, frame: &UiFrame<'_>, rect: Rect, target: HitTarget) {
        let visible = rect.intersection(frame.area());
        if visible.width > 0 && visible.height > 0 {
            self.regions.push((visible, target));
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, view: &PanelView<'_>) {
        self.regions.clear();
        let Some(rect) = view.geometry.cell_rect(view.cell, frame.area()) else {
            return;
        };
        if view.geometry.minimized {
            self.render_bubble(frame, rect);
        } else {
            self.render_panel(frame, rect, view);
        }
    }

    fn render_bubble(&mut self, frame: &mut UiFrame<'_>, rect: Rect) {
        let style = Style::default()
            .bg(theme::bubble_bg())
            .fg(theme::bubble_fg())
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Clear, rect);
        let block = Block::default().borders(Borders::ALL).style(style);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let label = Paragraph::new(BUBBLE_LABEL)
            .style(style)
            .alignment(Alignment::Center);
        let row = Rect {
            y: inner.y + inner.height.saturating_sub(1) / 2,
            height: inner.height.min(1),
            ..inner
        };
        frame.render_widget(label, row);
        self.mark(frame, rect, HitTarget::Bubble);
    }

    fn render_panel(&mut self, frame: &mut UiFrame<'_>, rect: Rect, view: &PanelView<'_>) {
        let border = if view.dragging {
            theme::panel_border_active()
        } else {
            theme::panel_border()
        };
        let base = Style::default().bg(theme::panel_bg()).fg(theme::panel_fg());
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(base);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        // Whole panel first so more specific parts win the hit test.
        self.mark(frame, rect, HitTarget::Transcript);

        let header_rows = (2 + SAMPLE_QUESTIONS.len() as u16 + 1).min(inner.height);
        let header = Rect {
            height: header_rows,
            ..inner
        };
        self.render_header(frame, header, view);

        let footer_rows = (INPUT_ROWS + 2).min(inner.height.saturating_sub(header_rows));
        let footer = Rect {
            y: inner.y + inner.height - footer_rows,
            height: footer_rows,
            ..inner
        };
        let body = Rect {
            y: inner.y + header_rows,
            height: inner.height - header_rows - footer_rows,
            ..inner
        };
        self.render_transcript(frame, body, view.transcript);
        self.render_footer(frame, footer, view);

        let corner = Rect {
            x: rect.x + rect.width.saturating_sub(1),
            y: rect.y + rect.height.saturating_sub(1),
            width: 1,
            height: 1,
        };
        frame.set_string(
            corner,
            corner.x,
            corner.y,
            RESIZE_GLYPH,
            Style::default().fg(theme::accent()),
        );
        self.mark(frame, corner, HitTarget::ResizeCorner);
    }

    fn render_header(&mut self, frame: &mut UiFrame<'_>, area: Rect, view: &PanelView<'_>) {
        let bar = Style::default()
            .bg(theme::header_bg())
            .fg(theme::header_fg());
        frame.render_widget(Block::default().style(bar), area);
        self.mark(frame, area, HitTarget::Header);

        let mut title = vec![Span::styled(TITLE, bar.add_modifier(Modifier::BOLD))];
        if view.sending {
            title.push(Span::styled(
                " • typing…",
                bar.fg(theme::header_muted_fg()),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(title)), row(area, 0));

        let who = match view.username {
            Some(name) => format!("Signed in as {name}"),
            None => "Browsing as guest".to_string(),
        };
        frame.set_string(
            row(area, 1),
            area.x,
            area.y + 1,
            &who,
            bar.fg(theme::header_muted_fg()),
        );

        // Buttons sit at the right end of the title row.
        let minimize_w = MINIMIZE_LABEL.width() as u16;
        let reset_w = RESET_LABEL.width() as u16;
        if area.width > minimize_w + reset_w + 1 {
            let minimize = Rect {
                x: area.x + area.width - minimize_w,
                y: area.y,
                width: minimize_w,
                height: 1,
            };
            let reset = Rect {
                x: minimize.x - 1 - reset_w,
                width: reset_w,
                ..minimize
            };
            let reset_style = if view.sending {
                bar.fg(theme::header_muted_fg())
            } else {
                bar.add_modifier(Modifier::BOLD)
            };
            frame.set_string(reset, reset.x, reset.y, RESET_LABEL, reset_style);
            frame.set_string(minimize, minimize.x, minimize.y, MINIMIZE_LABEL, bar);
            self.mark(frame, reset, HitTarget::Reset);
            self.mark(frame, minimize, HitTarget::Minimize);
        }

        if area.height > 2 {
            frame.set_string(
                row(area, 2),
                area.x,
                area.y + 2,
                "Try one:",
                bar.fg(theme::header_muted_fg()),
            );
        }
        let chip = Style::default().bg(theme::chip_bg()).fg(theme::chip_fg());
        for (index, question) in SAMPLE_QUESTIONS.iter().enumerate() {
            let offset = 3 + index as u16;
            if offset >= area.height {
                break;
            }
            let label = format!(" F{} {} ", index + 1, question);
            let width = (label.width() as u16).min(area.width);
            let line = Rect {
                width,
                ..row(area, offset)
            };
            frame.set_string(line, line.x, line.y, &label, chip);
            self.mark(frame, line, HitTarget::Sample(index));
        }
    }

    fn render_transcript(&mut self, frame: &mut UiFrame<'_>, area: Rect, transcript: &Transcript) {
        if area.height == 0 || area.width < 3 {
            self.max_scroll = 0;
            return;
        }
        let lines = transcript_lines(transcript, area.width.saturating_sub(2) as usize);
        let visible = area.height as usize;
        self.max_scroll = lines.len().saturating_sub(visible);
        self.scroll_back = self.scroll_back.min(self.max_scroll);
        let start = lines.len().saturating_sub(visible + self.scroll_back);
        let shown: Vec<Line<'_>> = lines.into_iter().skip(start).take(visible).collect();
        let padded = Rect {
            x: area.x + 1,
            width: area.width - 2,
            ..area
        };
        frame.render_widget(Paragraph::new(shown), padded);
        self.mark(frame, area, HitTarget::Transcript);
    }

    fn render_footer(&mut self, frame: &mut UiFrame<'_>, area: Rect, view: &PanelView<'_>) {
        if area.height == 0 {
            return;
        }
        let muted = Style::default().fg(theme::status_fg());
        let separator = "─".repeat(area.width as usize);
        frame.set_string(row(area, 0), area.x, area.y, &separator, muted);

        let send_label = if view.sending { "[...]" } else { "[Send]" };
        let send_w = send_label.width() as u16;
        let input_rows = area.height.saturating_sub(2).max(1).min(INPUT_ROWS);
        let input = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width.saturating_sub(send_w + 1),
            height: input_rows.min(area.height.saturating_sub(1)),
        };
        if input.height > 0 {
            let lines = input_lines(view.input, input.width as usize, input.height as usize);
            frame.render_widget(Paragraph::new(lines), input);
            self.mark(frame, input, HitTarget::Input);

            let send = Rect {
                x: input.x + input.width + 1,
                y: input.y,
                width: send_w,
                height: 1,
            };
            let enabled = !view.sending && !view.input.trim().is_empty();
            let send_style = if enabled {
                Style::default()
                    .bg(theme::accent())
                    .fg(theme::bubble_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                muted
            };
            frame.set_string(send, send.x, send.y, send_label, send_style);
            self.mark(frame, send, HitTarget::Send);
        }

        let tip_y = area.y + area.height - 1;
        if tip_y > input.y + input.height.saturating_sub(1) {
            frame.set_string(row(area, area.height - 1), area.x, tip_y, TIP, muted);
        }
    }
}

fn row(area: Rect, offset: u16) -> Rect {
    Rect {
        y: area.y + offset,
        height: 1,
        ..area
    }
}

/// Flatten the transcript into styled, wrapped lines. User messages hug the
/// right edge, assistant messages the left.
fn transcript_lines(transcript: &Transcript, width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for (index, message) in transcript.messages().iter().enumerate() {
        if index > 0 {
            out.push(Line::default());
        }
        let (label, style, alignment) = match message.role {
            Role::User => ("You", Style::default().fg(theme::user_fg()), Alignment::Right),
            Role::Assistant if message.content.starts_with("Error: ") => (
                "Assistant",
                Style::default().fg(theme::error_fg()),
                Alignment::Left,
            ),
            Role::Assistant => (
                "Assistant",
                Style::default().fg(theme::assistant_fg()),
                Alignment::Left,
            ),
        };
        out.push(
            Line::from(Span::styled(label, style.add_modifier(Modifier::BOLD)))
                .alignment(alignment),
        );
        for line in wrap_text(&message.content, width) {
            out.push(Line::from(Span::styled(line, style)).alignment(alignment));
        }
    }
    out
}

/// The tail of the input that fits, with a block cursor at the end.
fn input_lines(input: &str, width: usize, rows: usize) -> Vec<Line<'static>> {
    if input.is_empty() {
        let placeholder = Style::default()
            .fg(theme::status_fg())
            .add_modifier(Modifier::ITALIC);
        return vec![Line::from(vec![
            Span::raw("█"),
            Span::styled(PLACEHOLDER, placeholder),
        ])];
    }
    let mut text = input.to_string();
    text.push('█');
    let wrapped = wrap_text(&text, width.max(1));
    let skip = wrapped.len().saturating_sub(rows);
    wrapped.into_iter().skip(skip).map(Line::from).collect()
}

/// Word wrap measured in display columns, so wide glyphs take two. Explicit
/// newlines are kept and words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let options = Options::new(width.max(1)).word_splitter(WordSplitter::NoHyphenation);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
