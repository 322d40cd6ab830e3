use ratatui::style::Color;

// Centralized theme colors for the assistant panel.

pub const ACCENT_RGB: (u8, u8, u8) = (31, 79, 255);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Bubble
pub fn bubble_bg() -> Color {
    accent()
}
pub fn bubble_fg() -> Color {
    Color::White
}

// Panel
pub fn panel_bg() -> Color {
    Color::Black
}
pub fn panel_fg() -> Color {
    Color::White
}
pub fn panel_border() -> Color {
    Color::DarkGray
}
pub fn panel_border_active() -> Color {
    accent()
}

// Header
pub fn header_bg() -> Color {
    accent()
}
pub fn header_fg() -> Color {
    Color::White
}
pub fn header_muted_fg() -> Color {
    Color::Gray
}

// Transcript
pub fn user_fg() -> Color {
    Color::Cyan
}
pub fn assistant_fg() -> Color {
    Color::White
}
pub fn error_fg() -> Color {
    Color::LightRed
}

// Sample question chips
pub fn chip_bg() -> Color {
    Color::DarkGray
}
pub fn chip_fg() -> Color {
    Color::White
}

// Status line
pub fn status_fg() -> Color {
    Color::Gray
}
