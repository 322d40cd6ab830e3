//! Shared crate-wide constants.
//!
//! All geometry values are in pixels.

/// Smallest panel width the clamp engine will ever produce.
pub const PANEL_MIN_WIDTH: i32 = 320;

/// Smallest panel height the clamp engine will ever produce.
pub const PANEL_MIN_HEIGHT: i32 = 460;

/// Floor applied to the viewport-derived width bound on tiny viewports.
pub const PANEL_MAX_WIDTH_FLOOR: i32 = 300;

/// Floor applied to the viewport-derived height bound on tiny viewports.
pub const PANEL_MAX_HEIGHT_FLOOR: i32 = 420;

/// Total space kept free around the panel when sizing it (both sides combined).
pub const SIZE_MARGIN: i32 = 24;

/// Minimum distance kept between the widget and the right/bottom viewport edges,
/// and between the widget and the opposite edges.
pub const POSITION_MARGIN: i32 = 10;

/// Footprint of the minimized bubble.
pub const BUBBLE_WIDTH: i32 = 170;
pub const BUBBLE_HEIGHT: i32 = 56;

pub const DEFAULT_RIGHT: i32 = 18;
pub const DEFAULT_BOTTOM: i32 = 18;
pub const DEFAULT_WIDTH: i32 = 420;
pub const DEFAULT_HEIGHT: i32 = 580;

/// Nominal terminal cell size used when the terminal does not report pixels.
///
/// Units: pixels. Most terminal fonts land close to a 1:2 aspect ratio, so
/// the projection of pixel geometry onto cells stays roughly proportional.
pub const FALLBACK_CELL_WIDTH: u16 = 8;
pub const FALLBACK_CELL_HEIGHT: u16 = 16;

/// Storage key of the persisted widget layout blob.
pub const LAYOUT_KEY: &str = "smartshop_chatbot_ui_v2";

pub const ACCESS_TOKEN_KEY: &str = "access";
pub const REFRESH_TOKEN_KEY: &str = "refresh";
pub const USERNAME_KEY: &str = "username";
pub const PRODUCT_VIEW_KEY: &str = "product_view";
pub const PRODUCT_SORT_KEY: &str = "product_sort";

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// How often the interactive widget re-reads the stored session to notice
/// logins and logouts made by another process. Units: milliseconds.
pub const IDENTITY_POLL_MS: u64 = 2000;
