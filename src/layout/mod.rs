//! Geometry clamp engine for the floating chat widget.
//!
//! The widget is anchored to the bottom-right corner of the viewport: its
//! position is a pair of offsets from the right and bottom edges. Everything
//! here is pure arithmetic in pixels so it can run on every pointer move.

pub mod floating;

use ratatui::prelude::Rect;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BUBBLE_HEIGHT, BUBBLE_WIDTH, DEFAULT_BOTTOM, DEFAULT_HEIGHT, DEFAULT_RIGHT, DEFAULT_WIDTH,
    FALLBACK_CELL_HEIGHT, FALLBACK_CELL_WIDTH, PANEL_MAX_HEIGHT_FLOOR, PANEL_MAX_WIDTH_FLOOR,
    PANEL_MIN_HEIGHT, PANEL_MIN_WIDTH, POSITION_MARGIN, SIZE_MARGIN,
};

/// Offsets from the viewport's right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub right: i32,
    pub bottom: i32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            right: DEFAULT_RIGHT,
            bottom: DEFAULT_BOTTOM,
        }
    }
}

/// Panel dimensions. Ignored for placement while the widget is minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Pixel viewport covered by a grid of terminal cells.
    pub fn from_cells(columns: u16, rows: u16, cell: CellSize) -> Self {
        Self {
            width: i32::from(columns) * i32::from(cell.width),
            height: i32::from(rows) * i32::from(cell.height),
        }
    }
}

/// On-screen rectangle used for edge clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: i32,
    pub height: i32,
}

/// Complete layout of the widget: mode, placement and panel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryState {
    pub minimized: bool,
    pub position: Position,
    pub size: Size,
}

impl Default for GeometryState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GeometryState {
    /// The layout a fresh install starts with: a bubble near the corner.
    pub fn initial() -> Self {
        Self {
            minimized: true,
            position: Position::default(),
            size: Size::default(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        footprint(self.minimized, self.size)
    }

    /// Clamp size, then derive the footprint, then clamp position.
    ///
    /// The order matters: the expanded footprint depends on the clamped size.
    pub fn clamped(&self, viewport: Viewport) -> Self {
        let size = clamp_size(self.size, viewport);
        let footprint = footprint(self.minimized, size);
        let position = clamp_position(self.position, footprint, viewport);
        Self {
            minimized: self.minimized,
            position,
            size,
        }
    }

    /// Project the widget onto a terminal grid, clipped to `area`.
    ///
    /// Returns `None` when nothing of the widget would be visible.
    pub fn cell_rect(&self, cell: CellSize, area: Rect) -> Option<Rect> {
        let fp = self.footprint();
        let width = cells_for(fp.width, cell.width).max(1);
        let height = cells_for(fp.height, cell.height).max(1);
        let right = cells_for(self.position.right, cell.width);
        let bottom = cells_for(self.position.bottom, cell.height);
        let x = i32::from(area.x) + i32::from(area.width) - right - width;
        let y = i32::from(area.y) + i32::from(area.height) - bottom - height;
        clip_signed(x, y, width, height, area)
    }
}

/// Pixel size of one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: FALLBACK_CELL_WIDTH,
            height: FALLBACK_CELL_HEIGHT,
        }
    }
}

impl CellSize {
    /// Derive the cell size from the terminal's reported pixel dimensions,
    /// falling back to the nominal size when the terminal reports zero.
    pub fn from_window(columns: u16, rows: u16, pixel_width: u16, pixel_height: u16) -> Self {
        let fallback = Self::default();
        let width = if columns > 0 && pixel_width >= columns {
            pixel_width / columns
        } else {
            fallback.width
        };
        let height = if rows > 0 && pixel_height >= rows {
            pixel_height / rows
        } else {
            fallback.height
        };
        Self { width, height }
    }

    /// Pixel coordinate of the top-left corner of a cell.
    pub fn to_pixels(&self, column: u16, row: u16) -> (i32, i32) {
        (
            i32::from(column) * i32::from(self.width),
            i32::from(row) * i32::from(self.height),
        )
    }
}

fn cells_for(pixels: i32, cell: u16) -> i32 {
    let cell = i32::from(cell.max(1));
    (pixels + cell / 2).div_euclid(cell)
}

fn clip_signed(x: i32, y: i32, width: i32, height: i32, area: Rect) -> Option<Rect> {
    let left = x.max(i32::from(area.x));
    let top = y.max(i32::from(area.y));
    let right = (x + width).min(i32::from(area.x) + i32::from(area.width));
    let bottom = (y + height).min(i32::from(area.y) + i32::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

/// Clamp a requested panel size against the viewport.
///
/// The absolute minimums win over the viewport bound, so a tiny viewport can
/// be overflowed but the panel never shrinks below 320x460.
pub fn clamp_size(requested: Size, viewport: Viewport) -> Size {
    let max_width = PANEL_MAX_WIDTH_FLOOR.max(viewport.width - SIZE_MARGIN);
    let max_height = PANEL_MAX_HEIGHT_FLOOR.max(viewport.height - SIZE_MARGIN);
    Size {
        width: clamp(requested.width, PANEL_MIN_WIDTH, max_width),
        height: clamp(requested.height, PANEL_MIN_HEIGHT, max_height),
    }
}

pub fn footprint(minimized: bool, size: Size) -> Footprint {
    if minimized {
        Footprint {
            width: BUBBLE_WIDTH,
            height: BUBBLE_HEIGHT,
        }
    } else {
        Footprint {
            width: size.width,
            height: size.height,
        }
    }
}

/// Clamp right/bottom offsets so the footprint stays inside the viewport
/// with a margin on every side. Collapses to the margin when the viewport is
/// too small to honour both sides.
pub fn clamp_position(requested: Position, footprint: Footprint, viewport: Viewport) -> Position {
    let max_right = POSITION_MARGIN.max(viewport.width - footprint.width - POSITION_MARGIN);
    let max_bottom = POSITION_MARGIN.max(viewport.height - footprint.height - POSITION_MARGIN);
    Position {
        right: clamp(requested.right, POSITION_MARGIN, max_right),
        bottom: clamp(requested.bottom, POSITION_MARGIN, max_bottom),
    }
}

/// `max(min, min(max, n))`: when `max < min` the minimum wins.
fn clamp(n: i32, min: i32, max: i32) -> i32 {
    min.max(max.min(n))
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORTS: [Viewport; 6] = [
        Viewport::new(1920, 1080),
        Viewport::new(1280, 720),
        Viewport::new(640, 480),
        Viewport::new(330, 470),
        Viewport::new(200, 150),
        Viewport::new(0, 0),
    ];

    #[test]
    fn clamp_size_respects_bounds_for_all_viewports() {
        let requests = [
            Size {
                width: -500,
                height: -500,
            },
            Size {
                width: 0,
                height: 0,
            },
            Size::default(),
            Size {
                width: 5000,
                height: 5000,
            },
        ];
        for viewport in VIEWPORTS {
            let max_w = PANEL_MAX_WIDTH_FLOOR.max(viewport.width - SIZE_MARGIN);
            let max_h = PANEL_MAX_HEIGHT_FLOOR.max(viewport.height - SIZE_MARGIN);
            for requested in requests {
                let size = clamp_size(requested, viewport);
                assert!(size.width >= PANEL_MIN_WIDTH, "{viewport:?} {requested:?}");
                assert!(size.height >= PANEL_MIN_HEIGHT, "{viewport:?} {requested:?}");
                assert!(size.width <= max_w.max(PANEL_MIN_WIDTH));
                assert!(size.height <= max_h.max(PANEL_MIN_HEIGHT));
            }
        }
    }

    #[test]
    fn clamp_size_never_goes_below_minimum_on_tiny_viewport() {
        let size = clamp_size(
            Size {
                width: 100,
                height: 100,
            },
            Viewport::new(200, 150),
        );
        assert_eq!(
            size,
            Size {
                width: PANEL_MIN_WIDTH,
                height: PANEL_MIN_HEIGHT
            }
        );
    }

    #[test]
    fn clamp_size_shrinks_to_viewport_minus_margin() {
        let size = clamp_size(
            Size {
                width: 2000,
                height: 2000,
            },
            Viewport::new(800, 600),
        );
        assert_eq!(
            size,
            Size {
                width: 776,
                height: 576
            }
        );
    }

    #[test]
    fn footprint_depends_on_mode() {
        let size = Size {
            width: 500,
            height: 600,
        };
        assert_eq!(
            footprint(true, size),
            Footprint {
                width: BUBBLE_WIDTH,
                height: BUBBLE_HEIGHT
            }
        );
        assert_eq!(
            footprint(false, size),
            Footprint {
                width: 500,
                height: 600
            }
        );
    }

    #[test]
    fn clamp_position_keeps_margin_or_collapses() {
        let fp = Footprint {
            width: 420,
            height: 580,
        };
        let requests = [
            Position {
                right: -100,
                bottom: -100,
            },
            Position::default(),
            Position {
                right: 10_000,
                bottom: 10_000,
            },
        ];
        for viewport in VIEWPORTS {
            let max_right = viewport.width - fp.width - POSITION_MARGIN;
            let max_bottom = viewport.height - fp.height - POSITION_MARGIN;
            for requested in requests {
                let pos = clamp_position(requested, fp, viewport);
                assert!(pos.right >= POSITION_MARGIN);
                assert!(pos.bottom >= POSITION_MARGIN);
                if max_right >= POSITION_MARGIN {
                    assert!(pos.right <= max_right);
                } else {
                    assert_eq!(pos.right, POSITION_MARGIN);
                }
                if max_bottom >= POSITION_MARGIN {
                    assert!(pos.bottom <= max_bottom);
                } else {
                    assert_eq!(pos.bottom, POSITION_MARGIN);
                }
            }
        }
    }

    #[test]
    fn clamping_is_idempotent() {
        let states = [
            GeometryState::initial(),
            GeometryState {
                minimized: false,
                position: Position {
                    right: 900,
                    bottom: -40,
                },
                size: Size {
                    width: 3000,
                    height: 10,
                },
            },
        ];
        for viewport in VIEWPORTS {
            for state in states {
                let once = state.clamped(viewport);
                assert_eq!(once.clamped(viewport), once);
            }
        }
    }

    #[test]
    fn expanded_footprint_uses_clamped_size() {
        let state = GeometryState {
            minimized: false,
            position: Position {
                right: 10_000,
                bottom: 10_000,
            },
            size: Size {
                width: 5000,
                height: 5000,
            },
        };
        let clamped = state.clamped(Viewport::new(1000, 800));
        assert_eq!(
            clamped.size,
            Size {
                width: 976,
                height: 776
            }
        );
        // 1000 - 976 - 10 = 14, 800 - 776 - 10 = 14
        assert_eq!(
            clamped.position,
            Position {
                right: 14,
                bottom: 14
            }
        );
    }

    #[test]
    fn cell_rect_anchors_to_bottom_right() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 40,
        };
        let cell = CellSize {
            width: 10,
            height: 20,
        };
        let state = GeometryState::initial();
        // bubble 170x56 -> 17x3 cells, offsets 18/18 -> 2x1 cells
        let rect = state.cell_rect(cell, area).unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 100 - 2 - 17,
                y: 40 - 1 - 3,
                width: 17,
                height: 3
            }
        );
    }

    #[test]
    fn cell_rect_clips_overflowing_panel() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 10,
        };
        let state = GeometryState {
            minimized: false,
            ..GeometryState::initial()
        };
        let rect = state.cell_rect(CellSize::default(), area).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }

    #[test]
    fn cell_size_falls_back_when_pixels_unknown() {
        assert_eq!(CellSize::from_window(80, 24, 0, 0), CellSize::default());
        assert_eq!(
            CellSize::from_window(80, 24, 800, 480),
            CellSize {
                width: 10,
                height: 20
            }
        );
    }

    #[test]
    fn rect_contains_edge_cases() {
        let r = Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 5,
        };
        assert!(!rect_contains(r, 0, 0));
        let r2 = Rect {
            x: 2,
            y: 2,
            width: 3,
            height: 3,
        };
        assert!(rect_contains(r2, 2, 2));
        assert!(rect_contains(r2, 4, 4));
        assert!(!rect_contains(r2, 5, 4));
    }
}
