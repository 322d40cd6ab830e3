//! Pointer-driven drag and corner-resize gestures.
//!
//! Each gesture kind is a two-state machine: `None` is idle, `Some(record)` is
//! active. The records only remember where the gesture started; every move
//! recomputes the requested geometry from that anchor and feeds it through the
//! clamp engine, so rounding never accumulates.

use super::{GeometryState, Position, Size, Viewport, clamp_position, clamp_size, footprint};

/// Active header drag: anchor pointer plus the clamped position at press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDrag {
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub start_position: Position,
}

/// Active corner-handle resize: anchor pointer plus the clamped size at press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerResize {
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub start_size: Size,
}

/// Tracks both gesture kinds independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gestures {
    drag: Option<HeaderDrag>,
    resize: Option<CornerResize>,
}

impl Gestures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn resizing(&self) -> bool {
        self.resize.is_some()
    }

    pub fn active(&self) -> bool {
        self.dragging() || self.resizing()
    }

    /// Begin a drag from pointer `(x, y)`; `current` must already be clamped.
    pub fn start_drag(&mut self, x: i32, y: i32, current: &GeometryState) {
        self.drag = Some(HeaderDrag {
            anchor_x: x,
            anchor_y: y,
            start_position: current.position,
        });
    }

    /// Begin a corner resize from pointer `(x, y)`; `current` must already be clamped.
    pub fn start_resize(&mut self, x: i32, y: i32, current: &GeometryState) {
        self.resize = Some(CornerResize {
            anchor_x: x,
            anchor_y: y,
            start_size: current.size,
        });
    }

    /// Route a pointer move to whichever gestures are active.
    ///
    /// Returns the new clamped geometry, or `None` when no gesture is active.
    pub fn pointer_move(
        &self,
        x: i32,
        y: i32,
        viewport: Viewport,
        current: &GeometryState,
    ) -> Option<GeometryState> {
        if !self.active() {
            return None;
        }
        let mut next = *current;
        if let Some(resize) = self.resize {
            next.size = resize_to(resize, x, y, viewport);
        }
        if let Some(drag) = self.drag {
            next.position = drag_to(drag, x, y, viewport, next.minimized, next.size);
        }
        Some(next)
    }

    /// Idempotent.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Idempotent.
    pub fn end_resize(&mut self) {
        self.resize = None;
    }

    /// A pointer release anywhere ends every gesture, not just the one that
    /// started on the released handle.
    pub fn release_all(&mut self) {
        self.end_drag();
        self.end_resize();
    }
}

/// Offsets grow toward the top-left, so moving the pointer right/down must
/// shrink them for the panel to follow the cursor.
pub fn drag_to(
    drag: HeaderDrag,
    x: i32,
    y: i32,
    viewport: Viewport,
    minimized: bool,
    size: Size,
) -> Position {
    let dx = x - drag.anchor_x;
    let dy = y - drag.anchor_y;
    let requested = Position {
        right: drag.start_position.right - dx,
        bottom: drag.start_position.bottom - dy,
    };
    let size = clamp_size(size, viewport);
    clamp_position(requested, footprint(minimized, size), viewport)
}

/// The panel is anchored bottom-right, so pulling the handle up/left grows it.
pub fn resize_to(resize: CornerResize, x: i32, y: i32, viewport: Viewport) -> Size {
    let dx = resize.anchor_x - x;
    let dy = resize.anchor_y - y;
    let requested = Size {
        width: resize.start_size.width + dx,
        height: resize.start_size.height + dy,
    };
    clamp_size(requested, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_state() -> GeometryState {
        GeometryState {
            minimized: false,
            ..GeometryState::initial()
        }
    }

    const VIEWPORT: Viewport = Viewport::new(1600, 1000);

    #[test]
    fn idle_moves_are_ignored() {
        let g = Gestures::new();
        assert_eq!(g.pointer_move(5, 5, VIEWPORT, &open_state()), None);
    }

    #[test]
    fn drag_follows_cursor() {
        let state = open_state().clamped(VIEWPORT);
        let mut g = Gestures::new();
        g.start_drag(800, 500, &state);
        // move pointer 100 left and 50 up -> offsets grow
        let next = g.pointer_move(700, 450, VIEWPORT, &state).unwrap();
        assert_eq!(
            next.position,
            Position {
                right: 118,
                bottom: 68
            }
        );
        assert_eq!(next.size, state.size);
    }

    #[test]
    fn drag_is_clamped_to_viewport() {
        let state = open_state().clamped(VIEWPORT);
        let mut g = Gestures::new();
        g.start_drag(800, 500, &state);
        let next = g.pointer_move(5000, 5000, VIEWPORT, &state).unwrap();
        assert_eq!(
            next.position,
            Position {
                right: 10,
                bottom: 10
            }
        );
        let next = g.pointer_move(-5000, -5000, VIEWPORT, &state).unwrap();
        assert_eq!(
            next.position,
            Position {
                right: 1600 - 420 - 10,
                bottom: 1000 - 580 - 10
            }
        );
    }

    #[test]
    fn resize_grows_when_pulled_up_and_left() {
        let state = open_state().clamped(VIEWPORT);
        let mut g = Gestures::new();
        g.start_resize(1500, 900, &state);
        let next = g.pointer_move(1440, 880, VIEWPORT, &state).unwrap();
        assert_eq!(
            next.size,
            Size {
                width: 480,
                height: 600
            }
        );
        assert_eq!(next.position, state.position);
    }

    #[test]
    fn resize_respects_minimum() {
        let state = open_state().clamped(VIEWPORT);
        let mut g = Gestures::new();
        g.start_resize(100, 100, &state);
        let next = g.pointer_move(900, 900, VIEWPORT, &state).unwrap();
        assert_eq!(
            next.size,
            Size {
                width: 320,
                height: 460
            }
        );
    }

    #[test]
    fn end_is_idempotent_and_release_ends_both() {
        let state = open_state();
        let mut g = Gestures::new();
        g.end_drag();
        g.end_resize();
        assert!(!g.active());

        g.start_drag(0, 0, &state);
        g.start_resize(0, 0, &state);
        assert!(g.dragging() && g.resizing());
        g.release_all();
        assert!(!g.active());
        g.release_all();
        assert!(!g.active());
    }
}
