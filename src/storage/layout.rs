//! Durable projection of the widget's [`GeometryState`].
//!
//! The blob is a JSON object `{minimized, right, bottom, w, h}`. Loading is
//! lenient field by field: anything missing or of the wrong type falls back
//! to that field's default, so a partially written or hand-edited blob still
//! yields a usable layout.

use serde::Serialize;
use serde_json::Value;

use super::KeyValueStore;
use crate::constants::LAYOUT_KEY;
use crate::layout::{GeometryState, Position, Size};

#[derive(Debug, Serialize)]
struct LayoutBlob {
    minimized: bool,
    right: i32,
    bottom: i32,
    w: i32,
    h: i32,
}

impl From<&GeometryState> for LayoutBlob {
    fn from(state: &GeometryState) -> Self {
        Self {
            minimized: state.minimized,
            right: state.position.right,
            bottom: state.position.bottom,
            w: state.size.width,
            h: state.size.height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutStore<S> {
    store: S,
}

impl<S: KeyValueStore> LayoutStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Never fails; missing or malformed data yields [`GeometryState::initial`].
    pub fn load(&self) -> GeometryState {
        let defaults = GeometryState::initial();
        let Some(raw) = self.store.get(LAYOUT_KEY) else {
            return defaults;
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "persisted layout is not JSON; using defaults");
                return defaults;
            }
        };
        let Some(obj) = value.as_object() else {
            tracing::debug!("persisted layout is not an object; using defaults");
            return defaults;
        };
        let number = |key: &str, fallback: i32| {
            obj.get(key)
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite())
                .map(|n| n.round() as i32)
                .unwrap_or(fallback)
        };
        GeometryState {
            minimized: obj
                .get("minimized")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.minimized),
            position: Position {
                right: number("right", defaults.position.right),
                bottom: number("bottom", defaults.position.bottom),
            },
            size: Size {
                width: number("w", defaults.size.width),
                height: number("h", defaults.size.height),
            },
        }
    }

    /// Failures are logged and dropped: losing a layout preference is harmless.
    pub fn save(&self, state: &GeometryState) {
        let result = serde_json::to_string(&LayoutBlob::from(state))
            .map_err(super::StoreError::from)
            .and_then(|text| self.store.set(LAYOUT_KEY, &text));
        if let Err(err) = result {
            tracing::debug!(%err, "failed to persist widget layout");
        }
    }

    /// Delete the blob. The caller reverts its in-memory state to
    /// [`GeometryState::initial`].
    pub fn reset(&self) -> GeometryState {
        if let Err(err) = self.store.remove(LAYOUT_KEY) {
            tracing::debug!(%err, "failed to delete persisted widget layout");
        }
        GeometryState::initial()
    }
}
