//! Pointer event types consumed by gizmo maps.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in region-local screen coordinates, matching the space
/// gizmo hit-testing operates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    /// The pointer position carried by this event.
    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. }
            | Self::Up { position, .. }
            | Self::Move { position, .. }
            | Self::Scroll { position, .. } => *position,
        }
    }

    /// Create a motion event without modifiers, as injected after modal
    /// disengage to re-evaluate hover state.
    pub fn synthetic_move(position: Point) -> Self {
        Self::Move {
            position,
            modifiers: Modifiers::default(),
        }
    }
}
