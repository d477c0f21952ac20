//! Circular push-button gizmo, usually bound to an operator.

use kurbo::Point;

use gizmokit_core::{CursorShape, DrawSurface, Gizmo, GizmoKind};

/// A clickable circular button. The whole face is sub-part 0; pressing it
/// enters modal state, which for an operator-bound gizmo immediately hands
/// off to the operator.
#[derive(Debug, Clone)]
pub struct ButtonKind {
    radius: f64,
}

impl ButtonKind {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl GizmoKind for ButtonKind {
    fn name(&self) -> &str {
        "gizmokit.button"
    }

    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface) {
        surface.circle(gizmo.origin, self.radius, gizmo.is_highlighted());
    }

    fn test_select(&self, gizmo: &Gizmo, point: Point) -> Option<u8> {
        let d = point - gizmo.origin;
        (d.hypot() <= self.radius).then_some(0)
    }

    fn cursor(&self, _gizmo: &Gizmo) -> Option<CursorShape> {
        Some(CursorShape::Hand)
    }
}
