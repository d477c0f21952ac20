//! Axis-constrained arrow gizmo for 3D views.

use kurbo::{Point, Vec2};

use gizmokit_core::{CursorShape, DrawSurface, Gizmo, GizmoKind, GpuSelectService, PointerEvent};

/// Sub-part ids of the arrow.
pub const PART_STEM: u8 = 0;
pub const PART_HEAD: u8 = 1;

/// A drag handle pointing along a fixed screen-space direction. Dragging
/// slides the gizmo origin along that axis only; motion perpendicular to
/// it is discarded. Hit testing goes through the GPU selection pass, with
/// stem and head pickable as separate sub-parts.
#[derive(Debug, Clone)]
pub struct ArrowKind {
    direction: Vec2,
    length: f64,
}

#[derive(Debug, Clone, Copy)]
struct ArrowDrag {
    pointer: Point,
    origin: Point,
}

impl ArrowKind {
    /// `direction` is normalized; a zero vector falls back to +x.
    pub fn new(direction: Vec2, length: f64) -> Self {
        let norm = direction.hypot();
        let direction = if norm == 0.0 {
            Vec2::new(1.0, 0.0)
        } else {
            direction / norm
        };
        Self { direction, length }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    fn tip(&self, gizmo: &Gizmo) -> Point {
        gizmo.origin + self.direction * self.length
    }
}

impl GizmoKind for ArrowKind {
    fn name(&self) -> &str {
        "gizmokit.arrow"
    }

    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface) {
        let width = if gizmo.is_highlighted() { 3.0 } else { 1.5 };
        surface.polyline(&[gizmo.origin, self.tip(gizmo)], width);
        surface.circle(self.tip(gizmo), 3.0, gizmo.is_highlighted());
    }

    fn draw_select(&self, _gizmo: &Gizmo, gpu: &mut dyn GpuSelectService, select_id: u32) {
        gpu.push_id(select_id | u32::from(PART_STEM));
        gpu.push_id(select_id | u32::from(PART_HEAD));
    }

    fn invoke(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.interaction = Some(Box::new(ArrowDrag {
            pointer: event.position(),
            origin: gizmo.origin,
        }));
    }

    fn modal(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        let Some(start) = gizmo
            .interaction
            .as_ref()
            .and_then(|data| data.downcast_ref::<ArrowDrag>())
            .copied()
        else {
            return;
        };
        let delta = event.position() - start.pointer;
        let along = delta.dot(self.direction);
        gizmo.origin = start.origin + self.direction * along;
    }

    fn cursor(&self, _gizmo: &Gizmo) -> Option<CursorShape> {
        Some(CursorShape::Move)
    }
}
