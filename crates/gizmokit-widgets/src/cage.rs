//! Rectangular cage gizmo: a move/resize frame around on-canvas content.

use kurbo::{Affine, Point, Rect, Size, Vec2};

use gizmokit_core::{CursorShape, DrawSurface, Gizmo, GizmoKind, PointerEvent};

/// Pick radius of the corner handles, in pixels.
pub const HANDLE_PX: f64 = 6.0;

/// Sub-part ids of the cage. The body is part 0.
pub const PART_BODY: u8 = 0;
pub const PART_NW: u8 = 1;
pub const PART_NE: u8 = 2;
pub const PART_SW: u8 = 3;
pub const PART_SE: u8 = 4;

/// A 2D rectangular frame centered on the gizmo origin, sized by the
/// gizmo's basis scale. Dragging the body (part 0) moves the frame,
/// dragging a corner handle resizes it with the opposite corner anchored.
#[derive(Debug, Clone)]
pub struct CageKind {
    min_size: f64,
}

/// Drag state captured on invoke and consumed by the modal callback.
#[derive(Debug, Clone, Copy)]
struct CageDrag {
    pointer: Point,
    origin: Point,
    size: Size,
    part: u8,
}

impl Default for CageKind {
    fn default() -> Self {
        Self { min_size: 10.0 }
    }
}

impl CageKind {
    pub fn new(min_size: f64) -> Self {
        Self { min_size }
    }

    fn size(gizmo: &Gizmo) -> Size {
        let coeffs = gizmo.basis.as_coeffs();
        Size::new(coeffs[0], coeffs[3])
    }

    fn rect(gizmo: &Gizmo) -> Rect {
        Rect::from_center_size(gizmo.origin, Self::size(gizmo))
    }

    /// Unit direction of a corner part from the cage center.
    fn corner_sign(part: u8) -> Option<Vec2> {
        match part {
            PART_NW => Some(Vec2::new(-1.0, -1.0)),
            PART_NE => Some(Vec2::new(1.0, -1.0)),
            PART_SW => Some(Vec2::new(-1.0, 1.0)),
            PART_SE => Some(Vec2::new(1.0, 1.0)),
            _ => None,
        }
    }

    fn corner_point(gizmo: &Gizmo, part: u8) -> Option<Point> {
        let sign = Self::corner_sign(part)?;
        let size = Self::size(gizmo);
        Some(
            gizmo.origin
                + Vec2::new(sign.x * size.width / 2.0, sign.y * size.height / 2.0),
        )
    }
}

impl GizmoKind for CageKind {
    fn name(&self) -> &str {
        "gizmokit.cage"
    }

    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface) {
        let rect = Self::rect(gizmo);
        let outline = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x0, rect.y0),
        ];
        surface.polyline(&outline, 1.0);

        if gizmo.is_highlighted() {
            for part in [PART_NW, PART_NE, PART_SW, PART_SE] {
                if let Some(corner) = Self::corner_point(gizmo, part) {
                    surface.circle(corner, HANDLE_PX / 2.0, part == gizmo.highlight_part());
                }
            }
        }
    }

    fn test_select(&self, gizmo: &Gizmo, point: Point) -> Option<u8> {
        // corner handles take priority over the body they overlap
        for part in [PART_NW, PART_NE, PART_SW, PART_SE] {
            if let Some(corner) = Self::corner_point(gizmo, part) {
                if (point - corner).hypot() <= HANDLE_PX {
                    return Some(part);
                }
            }
        }
        Self::rect(gizmo).contains(point).then_some(PART_BODY)
    }

    fn invoke(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.interaction = Some(Box::new(CageDrag {
            pointer: event.position(),
            origin: gizmo.origin,
            size: Self::size(gizmo),
            part: gizmo.highlight_part(),
        }));
    }

    fn modal(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        let Some(start) = gizmo
            .interaction
            .as_ref()
            .and_then(|data| data.downcast_ref::<CageDrag>())
            .copied()
        else {
            return;
        };
        let delta = event.position() - start.pointer;

        match Self::corner_sign(start.part) {
            None => {
                gizmo.origin = start.origin + delta;
            }
            Some(sign) => {
                let width = (start.size.width + sign.x * delta.x).max(self.min_size);
                let height = (start.size.height + sign.y * delta.y).max(self.min_size);
                // opposite corner stays anchored
                let anchor = start.origin
                    + Vec2::new(
                        -sign.x * start.size.width / 2.0,
                        -sign.y * start.size.height / 2.0,
                    );
                gizmo.origin = anchor + Vec2::new(sign.x * width / 2.0, sign.y * height / 2.0);
                gizmo.basis = Affine::scale_non_uniform(width, height);
            }
        }
    }

    fn cursor(&self, gizmo: &Gizmo) -> Option<CursorShape> {
        Some(match gizmo.highlight_part() {
            PART_NW | PART_SE => CursorShape::ResizeNwse,
            PART_NE | PART_SW => CursorShape::ResizeNesw,
            _ => CursorShape::Move,
        })
    }
}
