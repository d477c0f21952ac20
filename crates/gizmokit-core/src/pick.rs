//! Pointer-to-gizmo resolution for 3D gizmos via the GPU selection pass.
//!
//! 3D gizmos can't be hit-tested geometrically from screen space, so they
//! are drawn into an offscreen selection buffer under numeric ids and the
//! id nearest the pointer is read back. Two queries run for precision: a
//! coarse one over the full hotspot to find any candidate, then a narrow
//! one to prefer the most precisely-centered candidate. The narrow result
//! wins when it reports a hit.

use kurbo::{Point, Rect};

use crate::gizmo::Gizmo;
use crate::services::{GpuSelectService, SelectMode, SELECT_BUFFER_CAPACITY};

/// Pointer hotspot diameter in pixels. The coarse query uses half of this
/// as its radius, the narrow refinement a fifth of it.
pub const HOTSPOT_PX: f64 = 14.0;

/// One gizmo participating in the selection pass, with the depth mode its
/// group requests.
pub(crate) struct PickTarget<'a> {
    pub gizmo: &'a Gizmo,
    pub depth_3d: bool,
}

/// Resolve the pick target under `point`. Returns the index into `targets`
/// and the sub-part id decoded from the low 8 bits of the winning hit.
pub(crate) fn pick_3d(
    targets: &[PickTarget<'_>],
    gpu: &mut dyn GpuSelectService,
    point: Point,
) -> Option<(usize, u8)> {
    if targets.is_empty() {
        return None;
    }

    let coarse = pick_pass(targets, gpu, point, 0.5 * HOTSPOT_PX)?;
    let hit = pick_pass(targets, gpu, point, 0.2 * HOTSPOT_PX).unwrap_or(coarse);

    let index = (hit >> 8) as usize;
    let part = (hit & 0xff) as u8;
    if index >= targets.len() {
        log::warn!("selection pass returned out-of-range gizmo index {index}");
        return None;
    }
    Some((index, part))
}

/// One selection query around `point` with the given hotspot radius.
fn pick_pass(
    targets: &[PickTarget<'_>],
    gpu: &mut dyn GpuSelectService,
    point: Point,
    hotspot: f64,
) -> Option<u32> {
    let rect = Rect::new(
        point.x - hotspot,
        point.y - hotspot,
        point.x + hotspot,
        point.y + hotspot,
    );

    let do_passes = gpu.supports_passes();
    let first_mode = if do_passes {
        SelectMode::NearestFirstPass
    } else {
        SelectMode::All
    };

    gpu.begin(rect, first_mode, SELECT_BUFFER_CAPACITY, 0);
    draw_select_loop(targets, gpu);
    let hits = gpu.end();

    if do_passes && hits > 0 {
        gpu.begin(rect, SelectMode::NearestSecondPass, SELECT_BUFFER_CAPACITY, hits);
        draw_select_loop(targets, gpu);
        gpu.end();
    }

    gpu.nearest_hit(hits)
}

/// Draw every target into the selection buffer, encoding the target index
/// in the high bits and leaving the low 8 bits to the gizmo's own
/// draw-select callback for sub-part ids.
fn draw_select_loop(targets: &[PickTarget<'_>], gpu: &mut dyn GpuSelectService) {
    let mut depth_prev = false;
    for (index, target) in targets.iter().enumerate() {
        // A highlighted gizmo stays pickable even when occluded.
        let depth = target.depth_3d && !target.gizmo.is_highlighted();
        if depth != depth_prev {
            gpu.set_depth_test(depth);
            depth_prev = depth;
        }
        let kind = target.gizmo.kind().clone();
        kind.draw_select(target.gizmo, gpu, (index as u32) << 8);
    }
    if depth_prev {
        gpu.set_depth_test(false);
    }
}
