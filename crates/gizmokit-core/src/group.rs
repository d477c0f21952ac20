//! Gizmo groups: poll-gated collections of gizmos instantiated together.

use std::fmt;
use std::sync::Arc;

use kurbo::Point;

use crate::gizmo::Gizmo;
use crate::services::ViewContext;

/// Which phase of region drawing a group participates in. 2D groups draw in
/// screen space after the scene, 3D groups draw inside the scene projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStep {
    TwoD,
    ThreeD,
}

/// Static behavior flags of a group kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFlags {
    /// Gizmos are positioned in the 3D scene and hit-tested through the GPU
    /// selection pass rather than direct geometry tests.
    pub three_d: bool,
    /// Draw (and pick) gizmos with depth testing, so scene geometry can
    /// occlude them.
    pub depth_3d: bool,
    /// Gizmos of this group participate in select-all.
    pub select: bool,
    /// Keep drawing sibling gizmos while one of them is modal.
    pub draw_modal_all: bool,
}

/// The behavior of a group kind: lifecycle hooks invoked by the owning map.
///
/// [`setup`](Self::setup) is mandatory and runs once, lazily, on the first
/// prepare pass the group is visible in. The remaining hooks default to
/// no-ops.
pub trait GizmoGroupKind: fmt::Debug {
    /// Kind name, for diagnostics.
    fn name(&self) -> &str;

    fn flags(&self) -> GroupFlags {
        GroupFlags::default()
    }

    /// Whether the group applies in the current view. Polled before every
    /// prepare pass and hit test; a failing poll skips the group entirely.
    fn poll(&self, ctx: &ViewContext) -> bool {
        let _ = ctx;
        true
    }

    /// One-time initialization: create the group's gizmos.
    fn setup(&self, group: &mut GizmoGroup);

    /// Rebuild derived state after the map was tagged dirty.
    fn refresh(&self, group: &mut GizmoGroup, ctx: &ViewContext) {
        let _ = (group, ctx);
    }

    /// Per-frame hook before the group's gizmos are drawn.
    fn draw_prepare(&self, group: &mut GizmoGroup, ctx: &ViewContext) {
        let _ = (group, ctx);
    }
}

/// One instantiated group inside a map. Owns its gizmos; the kind is shared
/// with the registry entry it was instantiated from.
#[derive(Debug)]
pub struct GizmoGroup {
    kind: Arc<dyn GizmoGroupKind>,
    gizmos: Vec<Gizmo>,
    initialized: bool,
}

impl GizmoGroup {
    pub(crate) fn new(kind: Arc<dyn GizmoGroupKind>) -> Self {
        Self {
            kind,
            gizmos: Vec::new(),
            initialized: false,
        }
    }

    pub fn kind(&self) -> &Arc<dyn GizmoGroupKind> {
        &self.kind
    }

    pub fn flags(&self) -> GroupFlags {
        self.kind.flags()
    }

    pub fn gizmos(&self) -> &[Gizmo] {
        &self.gizmos
    }

    pub fn gizmos_mut(&mut self) -> &mut [Gizmo] {
        &mut self.gizmos
    }

    /// Append a gizmo, returning its index within the group.
    pub fn add(&mut self, gizmo: Gizmo) -> usize {
        self.gizmos.push(gizmo);
        self.gizmos.len() - 1
    }

    pub(crate) fn ensure_initialized(&mut self) {
        if !self.initialized {
            let kind = Arc::clone(&self.kind);
            kind.setup(self);
            self.initialized = true;
            log::debug!(
                "initialized gizmo group `{}` with {} gizmo(s)",
                kind.name(),
                self.gizmos.len()
            );
        }
    }

    pub(crate) fn is_visible_in_drawstep(&self, step: DrawStep) -> bool {
        match step {
            DrawStep::TwoD => !self.flags().three_d,
            DrawStep::ThreeD => self.flags().three_d,
        }
    }

    /// Direct 2D hit test across the group's gizmos, in insertion order.
    pub(crate) fn find_intersected(&self, point: Point) -> Option<(usize, u8)> {
        for (index, gizmo) in self.gizmos.iter().enumerate() {
            if gizmo.hidden {
                continue;
            }
            if let Some(part) = gizmo.kind().test_select(gizmo, point) {
                return Some((index, part));
            }
        }
        None
    }
}
