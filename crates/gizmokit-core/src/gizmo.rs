//! The leaf interactive widget and its capability interface.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::PointerEvent;
use crate::services::{CursorShape, DrawSurface, GpuSelectService, OperatorBinding};

/// Handle to a gizmo inside its owning map: group slot plus index within
/// the group. A gizmo stays in one group for its entire lifetime, so the
/// handle is stable until the group itself is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GizmoRef {
    pub group: usize,
    pub index: usize,
}

/// Select/deselect action for [`GizmoMap::select_all`](crate::map::GizmoMap::select_all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectAction {
    Select,
    Deselect,
}

/// Visibility outcome for one gizmo in a prepare pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Skip entirely.
    Hidden,
    /// Run the update callback but don't draw. Hover-only gizmos need
    /// updating even while they're not shown.
    UpdateOnly,
    /// Update and draw.
    Draw,
}

/// Per-instance modal override, taking priority over the kind's default.
pub type ModalFn = fn(&mut Gizmo, &PointerEvent);

/// The behavior of a gizmo kind.
///
/// Every method except [`draw`](Self::draw) has a no-op default, so a kind
/// implements only the interactions it supports. A kind that never overrides
/// [`test_select`](Self::test_select) or [`draw_select`](Self::draw_select)
/// simply never reports hits.
pub trait GizmoKind: fmt::Debug {
    /// Kind name, for diagnostics.
    fn name(&self) -> &str;

    /// Draw the gizmo for display.
    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface);

    /// Contribute pickable geometry to the 3D selection pass. The low 8 bits
    /// of `select_id` are free for a sub-part id; push `select_id | part`.
    fn draw_select(&self, gizmo: &Gizmo, gpu: &mut dyn GpuSelectService, select_id: u32) {
        let _ = (gizmo, gpu, select_id);
    }

    /// Direct geometric hit test for 2D gizmos. Returns the hit sub-part id.
    fn test_select(&self, gizmo: &Gizmo, point: Point) -> Option<u8> {
        let _ = (gizmo, point);
        None
    }

    /// Refresh derived per-gizmo data before drawing. `full_refresh` is set
    /// when the owning map was tagged dirty.
    fn update(&self, gizmo: &mut Gizmo, full_refresh: bool) {
        let _ = (gizmo, full_refresh);
    }

    /// Called when the gizmo enters modal state, before any bound operator
    /// is invoked. Typically stashes drag-start state in
    /// [`Gizmo::interaction`].
    fn invoke(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        let _ = (gizmo, event);
    }

    /// Per-event update while the gizmo is modal.
    fn modal(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        let _ = (gizmo, event);
    }

    /// Notification that the gizmo was (de)selected through select-all.
    fn select(&self, gizmo: &mut Gizmo, action: SelectAction) {
        let _ = (gizmo, action);
    }

    /// Cursor to show while the gizmo is highlighted.
    fn cursor(&self, gizmo: &Gizmo) -> Option<CursorShape> {
        let _ = gizmo;
        None
    }
}

/// An interactive on-screen widget, owned by exactly one group.
pub struct Gizmo {
    /// Stable identity, for diagnostics and host-side bookkeeping.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    kind: Arc<dyn GizmoKind>,
    /// Anchor position in the group's coordinate space.
    pub origin: Point,
    /// Basis transform applied to the gizmo's local geometry.
    pub basis: Affine,
    /// Excluded from drawing and hit testing while set.
    pub hidden: bool,
    /// Only drawn while highlighted; still updated otherwise.
    pub draw_hover: bool,
    /// Operator launched when the gizmo enters modal state.
    pub operator: Option<OperatorBinding>,
    /// Per-instance modal override.
    pub custom_modal: Option<ModalFn>,
    /// Transient drag state, owned by the kind's invoke/modal callbacks.
    /// Cleared whenever modal state ends.
    pub interaction: Option<Box<dyn Any>>,
    pub(crate) highlighted: bool,
    pub(crate) highlight_part: u8,
    pub(crate) modal: bool,
    pub(crate) selected: bool,
}

impl Gizmo {
    pub fn new(name: impl Into<String>, kind: Arc<dyn GizmoKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            origin: Point::ZERO,
            basis: Affine::IDENTITY,
            hidden: false,
            draw_hover: false,
            operator: None,
            custom_modal: None,
            interaction: None,
            highlighted: false,
            highlight_part: 0,
            modal: false,
            selected: false,
        }
    }

    pub fn at(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_operator(mut self, binding: OperatorBinding) -> Self {
        self.operator = Some(binding);
        self
    }

    pub fn kind(&self) -> &Arc<dyn GizmoKind> {
        &self.kind
    }

    /// Whether the pointer is currently over this gizmo.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Sub-part id under the pointer while highlighted, 0 otherwise.
    pub fn highlight_part(&self) -> u8 {
        self.highlight_part
    }

    /// Whether this gizmo currently captures input.
    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Resolve the visibility policy for the current prepare pass.
    pub fn visibility(&self) -> Visibility {
        if self.hidden {
            Visibility::Hidden
        } else if self.draw_hover && !self.highlighted {
            Visibility::UpdateOnly
        } else {
            Visibility::Draw
        }
    }
}

impl fmt::Debug for Gizmo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gizmo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("hidden", &self.hidden)
            .field("highlighted", &self.highlighted)
            .field("highlight_part", &self.highlight_part)
            .field("modal", &self.modal)
            .field("selected", &self.selected)
            .field("has_interaction", &self.interaction.is_some())
            .finish_non_exhaustive()
    }
}
