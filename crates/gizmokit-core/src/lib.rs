//! GizmoKit Core Library
//!
//! Host-agnostic gizmo (on-screen manipulator) maps: per-region widget
//! registries with highlight, modal and selection state, geometric and
//! GPU-buffer hit testing, and operator handoff through narrow host traits.

pub mod event;
pub mod gizmo;
pub mod group;
pub mod map;
pub mod pick;
pub mod registry;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use event::{Modifiers, MouseButton, PointerEvent};
pub use gizmo::{Gizmo, GizmoKind, GizmoRef, ModalFn, SelectAction, Visibility};
pub use group::{DrawStep, GizmoGroup, GizmoGroupKind, GroupFlags};
pub use map::GizmoMap;
pub use pick::HOTSPOT_PX;
pub use registry::{GizmoMapType, GizmoTypeRegistry, MapTypeKey, RegionKind, SpaceKind};
pub use services::{
    CursorService, CursorShape, DrawSurface, EventInjector, GpuSelectService, InvokeMode,
    OperatorBinding, OperatorError, OperatorId, OperatorService, OperatorStatus, RedrawService,
    RegionId, SelectMode, Services, ViewContext, SELECT_BUFFER_CAPACITY,
};
