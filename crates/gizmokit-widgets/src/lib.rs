//! Ready-made gizmo kinds built on gizmokit-core.
//!
//! - **Button**: circular push button, usually operator-bound
//! - **Cage**: rectangular move/resize frame with corner handles
//! - **Arrow**: axis-constrained 3D drag handle
//!
//! Each kind is a plain [`GizmoKind`](gizmokit_core::GizmoKind)
//! implementation; hosts register them inside their own group kinds.

pub mod arrow;
pub mod button;
pub mod cage;

pub use arrow::{ArrowKind, PART_HEAD, PART_STEM};
pub use button::ButtonKind;
pub use cage::{CageKind, HANDLE_PX, PART_BODY, PART_NE, PART_NW, PART_SE, PART_SW};
