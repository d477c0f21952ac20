//! External collaborator interfaces.
//!
//! The gizmo map does not render, run operators, or own windows. Everything
//! it needs from the host application comes in through the narrow traits
//! defined here, bundled into [`Services`] for calls that need several of
//! them. Implementations live in the host; tests use in-memory doubles.

use std::fmt;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a viewport region. Each region owns at most one gizmo map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Snapshot of the view a gizmo map is being evaluated in.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext {
    /// The region dispatching the current draw or event.
    pub region: RegionId,
    /// Region bounds in window coordinates.
    pub rect: Rect,
}

/// Pointer cursor shapes a gizmo can request while highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorShape {
    Default,
    Crosshair,
    Move,
    ResizeEw,
    ResizeNs,
    ResizeNwse,
    ResizeNesw,
    Hand,
}

/// Identifier of an operator known to the host ("transform.translate" style).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub String);

impl OperatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An operator plus the properties it should be invoked with.
///
/// Gizmos that launch an operator on press carry one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorBinding {
    pub id: OperatorId,
    /// Operator properties, interpreted by the host's operator system.
    pub properties: serde_json::Value,
}

impl OperatorBinding {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: OperatorId::new(id),
            properties: serde_json::Value::Null,
        }
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }
}

/// How an operator should be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeMode {
    /// Interactive invocation; the operator may enter its own modal loop.
    Invoke,
    /// Direct execution with the bound properties, no interaction.
    Exec,
}

/// Outcome of an operator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    /// The operator took over input handling and is still running.
    RunningModal,
    /// The operator ran to completion immediately.
    Finished,
    /// The operator declined to run or was cancelled on invoke.
    Cancelled,
}

/// Errors surfaced by the operator execution service.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("unknown operator `{0}`")]
    UnknownOperator(OperatorId),
    #[error("operator `{id}` rejected its properties: {reason}")]
    InvalidProperties { id: OperatorId, reason: String },
}

/// Operator execution, provided by the host's window manager.
pub trait OperatorService {
    fn invoke(
        &mut self,
        binding: &OperatorBinding,
        mode: InvokeMode,
    ) -> Result<OperatorStatus, OperatorError>;
}

/// Selection modes for the GPU picking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Collect every hit, unordered. Used when the backend cannot run
    /// the two-pass nearest query.
    All,
    /// First pass of the nearest-hit query.
    NearestFirstPass,
    /// Second pass, given the hit count of the first.
    NearestSecondPass,
}

/// Hit-buffer capacity handed to [`GpuSelectService::begin`] for every
/// picking pass. Backends silently truncate hits beyond it.
pub const SELECT_BUFFER_CAPACITY: usize = 2048;

/// Offscreen GPU selection, used to resolve 3D gizmos under the pointer.
///
/// Protocol per pass: `begin`, one `push_id` per pickable piece of geometry
/// (issued from [`GizmoKind::draw_select`](crate::gizmo::GizmoKind::draw_select)),
/// `end` returning the hit count, then `nearest_hit` to read the result back.
pub trait GpuSelectService {
    /// Whether the backend supports the two-pass nearest query.
    fn supports_passes(&self) -> bool {
        false
    }

    /// Start a pass over `rect`. `capacity` bounds the backend's hit buffer;
    /// hits past it are dropped.
    fn begin(&mut self, rect: Rect, mode: SelectMode, capacity: usize, prev_hits: u32);

    /// Toggle depth testing for subsequently pushed geometry.
    fn set_depth_test(&mut self, enabled: bool);

    /// Register pickable geometry under `select_id`.
    fn push_id(&mut self, select_id: u32);

    /// Finish the pass, returning the number of ids that hit the query rect.
    fn end(&mut self) -> u32;

    /// The encoded id nearest to the query center, given the hit count of
    /// the first pass. `None` when nothing hit.
    fn nearest_hit(&self, hits: u32) -> Option<u32>;
}

/// Pointer cursor control for the window owning the region.
pub trait CursorService {
    fn set_cursor(&mut self, shape: CursorShape);

    /// Engage or release pointer grab (confine + hide) during modal drags
    /// that run without an operator.
    fn grab(&mut self, enabled: bool);
}

/// Region redraw tagging.
pub trait RedrawService {
    fn tag_region_redraw(&mut self, region: RegionId);
}

/// Synthetic event injection into the host's event queue.
pub trait EventInjector {
    /// Queue a pointer-move at the current pointer position so hover state
    /// re-evaluates on the next dispatch.
    fn synthesize_pointer_move(&mut self);
}

/// Draw target handed to gizmo draw callbacks.
///
/// Deliberately minimal: gizmokit decides *what* to draw and in which depth
/// mode, the host decides how the primitives reach the screen.
pub trait DrawSurface {
    fn set_depth_test(&mut self, enabled: bool);
    fn polyline(&mut self, points: &[Point], width: f64);
    fn circle(&mut self, center: Point, radius: f64, filled: bool);
}

/// Bundle of collaborator handles passed into map operations that touch
/// more than one of them.
pub struct Services<'a> {
    pub operators: &'a mut dyn OperatorService,
    pub cursor: &'a mut dyn CursorService,
    pub redraw: &'a mut dyn RedrawService,
    pub events: &'a mut dyn EventInjector,
}
