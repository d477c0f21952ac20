//! Shared test doubles: scripted collaborator services and simple gizmo
//! kinds used across the crate's unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kurbo::{Point, Rect};

use crate::event::PointerEvent;
use crate::gizmo::{Gizmo, GizmoKind, SelectAction};
use crate::group::{GizmoGroup, GizmoGroupKind, GroupFlags};
use crate::services::{
    CursorService, CursorShape, DrawSurface, EventInjector, GpuSelectService, InvokeMode,
    OperatorBinding, OperatorError, OperatorId, OperatorService, OperatorStatus, RedrawService,
    RegionId, SelectMode, Services, ViewContext,
};

/// Route log output through the test harness so failing tests show the
/// map's debug lines.
pub(crate) fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn ctx() -> ViewContext {
    init_logs();
    ViewContext {
        region: RegionId(1),
        rect: Rect::new(0.0, 0.0, 800.0, 600.0),
    }
}

/// A 2D circular gizmo kind hit-tested around its origin. Sub-part 0 is the
/// body; dragging moves the origin to the pointer.
#[derive(Debug)]
pub(crate) struct KnobKind {
    radius: f64,
    counters: Arc<GroupCounters>,
}

impl KnobKind {
    pub(crate) fn new(radius: f64) -> Self {
        Self {
            radius,
            counters: Arc::default(),
        }
    }

    fn with_counters(radius: f64, counters: Arc<GroupCounters>) -> Self {
        Self { radius, counters }
    }
}

impl GizmoKind for KnobKind {
    fn name(&self) -> &str {
        "test.knob"
    }

    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface) {
        surface.circle(gizmo.origin, self.radius, gizmo.is_highlighted());
    }

    fn test_select(&self, gizmo: &Gizmo, point: Point) -> Option<u8> {
        let d = point - gizmo.origin;
        (d.hypot() <= self.radius).then_some(0)
    }

    fn update(&self, _gizmo: &mut Gizmo, _full_refresh: bool) {
        self.counters.update.fetch_add(1, Ordering::Relaxed);
    }

    fn invoke(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.interaction = Some(Box::new(event.position()));
    }

    fn modal(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.origin = event.position();
    }

    fn cursor(&self, _gizmo: &Gizmo) -> Option<CursorShape> {
        Some(CursorShape::Crosshair)
    }
}

/// A 3D gizmo kind that only participates in the GPU selection pass.
#[derive(Debug)]
pub(crate) struct SolidKind;

impl GizmoKind for SolidKind {
    fn name(&self) -> &str {
        "test.solid"
    }

    fn draw(&self, gizmo: &Gizmo, surface: &mut dyn DrawSurface) {
        surface.circle(gizmo.origin, 1.0, false);
    }

    fn draw_select(&self, _gizmo: &Gizmo, gpu: &mut dyn GpuSelectService, select_id: u32) {
        gpu.push_id(select_id);
    }

    fn modal(&self, gizmo: &mut Gizmo, event: &PointerEvent) {
        gizmo.origin = event.position();
    }
}

/// Lifecycle counters shared between a group kind and the test body.
#[derive(Debug, Default)]
pub(crate) struct GroupCounters {
    pub setup: AtomicUsize,
    pub refresh: AtomicUsize,
    pub draw_prepare: AtomicUsize,
    /// Per-gizmo update callbacks, accumulated across the group's knobs.
    pub update: AtomicUsize,
}

pub(crate) struct KnobSpec {
    pub name: String,
    pub origin: Point,
    pub radius: f64,
    pub operator: Option<OperatorBinding>,
    pub hidden: bool,
    pub hover: bool,
}

/// Configurable group kind creating [`KnobKind`] gizmos, or [`SolidKind`]
/// ones when flagged 3D.
#[derive(Debug)]
pub(crate) struct KnobGroupKind {
    name: String,
    flags: GroupFlags,
    knobs: Vec<KnobSpec>,
    pub(crate) enabled: Arc<AtomicBool>,
    pub(crate) counters: Arc<GroupCounters>,
}

impl std::fmt::Debug for KnobSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnobSpec").field("name", &self.name).finish()
    }
}

impl KnobGroupKind {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: GroupFlags {
                select: true,
                ..GroupFlags::default()
            },
            knobs: Vec::new(),
            enabled: Arc::new(AtomicBool::new(true)),
            counters: Arc::new(GroupCounters::default()),
        }
    }

    pub(crate) fn with_flags(mut self, flags: GroupFlags) -> Self {
        self.flags = flags;
        self
    }

    pub(crate) fn with_knob(mut self, name: &str, origin: Point, radius: f64) -> Self {
        self.knobs.push(KnobSpec {
            name: name.to_string(),
            origin,
            radius,
            operator: None,
            hidden: false,
            hover: false,
        });
        self
    }

    pub(crate) fn with_bound_knob(
        mut self,
        name: &str,
        origin: Point,
        radius: f64,
        operator: OperatorBinding,
    ) -> Self {
        self.knobs.push(KnobSpec {
            name: name.to_string(),
            origin,
            radius,
            operator: Some(operator),
            hidden: false,
            hover: false,
        });
        self
    }

    pub(crate) fn with_hidden_knob(mut self, name: &str, origin: Point, radius: f64) -> Self {
        self.knobs.push(KnobSpec {
            name: name.to_string(),
            origin,
            radius,
            operator: None,
            hidden: true,
            hover: false,
        });
        self
    }

    pub(crate) fn with_hover_knob(mut self, name: &str, origin: Point, radius: f64) -> Self {
        self.knobs.push(KnobSpec {
            name: name.to_string(),
            origin,
            radius,
            operator: None,
            hidden: false,
            hover: true,
        });
        self
    }
}

impl GizmoGroupKind for KnobGroupKind {
    fn name(&self) -> &str {
        &self.name
    }

    fn flags(&self) -> GroupFlags {
        self.flags
    }

    fn poll(&self, _ctx: &ViewContext) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn setup(&self, group: &mut GizmoGroup) {
        self.counters.setup.fetch_add(1, Ordering::Relaxed);
        for spec in &self.knobs {
            let kind: Arc<dyn GizmoKind> = if self.flags.three_d {
                Arc::new(SolidKind)
            } else {
                Arc::new(KnobKind::with_counters(
                    spec.radius,
                    Arc::clone(&self.counters),
                ))
            };
            let mut gizmo = Gizmo::new(spec.name.clone(), kind).at(spec.origin);
            gizmo.operator = spec.operator.clone();
            gizmo.hidden = spec.hidden;
            gizmo.draw_hover = spec.hover;
            group.add(gizmo);
        }
    }

    fn refresh(&self, _group: &mut GizmoGroup, _ctx: &ViewContext) {
        self.counters.refresh.fetch_add(1, Ordering::Relaxed);
    }

    fn draw_prepare(&self, _group: &mut GizmoGroup, _ctx: &ViewContext) {
        self.counters.draw_prepare.fetch_add(1, Ordering::Relaxed);
    }
}

/// Scripted outcome of one GPU selection pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScriptedPass {
    pub hits: u32,
    pub nearest: Option<u32>,
}

impl ScriptedPass {
    pub(crate) fn hit(hits: u32, nearest: u32) -> Self {
        Self {
            hits,
            nearest: Some(nearest),
        }
    }

    pub(crate) fn miss() -> Self {
        Self {
            hits: 0,
            nearest: None,
        }
    }
}

/// Record of one begin/end cycle against the mock GPU service.
#[derive(Debug)]
pub(crate) struct PassRecord {
    pub rect: Rect,
    pub mode: SelectMode,
    pub capacity: usize,
    pub prev_hits: u32,
    pub pushed: Vec<u32>,
    pub depth_toggles: Vec<bool>,
    pub nearest: Option<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct MockGpuSelect {
    pub supports_passes: bool,
    script: VecDeque<ScriptedPass>,
    current: Option<(PassRecord, u32)>,
    pub passes_run: Vec<PassRecord>,
}

impl MockGpuSelect {
    pub(crate) fn scripted(script: Vec<ScriptedPass>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }
}

impl GpuSelectService for MockGpuSelect {
    fn supports_passes(&self) -> bool {
        self.supports_passes
    }

    fn begin(&mut self, rect: Rect, mode: SelectMode, capacity: usize, prev_hits: u32) {
        let outcome = self.script.pop_front().unwrap_or(ScriptedPass::miss());
        self.current = Some((
            PassRecord {
                rect,
                mode,
                capacity,
                prev_hits,
                pushed: Vec::new(),
                depth_toggles: Vec::new(),
                nearest: outcome.nearest,
            },
            outcome.hits,
        ));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        if let Some((record, _)) = self.current.as_mut() {
            record.depth_toggles.push(enabled);
        }
    }

    fn push_id(&mut self, select_id: u32) {
        if let Some((record, _)) = self.current.as_mut() {
            record.pushed.push(select_id);
        }
    }

    fn end(&mut self) -> u32 {
        match self.current.take() {
            Some((record, hits)) => {
                self.passes_run.push(record);
                hits
            }
            None => 0,
        }
    }

    fn nearest_hit(&self, hits: u32) -> Option<u32> {
        if hits == 0 {
            return None;
        }
        self.passes_run.last().and_then(|record| record.nearest)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedOperator {
    pub responses: VecDeque<Result<OperatorStatus, OperatorError>>,
    pub invocations: Vec<(OperatorId, InvokeMode)>,
}

impl ScriptedOperator {
    pub(crate) fn respond(status: OperatorStatus) -> Self {
        Self {
            responses: VecDeque::from([Ok(status)]),
            invocations: Vec::new(),
        }
    }

    pub(crate) fn fail(error: OperatorError) -> Self {
        Self {
            responses: VecDeque::from([Err(error)]),
            invocations: Vec::new(),
        }
    }
}

impl OperatorService for ScriptedOperator {
    fn invoke(
        &mut self,
        binding: &OperatorBinding,
        mode: InvokeMode,
    ) -> Result<OperatorStatus, OperatorError> {
        self.invocations.push((binding.id.clone(), mode));
        self.responses
            .pop_front()
            .unwrap_or(Ok(OperatorStatus::RunningModal))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingCursor {
    pub cursors: Vec<CursorShape>,
    pub grabs: Vec<bool>,
}

impl CursorService for RecordingCursor {
    fn set_cursor(&mut self, shape: CursorShape) {
        self.cursors.push(shape);
    }

    fn grab(&mut self, enabled: bool) {
        self.grabs.push(enabled);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingRedraw {
    pub tags: Vec<RegionId>,
}

impl RedrawService for RecordingRedraw {
    fn tag_region_redraw(&mut self, region: RegionId) {
        self.tags.push(region);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingEvents {
    pub synthesized_moves: usize,
}

impl EventInjector for RecordingEvents {
    fn synthesize_pointer_move(&mut self) {
        self.synthesized_moves += 1;
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub depth_toggles: Vec<bool>,
    pub circles: Vec<(Point, f64)>,
    pub polylines: usize,
}

impl DrawSurface for RecordingSurface {
    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_toggles.push(enabled);
    }

    fn polyline(&mut self, _points: &[Point], _width: f64) {
        self.polylines += 1;
    }

    fn circle(&mut self, center: Point, radius: f64, _filled: bool) {
        self.circles.push((center, radius));
    }
}

/// Owns one of every collaborator double and lends them out as [`Services`].
#[derive(Debug, Default)]
pub(crate) struct TestHost {
    pub operators: ScriptedOperator,
    pub cursor: RecordingCursor,
    pub redraw: RecordingRedraw,
    pub events: RecordingEvents,
}

impl TestHost {
    pub(crate) fn with_operator(operators: ScriptedOperator) -> Self {
        Self {
            operators,
            ..Self::default()
        }
    }

    pub(crate) fn services(&mut self) -> Services<'_> {
        Services {
            operators: &mut self.operators,
            cursor: &mut self.cursor,
            redraw: &mut self.redraw,
            events: &mut self.events,
        }
    }
}
