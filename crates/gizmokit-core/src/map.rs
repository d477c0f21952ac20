//! Per-region gizmo map: owns group instances and all interaction state.

use kurbo::{Point, Rect};

use crate::event::PointerEvent;
use crate::gizmo::{Gizmo, GizmoRef, SelectAction, Visibility};
use crate::group::{DrawStep, GizmoGroup, GroupFlags};
use crate::pick::{self, PickTarget};
use crate::registry::{GizmoTypeRegistry, MapTypeKey};
use crate::services::{
    CursorShape, DrawSurface, GpuSelectService, InvokeMode, OperatorId, OperatorStatus, RegionId,
    Services, ViewContext,
};

/// One gizmo map, owned by a viewport region.
///
/// Holds the group instances created from the map type's registered group
/// kinds, plus the interaction context: the highlighted gizmo, the modal
/// gizmo capturing input, and the current multi-selection. All weak
/// references are [`GizmoRef`] index handles into this map, so they can
/// never outlive or dangle past the gizmos they name.
///
/// All mutation happens synchronously on the UI event thread; the map does
/// no locking of its own.
#[derive(Debug)]
pub struct GizmoMap {
    key: MapTypeKey,
    region: RegionId,
    groups: Vec<GizmoGroup>,
    /// Refresh-needed dirty bit. Set by [`tag_refresh`](Self::tag_refresh),
    /// cleared exactly once per prepare pass.
    refresh_pending: bool,
    highlight: Option<GizmoRef>,
    modal: Option<GizmoRef>,
    selected: Vec<GizmoRef>,
}

impl GizmoMap {
    /// Create a map for `key`, instantiating one group per group kind
    /// currently registered for that key. The map starts dirty.
    pub fn new(registry: &mut GizmoTypeRegistry, key: MapTypeKey, region: RegionId) -> Self {
        let map_type = registry.ensure(key);
        let groups = map_type
            .group_kinds()
            .iter()
            .cloned()
            .map(GizmoGroup::new)
            .collect();
        Self {
            key,
            region,
            groups,
            refresh_pending: true,
            highlight: None,
            modal: None,
            selected: Vec::new(),
        }
    }

    pub fn key(&self) -> MapTypeKey {
        self.key
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn groups(&self) -> &[GizmoGroup] {
        &self.groups
    }

    pub fn gizmo(&self, handle: GizmoRef) -> Option<&Gizmo> {
        self.groups.get(handle.group)?.gizmos().get(handle.index)
    }

    pub fn gizmo_mut(&mut self, handle: GizmoRef) -> Option<&mut Gizmo> {
        self.groups
            .get_mut(handle.group)?
            .gizmos_mut()
            .get_mut(handle.index)
    }

    fn group_flags(&self, handle: GizmoRef) -> GroupFlags {
        self.groups
            .get(handle.group)
            .map(GizmoGroup::flags)
            .unwrap_or_default()
    }

    /// Mark the map as needing a refresh on the next prepare pass.
    pub fn tag_refresh(&mut self) {
        self.refresh_pending = true;
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Remove a group, dropping its gizmos. Weak handles into the removed
    /// group are cleared; handles into later groups are shifted in place.
    pub fn remove_group(&mut self, group: usize) -> Option<GizmoGroup> {
        if group >= self.groups.len() {
            return None;
        }
        let removed = self.groups.remove(group);

        let fix = |handle: GizmoRef| -> Option<GizmoRef> {
            if handle.group == group {
                None
            } else if handle.group > group {
                Some(GizmoRef {
                    group: handle.group - 1,
                    ..handle
                })
            } else {
                Some(handle)
            }
        };
        self.highlight = self.highlight.and_then(fix);
        self.modal = self.modal.and_then(fix);
        self.selected = self.selected.iter().copied().filter_map(fix).collect();
        Some(removed)
    }

    /* ---------------- draw preparation ---------------- */

    /// Refresh dirty groups and collect the gizmos to draw for `step`, in
    /// group-registration then gizmo-insertion order.
    ///
    /// While a gizmo is modal and its group doesn't request
    /// `draw_modal_all`, only the modal gizmo is evaluated and returned;
    /// siblings are suppressed to avoid interaction ambiguity mid-drag.
    /// The dirty flag is cleared exactly once per call, on every path.
    pub fn prepare_drawing(&mut self, ctx: &ViewContext, step: DrawStep) -> Vec<GizmoRef> {
        let mut draw_list = Vec::new();

        if let Some(modal) = self.modal {
            if !self.group_flags(modal).draw_modal_all {
                self.prepare_gizmo(modal, &mut draw_list);
                self.refresh_pending = false;
                return draw_list;
            }
        }

        let refresh = self.refresh_pending;
        for group_index in 0..self.groups.len() {
            let kind = self.groups[group_index].kind().clone();
            // drawstep first, to avoid calling the poll hook needlessly
            if !self.groups[group_index].is_visible_in_drawstep(step) || !kind.poll(ctx) {
                continue;
            }
            self.groups[group_index].ensure_initialized();
            if refresh {
                kind.refresh(&mut self.groups[group_index], ctx);
            }
            kind.draw_prepare(&mut self.groups[group_index], ctx);

            for index in 0..self.groups[group_index].gizmos().len() {
                self.prepare_gizmo(
                    GizmoRef {
                        group: group_index,
                        index,
                    },
                    &mut draw_list,
                );
            }
        }

        self.refresh_pending = false;
        draw_list
    }

    fn prepare_gizmo(&mut self, handle: GizmoRef, draw_list: &mut Vec<GizmoRef>) {
        let full_refresh = self.refresh_pending;
        let Some(gizmo) = self.gizmo_mut(handle) else {
            return;
        };
        match gizmo.visibility() {
            Visibility::Hidden => {}
            Visibility::UpdateOnly => {
                let kind = gizmo.kind().clone();
                kind.update(gizmo, full_refresh);
            }
            Visibility::Draw => {
                let kind = gizmo.kind().clone();
                kind.update(gizmo, full_refresh);
                draw_list.push(handle);
            }
        }
    }

    /// Prepare and draw all visible gizmos for `step`, toggling depth
    /// testing per gizmo. A highlighted gizmo is drawn without depth so it
    /// stays visible through occluders.
    pub fn draw(&mut self, ctx: &ViewContext, step: DrawStep, surface: &mut dyn DrawSurface) {
        let draw_list = self.prepare_drawing(ctx, step);

        let mut depth_prev = false;
        for handle in draw_list {
            let flags = self.group_flags(handle);
            let Some(gizmo) = self.gizmo(handle) else {
                continue;
            };
            let depth = flags.depth_3d && !gizmo.is_highlighted();
            if depth != depth_prev {
                surface.set_depth_test(depth);
                depth_prev = depth;
            }
            gizmo.kind().clone().draw(gizmo, surface);
        }
        if depth_prev {
            surface.set_depth_test(false);
        }
    }

    /* ---------------- hit testing ---------------- */

    /// Find the gizmo under `point` and its sub-part id.
    ///
    /// 2D gizmos are tested geometrically first, in group order, and take
    /// strict priority. Only when no 2D gizmo hits are the 3D groups'
    /// gizmos resolved through the GPU selection pass.
    pub fn find_intersected(
        &self,
        ctx: &ViewContext,
        gpu: &mut dyn GpuSelectService,
        point: Point,
    ) -> Option<(GizmoRef, u8)> {
        let mut intersectable_3d: Vec<GizmoRef> = Vec::new();

        for (group_index, group) in self.groups.iter().enumerate() {
            if !group.kind().poll(ctx) {
                continue;
            }
            if group.flags().three_d {
                for (index, gizmo) in group.gizmos().iter().enumerate() {
                    if !gizmo.hidden {
                        intersectable_3d.push(GizmoRef {
                            group: group_index,
                            index,
                        });
                    }
                }
            } else if let Some((index, part)) = group.find_intersected(point) {
                return Some((
                    GizmoRef {
                        group: group_index,
                        index,
                    },
                    part,
                ));
            }
        }

        if intersectable_3d.is_empty() {
            return None;
        }

        let targets: Vec<PickTarget<'_>> = intersectable_3d
            .iter()
            .filter_map(|&handle| {
                Some(PickTarget {
                    gizmo: self.gizmo(handle)?,
                    depth_3d: self.group_flags(handle).depth_3d,
                })
            })
            .collect();

        let (target_index, part) = pick::pick_3d(&targets, gpu, point)?;
        intersectable_3d
            .get(target_index)
            .map(|&handle| (handle, part))
    }

    /* ---------------- highlight ---------------- */

    pub fn highlight(&self) -> Option<GizmoRef> {
        self.highlight
    }

    /// Move the highlight to `target` (gizmo plus sub-part), or clear it.
    ///
    /// A no-op when the target gizmo and part already match, so repeated
    /// hover events don't retag the region. Otherwise the previous
    /// highlight is cleared, the cursor is updated from the new gizmo's
    /// cursor callback (or reset), and the region is tagged for redraw.
    pub fn highlight_set(
        &mut self,
        ctx: &ViewContext,
        services: &mut Services<'_>,
        target: Option<(GizmoRef, u8)>,
    ) {
        let unchanged = match (target, self.highlight) {
            (None, None) => true,
            (Some((handle, part)), Some(current)) => {
                handle == current
                    && self
                        .gizmo(handle)
                        .is_some_and(|g| g.highlight_part() == part)
            }
            _ => false,
        };
        if unchanged {
            return;
        }

        if let Some(previous) = self.highlight.take() {
            if let Some(gizmo) = self.gizmo_mut(previous) {
                gizmo.highlighted = false;
                gizmo.highlight_part = 0;
            }
        }

        match target {
            Some((handle, part)) => {
                let Some(gizmo) = self.gizmo_mut(handle) else {
                    log::warn!("highlight target {handle:?} no longer exists");
                    services.cursor.set_cursor(CursorShape::Default);
                    services.redraw.tag_region_redraw(ctx.region);
                    return;
                };
                gizmo.highlighted = true;
                gizmo.highlight_part = part;
                log::debug!("highlight -> `{}` part {part}", gizmo.name);

                let kind = gizmo.kind().clone();
                let shape = kind.cursor(gizmo).unwrap_or(CursorShape::Default);
                self.highlight = Some(handle);
                services.cursor.set_cursor(shape);
            }
            None => {
                services.cursor.set_cursor(CursorShape::Default);
            }
        }

        services.redraw.tag_region_redraw(ctx.region);
    }

    /* ---------------- modal ---------------- */

    pub fn modal(&self) -> Option<GizmoRef> {
        self.modal
    }

    /// Engage modal state on a gizmo, or disengage with `None`.
    ///
    /// Engaging runs the gizmo's invoke hook, then launches its bound
    /// operator if it has one. When the operator doesn't stay running
    /// modally (declined, finished immediately, or failed), the engage is
    /// rolled back and the map is left with no modal target. Gizmos without
    /// an operator drive the interaction themselves under pointer grab.
    ///
    /// Disengaging clears the gizmo's modal flag and transient interaction
    /// data, releases the pointer grab, tags the region for redraw, and
    /// synthesizes a pointer move so hover state re-evaluates immediately.
    pub fn modal_set(
        &mut self,
        ctx: &ViewContext,
        services: &mut Services<'_>,
        event: &PointerEvent,
        target: Option<GizmoRef>,
    ) {
        match target {
            Some(handle) => {
                let Some(gizmo) = self.gizmo_mut(handle) else {
                    log::warn!("modal target {handle:?} no longer exists");
                    return;
                };
                gizmo.modal = true;
                let kind = gizmo.kind().clone();
                let binding = gizmo.operator.clone();
                kind.invoke(gizmo, event);
                let name = gizmo.name.clone();
                self.modal = Some(handle);

                match binding {
                    Some(binding) => {
                        match services.operators.invoke(&binding, InvokeMode::Invoke) {
                            Ok(OperatorStatus::RunningModal) => {
                                log::debug!("modal -> `{name}` running `{}`", binding.id);
                            }
                            Ok(status) => {
                                log::debug!(
                                    "operator `{}` ended immediately ({status:?}), dropping modal `{name}`",
                                    binding.id
                                );
                                self.modal_rollback(handle);
                            }
                            Err(err) => {
                                log::warn!("operator `{}` failed to invoke: {err}", binding.id);
                                self.modal_rollback(handle);
                            }
                        }
                    }
                    None => {
                        log::debug!("modal -> `{name}`");
                        services.cursor.grab(true);
                    }
                }
            }
            None => {
                if let Some(previous) = self.modal.take() {
                    if let Some(gizmo) = self.gizmo_mut(previous) {
                        gizmo.modal = false;
                        gizmo.interaction = None;
                        log::debug!("modal cleared from `{}`", gizmo.name);
                    }
                }
                services.cursor.grab(false);
                services.redraw.tag_region_redraw(ctx.region);
                services.events.synthesize_pointer_move();
            }
        }
    }

    fn modal_rollback(&mut self, handle: GizmoRef) {
        if let Some(gizmo) = self.gizmo_mut(handle) {
            gizmo.modal = false;
            gizmo.interaction = None;
        }
        self.modal = None;
    }

    /// Forward an event to the modal gizmo while its operator runs.
    ///
    /// `running` names the operator currently executing modally, if any.
    /// Events whose operator doesn't match the one that engaged modal state
    /// are stale and ignored. When no operator runs anymore, highlight and
    /// modal state are cleared instead, treating this as normal termination.
    pub fn modal_update(
        &mut self,
        ctx: &ViewContext,
        services: &mut Services<'_>,
        event: &PointerEvent,
        running: Option<&OperatorId>,
    ) {
        if ctx.region != self.region {
            log::error!(
                "internal error: modal gizmo update dispatched to region {:?}, map belongs to {:?}",
                ctx.region,
                self.region
            );
            return;
        }
        let Some(handle) = self.modal else {
            return;
        };

        match running {
            Some(running) => {
                let Some(gizmo) = self.gizmo_mut(handle) else {
                    return;
                };
                if gizmo.operator.as_ref().map(|b| &b.id) != Some(running) {
                    return;
                }
                if let Some(custom) = gizmo.custom_modal {
                    custom(gizmo, event);
                } else {
                    let kind = gizmo.kind().clone();
                    kind.modal(gizmo, event);
                }
            }
            None => {
                self.highlight_set(ctx, services, None);
                self.modal_set(ctx, services, event, None);
            }
        }
    }

    /* ---------------- selection ---------------- */

    pub fn selected(&self) -> &[GizmoRef] {
        &self.selected
    }

    pub fn is_any_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Bounding rectangle over the origins of all selected gizmos.
    pub fn selected_bounds(&self) -> Option<Rect> {
        let mut origins = self
            .selected
            .iter()
            .filter_map(|&handle| self.gizmo(handle))
            .map(|gizmo| gizmo.origin);
        let first = origins.next()?;
        let mut bounds = Rect::from_points(first, first);
        for origin in origins {
            bounds = bounds.union_pt(origin);
        }
        Some(bounds)
    }

    /// Select or deselect every eligible gizmo. Returns whether the
    /// selection changed; callers use that to decide whether to refresh
    /// hover state, which this method triggers by synthesizing a pointer
    /// move on change.
    pub fn select_all(
        &mut self,
        ctx: &ViewContext,
        services: &mut Services<'_>,
        action: SelectAction,
    ) -> bool {
        let changed = match action {
            SelectAction::Select => self.select_all_intern(ctx, services),
            SelectAction::Deselect => self.deselect_all(),
        };
        if changed {
            services.events.synthesize_pointer_move();
        }
        changed
    }

    /// Replace the selection with every visible gizmo of select-capable
    /// groups, flag them, and highlight the first one.
    fn select_all_intern(&mut self, ctx: &ViewContext, services: &mut Services<'_>) -> bool {
        let mut next: Vec<GizmoRef> = Vec::new();
        for (group_index, group) in self.groups.iter().enumerate() {
            if !group.flags().select || !group.kind().poll(ctx) {
                continue;
            }
            for (index, gizmo) in group.gizmos().iter().enumerate() {
                if !gizmo.hidden {
                    next.push(GizmoRef {
                        group: group_index,
                        index,
                    });
                }
            }
        }

        let changed = next != self.selected;
        let previous = std::mem::replace(&mut self.selected, next);

        // unflag gizmos that dropped out of the selection
        for handle in previous {
            if !self.selected.contains(&handle) {
                if let Some(gizmo) = self.gizmo_mut(handle) {
                    gizmo.selected = false;
                }
            }
        }

        for index in 0..self.selected.len() {
            let handle = self.selected[index];
            if let Some(gizmo) = self.gizmo_mut(handle) {
                gizmo.selected = true;
                let kind = gizmo.kind().clone();
                kind.select(gizmo, SelectAction::Select);
            }
        }

        if let Some(&first) = self.selected.first() {
            let part = self.gizmo(first).map_or(0, Gizmo::highlight_part);
            self.highlight_set(ctx, services, Some((first, part)));
        }

        changed
    }

    /// Clear the selection. Idempotent: returns false when already empty.
    fn deselect_all(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        for handle in std::mem::take(&mut self.selected) {
            if let Some(gizmo) = self.gizmo_mut(handle) {
                gizmo.selected = false;
            }
        }
        true
    }
}
