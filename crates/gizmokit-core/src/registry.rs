//! Registry of gizmo map types, keyed by (space kind, region kind).
//!
//! The registry is an owned service object created by the host at startup
//! and passed by reference into map creation. Dropping it releases every
//! map type and group-kind reference; live maps keep their own shared
//! handles to the kinds they were instantiated from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::group::GizmoGroupKind;

/// Editor space kinds that can host gizmo maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceKind {
    View3d,
    Canvas2d,
    NodeGraph,
    Timeline,
}

/// Region kinds within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    Window,
    Header,
    Toolbar,
    Sidebar,
}

/// Key identifying one map type. At most one registry entry exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapTypeKey {
    pub space: SpaceKind,
    pub region: RegionKind,
}

impl MapTypeKey {
    pub fn new(space: SpaceKind, region: RegionKind) -> Self {
        Self { space, region }
    }
}

/// A map type: the ordered set of group kinds registered for one key.
/// Maps created for this key instantiate one group per registered kind.
#[derive(Debug)]
pub struct GizmoMapType {
    key: MapTypeKey,
    group_kinds: Vec<Arc<dyn GizmoGroupKind>>,
}

impl GizmoMapType {
    fn new(key: MapTypeKey) -> Self {
        Self {
            key,
            group_kinds: Vec::new(),
        }
    }

    pub fn key(&self) -> MapTypeKey {
        self.key
    }

    /// Registered group kinds, in registration order.
    pub fn group_kinds(&self) -> &[Arc<dyn GizmoGroupKind>] {
        &self.group_kinds
    }

    /// Register a group kind. Maps created afterwards will instantiate it;
    /// existing maps are unaffected.
    pub fn register_group(&mut self, kind: Arc<dyn GizmoGroupKind>) {
        log::debug!(
            "registered gizmo group kind `{}` for {:?}/{:?}",
            kind.name(),
            self.key.space,
            self.key.region
        );
        self.group_kinds.push(kind);
    }
}

/// All known map types, in insertion order.
#[derive(Debug, Default)]
pub struct GizmoTypeRegistry {
    types: Vec<GizmoMapType>,
}

impl GizmoTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-creating lookup.
    pub fn find(&self, key: MapTypeKey) -> Option<&GizmoMapType> {
        self.types.iter().find(|t| t.key == key)
    }

    pub fn find_mut(&mut self, key: MapTypeKey) -> Option<&mut GizmoMapType> {
        self.types.iter_mut().find(|t| t.key == key)
    }

    /// Return the entry for `key`, creating an empty one if none exists.
    pub fn ensure(&mut self, key: MapTypeKey) -> &mut GizmoMapType {
        let index = match self.types.iter().position(|t| t.key == key) {
            Some(index) => index,
            None => {
                self.types.push(GizmoMapType::new(key));
                self.types.len() - 1
            }
        };
        &mut self.types[index]
    }

    /// Registered map types, in insertion order.
    pub fn types(&self) -> &[GizmoMapType] {
        &self.types
    }
}
