//! Shared components and id conversions

use bevy::prelude::*;
use orbitrig_core::{OrbitController, OrbitTarget, TargetId};

/// The orbiting rig; its `Transform` is written by the controller every frame
#[derive(Component, Debug)]
pub struct OrbitRig {
    pub controller: OrbitController,
}

impl OrbitRig {
    pub fn new(controller: OrbitController) -> Self {
        Self { controller }
    }

    /// Entity the rig currently orbits, if it tracks one
    pub fn target_entity(&self) -> Option<Entity> {
        match self.controller.target()? {
            OrbitTarget::Tracked(id) => Some(entity_for(id)),
            OrbitTarget::Transient(_) => None,
        }
    }
}

/// The camera child of a rig; its local translation is the pan offset
#[derive(Component, Debug, Default)]
pub struct PanCamera;

/// Marker for objects a rig may orbit; excluded from obstruction casts
#[derive(Component, Debug, Default)]
pub struct OrbitFocus;

/// Rig target handle for an entity
pub fn target_id(entity: Entity) -> TargetId {
    TargetId(entity.to_bits())
}

/// Entity behind a rig target handle
pub fn entity_for(id: TargetId) -> Entity {
    Entity::from_bits(id.0)
}
