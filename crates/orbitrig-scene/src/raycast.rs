//! Scene queries answered with Bevy mesh ray casts

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use orbitrig_core::{RayHit, SceneQuery, TargetId};

use crate::types::entity_for;

/// System parameter bundling what the rig needs to see the scene
#[derive(SystemParam)]
pub struct RigSceneParams<'w, 's> {
    ray_cast: MeshRayCast<'w, 's>,
    transforms: Query<'w, 's, &'static GlobalTransform>,
}

impl<'w, 's> RigSceneParams<'w, 's> {
    /// Borrow as a [`SceneQuery`] that never reports hits on `ignored` entities
    pub fn query<'a>(&'a mut self, ignored: &'a [Entity]) -> BevySceneQuery<'a, 'w, 's> {
        BevySceneQuery {
            params: self,
            ignored,
        }
    }

    /// First mesh hit along a ray, skipping `ignored`
    pub fn first_hit(&mut self, ray: Ray3d, ignored: &[Entity]) -> Option<(Entity, f32, Vec3)> {
        let filter = |entity: Entity| !ignored.contains(&entity);
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Any)
            .with_filter(&filter);
        self.ray_cast
            .cast_ray(ray, &settings)
            .first()
            .map(|(entity, hit)| (*entity, hit.distance, hit.point))
    }
}

pub struct BevySceneQuery<'a, 'w, 's> {
    params: &'a mut RigSceneParams<'w, 's>,
    ignored: &'a [Entity],
}

impl SceneQuery for BevySceneQuery<'_, '_, '_> {
    fn target_position(&mut self, target: TargetId) -> Option<Vec3> {
        self.params
            .transforms
            .get(entity_for(target))
            .ok()
            .map(GlobalTransform::translation)
    }

    fn linecast(&mut self, from: Vec3, to: Vec3) -> Option<RayHit> {
        let length = from.distance(to);
        let direction = Dir3::new(to - from).ok()?;
        let (_, distance, point) = self
            .params
            .first_hit(Ray3d::new(from, direction), self.ignored)?;
        (distance <= length).then_some(RayHit { point, distance })
    }

    fn raycast(&mut self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        let direction = Dir3::new(direction).ok()?;
        let (_, distance, point) = self
            .params
            .first_hit(Ray3d::new(origin, direction), self.ignored)?;
        Some(RayHit { point, distance })
    }
}
