//! Visibility queries against Rapier colliders.

use bevy_ecs::prelude::*;
use bevy_math::Vec3 as BevyVec3;
use bevy_rapier3d::prelude::*;
use evade_core::{ClassMask, Classification, RayHit, Vec3, VisibilityQuery};

use crate::{
    scan_evaders, EvadeClass, EvadeClock, EvadePosition, EvadeSurface, EvadeTraceLines,
    EvaderItems,
};

fn to_bevy(v: Vec3) -> BevyVec3 {
    BevyVec3::new(v.x, v.y, v.z)
}

/// Decides which colliders a visibility ray may stop at.
///
/// A collider's classification comes from its [`EvadeClass`]; colliders without one count as
/// [`Classification::Other`]. The excluded entity never blocks.
pub struct ColliderFilter<'a, 'w, 's> {
    classes: &'a Query<'w, 's, &'static EvadeClass>,
    exclude: Option<Entity>,
}

impl<'a, 'w, 's> ColliderFilter<'a, 'w, 's> {
    pub fn new(classes: &'a Query<'w, 's, &'static EvadeClass>) -> Self {
        Self {
            classes,
            exclude: None,
        }
    }

    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    pub fn class_of(&self, entity: Entity) -> Classification {
        self.classes
            .get(entity)
            .map_or(Classification::Other, |class| class.0)
    }

    pub fn admits(&self, entity: Entity, mask: ClassMask) -> bool {
        self.exclude != Some(entity) && mask.contains(self.class_of(entity))
    }
}

/// [`VisibilityQuery`] over a Rapier context. Sensors are ignored.
pub struct RapierVisibility<'a, 'w, 's> {
    context: &'a RapierContext<'a>,
    filter: ColliderFilter<'a, 'w, 's>,
}

impl<'a, 'w, 's> RapierVisibility<'a, 'w, 's> {
    pub fn new(
        context: &'a RapierContext<'a>,
        classes: &'a Query<'w, 's, &'static EvadeClass>,
    ) -> Self {
        Self {
            context,
            filter: ColliderFilter::new(classes),
        }
    }

    /// Skip the collider and rigid body of `entity`, typically the scanning agent itself.
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.filter = self.filter.excluding(entity);
        self
    }
}

impl VisibilityQuery for RapierVisibility<'_, '_, '_> {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ClassMask,
    ) -> Option<RayHit> {
        let admit = |entity: Entity| self.filter.admits(entity, mask);
        let mut filter = QueryFilter::default().exclude_sensors().predicate(&admit);
        if let Some(entity) = self.filter.exclude {
            filter = filter.exclude_collider(entity).exclude_rigid_body(entity);
        }

        let (entity, toi) = self.context.cast_ray(
            to_bevy(origin),
            to_bevy(direction),
            max_distance,
            true,
            filter,
        )?;

        Some(RayHit {
            point: origin + direction * toi,
            distance: toi,
            class: self.filter.class_of(entity),
        })
    }
}

/// [`crate::tick_evaders`] with Rapier colliders as the visibility backend.
pub fn tick_evaders_with_rapier(
    clock: Res<EvadeClock>,
    rapier_context: ReadRapierContext,
    classes: Query<&EvadeClass>,
    surface: Res<EvadeSurface>,
    mut trace: Option<ResMut<EvadeTraceLines>>,
    targets: Query<&EvadePosition>,
    mut evaders: Query<EvaderItems>,
) {
    let Ok(rapier) = rapier_context.single() else {
        tracing::debug!("no rapier context; skipping evasion scan");
        return;
    };

    scan_evaders(
        &clock,
        |entity| RapierVisibility::new(&rapier, &classes).excluding(entity),
        surface.0.as_ref(),
        trace.as_deref_mut(),
        &targets,
        &mut evaders,
    );
}
