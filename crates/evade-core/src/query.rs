//! Collaborator contracts consumed by the scanner.
//!
//! Engines implement these against their own physics, navigation and locomotion; the workspace
//! ships reference implementations (`PoissonDiscSampler`, `evade_nav::WalkableMesh`,
//! `evade_nav::StraightMover`).

use crate::{ClassMask, Classification, Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Produces evenly spaced 2D points covering `[0, width] x [0, height]`.
///
/// No two points may be closer than `min_spacing`. The order is implementation-defined but must
/// be stable for a given generator state.
pub trait BlueNoiseSampler {
    /// Clear `out` and fill it with one batch of samples.
    fn samples_into(&mut self, width: f32, height: f32, min_spacing: f32, out: &mut Vec<Vec2>);
}

/// Result of a [`VisibilityQuery`] hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RayHit {
    pub point: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    pub class: Classification,
}

/// Ray queries against world geometry.
pub trait VisibilityQuery {
    /// Cast a ray and report the nearest object whose tag is in `mask`.
    ///
    /// `direction` is a unit vector. Non-solid/trigger geometry must be ignored.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ClassMask,
    ) -> Option<RayHit>;
}

/// Maps arbitrary points onto the agent-traversable surface.
pub trait SurfaceProjector {
    /// Nearest walkable point within `search_radius` of `point`, if any.
    fn project(&self, point: Vec3, search_radius: f32) -> Option<Vec3>;
}

/// Destination sink for the agent's locomotion.
///
/// Fire-and-forget: the scanner never waits for arrival or acknowledgment.
pub trait MovementController {
    fn set_destination(&mut self, point: Vec3);
}

impl<T: VisibilityQuery + ?Sized> VisibilityQuery for &T {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ClassMask,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, mask)
    }
}

impl<T: SurfaceProjector + ?Sized> SurfaceProjector for &T {
    fn project(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        (**self).project(point, search_radius)
    }
}

/// Records the last requested destination. Handy for hosts that poll instead of being pushed to.
impl MovementController for Option<Vec3> {
    fn set_destination(&mut self, point: Vec3) {
        *self = Some(point);
    }
}

impl MovementController for Vec<Vec3> {
    fn set_destination(&mut self, point: Vec3) {
        self.push(point);
    }
}
