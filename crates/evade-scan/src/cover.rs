use evade_core::{ClassMask, Vec3, VisibilityQuery};

/// Segments shorter than this never count as covered.
pub const COVER_EPSILON: f32 = 0.01;

/// Whether wall geometry blocks the straight line between two eye positions.
pub fn has_cover(
    visibility: &dyn VisibilityQuery,
    from_eye: Vec3,
    threat_eye: Vec3,
    wall_mask: ClassMask,
) -> bool {
    let delta = threat_eye - from_eye;
    let dist = delta.length();
    // Also rejects NaN.
    if !(dist > COVER_EPSILON) {
        return false;
    }
    visibility
        .raycast(from_eye, delta / dist, dist, wall_mask)
        .is_some()
}
