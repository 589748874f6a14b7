use evade_core::{SurfaceProjector, Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Walkable surface made of non-overlapping triangles.
///
/// Triangles are located on the ground plane (XZ); each vertex carries its own height so ramps
/// and stairs can be approximated. Projection finds the closest ground-plane point per triangle,
/// lifts it onto the triangle and keeps the result nearest to the query in 3D.
#[derive(Debug, Clone)]
pub struct WalkableMesh {
    tris: Vec<[Vec3; 3]>,
    bounds: Vec<(Vec2, Vec2)>,
}

impl WalkableMesh {
    pub fn from_triangles(tris: Vec<[Vec3; 3]>) -> Self {
        let bounds = tris.iter().map(tri_bounds).collect();
        Self { tris, bounds }
    }

    /// Build a surface from flat axis-aligned rectangles `(min, max, height)` on the ground plane.
    pub fn from_rects(rects: &[(Vec2, Vec2, f32)]) -> Self {
        let mut tris = Vec::with_capacity(rects.len() * 2);
        for &(min, max, h) in rects {
            let a = Vec3::new(min.x, h, min.y);
            let b = Vec3::new(max.x, h, min.y);
            let c = Vec3::new(max.x, h, max.y);
            let d = Vec3::new(min.x, h, max.y);
            tris.push([a, b, c]);
            tris.push([a, c, d]);
        }
        Self::from_triangles(tris)
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.tris
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub fn find_triangle(&self, p: Vec2) -> Option<usize> {
        self.tris
            .iter()
            .position(|tri| point_in_triangle(p, ground_tri(tri)))
    }

    /// Surface height under `p`, if `p` lies on the mesh.
    pub fn height_at(&self, p: Vec2) -> Option<f32> {
        let tri = self.tris[self.find_triangle(p)?];
        Some(height_on_triangle(p, &tri))
    }

    /// Nearest surface point to `p`, regardless of distance.
    pub fn nearest_point(&self, p: Vec3) -> Option<Vec3> {
        self.nearest_within(p, f32::INFINITY)
    }

    /// Nearest surface point within `radius` (3D distance) of `p`.
    pub fn nearest_within(&self, p: Vec3, radius: f32) -> Option<Vec3> {
        if !p.is_finite() || radius < 0.0 || radius.is_nan() {
            return None;
        }

        let g = p.ground();
        let mut best: Option<(f32, Vec3)> = None;
        for (tri, (min, max)) in self.tris.iter().zip(self.bounds.iter()) {
            // Ground-plane distance to the bounds is a lower bound on the 3D distance.
            if bounds_distance(g, *min, *max) > radius {
                continue;
            }

            let q2 = closest_point_on_triangle(g, ground_tri(tri));
            let q = Vec3::from_ground(q2, height_on_triangle(q2, tri));
            let d = q.distance(p);
            if d > radius {
                continue;
            }
            match best {
                None => best = Some((d, q)),
                Some((best_d, _)) if d < best_d => best = Some((d, q)),
                _ => {}
            }
        }
        best.map(|(_, q)| q)
    }
}

impl SurfaceProjector for WalkableMesh {
    fn project(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        self.nearest_within(point, search_radius)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct WalkableMeshSerde {
    tris: Vec<[Vec3; 3]>,
}

#[cfg(feature = "serde")]
impl Serialize for WalkableMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WalkableMeshSerde {
            tris: self.tris.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for WalkableMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = WalkableMeshSerde::deserialize(deserializer)?;
        Ok(WalkableMesh::from_triangles(data.tris))
    }
}

fn ground_tri(tri: &[Vec3; 3]) -> [Vec2; 3] {
    [tri[0].ground(), tri[1].ground(), tri[2].ground()]
}

fn tri_bounds(tri: &[Vec3; 3]) -> (Vec2, Vec2) {
    let [a, b, c] = ground_tri(tri);
    (
        Vec2::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
        Vec2::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
    )
}

fn bounds_distance(p: Vec2, min: Vec2, max: Vec2) -> f32 {
    let dx = (min.x - p.x).max(0.0).max(p.x - max.x);
    let dy = (min.y - p.y).max(0.0).max(p.y - max.y);
    Vec2::new(dx, dy).length()
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn tri_area2(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    cross(b - a, c - a)
}

fn point_in_triangle(p: Vec2, tri: [Vec2; 3]) -> bool {
    let eps = 1e-6;
    let [a, b, c] = tri;
    let ab = tri_area2(a, b, p);
    let bc = tri_area2(b, c, p);
    let ca = tri_area2(c, a, p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

fn height_on_triangle(p: Vec2, tri: &[Vec3; 3]) -> f32 {
    let [a, b, c] = ground_tri(tri);
    let area = tri_area2(a, b, c);
    if area.abs() <= f32::EPSILON {
        return (tri[0].y + tri[1].y + tri[2].y) / 3.0;
    }
    let wa = tri_area2(b, c, p) / area;
    let wb = tri_area2(c, a, p) / area;
    let wc = 1.0 - wa - wb;
    tri[0].y * wa + tri[1].y * wb + tri[2].y * wc
}

fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let denom = ab.dot(ab);
    if denom <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / denom).clamp(0.0, 1.0);
    a + ab * t
}

fn closest_point_on_triangle(p: Vec2, tri: [Vec2; 3]) -> Vec2 {
    if point_in_triangle(p, tri) {
        return p;
    }
    let [a, b, c] = tri;
    [
        closest_point_on_segment(p, a, b),
        closest_point_on_segment(p, b, c),
        closest_point_on_segment(p, c, a),
    ]
    .into_iter()
    .fold(None, |best: Option<(f32, Vec2)>, q| {
        let d = q.distance_squared(p);
        match best {
            Some((best_d, _)) if best_d <= d => best,
            _ => Some((d, q)),
        }
    })
    .map_or(a, |(_, q)| q)
}
