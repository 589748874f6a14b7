#![allow(dead_code)]

use evade_core::{
    BlueNoiseSampler, Classification, PoissonDiscSampler, SurfaceProjector, Vec2, Vec3,
};
use evade_nav::{Obstacle, ObstacleWorld, WalkableMesh};

/// Replays the same batch every pass and counts how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct FixedSampler {
    pub points: Vec<Vec2>,
    pub calls: usize,
}

impl FixedSampler {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points, calls: 0 }
    }
}

impl BlueNoiseSampler for FixedSampler {
    fn samples_into(&mut self, _width: f32, _height: f32, _min_spacing: f32, out: &mut Vec<Vec2>) {
        self.calls += 1;
        out.clear();
        out.extend_from_slice(&self.points);
    }
}

/// Poisson sampler that keeps a copy of its last batch.
#[derive(Debug, Clone)]
pub struct RecordingSampler {
    pub inner: PoissonDiscSampler,
    pub last: Vec<Vec2>,
}

impl RecordingSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: PoissonDiscSampler::new(seed),
            last: Vec::new(),
        }
    }
}

impl BlueNoiseSampler for RecordingSampler {
    fn samples_into(&mut self, width: f32, height: f32, min_spacing: f32, out: &mut Vec<Vec2>) {
        self.inner.samples_into(width, height, min_spacing, out);
        self.last.clear();
        self.last.extend_from_slice(out);
    }
}

pub struct NoSurface;

impl SurfaceProjector for NoSurface {
    fn project(&self, _point: Vec3, _search_radius: f32) -> Option<Vec3> {
        None
    }
}

/// Sampler-space point for a ground-plane offset around the agent.
pub fn sample_at(radius: f32, dx: f32, dz: f32) -> Vec2 {
    Vec2::new(radius + dx, radius + dz)
}

pub fn floor() -> WalkableMesh {
    WalkableMesh::from_rects(&[(Vec2::new(-20.0, -20.0), Vec2::new(20.0, 20.0), 0.0)])
}

pub fn threat_box(at: Vec3) -> Obstacle {
    Obstacle::cuboid(
        at + Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.5, 1.0, 0.5),
        Classification::Threat,
    )
}

/// Wall spanning x in [4, 5], z in [-1, 1], three units tall.
pub fn wall() -> Obstacle {
    Obstacle::cuboid(
        Vec3::new(4.5, 1.5, 0.0),
        Vec3::new(0.5, 1.5, 1.0),
        Classification::Wall,
    )
}

pub const THREAT_AT: Vec3 = Vec3::new(10.0, 0.0, 0.0);

pub fn walled_world() -> ObstacleWorld {
    ObstacleWorld::new().with(wall()).with(threat_box(THREAT_AT))
}

pub fn open_world() -> ObstacleWorld {
    ObstacleWorld::new().with(threat_box(THREAT_AT))
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3
}
