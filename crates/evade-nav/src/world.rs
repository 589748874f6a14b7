use evade_core::{ClassMask, Classification, RayHit, Vec3, VisibilityQuery};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box with a classification tag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
    pub class: Classification,
    /// Non-solid obstacles (triggers) are transparent to every query.
    #[cfg_attr(feature = "serde", serde(default = "default_solid"))]
    pub solid: bool,
}

#[cfg(feature = "serde")]
fn default_solid() -> bool {
    true
}

impl Obstacle {
    pub fn new(min: Vec3, max: Vec3, class: Classification) -> Self {
        Self {
            min,
            max,
            class,
            solid: true,
        }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3, class: Classification) -> Self {
        Self::new(center - half_extents, center + half_extents, class)
    }

    pub fn sensor(mut self) -> Self {
        self.solid = false;
        self
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Entry distance along a unit ray. `None` on a miss, and when the ray starts inside the
    /// box: enclosing geometry never blocks a ray.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let axes = [
            (origin.x, direction.x, self.min.x, self.max.x),
            (origin.y, direction.y, self.min.y, self.max.y),
            (origin.z, direction.z, self.min.z, self.max.z),
        ];

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        for (o, d, lo, hi) in axes {
            if d.abs() <= 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            t_enter = t_enter.max(a.min(b));
            t_exit = t_exit.min(a.max(b));
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 || t_enter < 0.0 {
            return None;
        }
        Some(t_enter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(pub usize);

/// Minimal visibility backend: a flat list of boxes, queried by brute force.
#[derive(Debug, Clone, Default)]
pub struct ObstacleWorld {
    obstacles: Vec<Obstacle>,
}

impl ObstacleWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, obstacle: Obstacle) -> ObstacleId {
        self.obstacles.push(obstacle);
        ObstacleId(self.obstacles.len() - 1)
    }

    pub fn with(mut self, obstacle: Obstacle) -> Self {
        self.push(obstacle);
        self
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Re-center an obstacle, keeping its size. Used for moving bodies like the threat.
    pub fn move_to(&mut self, id: ObstacleId, center: Vec3) {
        if let Some(obstacle) = self.obstacles.get_mut(id.0) {
            let half = obstacle.half_extents();
            obstacle.min = center - half;
            obstacle.max = center + half;
        }
    }
}

impl VisibilityQuery for ObstacleWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ClassMask,
    ) -> Option<RayHit> {
        let mut best: Option<(f32, Classification)> = None;
        for obstacle in self.obstacles.iter() {
            if !obstacle.solid || !mask.contains(obstacle.class) {
                continue;
            }
            let Some(t) = obstacle.ray_entry(origin, direction) else {
                continue;
            };
            if t > max_distance {
                continue;
            }
            match best {
                Some((best_t, _)) if best_t <= t => {}
                _ => best = Some((t, obstacle.class)),
            }
        }

        best.map(|(distance, class)| RayHit {
            point: origin + direction * distance,
            distance,
            class,
        })
    }
}
