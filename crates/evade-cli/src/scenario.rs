//! Scenario files: world layout, agent, threat and scanner tuning.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use evade_core::{Vec2, Vec3};
use evade_nav::{Obstacle, WalkableMesh};
use evade_scan::ScanConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,

    /// Seed for the blue-noise sampler.
    pub seed: u64,

    /// Simulated seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Fixed step in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,

    pub scan: ScanConfig,

    pub agent: AgentSpec,

    /// Without a threat the agent never moves.
    pub threat: Option<ThreatSpec>,

    pub obstacles: Vec<Obstacle>,

    /// Walkable rectangles on the ground plane.
    pub floor: Vec<FloorRect>,
}

fn default_duration() -> f64 {
    10.0
}
fn default_dt() -> f32 {
    1.0 / 30.0
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: None,
            seed: 0,
            duration: default_duration(),
            dt: default_dt(),
            scan: ScanConfig::default(),
            agent: AgentSpec::default(),
            threat: None,
            obstacles: Vec::new(),
            floor: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    pub position: Vec3,
    #[serde(default = "default_agent_speed")]
    pub speed: f32,
    #[serde(default = "default_arrival")]
    pub arrival_distance: f32,
}

fn default_agent_speed() -> f32 {
    3.5
}
fn default_arrival() -> f32 {
    0.1
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            speed: default_agent_speed(),
            arrival_distance: default_arrival(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatSpec {
    pub position: Vec3,
    #[serde(default = "default_threat_speed")]
    pub speed: f32,
    /// Looping patrol route. Empty means the threat stands still.
    pub waypoints: Vec<Vec3>,
    #[serde(default = "default_arrival")]
    pub stopping_distance: f32,
    /// Size of the threat's body for visibility queries.
    #[serde(default = "default_threat_half_extents")]
    pub half_extents: Vec3,
}

fn default_threat_speed() -> f32 {
    2.0
}
fn default_threat_half_extents() -> Vec3 {
    Vec3::new(0.4, 1.0, 0.4)
}

impl Default for ThreatSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            speed: default_threat_speed(),
            waypoints: Vec::new(),
            stopping_distance: default_arrival(),
            half_extents: default_threat_half_extents(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FloorRect {
    pub min: Vec2,
    pub max: Vec2,
    #[serde(default)]
    pub height: f32,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        self.scan.validate().context("invalid scan configuration")?;
        ensure!(
            self.dt.is_finite() && self.dt > 0.0,
            "dt must be positive, got {}",
            self.dt
        );
        ensure!(
            self.duration.is_finite() && self.duration >= 0.0,
            "duration must not be negative, got {}",
            self.duration
        );
        ensure!(
            self.agent.position.is_finite(),
            "agent position must be finite"
        );
        for (i, rect) in self.floor.iter().enumerate() {
            ensure!(
                rect.min.x <= rect.max.x && rect.min.y <= rect.max.y,
                "floor[{i}] has min greater than max"
            );
        }
        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let (min, max) = (obstacle.min, obstacle.max);
            ensure!(
                min.x <= max.x && min.y <= max.y && min.z <= max.z,
                "obstacles[{i}] has min greater than max"
            );
        }
        if self.floor.is_empty() {
            tracing::warn!("scenario has no floor; every candidate will fail projection");
        }
        Ok(())
    }

    pub fn walkable(&self) -> WalkableMesh {
        let rects: Vec<(Vec2, Vec2, f32)> = self
            .floor
            .iter()
            .map(|r| (r.min, r.max, r.height))
            .collect();
        WalkableMesh::from_rects(&rects)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}
