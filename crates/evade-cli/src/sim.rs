//! Fixed-step simulation of one agent evading one threat.

use anyhow::Result;
use evade_core::{Classification, PoissonDiscSampler, Vec3};
use evade_nav::{
    Obstacle, ObstacleId, ObstacleWorld, StraightMover, WalkableMesh, WaypointPatrol,
};
use evade_scan::{has_cover, AgentState, ScanEnv, Scanner, ThreatState, TickOutcome};
use evade_tools::{NullTraceSink, TraceLog, TraceSink};
use serde::Serialize;

use crate::scenario::Scenario;

/// A destination handed to the agent's mover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dispatch {
    pub time: f64,
    pub destination: Vec3,
    pub score: f32,
    pub cover: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub scenario: String,
    pub seed: u64,
    pub frames: u64,
    pub scans: u64,
    pub dispatches: Vec<Dispatch>,
    /// Share of frames in which a wall blocked the line of sight to the threat.
    pub covered_ratio: f64,
    pub covered_at_end: bool,
    pub agent: Vec3,
    pub threat: Option<Vec3>,
    /// Trace lines recorded, when tracing was on.
    pub trace_lines: usize,
}

struct Threat {
    body: ObstacleId,
    position: Vec3,
    patrol: WaypointPatrol,
}

pub struct Simulation {
    name: String,
    seed: u64,
    dt: f32,
    now: f64,
    frames: u64,
    world: ObstacleWorld,
    surface: WalkableMesh,
    scanner: Scanner<PoissonDiscSampler>,
    mover: StraightMover,
    threat: Option<Threat>,
    trace: Option<TraceLog>,
    scans: u64,
    covered_frames: u64,
    dispatches: Vec<Dispatch>,
    trace_lines: usize,
}

impl Simulation {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        scenario.validate()?;

        let mut world = ObstacleWorld::new();
        for obstacle in &scenario.obstacles {
            world.push(*obstacle);
        }

        let threat = scenario.threat.as_ref().map(|threat| {
            let body = world.push(Obstacle::cuboid(
                threat.position + Vec3::UP * threat.half_extents.y,
                threat.half_extents,
                Classification::Threat,
            ));
            Threat {
                body,
                position: threat.position,
                patrol: WaypointPatrol::new(
                    threat.waypoints.clone(),
                    threat.speed,
                    threat.stopping_distance,
                ),
            }
        });

        let scanner = Scanner::new(scenario.scan, PoissonDiscSampler::new(scenario.seed))?;
        let agent = &scenario.agent;

        Ok(Self {
            name: scenario.display_name().to_string(),
            seed: scenario.seed,
            dt: scenario.dt,
            now: 0.0,
            frames: 0,
            world,
            surface: scenario.walkable(),
            scanner,
            mover: StraightMover::new(agent.position, agent.speed, agent.arrival_distance),
            threat,
            trace: None,
            scans: 0,
            covered_frames: 0,
            dispatches: Vec::new(),
            trace_lines: 0,
        })
    }

    /// Record scan trace lines.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(TraceLog::default());
        self
    }

    /// Lines from the most recent scan pass.
    pub fn last_trace(&self) -> Option<&TraceLog> {
        self.trace.as_ref()
    }

    pub fn step(&mut self) -> TickOutcome {
        let dt = self.dt;

        if let Some(threat) = self.threat.as_mut() {
            if !threat.patrol.is_empty() {
                threat.position = threat.patrol.step(threat.position, dt);
            }
            let half = self
                .world
                .get(threat.body)
                .map_or(Vec3::ZERO, |body| body.half_extents());
            self.world
                .move_to(threat.body, threat.position + Vec3::UP * half.y);
        }

        let threat_state = self.threat.as_ref().map(|t| ThreatState::new(t.position));
        let agent = AgentState::new(self.mover.position());

        let mut null = NullTraceSink;
        let due = self.now >= self.scanner.next_scan_time();
        let sink: &mut dyn TraceSink = match self.trace.as_mut() {
            Some(log) if due => {
                log.begin(self.now);
                log
            }
            _ => &mut null,
        };

        let mut env = ScanEnv::new(&self.world, &self.surface)
            .with_mover(&mut self.mover)
            .with_trace(sink);
        let outcome = self
            .scanner
            .tick(self.now, &agent, threat_state.as_ref(), &mut env);

        if let TickOutcome::Scanned(report) = &outcome {
            self.scans += 1;
            if let Some(log) = self.trace.as_ref() {
                self.trace_lines += log.lines.len();
            }
            if let (true, Some(best)) = (report.dispatched, report.best) {
                tracing::info!(
                    t = self.now,
                    x = best.projected.x,
                    z = best.projected.z,
                    score = best.score,
                    cover = best.cover,
                    "new destination"
                );
                self.dispatches.push(Dispatch {
                    time: self.now,
                    destination: best.projected,
                    score: best.score,
                    cover: best.cover,
                });
            }
        }

        self.mover
            .step_on(dt, &self.surface, self.scanner.config().nav_sample_radius);
        if self.agent_covered() {
            self.covered_frames += 1;
        }

        self.now += dt as f64;
        self.frames += 1;
        outcome
    }

    pub fn run_for(&mut self, seconds: f64) -> Summary {
        let frames = (seconds / self.dt as f64).round().max(0.0) as u64;
        for _ in 0..frames {
            self.step();
        }
        self.summary()
    }

    fn agent_covered(&self) -> bool {
        let Some(threat) = self.threat.as_ref() else {
            return false;
        };
        let config = self.scanner.config();
        let eye = Vec3::UP * config.eye_height;
        has_cover(
            &self.world,
            self.mover.position() + eye,
            threat.position + eye,
            config.masks.wall,
        )
    }

    pub fn summary(&self) -> Summary {
        Summary {
            scenario: self.name.clone(),
            seed: self.seed,
            frames: self.frames,
            scans: self.scans,
            dispatches: self.dispatches.clone(),
            covered_ratio: if self.frames == 0 {
                0.0
            } else {
                self.covered_frames as f64 / self.frames as f64
            },
            covered_at_end: self.agent_covered(),
            agent: self.mover.position(),
            threat: self.threat.as_ref().map(|t| t.position),
            trace_lines: self.trace_lines,
        }
    }
}
