use evade_core::{
    BlueNoiseSampler, Deadline, MovementController, RayHit, SurfaceProjector, Vec2, Vec3,
    VisibilityQuery,
};
use evade_tools::{LineKind, TraceLine, TraceSink};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{has_cover, ConfigError, ScanConfig, ScoreTerms, ScoreWeights};

/// Marker drawn above each projected candidate.
const MARKER_LIFT: f32 = 0.05;
const MARKER_LENGTH: f32 = 0.5;
const DESTINATION_MARKER_LENGTH: f32 = 1.5;

/// What the scanner reads about the evading agent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentState {
    pub position: Vec3,
    /// Facing direction on the ground plane. Informational only.
    pub facing: Vec3,
}

impl AgentState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            facing: Vec3::Z,
        }
    }

    pub fn with_facing(mut self, facing: Vec3) -> Self {
        self.facing = facing;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreatState {
    pub position: Vec3,
}

impl ThreatState {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

/// A scored, surface-projected evasion spot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Sample offset from the agent on the ground plane.
    pub offset: Vec2,
    pub direction: Vec3,
    /// Spot before projection.
    pub raw: Vec3,
    pub projected: Vec3,
    /// What stopped the directional probe, if anything.
    pub hit: Option<RayHit>,
    pub cover: bool,
    pub direct_sight: bool,
    pub safe_point: bool,
    pub score: f32,
}

/// Outcome of evaluating one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleEval {
    /// Outside the scan disc, or at its center.
    OutOfRange,
    /// The spot could not be projected onto the walkable surface.
    Unprojected {
        direction: Vec3,
        hit: Option<RayHit>,
        raw: Vec3,
    },
    Scored(Candidate),
}

/// Counters and result of one scan pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanReport {
    pub time: f64,
    /// Points returned by the sampler.
    pub samples: usize,
    /// Samples inside the scan disc.
    pub in_range: usize,
    /// Candidates that survived projection and were scored.
    pub projected: usize,
    pub best: Option<Candidate>,
    /// Whether `best` was forwarded to the movement controller.
    pub dispatched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    NotDue,
    NoThreat,
    NoController,
    Scanned(ScanReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            TickOutcome::Scanned(report) => Some(report),
            _ => None,
        }
    }

    /// Destination sent to the movement controller during this tick.
    pub fn dispatched(&self) -> Option<Vec3> {
        let report = self.report()?;
        if !report.dispatched {
            return None;
        }
        report.best.map(|c| c.projected)
    }
}

/// Collaborators borrowed for one tick.
pub struct ScanEnv<'a> {
    pub visibility: &'a dyn VisibilityQuery,
    pub surface: &'a dyn SurfaceProjector,
    pub mover: Option<&'a mut dyn MovementController>,
    pub trace: Option<&'a mut dyn TraceSink>,
}

impl<'a> ScanEnv<'a> {
    pub fn new(visibility: &'a dyn VisibilityQuery, surface: &'a dyn SurfaceProjector) -> Self {
        Self {
            visibility,
            surface,
            mover: None,
            trace: None,
        }
    }

    pub fn with_mover(mut self, mover: &'a mut dyn MovementController) -> Self {
        self.mover = Some(mover);
        self
    }

    pub fn with_trace(mut self, trace: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(trace);
        self
    }
}

fn emit(trace: &mut Option<&mut (dyn TraceSink + '_)>, line: TraceLine) {
    if let Some(sink) = trace.as_deref_mut() {
        sink.line(line);
    }
}

/// Periodically picks the best evasion spot and steers the agent toward it.
#[derive(Debug, Clone)]
pub struct Scanner<S> {
    config: ScanConfig,
    sampler: S,
    scan_gate: Deadline,
    repath_gate: Deadline,
    samples: Vec<Vec2>,
    last_destination: Option<Vec3>,
}

impl<S: BlueNoiseSampler> Scanner<S> {
    pub fn new(config: ScanConfig, sampler: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            sampler,
            scan_gate: Deadline::new(),
            repath_gate: Deadline::new(),
            samples: Vec::new(),
            last_destination: None,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Replace the configuration. Timers keep running.
    pub fn set_config(&mut self, config: ScanConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn policy(&self) -> &ScoreWeights {
        &self.config.weights
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn next_scan_time(&self) -> f64 {
        self.scan_gate.next()
    }

    pub fn next_repath_time(&self) -> f64 {
        self.repath_gate.next()
    }

    pub fn last_destination(&self) -> Option<Vec3> {
        self.last_destination
    }

    /// Make the next tick scan and dispatch immediately.
    pub fn reset_timers(&mut self) {
        self.scan_gate.reset();
        self.repath_gate.reset();
    }

    /// Run a scan pass if one is due and there is something to evade and someone to steer.
    pub fn tick(
        &mut self,
        now: f64,
        agent: &AgentState,
        threat: Option<&ThreatState>,
        env: &mut ScanEnv<'_>,
    ) -> TickOutcome {
        if !self.scan_gate.ready(now) {
            return TickOutcome::NotDue;
        }
        let Some(threat) = threat else {
            return TickOutcome::NoThreat;
        };
        if env.mover.is_none() {
            return TickOutcome::NoController;
        }

        let report = self.scan_pass(now, agent, threat, env);
        self.scan_gate.fire(now, self.config.scan_interval);
        TickOutcome::Scanned(report)
    }

    /// One full pass regardless of the scan gate. The repath gate still applies.
    pub fn scan_pass(
        &mut self,
        now: f64,
        agent: &AgentState,
        threat: &ThreatState,
        env: &mut ScanEnv<'_>,
    ) -> ScanReport {
        let cfg = self.config;
        let extent = cfg.scan_radius * 2.0;
        self.sampler
            .samples_into(extent, extent, cfg.min_spacing, &mut self.samples);

        let mut report = ScanReport {
            time: now,
            samples: self.samples.len(),
            ..ScanReport::default()
        };

        let mut trace = env.trace.as_deref_mut().filter(|sink| sink.enabled());
        let ttl = cfg.scan_interval as f32;
        let origin = agent.position + Vec3::UP * cfg.ray_lift;
        let mut best: Option<Candidate> = None;

        for &sample in self.samples.iter() {
            let eval = evaluate_with(&cfg, sample, agent, threat, env.visibility, env.surface);

            let (direction, hit, raw, projected) = match eval {
                SampleEval::OutOfRange => continue,
                SampleEval::Unprojected {
                    direction,
                    hit,
                    raw,
                } => {
                    report.in_range += 1;
                    (direction, hit, raw, None)
                }
                SampleEval::Scored(candidate) => {
                    report.in_range += 1;
                    report.projected += 1;
                    (
                        candidate.direction,
                        candidate.hit,
                        candidate.raw,
                        Some(candidate),
                    )
                }
            };

            if trace.is_some() {
                let kind = probe_line_kind(&cfg, hit.as_ref());
                match hit {
                    Some(h) => {
                        emit(&mut trace, TraceLine::new(origin, h.point, kind).with_ttl(ttl));
                        emit(
                            &mut trace,
                            TraceLine::new(h.point, raw, LineKind::Pullback).with_ttl(ttl),
                        );
                    }
                    None => emit(
                        &mut trace,
                        TraceLine::ray(origin, direction, cfg.scan_radius, kind).with_ttl(ttl),
                    ),
                }
                if let Some(c) = projected.as_ref() {
                    emit(
                        &mut trace,
                        TraceLine::ray(
                            c.projected + Vec3::UP * MARKER_LIFT,
                            Vec3::UP,
                            MARKER_LENGTH,
                            kind,
                        )
                        .with_ttl(ttl),
                    );
                }
            }

            let Some(candidate) = projected else {
                continue;
            };
            tracing::trace!(
                x = candidate.projected.x,
                z = candidate.projected.z,
                score = candidate.score,
                cover = candidate.cover,
                direct_sight = candidate.direct_sight,
                "candidate"
            );

            if candidate.score.is_nan() {
                continue;
            }
            let better = match best.as_ref() {
                None => true,
                Some(current) => candidate.score > current.score,
            };
            if better {
                best = Some(candidate);
            }
        }

        report.best = best;
        if let (Some(best), Some(mover)) = (report.best.as_ref(), env.mover.as_deref_mut()) {
            if self.repath_gate.try_fire(now, cfg.repath_cooldown) {
                mover.set_destination(best.projected);
                self.last_destination = Some(best.projected);
                report.dispatched = true;
                emit(
                    &mut trace,
                    TraceLine::ray(
                        best.projected,
                        Vec3::UP,
                        DESTINATION_MARKER_LENGTH,
                        LineKind::Destination,
                    )
                    .with_ttl(ttl),
                );
            }
        }

        tracing::debug!(
            time = now,
            samples = report.samples,
            in_range = report.in_range,
            projected = report.projected,
            best_score = report.best.map(|c| c.score),
            dispatched = report.dispatched,
            "scan pass"
        );
        report
    }

    /// Evaluate a single sample (in sampler coordinates) with the current configuration.
    pub fn evaluate(
        &self,
        sample: Vec2,
        agent: &AgentState,
        threat: &ThreatState,
        visibility: &dyn VisibilityQuery,
        surface: &dyn SurfaceProjector,
    ) -> SampleEval {
        evaluate_with(&self.config, sample, agent, threat, visibility, surface)
    }
}

fn evaluate_with(
    cfg: &ScanConfig,
    sample: Vec2,
    agent: &AgentState,
    threat: &ThreatState,
    visibility: &dyn VisibilityQuery,
    surface: &dyn SurfaceProjector,
) -> SampleEval {
    let radius = cfg.scan_radius;
    let offset = sample - Vec2::new(radius, radius);
    let planar = offset.length();
    if !(planar <= radius) {
        return SampleEval::OutOfRange;
    }
    let Some(direction) = Vec3::from_ground(offset, 0.0).try_normalize() else {
        return SampleEval::OutOfRange;
    };

    let lift = Vec3::UP * cfg.ray_lift;
    let hit = visibility.raycast(agent.position + lift, direction, radius, cfg.probe_mask());
    let raw = match hit {
        Some(h) => h.point - direction * cfg.stand_off - lift,
        None => agent.position + direction * radius,
    };

    let Some(projected) = surface.project(raw, cfg.nav_sample_radius) else {
        return SampleEval::Unprojected {
            direction,
            hit,
            raw,
        };
    };

    let eye = Vec3::UP * cfg.eye_height;
    let threat_eye = threat.position + eye;
    let cover = has_cover(visibility, projected + eye, threat_eye, cfg.masks.wall);
    let direct_sight = hit.is_some_and(|h| cfg.masks.is_threat(h.class));
    let safe_point =
        cfg.weights.safe_points_enabled() && hit.is_some_and(|h| cfg.masks.is_safe_point(h.class));

    let score = cfg.weights.score(ScoreTerms {
        cover,
        distance: projected.distance(threat_eye),
        direct_sight,
        safe_point,
    });

    SampleEval::Scored(Candidate {
        offset,
        direction,
        raw,
        projected,
        hit,
        cover,
        direct_sight,
        safe_point,
        score,
    })
}

fn probe_line_kind(cfg: &ScanConfig, hit: Option<&RayHit>) -> LineKind {
    let Some(hit) = hit else {
        return LineKind::Clear;
    };
    if cfg.masks.is_threat(hit.class) {
        LineKind::BlockedByThreat
    } else if cfg.masks.is_wall(hit.class) {
        LineKind::BlockedByWall
    } else if cfg.masks.is_safe_point(hit.class) {
        LineKind::SafePoint
    } else {
        LineKind::Clear
    }
}
