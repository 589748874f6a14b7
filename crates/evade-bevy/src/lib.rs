//! Bevy adapter for the evasion scanner.
//!
//! Entities with an [`EvadeScanner`], an [`EvadePosition`] and an [`EvadeTarget`] pointing at
//! another positioned entity are scanned every frame; chosen spots land in their
//! [`EvadeDestination`], which the host's locomotion reads. Positions are plain components so the
//! adapter stays agnostic of how the host moves things.
//!
//! ## Scheduling
//!
//! Systems run in [`EvadeSet`] (`SyncIn`, `Scan`, `SyncOut`, chained) in `Update` by default, or
//! in `FixedUpdate` with [`EvadePlugin::in_fixed_update`]. Scan timing follows [`EvadeClock`],
//! which advances by `dt_seconds` per run.
//!
//! ## Features
//!
//! - `time`: if Bevy's `bevy_time::Time` resource is present, [`EvadeClock`] follows it.
//! - `physics`: [`RapierVisibility`] answers visibility queries from Rapier colliders tagged with
//!   [`EvadeClass`]; enable with [`EvadePlugin::with_rapier`].
//! - `gizmos`: [`EvadeGizmosPlugin`] draws [`EvadeTraceLines`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

use std::sync::Arc;

use bevy_app::{App, FixedUpdate, Plugin, Update};
use bevy_ecs::prelude::{Component, Entity, Query, Res, ResMut, Resource, SystemSet};
use bevy_ecs::schedule::{IntoScheduleConfigs, ScheduleLabel};
use evade_core::{Classification, PoissonDiscSampler, SurfaceProjector, Vec3, VisibilityQuery};
use evade_nav::ObstacleWorld;
use evade_scan::{
    AgentState, ConfigError, ScanConfig, ScanEnv, Scanner, ThreatState, TickOutcome,
};
use evade_tools::{TraceLine, TraceSink};

#[cfg(feature = "time")]
use bevy_time::Time;

#[cfg(feature = "physics")]
#[cfg_attr(docsrs, doc(cfg(feature = "physics")))]
pub mod physics;

#[cfg(feature = "physics")]
pub use physics::{tick_evaders_with_rapier, ColliderFilter, RapierVisibility};

#[cfg(feature = "gizmos")]
#[cfg_attr(docsrs, doc(cfg(feature = "gizmos")))]
pub mod debug;

#[cfg(feature = "gizmos")]
pub use debug::{draw_evade_trace_lines, EvadeGizmosPlugin};

/// Per-entity scanner state.
#[derive(Debug, Clone)]
#[derive(Component)]
pub struct EvadeScanner(pub Scanner<PoissonDiscSampler>);

impl EvadeScanner {
    pub fn new(config: ScanConfig, seed: u64) -> Result<Self, ConfigError> {
        Scanner::new(config, PoissonDiscSampler::new(seed)).map(Self)
    }
}

/// World position (Y up).
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(Component)]
pub struct EvadePosition(pub Vec3);

/// Facing direction on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(Component)]
pub struct EvadeFacing(pub Vec3);

impl Default for EvadeFacing {
    fn default() -> Self {
        Self(Vec3::Z)
    }
}

/// The entity being evaded. It needs an [`EvadePosition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Component)]
pub struct EvadeTarget(pub Entity);

/// Latest destination chosen for this entity. Without it the entity is never scanned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[derive(Component)]
pub struct EvadeDestination(pub Option<Vec3>);

/// Classification of a collider for visibility queries. Untagged colliders count as
/// [`Classification::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Component)]
pub struct EvadeClass(pub Classification);

#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(Resource)]
pub struct EvadeClock {
    /// Time handed to scanners this frame, in seconds.
    pub now: f64,
    pub dt_seconds: f32,
    pub frame: u64,
}

impl Default for EvadeClock {
    fn default() -> Self {
        Self {
            now: 0.0,
            dt_seconds: 1.0 / 60.0,
            frame: 0,
        }
    }
}

/// Visibility backend used by [`tick_evaders`]. Defaults to an empty world (nothing blocks).
#[derive(Clone)]
#[derive(Resource)]
pub struct EvadeVisibility(pub Arc<dyn VisibilityQuery + Send + Sync>);

impl Default for EvadeVisibility {
    fn default() -> Self {
        Self(Arc::new(ObstacleWorld::new()))
    }
}

impl EvadeVisibility {
    pub fn new<V>(visibility: V) -> Self
    where
        V: VisibilityQuery + Send + Sync + 'static,
    {
        Self(Arc::new(visibility))
    }
}

/// Walkable-surface projection. Defaults to accepting every point as is.
#[derive(Clone)]
#[derive(Resource)]
pub struct EvadeSurface(pub Arc<dyn SurfaceProjector + Send + Sync>);

impl Default for EvadeSurface {
    fn default() -> Self {
        Self(Arc::new(Unconstrained))
    }
}

impl EvadeSurface {
    pub fn new<P>(surface: P) -> Self
    where
        P: SurfaceProjector + Send + Sync + 'static,
    {
        Self(Arc::new(surface))
    }
}

/// Surface for hosts without walkable-area data: every point projects onto itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl SurfaceProjector for Unconstrained {
    fn project(&self, point: Vec3, _search_radius: f32) -> Option<Vec3> {
        Some(point)
    }
}

/// Trace lines from recent scan passes, kept until their time-to-live runs out.
#[derive(Debug, Default)]
#[derive(Resource)]
pub struct EvadeTraceLines {
    now: f64,
    lines: Vec<(f64, TraceLine)>,
}

impl EvadeTraceLines {
    pub fn lines(&self) -> impl Iterator<Item = &TraceLine> + '_ {
        self.lines.iter().map(|(_, line)| line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop lines that expired by `now`; new lines are stamped relative to it.
    pub fn expire(&mut self, now: f64) {
        self.now = now;
        self.lines.retain(|(expires_at, _)| *expires_at > now);
    }
}

impl TraceSink for EvadeTraceLines {
    fn line(&mut self, line: TraceLine) {
        self.lines.push((self.now + line.ttl_seconds as f64, line));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvadeSchedule {
    Update,
    FixedUpdate,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum EvadeSet {
    SyncIn,
    Scan,
    SyncOut,
}

pub type EvaderItems = (
    Entity,
    &'static mut EvadeScanner,
    &'static EvadePosition,
    Option<&'static EvadeFacing>,
    Option<&'static EvadeTarget>,
    Option<&'static mut EvadeDestination>,
);

/// Scan every evader, asking `visibility_for` for the query backend of each one.
pub fn scan_evaders<V, F>(
    clock: &EvadeClock,
    visibility_for: F,
    surface: &dyn SurfaceProjector,
    mut trace: Option<&mut EvadeTraceLines>,
    targets: &Query<&EvadePosition>,
    evaders: &mut Query<EvaderItems>,
) where
    V: VisibilityQuery,
    F: Fn(Entity) -> V,
{
    if let Some(trace) = trace.as_deref_mut() {
        trace.expire(clock.now);
    }

    for (entity, mut scanner, position, facing, target, destination) in evaders.iter_mut() {
        let threat = target
            .and_then(|t| targets.get(t.0).ok())
            .map(|p| ThreatState::new(p.0));
        let agent = AgentState {
            position: position.0,
            facing: facing.copied().unwrap_or_default().0,
        };

        let visibility = visibility_for(entity);
        let mut requested: Option<Vec3> = None;
        let mut env = ScanEnv::new(&visibility, surface);
        if destination.is_some() {
            env = env.with_mover(&mut requested);
        }
        if let Some(trace) = trace.as_deref_mut() {
            env = env.with_trace(trace);
        }

        let outcome = scanner.0.tick(clock.now, &agent, threat.as_ref(), &mut env);
        if let TickOutcome::Scanned(report) = &outcome {
            tracing::debug!(
                entity = ?entity,
                projected = report.projected,
                dispatched = report.dispatched,
                "evader scanned"
            );
        }

        if let (Some(point), Some(mut destination)) = (requested, destination) {
            destination.0 = Some(point);
        }
    }
}

pub fn tick_evaders(
    clock: Res<EvadeClock>,
    visibility: Res<EvadeVisibility>,
    surface: Res<EvadeSurface>,
    mut trace: Option<ResMut<EvadeTraceLines>>,
    targets: Query<&EvadePosition>,
    mut evaders: Query<EvaderItems>,
) {
    let backend = visibility.0.as_ref();
    scan_evaders(
        &clock,
        |_| backend,
        surface.0.as_ref(),
        trace.as_deref_mut(),
        &targets,
        &mut evaders,
    );
}

#[cfg(feature = "time")]
pub fn sync_clock_from_bevy_time(time: Option<Res<Time>>, mut clock: ResMut<EvadeClock>) {
    let Some(time) = time else {
        return;
    };

    let dt = time.delta_secs();
    if dt.is_finite() && dt.is_sign_positive() {
        clock.dt_seconds = dt;
    }
    clock.now = time.elapsed_secs_f64();
}

pub fn advance_clock(mut clock: ResMut<EvadeClock>) {
    clock.now += clock.dt_seconds.max(0.0) as f64;
    clock.frame = clock.frame.wrapping_add(1);
}

pub struct EvadePlugin {
    schedule: EvadeSchedule,
    trace_lines: bool,
    #[cfg(feature = "physics")]
    rapier: bool,
}

impl Default for EvadePlugin {
    fn default() -> Self {
        Self {
            schedule: EvadeSchedule::Update,
            trace_lines: false,
            #[cfg(feature = "physics")]
            rapier: false,
        }
    }
}

impl EvadePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_fixed_update(mut self) -> Self {
        self.schedule = EvadeSchedule::FixedUpdate;
        self
    }

    /// Record trace lines into [`EvadeTraceLines`].
    pub fn with_trace_lines(mut self) -> Self {
        self.trace_lines = true;
        self
    }

    /// Query Rapier colliders instead of [`EvadeVisibility`].
    #[cfg(feature = "physics")]
    #[cfg_attr(docsrs, doc(cfg(feature = "physics")))]
    pub fn with_rapier(mut self) -> Self {
        self.rapier = true;
        self
    }

    pub fn schedule(&self) -> EvadeSchedule {
        self.schedule
    }
}

impl EvadePlugin {
    #[cfg(feature = "physics")]
    fn uses_rapier(&self) -> bool {
        self.rapier
    }

    #[cfg(not(feature = "physics"))]
    fn uses_rapier(&self) -> bool {
        false
    }

    fn add_systems_to<L: ScheduleLabel + Clone>(&self, app: &mut App, label: L) {
        app.configure_sets(
            label.clone(),
            (EvadeSet::SyncIn, EvadeSet::Scan, EvadeSet::SyncOut).chain(),
        );

        #[cfg(feature = "time")]
        app.add_systems(
            label.clone(),
            sync_clock_from_bevy_time.in_set(EvadeSet::SyncIn),
        );
        app.add_systems(label.clone(), advance_clock.in_set(EvadeSet::SyncOut));

        if self.uses_rapier() {
            #[cfg(feature = "physics")]
            app.add_systems(label, tick_evaders_with_rapier.in_set(EvadeSet::Scan));
        } else {
            app.add_systems(label, tick_evaders.in_set(EvadeSet::Scan));
        }
    }
}

impl Plugin for EvadePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EvadeClock>();
        app.init_resource::<EvadeVisibility>();
        app.init_resource::<EvadeSurface>();
        if self.trace_lines {
            app.init_resource::<EvadeTraceLines>();
        }

        match self.schedule {
            EvadeSchedule::Update => self.add_systems_to(app, Update),
            EvadeSchedule::FixedUpdate => self.add_systems_to(app, FixedUpdate),
        }
    }
}
