//! Umbrella crate that re-exports the `evade-*` building blocks.
//!
//! Start with [`scan::Scanner`]: give it a sampler, then call `tick` every frame with the
//! agent, the threat and the engine collaborators ([`core::VisibilityQuery`],
//! [`core::SurfaceProjector`], [`core::MovementController`]).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use evade_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use evade_tools as tools;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use evade_nav as nav;

#[cfg(feature = "scan")]
#[cfg_attr(docsrs, doc(cfg(feature = "scan")))]
pub use evade_scan as scan;

/// Common imports for driving a scanner.
#[cfg(all(feature = "scan", feature = "nav"))]
pub mod prelude {
    pub use evade_core::{
        BlueNoiseSampler, ClassMask, ClassMasks, Classification, MovementController,
        PoissonDiscSampler, RayHit, SurfaceProjector, Vec2, Vec3, VisibilityQuery,
    };
    pub use evade_nav::{Obstacle, ObstacleWorld, StraightMover, WalkableMesh, WaypointPatrol};
    pub use evade_scan::{
        AgentState, ScanConfig, ScanEnv, ScanReport, Scanner, ThreatState, TickOutcome,
    };
    pub use evade_tools::{TraceLine, TraceSink};
}
