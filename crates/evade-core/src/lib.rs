//! Deterministic, engine-agnostic primitives for evasion scanning.
//!
//! The scanner itself lives in `evade-scan`; this crate holds the shared vocabulary:
//! math types, classification tags, the collaborator traits the scanner consumes, deadline
//! gates and a reference blue-noise sampler.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod classify;
pub mod deadline;
pub mod math;
pub mod query;
pub mod rng;
pub mod sampling;

pub use classify::{ClassMask, ClassMasks, Classification};
pub use deadline::Deadline;
pub use math::{Vec2, Vec3};
pub use query::{BlueNoiseSampler, MovementController, RayHit, SurfaceProjector, VisibilityQuery};
pub use rng::{DeterministicRng, SplitMix64};
pub use sampling::PoissonDiscSampler;
