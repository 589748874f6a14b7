//! Evasion scanner.
//!
//! Every scan interval the [`Scanner`] draws blue-noise directions around the agent, probes each
//! one against the world, projects the resulting spot onto the walkable surface and scores it by
//! cover from the threat and distance to it. The best spot is forwarded to the movement
//! controller at most once per repath cooldown.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod cover;
pub mod error;
pub mod scanner;
pub mod score;

pub use config::ScanConfig;
pub use cover::{has_cover, COVER_EPSILON};
pub use error::ConfigError;
pub use scanner::{
    AgentState, Candidate, SampleEval, ScanEnv, ScanReport, Scanner, ThreatState, TickOutcome,
};
pub use score::{ScoreTerms, ScoreWeights};
