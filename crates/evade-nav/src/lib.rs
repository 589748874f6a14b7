//! Reference collaborators for the evasion scanner: walkable-surface projection, a box world for
//! visibility queries, and simple locomotion.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod mesh;
pub mod motion;
pub mod world;

pub use mesh::WalkableMesh;
pub use motion::{StraightMover, WaypointPatrol};
pub use world::{Obstacle, ObstacleId, ObstacleWorld};
