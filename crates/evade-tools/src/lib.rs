//! Tooling primitives for evasion scanning.
//!
//! This crate is intentionally lightweight and engine-agnostic. Rendering the traces (Bevy
//! gizmos, editor overlays, etc.) belongs in adapter crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{LineKind, NullTraceSink, TraceLine, TraceLog, TraceSink, VecTraceSink};
