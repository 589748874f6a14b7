#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use evade_core::Vec3;

/// Semantic category of a diagnostic line; decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineKind {
    /// Probe ray stopped by the threat.
    BlockedByThreat,
    /// Probe ray stopped by a wall.
    BlockedByWall,
    /// Probe ray stopped by a designated safe point.
    SafePoint,
    /// Probe ray reached full length, or hit something unclassified.
    Clear,
    /// Segment from a hit point back to the pulled-in candidate.
    Pullback,
    /// Marker for the destination forwarded to the movement controller.
    Destination,
}

impl LineKind {
    /// Linear RGBA color.
    pub fn rgba(self) -> [f32; 4] {
        match self {
            LineKind::BlockedByThreat => [1.0, 0.0, 0.0, 1.0],
            LineKind::BlockedByWall => [1.0, 0.92, 0.016, 1.0],
            LineKind::SafePoint => [0.0, 0.0, 1.0, 1.0],
            LineKind::Clear => [0.0, 1.0, 0.0, 1.0],
            LineKind::Pullback => [1.0, 1.0, 1.0, 1.0],
            LineKind::Destination => [0.0, 1.0, 1.0, 1.0],
        }
    }
}

/// A single debug segment. Purely observational.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLine {
    pub from: Vec3,
    pub to: Vec3,
    pub kind: LineKind,
    /// How long a renderer should keep the line on screen.
    pub ttl_seconds: f32,
}

impl TraceLine {
    pub fn new(from: Vec3, to: Vec3, kind: LineKind) -> Self {
        Self {
            from,
            to,
            kind,
            ttl_seconds: 0.0,
        }
    }

    /// Segment from `from` along `direction` for `length` units.
    pub fn ray(from: Vec3, direction: Vec3, length: f32, kind: LineKind) -> Self {
        Self::new(from, from + direction * length, kind)
    }

    pub fn with_ttl(mut self, ttl_seconds: f32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

pub trait TraceSink {
    fn line(&mut self, line: TraceLine);

    /// When `false`, producers may skip building lines altogether.
    fn enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn line(&mut self, _line: TraceLine) {}

    fn enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub lines: Vec<TraceLine>,
}

impl VecTraceSink {
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

impl TraceSink for VecTraceSink {
    fn line(&mut self, line: TraceLine) {
        self.lines.push(line);
    }
}

/// Lines recorded during one scan pass, tagged with the pass time.
#[derive(Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub time: f64,
    pub lines: Vec<TraceLine>,
}

impl TraceLog {
    pub fn begin(&mut self, time: f64) {
        self.time = time;
        self.lines.clear();
    }
}

impl TraceSink for TraceLog {
    fn line(&mut self, line: TraceLine) {
        self.lines.push(line);
    }
}
