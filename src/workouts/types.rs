//! Workout types and enums.
//!
//! A workout is a list of segments, each repeating an ordered list of timed
//! entries. Entries carry their training targets keyed by target kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Type of workout segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    /// Gradual power increase
    Warmup,
    /// Gradual power decrease
    Cooldown,
    /// Repeating on/off blocks
    Interval,
    /// Constant power
    SteadyState,
    /// No ERG target (resistance mode)
    FreeRide,
    /// Linear power change
    Ramp,
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentType::Warmup => write!(f, "Warmup"),
            SegmentType::Cooldown => write!(f, "Cooldown"),
            SegmentType::Interval => write!(f, "Interval"),
            SegmentType::SteadyState => write!(f, "Steady State"),
            SegmentType::FreeRide => write!(f, "Free Ride"),
            SegmentType::Ramp => write!(f, "Ramp"),
        }
    }
}

/// Kind of training target an entry carries.
///
/// Serialises under its primary alias. Workout sources may use any alias
/// accepted by [`TargetKey::from_alias`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TargetKey {
    /// Heart rate in bpm
    #[serde(rename = "HEARTRATE")]
    HeartRate,
    /// Power as a pre-scaled percentage of FTP (75 means 75%)
    #[serde(rename = "FTP_RELATIVE")]
    FtpRelative,
    /// Absolute power in watts
    #[serde(rename = "POWER")]
    Power,
}

impl TargetKey {
    /// Parse a target alias as found in workout sources. Unknown aliases
    /// yield `None`.
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "HEARTRATE" | "heart_rate" => Some(TargetKey::HeartRate),
            "FTP_RELATIVE" => Some(TargetKey::FtpRelative),
            "POWER" | "power" => Some(TargetKey::Power),
            _ => None,
        }
    }
}

/// Read a target map keyed by alias.
///
/// Unknown aliases are dropped. When two aliases of one kind are both
/// present, the upper-case primary alias wins regardless of key order.
fn deserialize_targets<'de, D>(deserializer: D) -> Result<BTreeMap<TargetKey, Target>, D::Error>
where
    D: Deserializer<'de>,
{
    // Sorted by alias, so "HEARTRATE" precedes "heart_rate" and "POWER" precedes "power"
    let raw = BTreeMap::<String, Target>::deserialize(deserializer)?;

    let mut targets = BTreeMap::new();
    for (alias, target) in raw {
        if let Some(key) = TargetKey::from_alias(&alias) {
            targets.entry(key).or_insert(target);
        }
    }
    Ok(targets)
}

/// A single target value or a low/high range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    /// Single target value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    /// Lower bound of a range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<u32>,
    /// Upper bound of a range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<u32>,
}

impl Target {
    /// Create a single-value target.
    pub fn single(value: u32) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Create a range target.
    pub fn range(low: u32, high: u32) -> Self {
        Self {
            value: None,
            low: Some(low),
            high: Some(high),
        }
    }

    /// Whether both range bounds are populated.
    pub fn is_range(&self) -> bool {
        self.low.is_some() && self.high.is_some()
    }

    /// Canonical `(low, high)` bounds, or `None` for an empty target.
    ///
    /// A range takes precedence over a single value; a single value yields
    /// equal bounds.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        match (self.low, self.high, self.value) {
            (Some(low), Some(high), _) => Some((low, high)),
            (_, _, Some(value)) => Some((value, value)),
            _ => None,
        }
    }
}

/// A single timed step within a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    /// Duration in seconds
    pub duration: f64,
    /// Training targets keyed by kind, one per kind
    #[serde(default, deserialize_with = "deserialize_targets")]
    pub targets: BTreeMap<TargetKey, Target>,
    /// Optional step name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WorkoutEntry {
    /// Create an entry with no targets.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            targets: BTreeMap::new(),
            name: None,
        }
    }

    /// Add a target under the given key.
    pub fn with_target(mut self, key: TargetKey, target: Target) -> Self {
        self.targets.insert(key, target);
        self
    }

    /// Set the step name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

fn default_repeat() -> u32 {
    1
}

/// A repeated group of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSegment {
    /// Type of segment
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    /// Number of times the entries are repeated
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Ordered entries
    #[serde(default)]
    pub entries: Vec<WorkoutEntry>,
    /// Optional description, used as a fallback step name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkoutSegment {
    /// Create a segment that runs its entries once.
    pub fn new(segment_type: SegmentType, entries: Vec<WorkoutEntry>) -> Self {
        Self {
            segment_type,
            repeat: 1,
            entries,
            description: None,
        }
    }

    /// Set the repeat count.
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Number of steps this segment unrolls into.
    pub fn step_count(&self) -> usize {
        self.repeat as usize * self.entries.len()
    }
}

/// A structured training workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Workout name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered list of segments
    #[serde(default)]
    pub segments: Vec<WorkoutSegment>,
}

impl Workout {
    /// Create a new workout with the given name and segments.
    pub fn new(name: Option<String>, segments: Vec<WorkoutSegment>) -> Self {
        Self { name, segments }
    }

    /// Total number of steps once every segment is unrolled.
    pub fn total_steps(&self) -> usize {
        self.segments.iter().map(WorkoutSegment::step_count).sum()
    }
}

/// Errors related to workout operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkoutError {
    /// More steps than a 16-bit message index can address
    #[error("Workout has {0} steps, more than a FIT workout can hold")]
    TooManySteps(usize),
}
