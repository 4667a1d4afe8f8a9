//! Resolution of an entry's targets into a single canonical target.

use std::collections::BTreeMap;

use crate::workouts::types::{Target, TargetKey};

/// Kind of target encoded in a workout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetKind {
    /// No target
    #[default]
    Open,
    /// Power (absolute watts or percent FTP, not distinguished)
    Power,
    /// Heart rate
    HeartRate,
}

impl TargetKind {
    /// Wire value for the step `target_type` field.
    pub fn wire_value(self) -> u8 {
        match self {
            TargetKind::Open => 0,
            TargetKind::Power => 1,
            TargetKind::HeartRate => 2,
        }
    }
}

/// Canonical `(kind, low, high)` target of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedTarget {
    /// Target kind written as the step's target type
    pub kind: TargetKind,
    /// Lower bound, equal to `high` for single-value targets
    pub low: u32,
    /// Upper bound
    pub high: u32,
}

impl ResolvedTarget {
    /// The open target with zero bounds.
    pub const OPEN: ResolvedTarget = ResolvedTarget {
        kind: TargetKind::Open,
        low: 0,
        high: 0,
    };
}

/// Keys checked in priority order, with the kind each one resolves to.
const PRIORITY: [(TargetKey, TargetKind); 3] = [
    (TargetKey::HeartRate, TargetKind::HeartRate),
    (TargetKey::FtpRelative, TargetKind::Power),
    (TargetKey::Power, TargetKind::Power),
];

/// Resolve an entry's targets.
///
/// The first key present in priority order wins, and lower-priority keys are
/// ignored even when the winner holds no usable value. An empty winner, or no
/// recognised key at all, resolves to [`ResolvedTarget::OPEN`].
pub fn resolve_target(targets: &BTreeMap<TargetKey, Target>) -> ResolvedTarget {
    let Some((target, kind)) = PRIORITY
        .iter()
        .find_map(|(key, kind)| targets.get(key).map(|target| (target, *kind)))
    else {
        return ResolvedTarget::OPEN;
    };

    match target.bounds() {
        Some((low, high)) => ResolvedTarget { kind, low, high },
        None => ResolvedTarget::OPEN,
    }
}
