//! Unrolls a workout into the ordered list of steps written to the device.

use crate::workouts::target::{resolve_target, TargetKind};
use crate::workouts::types::{SegmentType, Workout, WorkoutError};

/// Most steps a workout may unroll into; step indices are 16-bit
pub const MAX_STEPS: usize = u16::MAX as usize;

/// Intensity class of a workout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Warmup,
    Interval,
    Cooldown,
}

impl Intensity {
    /// Wire value for the step `intensity` field.
    pub fn wire_value(self) -> u8 {
        match self {
            Intensity::Warmup => 0,
            Intensity::Interval => 1,
            Intensity::Cooldown => 2,
        }
    }
}

impl From<SegmentType> for Intensity {
    fn from(segment_type: SegmentType) -> Self {
        match segment_type {
            SegmentType::Warmup => Intensity::Warmup,
            SegmentType::Cooldown => Intensity::Cooldown,
            SegmentType::Interval
            | SegmentType::SteadyState
            | SegmentType::FreeRide
            | SegmentType::Ramp => Intensity::Interval,
        }
    }
}

/// A single step ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Position in the step list, starting at 0
    pub message_index: u16,
    /// Duration in whole seconds
    pub duration_seconds: u32,
    /// Resolved target kind
    pub target_kind: TargetKind,
    /// Lower target bound, 0 for open steps
    pub target_low: u32,
    /// Upper target bound, 0 for open steps
    pub target_high: u32,
    /// Intensity derived from the segment type
    pub intensity: Intensity,
    /// Untruncated step name
    pub step_name: String,
}

/// Truncate a duration in seconds toward zero.
///
/// Fractional seconds are dropped. Negative and NaN values become 0, and
/// values beyond `u32::MAX` saturate.
pub fn whole_seconds(duration: f64) -> u32 {
    duration as u32
}

fn first_non_empty<'a>(candidates: [Option<&'a str>; 3]) -> &'a str {
    candidates
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or("")
}

/// Unroll a workout into its ordered steps.
///
/// Segments and entries keep their order, and each segment's entries are
/// emitted `repeat` times in a row. Message indices run from 0 without gaps.
///
/// Fails with [`WorkoutError::TooManySteps`] when the workout unrolls into
/// more than [`MAX_STEPS`] steps.
pub fn sequence_steps(workout: &Workout) -> Result<Vec<StepDescriptor>, WorkoutError> {
    let total = workout.total_steps();
    if total > MAX_STEPS {
        return Err(WorkoutError::TooManySteps(total));
    }

    let mut steps = Vec::with_capacity(total);

    for segment in &workout.segments {
        let intensity = Intensity::from(segment.segment_type);

        for _ in 0..segment.repeat {
            for entry in &segment.entries {
                let target = resolve_target(&entry.targets);
                let step_name = first_non_empty([
                    entry.name.as_deref(),
                    segment.description.as_deref(),
                    workout.name.as_deref(),
                ]);

                let message_index = u16::try_from(steps.len())
                    .map_err(|_| WorkoutError::TooManySteps(total))?;

                steps.push(StepDescriptor {
                    message_index,
                    duration_seconds: whole_seconds(entry.duration),
                    target_kind: target.kind,
                    target_low: target.low,
                    target_high: target.high,
                    intensity,
                    step_name: step_name.to_string(),
                });
            }
        }
    }

    Ok(steps)
}
