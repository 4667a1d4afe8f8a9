//! Workout module: data model, target resolution and step sequencing.

pub mod sequencer;
pub mod target;
pub mod types;

pub use sequencer::{sequence_steps, Intensity, StepDescriptor, MAX_STEPS};
pub use target::{resolve_target, ResolvedTarget, TargetKind};
pub use types::{SegmentType, Target, TargetKey, Workout, WorkoutEntry, WorkoutError, WorkoutSegment};
