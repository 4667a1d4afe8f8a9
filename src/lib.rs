//! wktfit - Structured workout to FIT converter
//!
//! Turns a structured workout (segments of repeated, timed steps with power
//! or heart rate targets) into a FIT workout file that cycling head units
//! can load.

pub mod export;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use export::{ExportError, WorkoutExporter};
pub use storage::config::ExportConfig;
pub use workouts::types::Workout;
