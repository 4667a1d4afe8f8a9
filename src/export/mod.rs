//! Export module for writing workouts as FIT files.

pub mod crc;
pub mod exporter_fit;
pub mod profile;
pub mod types;
pub mod writer;

pub use exporter_fit::{export_fit, export_fit_to_file, generate_fit_filename, WorkoutExporter};
pub use types::ExportError;
pub use writer::{FitBackend, FitWriter, MessageEncoder, NativeFitBackend, WriterOptions};
