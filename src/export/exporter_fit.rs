//! FIT workout file export.
//!
//! Writes a workout as a file_id record, a workout record and one
//! workout_step record per unrolled step, followed by the file CRC. Target
//! values are written as given: power targets, absolute or percent FTP,
//! share one target type.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::profile::{FieldValue, FILE_ID, WORKOUT, WORKOUT_STEP};
use crate::export::types::ExportError;
use crate::export::writer::{FitBackend, MessageEncoder, NativeFitBackend};
use crate::storage::config::ExportConfig;
use crate::workouts::sequencer::{sequence_steps, StepDescriptor};
use crate::workouts::types::Workout;

/// Workout name written when the workout has none
pub const DEFAULT_WORKOUT_NAME: &str = "Workout";

/// Duration type for time-based steps
const DURATION_TYPE_TIME: u8 = 0;

/// Exports workouts through a bound FIT backend.
pub struct WorkoutExporter {
    backend: Option<Box<dyn FitBackend>>,
    config: ExportConfig,
}

impl Default for WorkoutExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl WorkoutExporter {
    /// Create an exporter using the built-in FIT backend.
    pub fn new(config: ExportConfig) -> Self {
        Self::with_backend(Box::new(NativeFitBackend), config)
    }

    /// Create an exporter using the given backend.
    pub fn with_backend(backend: Box<dyn FitBackend>, config: ExportConfig) -> Self {
        Self {
            backend: Some(backend),
            config,
        }
    }

    /// Create an exporter with no backend bound. Every export fails with
    /// [`ExportError::MissingDependency`].
    pub fn unbound(config: ExportConfig) -> Self {
        Self {
            backend: None,
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn backend(&self) -> Result<&dyn FitBackend, ExportError> {
        self.backend.as_deref().ok_or_else(|| {
            ExportError::MissingDependency(
                "no FIT backend is bound; construct the exporter with WorkoutExporter::new \
                 or bind one with WorkoutExporter::with_backend"
                    .to_string(),
            )
        })
    }

    /// Reading FIT workouts is not supported.
    pub fn load(&self, path: &Path) -> Result<Workout, ExportError> {
        Err(ExportError::UnsupportedOperation(format!(
            "loading FIT workouts is not implemented ({})",
            path.display()
        )))
    }

    /// Export a workout to an in-memory FIT file.
    pub fn export_to_vec(&self, workout: &Workout) -> Result<Vec<u8>, ExportError> {
        let mut data = Vec::new();
        self.export_to_writer(workout, &mut data)?;
        Ok(data)
    }

    /// Export a workout to a writer, returning the number of bytes written.
    pub fn export_to_writer<W: Write>(
        &self,
        workout: &Workout,
        mut sink: W,
    ) -> Result<usize, ExportError> {
        let backend = self.backend()?;
        let steps = sequence_steps(workout)?;

        let encoder = backend.open(&mut sink, self.config.writer_options());
        let written = self.encode(workout, &steps, encoder)?;

        tracing::info!(
            "Exported workout {:?}: {} steps, {} bytes via {} backend",
            workout_name(workout),
            steps.len(),
            written,
            backend.name()
        );

        Ok(written)
    }

    /// Export a workout to a FIT file.
    ///
    /// The file is closed on every path. A failed export may leave a
    /// partially written file behind.
    pub fn export_to_file(&self, workout: &Workout, path: &Path) -> Result<(), ExportError> {
        // Fail before touching the filesystem
        self.backend()?;

        let mut file = BufWriter::new(File::create(path)?);
        self.export_to_writer(workout, &mut file)?;
        file.into_inner().map_err(|e| e.into_error())?.sync_all()?;

        tracing::debug!("Wrote FIT workout to {}", path.display());
        Ok(())
    }

    fn encode(
        &self,
        workout: &Workout,
        steps: &[StepDescriptor],
        mut encoder: Box<dyn MessageEncoder + '_>,
    ) -> Result<usize, ExportError> {
        let config = &self.config;

        encoder.add_definition(&FILE_ID)?;
        encoder.add_record(
            &FILE_ID,
            &[
                FieldValue::U16(config.manufacturer),
                FieldValue::U8(config.file_type),
                FieldValue::U16(config.product),
                FieldValue::U32(config.serial_number),
            ],
        )?;

        encoder.add_definition(&WORKOUT)?;
        encoder.add_record(
            &WORKOUT,
            &[
                FieldValue::U8(config.sport),
                FieldValue::U32(0), // capabilities
                FieldValue::U16(steps.len() as u16), // bounded by MAX_STEPS
                FieldValue::Str(workout_name(workout)),
            ],
        )?;

        if !steps.is_empty() {
            encoder.add_definition(&WORKOUT_STEP)?;
        }
        for step in steps {
            encoder.add_record(
                &WORKOUT_STEP,
                &[
                    FieldValue::U16(step.message_index),
                    FieldValue::U8(DURATION_TYPE_TIME),
                    FieldValue::U32(step.duration_seconds),
                    FieldValue::U8(step.target_kind.wire_value()),
                    FieldValue::U32(0), // target_value, unused with custom bounds
                    FieldValue::U32(step.target_low),
                    FieldValue::U32(step.target_high),
                    FieldValue::U8(step.intensity.wire_value()),
                    FieldValue::Str(&step.step_name),
                ],
            )?;
        }

        encoder.finish()
    }
}

fn workout_name(workout: &Workout) -> &str {
    workout
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_WORKOUT_NAME)
}

/// Export a workout to FIT format with the default configuration.
pub fn export_fit(workout: &Workout) -> Result<Vec<u8>, ExportError> {
    WorkoutExporter::default().export_to_vec(workout)
}

/// Export a workout to FIT and write to a file.
pub fn export_fit_to_file(workout: &Workout, path: &Path) -> Result<(), ExportError> {
    WorkoutExporter::default().export_to_file(workout, path)
}

/// Generate a default filename for a FIT workout export.
pub fn generate_fit_filename(workout: &Workout) -> String {
    let stem: String = workout_name(workout)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.fit", stem)
}
