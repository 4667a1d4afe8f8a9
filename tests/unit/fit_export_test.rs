//! Unit tests for FIT workout export.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wktfit::export::profile::{mesg_num, FieldValue, MessageDefinition};
use wktfit::export::{
    export_fit, export_fit_to_file, ExportError, FitBackend, FitWriter, MessageEncoder,
    WorkoutExporter, WriterOptions,
};
use wktfit::workouts::types::{SegmentType, Target, TargetKey, WorkoutEntry, WorkoutSegment};
use wktfit::{ExportConfig, Workout};

use super::fit_records::{read_records, DataRecord};

fn steps(records: &[DataRecord]) -> Vec<&DataRecord> {
    records
        .iter()
        .filter(|r| r.global == mesg_num::WORKOUT_STEP)
        .collect()
}

fn workout_record(records: &[DataRecord]) -> &DataRecord {
    records
        .iter()
        .find(|r| r.global == mesg_num::WORKOUT)
        .expect("workout record")
}

/// One interval segment repeated twice: A = 300s at 75, B = 120s open.
fn create_interval_workout() -> Workout {
    Workout::new(
        Some("Intervals".to_string()),
        vec![WorkoutSegment::new(
            SegmentType::Interval,
            vec![
                WorkoutEntry::new(300.0)
                    .with_name("A")
                    .with_target(TargetKey::Power, Target::single(75)),
                WorkoutEntry::new(120.0).with_name("B"),
            ],
        )
        .with_repeat(2)],
    )
}

#[test]
fn test_interval_scenario() {
    let data = export_fit(&create_interval_workout()).unwrap();
    let (records, _) = read_records(&data);

    assert_eq!(records[0].global, mesg_num::FILE_ID);
    assert_eq!(records[1].global, mesg_num::WORKOUT);
    assert_eq!(workout_record(&records).u16(6), 4);

    let steps = steps(&records);
    assert_eq!(steps.len(), 4);

    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.u16(254), i as u16);
        assert_eq!(step.u8(0), 0); // time-based
        assert_eq!(step.u8(7), 1); // interval
        assert_eq!(step.u32(3), 0);
    }

    for step in [steps[0], steps[2]] {
        assert_eq!(step.u32(1), 300);
        assert_eq!(step.u8(2), 1); // power
        assert_eq!((step.u32(4), step.u32(5)), (75, 75));
        assert_eq!(step.bytes(8), b"A");
    }

    for step in [steps[1], steps[3]] {
        assert_eq!(step.u32(1), 120);
        assert_eq!(step.u8(2), 0); // open
        assert_eq!((step.u32(4), step.u32(5)), (0, 0));
        assert_eq!(step.bytes(8), b"B");
    }
}

#[test]
fn test_file_id_record() {
    let data = export_fit(&create_interval_workout()).unwrap();
    let (records, _) = read_records(&data);

    let file_id = &records[0];
    assert_eq!(file_id.u16(1), 60);
    assert_eq!(file_id.u8(0), 4);
    assert_eq!(file_id.u16(2), 65534);
    assert_eq!(file_id.u32(3), 12345678);

    let workout = workout_record(&records);
    assert_eq!(workout.u8(4), 2);
    assert_eq!(workout.u32(5), 0);
    assert_eq!(workout.bytes(8), b"Intervals");
}

#[test]
fn test_step_count_and_indices_across_segments() {
    let workout = Workout::new(
        None,
        vec![
            WorkoutSegment::new(SegmentType::Warmup, vec![WorkoutEntry::new(600.0)]),
            WorkoutSegment::new(
                SegmentType::SteadyState,
                vec![
                    WorkoutEntry::new(30.0),
                    WorkoutEntry::new(30.0),
                    WorkoutEntry::new(30.0),
                ],
            )
            .with_repeat(4),
            WorkoutSegment::new(SegmentType::Ramp, vec![]).with_repeat(3),
            WorkoutSegment::new(SegmentType::Cooldown, vec![WorkoutEntry::new(300.0)]),
        ],
    );

    let data = export_fit(&workout).unwrap();
    let (records, definitions) = read_records(&data);
    let steps = steps(&records);

    assert_eq!(steps.len(), workout.total_steps());
    assert_eq!(steps.len(), 14);
    assert_eq!(workout_record(&records).u16(6), 14);
    assert_eq!(definitions, 3);

    let indices: Vec<u16> = steps.iter().map(|s| s.u16(254)).collect();
    assert_eq!(indices, (0..14).collect::<Vec<u16>>());

    assert_eq!(steps[0].u8(7), 0);
    assert!(steps[1..13].iter().all(|s| s.u8(7) == 1));
    assert_eq!(steps[13].u8(7), 2);
}

#[test]
fn test_heart_rate_overrides_power() {
    let workout = Workout::new(
        None,
        vec![WorkoutSegment::new(
            SegmentType::SteadyState,
            vec![WorkoutEntry::new(600.0)
                .with_target(TargetKey::Power, Target::single(250))
                .with_target(TargetKey::FtpRelative, Target::single(80))
                .with_target(TargetKey::HeartRate, Target::range(135, 145))],
        )],
    );

    let data = export_fit(&workout).unwrap();
    let (records, _) = read_records(&data);
    let step = steps(&records)[0];

    assert_eq!(step.u8(2), 2);
    assert_eq!((step.u32(4), step.u32(5)), (135, 145));
}

#[test]
fn test_names_truncated_to_16_bytes() {
    let workout = Workout::new(
        Some("Threshold Builder Week 3".to_string()),
        vec![WorkoutSegment::new(
            SegmentType::Interval,
            vec![
                WorkoutEntry::new(60.0).with_name("Exactly16Bytes!!"),
                WorkoutEntry::new(60.0).with_name("Seventeen bytes!!"),
                WorkoutEntry::new(60.0).with_name("Ünïcödé sprint ëffort"),
            ],
        )],
    );

    let data = export_fit(&workout).unwrap();
    let (records, _) = read_records(&data);

    assert_eq!(workout_record(&records).bytes(8), b"Threshold Builde");

    let steps = steps(&records);
    assert_eq!(steps[0].bytes(8), b"Exactly16Bytes!!");
    assert_eq!(steps[1].bytes(8), b"Seventeen bytes!");

    let expected = &"Ünïcödé sprint ëffort".as_bytes()[..16];
    assert_eq!(steps[2].bytes(8), expected);
}

#[test]
fn test_fractional_durations_truncated() {
    let workout = Workout::new(
        None,
        vec![WorkoutSegment::new(
            SegmentType::FreeRide,
            vec![WorkoutEntry::new(89.99), WorkoutEntry::new(0.5)],
        )],
    );

    let data = export_fit(&workout).unwrap();
    let (records, _) = read_records(&data);
    let steps = steps(&records);

    assert_eq!(steps[0].u32(1), 89);
    assert_eq!(steps[1].u32(1), 0);
}

#[test]
fn test_unnamed_workout_uses_default_name() {
    let workout = Workout::new(
        None,
        vec![WorkoutSegment::new(
            SegmentType::Interval,
            vec![WorkoutEntry::new(60.0)],
        )],
    );

    let data = export_fit(&workout).unwrap();
    let (records, _) = read_records(&data);

    assert_eq!(workout_record(&records).bytes(8), b"Workout");
    assert_eq!(steps(&records)[0].bytes(8), b"");
}

#[test]
fn test_repeat_definitions_config() {
    let config = ExportConfig {
        repeat_definitions: true,
        ..Default::default()
    };
    let data = WorkoutExporter::new(config)
        .export_to_vec(&create_interval_workout())
        .unwrap();
    let (records, definitions) = read_records(&data);

    assert_eq!(records.len(), 6);
    assert_eq!(definitions, 6);
}

#[test]
fn test_custom_file_id_config() {
    let config = ExportConfig {
        manufacturer: 1,
        product: 7,
        serial_number: 99,
        ..Default::default()
    };
    let data = WorkoutExporter::new(config)
        .export_to_vec(&create_interval_workout())
        .unwrap();
    let (records, _) = read_records(&data);

    assert_eq!(records[0].u16(1), 1);
    assert_eq!(records[0].u16(2), 7);
    assert_eq!(records[0].u32(3), 99);
}

#[test]
fn test_export_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intervals.fit");

    export_fit_to_file(&create_interval_workout(), &path).unwrap();

    let data = std::fs::read(&path).unwrap();
    assert_eq!(data, export_fit(&create_interval_workout()).unwrap());
}

#[test]
fn test_unbound_exporter_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intervals.fit");

    let result = WorkoutExporter::unbound(ExportConfig::default())
        .export_to_file(&create_interval_workout(), &path);

    match result {
        Err(ExportError::MissingDependency(message)) => assert!(message.contains("backend")),
        other => panic!("expected MissingDependency, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("intervals.fit");

    let result = export_fit_to_file(&create_interval_workout(), &path);
    assert!(matches!(result, Err(ExportError::IoError(_))));
}

#[test]
fn test_load_always_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intervals.fit");
    export_fit_to_file(&create_interval_workout(), &path).unwrap();

    let result = WorkoutExporter::default().load(&path);
    assert!(matches!(result, Err(ExportError::UnsupportedOperation(_))));
}

/// A sink that fails every write.
struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_propagates() {
    let result = WorkoutExporter::default().export_to_writer(&create_interval_workout(), FailingSink);
    assert!(matches!(result, Err(ExportError::IoError(_))));
}

/// Backend that counts definitions and records before delegating to the
/// native writer.
struct CountingBackend {
    definitions: Arc<AtomicUsize>,
    records: Arc<AtomicUsize>,
}

struct CountingEncoder<'a> {
    inner: FitWriter<&'a mut dyn Write>,
    definitions: Arc<AtomicUsize>,
    records: Arc<AtomicUsize>,
}

impl MessageEncoder for CountingEncoder<'_> {
    fn add_definition(
        &mut self,
        definition: &'static MessageDefinition,
    ) -> Result<(), ExportError> {
        self.definitions.fetch_add(1, Ordering::SeqCst);
        self.inner.add_definition(definition)
    }

    fn add_record(
        &mut self,
        definition: &'static MessageDefinition,
        values: &[FieldValue<'_>],
    ) -> Result<(), ExportError> {
        self.records.fetch_add(1, Ordering::SeqCst);
        self.inner.add_record(definition, values)
    }

    fn finish(self: Box<Self>) -> Result<usize, ExportError> {
        Box::new(self.inner).finish()
    }
}

impl FitBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn open<'a>(
        &self,
        sink: &'a mut dyn Write,
        options: WriterOptions,
    ) -> Box<dyn MessageEncoder + 'a> {
        Box::new(CountingEncoder {
            inner: FitWriter::with_options(sink, options),
            definitions: Arc::clone(&self.definitions),
            records: Arc::clone(&self.records),
        })
    }
}

fn counting_exporter(
    config: ExportConfig,
) -> (WorkoutExporter, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let definitions = Arc::new(AtomicUsize::new(0));
    let records = Arc::new(AtomicUsize::new(0));
    let backend = CountingBackend {
        definitions: Arc::clone(&definitions),
        records: Arc::clone(&records),
    };
    (
        WorkoutExporter::with_backend(Box::new(backend), config),
        definitions,
        records,
    )
}

#[test]
fn test_custom_backend_receives_every_record() {
    let (exporter, definitions, records) = counting_exporter(ExportConfig::default());

    let data = exporter.export_to_vec(&create_interval_workout()).unwrap();

    assert_eq!(definitions.load(Ordering::SeqCst), 3);
    assert_eq!(records.load(Ordering::SeqCst), 6);
    assert_eq!(data, export_fit(&create_interval_workout()).unwrap());
}

#[test]
fn test_custom_backend_with_repeated_definitions() {
    let config = ExportConfig {
        repeat_definitions: true,
        ..Default::default()
    };
    let (exporter, definitions, records) = counting_exporter(config.clone());

    let data = exporter.export_to_vec(&create_interval_workout()).unwrap();
    let (decoded, written) = read_records(&data);

    // Explicit definitions cover the first record of each kind
    assert_eq!(definitions.load(Ordering::SeqCst), 3);
    assert_eq!(records.load(Ordering::SeqCst), 6);
    assert_eq!(decoded.len(), 6);
    assert_eq!(written, 6);
    assert_eq!(
        data,
        WorkoutExporter::new(config)
            .export_to_vec(&create_interval_workout())
            .unwrap()
    );
}

#[test]
fn test_empty_workout_defines_no_steps() {
    let (exporter, definitions, _) = counting_exporter(ExportConfig::default());

    let data = exporter.export_to_vec(&Workout::default()).unwrap();
    let (records, written) = read_records(&data);

    assert_eq!(definitions.load(Ordering::SeqCst), 2);
    assert_eq!(written, 2);
    assert_eq!(records.len(), 2);
    assert_eq!(workout_record(&records).u16(6), 0);
}
