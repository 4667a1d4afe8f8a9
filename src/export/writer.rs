//! FIT binary writer.
//!
//! Records are collected in memory and written to the sink in one pass on
//! [`MessageEncoder::finish`], once the data size for the file header is
//! known. Encoders are obtained through a [`FitBackend`], which is the
//! capability an exporter must have bound before it can produce output.

use std::io::Write;

use crate::export::crc::{calculate_crc, compute_crc};
use crate::export::profile::{
    FieldValue, MessageDefinition, HEADER_SIZE, PROFILE_VERSION, PROTOCOL_VERSION, STRING_SIZE,
};
use crate::export::types::ExportError;

/// Options controlling how records are framed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Emit the definition again before every data record
    pub repeat_definitions: bool,
}

/// Streaming encoder for definition and data records.
pub trait MessageEncoder {
    /// Write a definition record for a message kind.
    fn add_definition(&mut self, definition: &'static MessageDefinition)
        -> Result<(), ExportError>;

    /// Write a data record, preceded by its definition if none is active for
    /// its local message number. With `repeat_definitions`, a definition is
    /// written unless one was added since the last record of that number.
    fn add_record(
        &mut self,
        definition: &'static MessageDefinition,
        values: &[FieldValue<'_>],
    ) -> Result<(), ExportError>;

    /// Write the file to the sink and return the number of bytes written.
    fn finish(self: Box<Self>) -> Result<usize, ExportError>;
}

/// A source of FIT message encoders.
pub trait FitBackend: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;

    /// Open an encoder that writes to `sink`.
    fn open<'a>(
        &self,
        sink: &'a mut dyn Write,
        options: WriterOptions,
    ) -> Box<dyn MessageEncoder + 'a>;
}

/// The built-in backend, backed by [`FitWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFitBackend;

impl FitBackend for NativeFitBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn open<'a>(
        &self,
        sink: &'a mut dyn Write,
        options: WriterOptions,
    ) -> Box<dyn MessageEncoder + 'a> {
        Box::new(FitWriter::with_options(sink, options))
    }
}

/// FIT file writer
pub struct FitWriter<W: Write> {
    sink: W,
    records: Vec<u8>,
    options: WriterOptions,
    /// Global message number currently defined for each local number
    active: [Option<u16>; 16],
    /// Local numbers defined with no data record written since
    fresh: [bool; 16],
}

impl<W: Write> FitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        Self {
            sink,
            records: Vec::new(),
            options,
            active: [None; 16],
            fresh: [false; 16],
        }
    }

    /// Bytes of record data written so far.
    pub fn data_size(&self) -> usize {
        self.records.len()
    }

    fn write_definition(&mut self, definition: &'static MessageDefinition) {
        let local = definition.local_number & 0x0F;

        // Record header: definition message (bit 6 set), local message num in bits 0-3
        self.records.push(0x40 | local);
        // Reserved
        self.records.push(0);
        // Architecture: 0 = little endian
        self.records.push(0);
        self.records
            .extend_from_slice(&definition.global_number.to_le_bytes());
        self.records.push(definition.fields.len() as u8);

        for field in definition.fields {
            self.records
                .extend_from_slice(&[field.number, field.size(), field.base_type.id()]);
        }

        self.active[local as usize] = Some(definition.global_number);
        self.fresh[local as usize] = true;
        tracing::debug!(
            "Defined {} (global {}) as local message {}",
            definition.name,
            definition.global_number,
            local
        );
    }

    fn write_string(&mut self, value: &str, message: &'static str) {
        let bytes = value.as_bytes();
        let len = bytes.len().min(STRING_SIZE as usize);

        if len < bytes.len() && !value.is_char_boundary(len) {
            tracing::warn!(
                "Truncating {} string {:?} splits a multi-byte character",
                message,
                value
            );
        }

        self.records.extend_from_slice(&bytes[..len]);
        self.records
            .extend(std::iter::repeat(0u8).take(STRING_SIZE as usize - len));
    }

    /// Write the header, records and CRC to the sink.
    fn write_file(&mut self) -> Result<usize, ExportError> {
        let data_size = u32::try_from(self.records.len()).map_err(|_| {
            ExportError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "FIT data section exceeds 4 GiB",
            ))
        })?;

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        header.push(HEADER_SIZE);
        header.push(PROTOCOL_VERSION);
        header.extend_from_slice(&PROFILE_VERSION.to_le_bytes());
        header.extend_from_slice(&data_size.to_le_bytes());
        header.extend_from_slice(b".FIT");
        let header_crc = calculate_crc(&header);
        header.extend_from_slice(&header_crc.to_le_bytes());

        let file_crc = compute_crc(calculate_crc(&header), &self.records);

        self.sink.write_all(&header)?;
        self.sink.write_all(&self.records)?;
        self.sink.write_all(&file_crc.to_le_bytes())?;
        self.sink.flush()?;

        Ok(header.len() + self.records.len() + 2)
    }
}

impl<W: Write> MessageEncoder for FitWriter<W> {
    fn add_definition(
        &mut self,
        definition: &'static MessageDefinition,
    ) -> Result<(), ExportError> {
        self.write_definition(definition);
        Ok(())
    }

    fn add_record(
        &mut self,
        definition: &'static MessageDefinition,
        values: &[FieldValue<'_>],
    ) -> Result<(), ExportError> {
        if values.len() != definition.fields.len() {
            return Err(ExportError::FieldMismatch {
                message: definition.name,
                reason: format!(
                    "expected {} values, got {}",
                    definition.fields.len(),
                    values.len()
                ),
            });
        }

        if let Some((field, value)) = definition
            .fields
            .iter()
            .zip(values)
            .find(|(field, value)| !value.fits(field.base_type))
        {
            return Err(ExportError::FieldMismatch {
                message: definition.name,
                reason: format!("{:?} cannot encode {}", value, field.name),
            });
        }

        let local = definition.local_number & 0x0F;
        let defined = self.active[local as usize] == Some(definition.global_number);
        if !defined || (self.options.repeat_definitions && !self.fresh[local as usize]) {
            self.write_definition(definition);
        }

        // Record header: data message (bit 6 clear), local message num in bits 0-3
        self.records.push(local);
        self.fresh[local as usize] = false;

        for value in values {
            match value {
                FieldValue::U8(v) => self.records.push(*v),
                FieldValue::U16(v) => self.records.extend_from_slice(&v.to_le_bytes()),
                FieldValue::U32(v) => self.records.extend_from_slice(&v.to_le_bytes()),
                FieldValue::Str(s) => self.write_string(s, definition.name),
            }
        }

        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<usize, ExportError> {
        self.write_file()
    }
}
