//! Static FIT message definitions for workout files.
//!
//! Each table lists its fields in wire order. The writer derives both the
//! definition record and the data record layout from these tables.

/// FIT protocol version (2.0)
pub const PROTOCOL_VERSION: u8 = 0x20;

/// FIT profile version (21.00)
pub const PROFILE_VERSION: u16 = 2100;

/// Size of the file header, including its CRC
pub const HEADER_SIZE: u8 = 14;

/// Width of every string field, in bytes
pub const STRING_SIZE: u8 = 16;

/// Global FIT message numbers
pub mod mesg_num {
    pub const FILE_ID: u16 = 0;
    pub const WORKOUT: u16 = 26;
    pub const WORKOUT_STEP: u16 = 27;
}

/// FIT base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    Uint8,
    String,
    Uint16,
    Uint32,
    Uint32z,
}

impl BaseType {
    /// Base type number written in field definitions.
    pub const fn id(self) -> u8 {
        match self {
            BaseType::Enum => 0x00,
            BaseType::Uint8 => 0x02,
            BaseType::String => 0x07,
            BaseType::Uint16 => 0x84,
            BaseType::Uint32 => 0x86,
            BaseType::Uint32z => 0x8C,
        }
    }

    /// Encoded width in bytes.
    pub const fn size(self) -> u8 {
        match self {
            BaseType::Enum | BaseType::Uint8 => 1,
            BaseType::String => STRING_SIZE,
            BaseType::Uint16 => 2,
            BaseType::Uint32 | BaseType::Uint32z => 4,
        }
    }
}

/// A single field of a message definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: &'static str,
    /// Field definition number
    pub number: u8,
    pub base_type: BaseType,
}

impl FieldDefinition {
    const fn new(name: &'static str, number: u8, base_type: BaseType) -> Self {
        Self {
            name,
            number,
            base_type,
        }
    }

    /// Encoded width in bytes.
    pub const fn size(&self) -> u8 {
        self.base_type.size()
    }
}

/// Layout of one message kind.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageDefinition {
    pub name: &'static str,
    pub global_number: u16,
    /// Local message number used in record headers (0-15)
    pub local_number: u8,
    pub fields: &'static [FieldDefinition],
}

impl MessageDefinition {
    /// Size of a data record's payload, excluding the record header.
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.size() as usize).sum()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub static FILE_ID: MessageDefinition = MessageDefinition {
    name: "file_id",
    global_number: mesg_num::FILE_ID,
    local_number: 0,
    fields: &[
        FieldDefinition::new("manufacturer", 1, BaseType::Uint16),
        FieldDefinition::new("type", 0, BaseType::Enum),
        FieldDefinition::new("product", 2, BaseType::Uint16),
        FieldDefinition::new("serial_number", 3, BaseType::Uint32z),
    ],
};

pub static WORKOUT: MessageDefinition = MessageDefinition {
    name: "workout",
    global_number: mesg_num::WORKOUT,
    local_number: 1,
    fields: &[
        FieldDefinition::new("sport", 4, BaseType::Uint8),
        FieldDefinition::new("capabilities", 5, BaseType::Uint32),
        FieldDefinition::new("num_valid_steps", 6, BaseType::Uint16),
        FieldDefinition::new("wkt_name", 8, BaseType::String),
    ],
};

pub static WORKOUT_STEP: MessageDefinition = MessageDefinition {
    name: "workout_step",
    global_number: mesg_num::WORKOUT_STEP,
    local_number: 2,
    fields: &[
        FieldDefinition::new("message_index", 254, BaseType::Uint16),
        FieldDefinition::new("duration_type", 0, BaseType::Uint8),
        FieldDefinition::new("duration_value", 1, BaseType::Uint32),
        FieldDefinition::new("target_type", 2, BaseType::Uint8),
        FieldDefinition::new("target_value", 3, BaseType::Uint32),
        FieldDefinition::new("custom_target_value_low", 4, BaseType::Uint32),
        FieldDefinition::new("custom_target_value_high", 5, BaseType::Uint32),
        FieldDefinition::new("intensity", 7, BaseType::Uint8),
        FieldDefinition::new("wkt_step_name", 8, BaseType::String),
    ],
};

/// Every message kind a workout file uses, in emission order.
pub static WORKOUT_FILE_MESSAGES: [&MessageDefinition; 3] = [&FILE_ID, &WORKOUT, &WORKOUT_STEP];

/// A value supplied for one field of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    Str(&'a str),
}

impl FieldValue<'_> {
    /// Whether this value can be encoded as the given base type.
    pub fn fits(&self, base_type: BaseType) -> bool {
        matches!(
            (self, base_type),
            (FieldValue::U8(_), BaseType::Enum | BaseType::Uint8)
                | (FieldValue::U16(_), BaseType::Uint16)
                | (FieldValue::U32(_), BaseType::Uint32 | BaseType::Uint32z)
                | (FieldValue::Str(_), BaseType::String)
        )
    }
}
