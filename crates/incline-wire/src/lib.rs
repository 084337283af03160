//! Fixed-layout binary frame codec for the board telemetry link.
//!
//! The remote board writes its message structs to the wire as-is: native
//! byte order, no inter-field padding. A [`FrameSchema`] describes one such
//! message as an ordered list of field types, and `encode`/`decode` translate
//! between bytes and typed values byte-for-byte with that layout.

use thiserror::Error;

/// Primitive field kinds that can appear in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Char,
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
}

impl FieldType {
    /// Encoded width in bytes. Independent of host alignment.
    pub const fn width(self) -> usize {
        match self {
            FieldType::Char | FieldType::Bool | FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32 | FieldType::U32 | FieldType::F32 => 4,
            FieldType::I64 | FieldType::U64 => 8,
        }
    }

    /// Wire-vocabulary name, used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            FieldType::Char => "char",
            FieldType::Bool => "bool",
            FieldType::I8 => "int8",
            FieldType::U8 => "uint8",
            FieldType::I16 => "int16",
            FieldType::U16 => "uint16",
            FieldType::I32 => "int32",
            FieldType::U32 => "uint32",
            FieldType::I64 => "int64",
            FieldType::U64 => "uint64",
            FieldType::F32 => "float",
        }
    }
}

/// One decoded field value. The variant must match the schema's declared
/// [`FieldType`] at the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Char(u8),
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
}

impl FieldValue {
    /// The field type this value encodes as.
    pub const fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Char(_) => FieldType::Char,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::I8(_) => FieldType::I8,
            FieldValue::U8(_) => FieldType::U8,
            FieldValue::I16(_) => FieldType::I16,
            FieldValue::U16(_) => FieldType::U16,
            FieldValue::I32(_) => FieldType::I32,
            FieldValue::U32(_) => FieldType::U32,
            FieldValue::I64(_) => FieldType::I64,
            FieldValue::U64(_) => FieldType::U64,
            FieldValue::F32(_) => FieldType::F32,
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame needs {needed} bytes but only {available} were supplied")]
    Truncated { needed: usize, available: usize },
    #[error("Schema has {expected} fields but {got} values were supplied")]
    ValueCount { expected: usize, got: usize },
    #[error("Field {index} is declared {expected} but the value is {got}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
}

/// Ordered, immutable field layout of one wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSchema {
    fields: Box<[FieldType]>,
}

impl FrameSchema {
    pub fn new(fields: impl Into<Vec<FieldType>>) -> Self {
        Self {
            fields: fields.into().into_boxed_slice(),
        }
    }

    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total encoded width in bytes: the sum of the field widths.
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.width()).sum()
    }

    /// Decode one frame from `bytes`, consuming exactly [`width`](Self::width)
    /// bytes. Fails rather than truncating when fewer are supplied.
    ///
    /// A boolean field decodes any nonzero byte as true, matching the native
    /// unpacking semantics on the remote side.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<FieldValue>, FrameError> {
        let needed = self.width();
        if bytes.len() < needed {
            return Err(FrameError::Truncated {
                needed,
                available: bytes.len(),
            });
        }

        let mut values = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for &field in self.fields.iter() {
            let raw = &bytes[offset..offset + field.width()];
            values.push(decode_field(field, raw));
            offset += field.width();
        }
        Ok(values)
    }

    /// Encode `values` into the schema's byte layout. Fails if the value
    /// count or any value's type does not match the schema. Pure: no effect
    /// beyond the returned bytes.
    pub fn encode(&self, values: &[FieldValue]) -> Result<Vec<u8>, FrameError> {
        if values.len() != self.fields.len() {
            return Err(FrameError::ValueCount {
                expected: self.fields.len(),
                got: values.len(),
            });
        }

        let mut bytes = Vec::with_capacity(self.width());
        for (index, (&field, value)) in self.fields.iter().zip(values).enumerate() {
            if value.field_type() != field {
                return Err(FrameError::TypeMismatch {
                    index,
                    expected: field.label(),
                    got: value.field_type().label(),
                });
            }
            encode_field(value, &mut bytes);
        }
        Ok(bytes)
    }
}

fn decode_field(field: FieldType, raw: &[u8]) -> FieldValue {
    // `raw` is exactly `field.width()` bytes; the try_into calls cannot fail.
    match field {
        FieldType::Char => FieldValue::Char(raw[0]),
        FieldType::Bool => FieldValue::Bool(raw[0] != 0),
        FieldType::I8 => FieldValue::I8(raw[0] as i8),
        FieldType::U8 => FieldValue::U8(raw[0]),
        FieldType::I16 => FieldValue::I16(i16::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::U16 => FieldValue::U16(u16::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::I32 => FieldValue::I32(i32::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::U32 => FieldValue::U32(u32::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::I64 => FieldValue::I64(i64::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::U64 => FieldValue::U64(u64::from_ne_bytes(raw.try_into().unwrap())),
        FieldType::F32 => FieldValue::F32(f32::from_ne_bytes(raw.try_into().unwrap())),
    }
}

fn encode_field(value: &FieldValue, bytes: &mut Vec<u8>) {
    match *value {
        FieldValue::Char(v) => bytes.push(v),
        FieldValue::Bool(v) => bytes.push(v as u8),
        FieldValue::I8(v) => bytes.push(v as u8),
        FieldValue::U8(v) => bytes.push(v),
        FieldValue::I16(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::U16(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::I32(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::U32(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::I64(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::U64(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
        FieldValue::F32(v) => bytes.extend_from_slice(&v.to_ne_bytes()),
    }
}
