use bytes::{BufMut, BytesMut};
use serde::{Serialize, Serializer};

use crate::error::{Result, SchemaError};
use crate::record::{Record, Schema};

/// Encoding of one fixed-width field.
///
/// All integers are little-endian. `I16` is two's complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    I16,
    U32,
    /// Fixed-length byte string, zero-padded on the right.
    Bytes(usize),
    /// A nested record laid out inline.
    Record(&'static Schema),
}

impl FieldKind {
    /// Number of bytes this kind occupies on the wire.
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 => 4,
            FieldKind::Bytes(len) => *len,
            FieldKind::Record(schema) => schema.width(),
        }
    }

    /// Short type name for diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::I16 => "i16",
            FieldKind::U32 => "u32",
            FieldKind::Bytes(_) => "bytes",
            FieldKind::Record(schema) => schema.name,
        }
    }
}

/// A named field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn u8(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::U8,
        }
    }

    pub const fn u16(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::U16,
        }
    }

    pub const fn i16(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::I16,
        }
    }

    pub const fn u32(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::U32,
        }
    }

    pub const fn bytes(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Bytes(len),
        }
    }

    pub const fn record(name: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            kind: FieldKind::Record(schema),
        }
    }

    /// Number of bytes this field occupies on the wire.
    pub const fn width(&self) -> usize {
        self.kind.width()
    }

    /// The value a freshly constructed record holds for this field.
    pub fn zero(&self) -> Value {
        match self.kind {
            FieldKind::U8 => Value::U8(0),
            FieldKind::U16 => Value::U16(0),
            FieldKind::I16 => Value::I16(0),
            FieldKind::U32 => Value::U32(0),
            FieldKind::Bytes(_) => Value::Bytes(Vec::new()),
            FieldKind::Record(schema) => Value::Record(schema.default_record()),
        }
    }

    /// Decode this field from `buf` at `offset`.
    ///
    /// Returns the value and the offset just past it.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
        let width = self.width();
        let available = buf.len().saturating_sub(offset);
        if width > available {
            return Err(SchemaError::TooShort {
                field: self.name,
                offset,
                needed: width,
                available,
            });
        }

        let raw = &buf[offset..offset + width];
        let value = match self.kind {
            FieldKind::U8 => Value::U8(raw[0]),
            FieldKind::U16 => Value::U16(u16::from_le_bytes([raw[0], raw[1]])),
            FieldKind::I16 => Value::I16(i16::from_le_bytes([raw[0], raw[1]])),
            FieldKind::U32 => Value::U32(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            FieldKind::Bytes(_) => Value::Bytes(raw.to_vec()),
            FieldKind::Record(schema) => Value::Record(schema.decode_at(buf, offset)?.0),
        };

        Ok((value, offset + width))
    }

    /// Encode `value` as exactly [`width`](Self::width) bytes.
    ///
    /// Short byte strings are zero-padded. Oversize strings are rejected,
    /// never truncated.
    pub fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<()> {
        match (self.kind, value) {
            (FieldKind::U8, Value::U8(v)) => dst.put_u8(*v),
            (FieldKind::U16, Value::U16(v)) => dst.put_u16_le(*v),
            (FieldKind::I16, Value::I16(v)) => dst.put_i16_le(*v),
            (FieldKind::U32, Value::U32(v)) => dst.put_u32_le(*v),
            (FieldKind::Bytes(len), Value::Bytes(v)) => {
                if v.len() > len {
                    return Err(SchemaError::StringTooLong {
                        field: self.name,
                        len: v.len(),
                        max: len,
                    });
                }
                dst.put_slice(v);
                dst.put_bytes(0, len - v.len());
            }
            (FieldKind::Record(schema), Value::Record(v)) => {
                if !std::ptr::eq(v.schema(), schema) {
                    return Err(SchemaError::WrongSchema {
                        expected: schema.name,
                        found: v.schema().name,
                    });
                }
                v.encode_into(dst)?;
            }
            (kind, value) => {
                return Err(SchemaError::TypeMismatch {
                    field: self.name,
                    expected: kind.type_name(),
                    found: value.type_name(),
                })
            }
        }
        Ok(())
    }

    /// Check that `value` may be stored in this field.
    pub(crate) fn check(&self, value: &Value) -> Result<()> {
        let matches = match (self.kind, value) {
            (FieldKind::U8, Value::U8(_))
            | (FieldKind::U16, Value::U16(_))
            | (FieldKind::I16, Value::I16(_))
            | (FieldKind::U32, Value::U32(_))
            | (FieldKind::Bytes(_), Value::Bytes(_)) => true,
            (FieldKind::Record(schema), Value::Record(r)) => std::ptr::eq(r.schema(), schema),
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(SchemaError::TypeMismatch {
                field: self.name,
                expected: self.kind.type_name(),
                found: value.type_name(),
            })
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
    Bytes(Vec<u8>),
    Record(Record),
}

impl Value {
    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::Bytes(_) => "bytes",
            Value::Record(r) => r.schema().name,
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(v.as_bytes().to_vec())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

/// Byte strings serialize as trimmed text, or as hex when they hold
/// anything other than printable UTF-8 and padding.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::Bytes(v) => serializer.serialize_str(&display_bytes(v)),
            Value::Record(r) => r.serialize(serializer),
        }
    }
}

/// Interpret a padded byte string as text.
pub(crate) fn trim_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Text if the padded string is printable, lowercase hex otherwise.
pub(crate) fn display_bytes(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    match std::str::from_utf8(&raw[..end]) {
        Ok(text) if !text.chars().any(char::is_control) => text.trim().to_string(),
        _ => raw.iter().map(|b| format!("{b:02x}")).collect(),
    }
}
