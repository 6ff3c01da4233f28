use bytes::{Bytes, BytesMut};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::error::{Result, SchemaError};
use crate::field::{trim_text, Field, Value};

/// An ordered, fixed-width record layout.
///
/// Schemas are declared as `static` items and never built at runtime.
/// Field names are unique within a schema.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Total wire width: the sum of all field widths, nested records included.
    pub const fn width(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].width();
            i += 1;
        }
        total
    }

    /// Look up a field and its position.
    pub fn field(&self, name: &str) -> Option<(usize, &'static Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// A record with every field at its zero value.
    pub fn default_record(&'static self) -> Record {
        Record {
            schema: self,
            values: self.fields.iter().map(Field::zero).collect(),
        }
    }

    /// A record with zero values except for the named overrides.
    pub fn record_with<I, V>(&'static self, overrides: I) -> Result<Record>
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<Value>,
    {
        let mut record = self.default_record();
        for (name, value) in overrides {
            record.set(name, value)?;
        }
        Ok(record)
    }

    /// Decode a standalone record. `buf` must be exactly [`width`](Self::width) bytes.
    pub fn decode(&'static self, buf: &[u8]) -> Result<Record> {
        let (record, end) = self.decode_at(buf, 0)?;
        if end < buf.len() {
            return Err(SchemaError::RecordTooLong {
                schema: self.name,
                expected: self.width(),
                actual: buf.len(),
            });
        }
        trace!(schema = self.name, len = buf.len(), "decoded record");
        Ok(record)
    }

    /// Decode a record embedded in `buf` at `offset`, ignoring trailing bytes.
    ///
    /// Returns the record and the offset just past it.
    pub fn decode_at(&'static self, buf: &[u8], offset: usize) -> Result<(Record, usize)> {
        let mut values = Vec::with_capacity(self.fields.len());
        let mut pos = offset;
        for field in self.fields {
            let (value, next) =
                field
                    .decode(buf, pos)
                    .map_err(|_| SchemaError::RecordTooShort {
                        schema: self.name,
                        expected: self.width(),
                        actual: buf.len().saturating_sub(offset),
                    })?;
            values.push(value);
            pos = next;
        }
        Ok((
            Record {
                schema: self,
                values,
            },
            pos,
        ))
    }
}

/// A concrete record: one value per schema field, in schema order.
///
/// Records are plain owned values. Edit one with [`set`](Record::set) or
/// derive a modified copy with [`with`](Record::with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Value>,
}

impl Record {
    /// The schema this record was built from.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Field names paired with their values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.schema
            .fields
            .iter()
            .map(|f| f.name)
            .zip(self.values.iter())
    }

    /// The value of a field, if the schema has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.field(name).map(|(i, _)| &self.values[i])
    }

    /// Replace a field's value. The value's type must match the field.
    ///
    /// String length is checked when the record is encoded.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (i, field) = self.lookup(name)?;
        let value = value.into();
        field.check(&value)?;
        self.values[i] = value;
        Ok(())
    }

    /// A copy of this record with one field replaced.
    pub fn with(&self, name: &str, value: impl Into<Value>) -> Result<Self> {
        let mut copy = self.clone();
        copy.set(name, value)?;
        Ok(copy)
    }

    pub fn u8(&self, name: &str) -> Result<u8> {
        match self.typed(name)? {
            (_, Value::U8(v)) => Ok(*v),
            (field, other) => Err(mismatch(field, "u8", other)),
        }
    }

    pub fn u16(&self, name: &str) -> Result<u16> {
        match self.typed(name)? {
            (_, Value::U16(v)) => Ok(*v),
            (field, other) => Err(mismatch(field, "u16", other)),
        }
    }

    pub fn i16(&self, name: &str) -> Result<i16> {
        match self.typed(name)? {
            (_, Value::I16(v)) => Ok(*v),
            (field, other) => Err(mismatch(field, "i16", other)),
        }
    }

    pub fn u32(&self, name: &str) -> Result<u32> {
        match self.typed(name)? {
            (_, Value::U32(v)) => Ok(*v),
            (field, other) => Err(mismatch(field, "u32", other)),
        }
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        match self.typed(name)? {
            (_, Value::Bytes(v)) => Ok(v),
            (field, other) => Err(mismatch(field, "bytes", other)),
        }
    }

    /// A byte-string field read as text, padding and surrounding whitespace trimmed.
    pub fn text(&self, name: &str) -> Result<String> {
        self.bytes(name).map(trim_text)
    }

    pub fn record(&self, name: &str) -> Result<&Record> {
        match self.typed(name)? {
            (_, Value::Record(v)) => Ok(v),
            (field, other) => Err(mismatch(field, "record", other)),
        }
    }

    /// Encode every field in order. The output is exactly `schema().width()` bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.schema.width());
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }

    pub(crate) fn encode_into(&self, dst: &mut BytesMut) -> Result<()> {
        for (field, value) in self.schema.fields.iter().zip(self.values.iter()) {
            field.encode(value, dst)?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<(usize, &'static Field)> {
        self.schema
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField {
                schema: self.schema.name,
                field: name.to_string(),
            })
    }

    fn typed(&self, name: &str) -> Result<(&'static str, &Value)> {
        let (i, field) = self.lookup(name)?;
        Ok((field.name, &self.values[i]))
    }
}

fn mismatch(field: &'static str, wanted: &'static str, found: &Value) -> SchemaError {
    SchemaError::TypeMismatch {
        field,
        expected: found.type_name(),
        found: wanted,
    }
}

/// Serializes as a map of field name to value, in schema order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INNER: Schema = Schema::new("Inner", &[Field::u8("a"), Field::u16("b")]);

    static OUTER: Schema = Schema::new(
        "Outer",
        &[
            Field::bytes("name", 4),
            Field::record("inner", &INNER),
            Field::i16("t"),
            Field::u32("count"),
        ],
    );

    fn sample_bytes() -> Vec<u8> {
        vec![
            b'a', b'b', 0, 0, // name
            7, 0x34, 0x12, // inner
            0x38, 0xFF, // t = -200
            1, 0, 0, 0, // count
        ]
    }

    #[test]
    fn width_includes_nested() {
        assert_eq!(INNER.width(), 3);
        assert_eq!(OUTER.width(), 13);
    }

    #[test]
    fn decode_walks_fields_in_order() {
        let r = OUTER.decode(&sample_bytes()).unwrap();
        assert_eq!(r.text("name").unwrap(), "ab");
        assert_eq!(r.bytes("name").unwrap(), b"ab\0\0");
        assert_eq!(r.record("inner").unwrap().u8("a").unwrap(), 7);
        assert_eq!(r.record("inner").unwrap().u16("b").unwrap(), 0x1234);
        assert_eq!(r.i16("t").unwrap(), -200);
        assert_eq!(r.u32("count").unwrap(), 1);
    }

    #[test]
    fn exact_length_contract() {
        let mut buf = sample_bytes();
        assert!(OUTER.decode(&buf).is_ok());

        buf.push(0);
        assert!(matches!(
            OUTER.decode(&buf),
            Err(SchemaError::RecordTooLong {
                schema: "Outer",
                expected: 13,
                actual: 14
            })
        ));

        buf.truncate(12);
        assert!(matches!(
            OUTER.decode(&buf),
            Err(SchemaError::RecordTooShort {
                schema: "Outer",
                expected: 13,
                actual: 12
            })
        ));
    }

    #[test]
    fn truncated_nested_record_is_too_short() {
        let buf = &sample_bytes()[..6];
        assert!(matches!(
            OUTER.decode(buf),
            Err(SchemaError::RecordTooShort {
                schema: "Outer",
                ..
            })
        ));
    }

    #[test]
    fn decode_at_ignores_trailing_bytes() {
        let mut buf = vec![0xEE];
        buf.extend_from_slice(&[1, 2, 0, 9, 9]);
        let (r, end) = INNER.decode_at(&buf, 1).unwrap();
        assert_eq!(r.u8("a").unwrap(), 1);
        assert_eq!(r.u16("b").unwrap(), 2);
        assert_eq!(end, 4);
    }

    #[test]
    fn encode_reproduces_decoded_bytes() {
        let raw = sample_bytes();
        let r = OUTER.decode(&raw).unwrap();
        assert_eq!(r.encode().unwrap().as_ref(), raw.as_slice());
    }

    #[test]
    fn default_record_is_zeroed() {
        let r = OUTER.default_record();
        assert_eq!(r.text("name").unwrap(), "");
        assert_eq!(r.i16("t").unwrap(), 0);
        assert_eq!(r.record("inner").unwrap().u16("b").unwrap(), 0);
        assert_eq!(r.encode().unwrap().as_ref(), &[0u8; 13]);
    }

    #[test]
    fn record_with_overrides() {
        let r = OUTER
            .record_with([("t", Value::I16(-5)), ("count", Value::U32(99))])
            .unwrap();
        assert_eq!(r.i16("t").unwrap(), -5);
        assert_eq!(r.u32("count").unwrap(), 99);
        assert_eq!(r.text("name").unwrap(), "");
    }

    #[test]
    fn with_returns_modified_copy() {
        let original = OUTER.default_record();
        let changed = original.with("count", 3u32).unwrap();
        assert_eq!(original.u32("count").unwrap(), 0);
        assert_eq!(changed.u32("count").unwrap(), 3);
    }

    #[test]
    fn set_rejects_unknown_and_mistyped() {
        let mut r = OUTER.default_record();
        assert!(matches!(
            r.set("missing", 1u8),
            Err(SchemaError::UnknownField { .. })
        ));
        assert!(matches!(
            r.set("count", 1u16),
            Err(SchemaError::TypeMismatch { .. })
        ));
        assert!(matches!(
            r.set("inner", OUTER.default_record()),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn oversize_string_fails_on_encode() {
        let r = OUTER.default_record().with("name", "toolong").unwrap();
        assert!(matches!(
            r.encode(),
            Err(SchemaError::StringTooLong {
                field: "name",
                len: 7,
                max: 4
            })
        ));
    }

    #[test]
    fn decode_encode_round_trip() {
        let r = OUTER
            .record_with([
                ("name", Value::from("xy")),
                ("t", Value::I16(i16::MIN)),
                ("count", Value::U32(u32::MAX)),
            ])
            .unwrap();
        let decoded = OUTER.decode(&r.encode().unwrap()).unwrap();
        // Byte strings come back at full width, so compare field-wise.
        assert_eq!(decoded.text("name").unwrap(), "xy");
        assert_eq!(decoded.i16("t").unwrap(), i16::MIN);
        assert_eq!(decoded.u32("count").unwrap(), u32::MAX);
        assert_eq!(decoded.encode().unwrap(), r.encode().unwrap());
    }

    #[test]
    fn serializes_as_map() {
        let r = OUTER.decode(&sample_bytes()).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["name"], "ab");
        assert_eq!(json["inner"]["b"], 0x1234);
        assert_eq!(json["t"], -200);
    }
}
