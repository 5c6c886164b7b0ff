//! Bridge from `serde::Serialize` to [`Value`]
//!
//! Structs serialize to records, maps to maps, sequences and tuples to
//! sequences. Fields skipped by serde attributes stay invisible. Anything the
//! serializer rejects collapses to [`Value::Nil`].

use super::value::{Destructure, Scalar, Value};
use serde::ser::{self, Serialize};
use std::fmt;

/// Destructure any `Serialize` type through serde.
///
/// ```
/// use sawmill::Serialized;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Job {
///     name: &'static str,
///     retries: u32,
/// }
///
/// let (_, flat) = sawmill::destructure(&Serialized(&Job { name: "sync", retries: 2 }));
/// assert_eq!(flat["name"].to_string(), "sync");
/// assert_eq!(flat["retries"].to_string(), "2");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Serialized<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Destructure for Serialized<'_, T> {
    fn to_value(&self) -> Value {
        to_value_serde(self.0)
    }
}

pub fn to_value_serde<T: Serialize + ?Sized>(value: &T) -> Value {
    value.serialize(ValueSerializer).unwrap_or(Value::Nil)
}

#[derive(Debug)]
pub struct SerializeError(String);

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SerializeError {}

impl ser::Error for SerializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerializeError(msg.to_string())
    }
}

type SerResult = std::result::Result<Value, SerializeError>;

struct ValueSerializer;

fn scalar(s: Scalar) -> SerResult {
    Ok(Value::Scalar(s))
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = SerializeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = VariantRecordBuilder;

    fn serialize_bool(self, v: bool) -> SerResult {
        scalar(Scalar::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> SerResult {
        scalar(Scalar::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> SerResult {
        scalar(Scalar::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> SerResult {
        scalar(Scalar::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> SerResult {
        scalar(Scalar::Int(v))
    }

    fn serialize_i128(self, v: i128) -> SerResult {
        Ok(v.to_value())
    }

    fn serialize_u8(self, v: u8) -> SerResult {
        scalar(Scalar::Uint(u64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> SerResult {
        scalar(Scalar::Uint(u64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> SerResult {
        scalar(Scalar::Uint(u64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> SerResult {
        scalar(Scalar::Uint(v))
    }

    fn serialize_u128(self, v: u128) -> SerResult {
        Ok(v.to_value())
    }

    fn serialize_f32(self, v: f32) -> SerResult {
        scalar(Scalar::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> SerResult {
        scalar(Scalar::Float(v))
    }

    fn serialize_char(self, v: char) -> SerResult {
        scalar(Scalar::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> SerResult {
        scalar(Scalar::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> SerResult {
        scalar(Scalar::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> SerResult {
        Ok(Value::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> SerResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> SerResult {
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> SerResult {
        Ok(Value::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> SerResult {
        scalar(Scalar::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> SerResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> SerResult {
        let inner = value.serialize(ValueSerializer)?;
        Ok(Value::Record(vec![(variant.to_string(), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> std::result::Result<SeqBuilder, SerializeError> {
        Ok(SeqBuilder::new(len.unwrap_or(0), true))
    }

    fn serialize_tuple(self, len: usize) -> std::result::Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<SeqBuilder, SerializeError> {
        Ok(SeqBuilder::new(len, false))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> std::result::Result<VariantSeqBuilder, SerializeError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> std::result::Result<MapBuilder, SerializeError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<RecordBuilder, SerializeError> {
        Ok(RecordBuilder {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> std::result::Result<VariantRecordBuilder, SerializeError> {
        Ok(VariantRecordBuilder {
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

/// Collects sequence elements. serde hands `Vec<u8>`, `&[u8]` and `[u8; N]`
/// over one `serialize_u8` at a time, so `bytes` tracks whether every element
/// so far was a `u8` and the finished sequence collapses to one byte string.
struct SeqBuilder {
    items: Vec<Value>,
    bytes: Option<Vec<u8>>,
}

impl SeqBuilder {
    fn new(len: usize, collapse_bytes: bool) -> Self {
        Self {
            items: Vec::with_capacity(len),
            bytes: collapse_bytes.then(|| Vec::with_capacity(len)),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> std::result::Result<(), SerializeError> {
        if let Some(bytes) = self.bytes.as_mut() {
            if let Ok(byte) = value.serialize(ByteSerializer) {
                bytes.push(byte);
                self.items.push(Value::Scalar(Scalar::Uint(u64::from(byte))));
                return Ok(());
            }
            self.bytes = None;
        }
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        match self.bytes {
            Some(bytes) if !bytes.is_empty() => Value::Scalar(Scalar::Bytes(bytes)),
            _ => Value::Seq(self.items),
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(Value::Seq(self.items))
    }
}

/// Accepts a lone `u8` and rejects everything else.
struct ByteSerializer;

macro_rules! reject {
    ($($method:ident($($arg:ty),*)),* $(,)?) => {
        $(
            fn $method(self, $(_: $arg),*) -> std::result::Result<u8, SerializeError> {
                Err(SerializeError("not a byte".to_string()))
            }
        )*
    };
}

impl ser::Serializer for ByteSerializer {
    type Ok = u8;
    type Error = SerializeError;
    type SerializeSeq = ser::Impossible<u8, SerializeError>;
    type SerializeTuple = ser::Impossible<u8, SerializeError>;
    type SerializeTupleStruct = ser::Impossible<u8, SerializeError>;
    type SerializeTupleVariant = ser::Impossible<u8, SerializeError>;
    type SerializeMap = ser::Impossible<u8, SerializeError>;
    type SerializeStruct = ser::Impossible<u8, SerializeError>;
    type SerializeStructVariant = ser::Impossible<u8, SerializeError>;

    fn serialize_u8(self, v: u8) -> std::result::Result<u8, SerializeError> {
        Ok(v)
    }

    reject! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_none(),
        serialize_unit(),
        serialize_unit_struct(&'static str),
        serialize_unit_variant(&'static str, u32, &'static str),
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> std::result::Result<u8, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: &T,
    ) -> std::result::Result<u8, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> std::result::Result<u8, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_seq(
        self,
        _: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self::SerializeTuple, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_map(
        self,
        _: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self::SerializeStruct, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, SerializeError> {
        Err(SerializeError("not a byte".to_string()))
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> SerResult {
        Ok(Value::Record(vec![(
            self.variant.to_string(),
            Value::Seq(self.items),
        )]))
    }
}

struct MapBuilder {
    entries: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_key<T: Serialize + ?Sized>(
        &mut self,
        key: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.pending_key = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| SerializeError("map value without key".to_string()))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> SerResult {
        Ok(Value::Map(self.entries))
    }
}

struct RecordBuilder {
    fields: Vec<(String, Value)>,
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.fields
            .push((key.to_string(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> SerResult {
        Ok(Value::Record(self.fields))
    }
}

struct VariantRecordBuilder {
    variant: &'static str,
    fields: Vec<(String, Value)>,
}

impl ser::SerializeStructVariant for VariantRecordBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), SerializeError> {
        self.fields
            .push((key.to_string(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> SerResult {
        Ok(Value::Record(vec![(
            self.variant.to_string(),
            Value::Record(self.fields),
        )]))
    }
}
