//! Tagged payload model
//!
//! Every payload handed to the logger is first turned into a [`Value`] tree
//! through the [`Destructure`] trait. The tree is owned, so it shares no
//! memory with the caller's data and can be handed to handler threads.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// An atomic leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(String),
    /// Byte strings are atomic: they are never split into per-element entries.
    Bytes(Vec<u8>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Uint(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Complex { re, im } => {
                if im.is_sign_negative() {
                    write!(f, "({}{}i)", re, im)
                } else {
                    write!(f, "({}+{}i)", re, im)
                }
            }
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Uint(u) => serializer.serialize_u64(*u),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::Complex { .. } => serializer.collect_str(self),
            Scalar::Str(s) => serializer.serialize_str(s),
            Scalar::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v.into())
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Uint,
    u64 => Uint,
    f64 => Float,
    String => Str,
    Vec<u8> => Bytes,
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

/// What the textual form attached to a [`Described`] node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    /// A plain textual rendering (`Display`-like).
    Text,
    /// An error message.
    Error,
}

/// A node that carries a textual form next to its structural value.
#[derive(Debug, Clone, PartialEq)]
pub struct Described {
    pub kind: DescriptionKind,
    pub text: String,
    pub value: Value,
}

/// Owned, tagged copy of a payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or non-copyable data (channels, functions, `None`).
    #[default]
    Nil,
    Scalar(Scalar),
    /// Named fields in declaration order.
    Record(Vec<(String, Value)>),
    /// Keyed entries; keys are flattened through their textual form.
    Map(Vec<(Value, Value)>),
    Seq(Vec<Value>),
    Described(Box<Described>),
}

impl Value {
    pub fn described_text(text: impl Into<String>, value: Value) -> Self {
        Value::Described(Box::new(Described {
            kind: DescriptionKind::Text,
            text: text.into(),
            value,
        }))
    }

    pub fn described_error(text: impl Into<String>, value: Value) -> Self {
        Value::Described(Box::new(Described {
            kind: DescriptionKind::Error,
            text: text.into(),
            value,
        }))
    }

    pub fn str(text: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(text.into()))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a direct child by name.
    ///
    /// Records match on field name, maps on the textual form of the key.
    /// Described nodes are transparent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.to_string() == key)
                .map(|(_, v)| v),
            Value::Described(d) => d.value.get(key),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Scalar(s) => fmt::Display::fmt(s, f),
            Value::Described(d) => f.write_str(&d.text),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("]")
            }
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::Described(d) => serializer.serialize_str(&d.text),
            Value::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&k.to_string(), v)?;
                }
                map.end()
            }
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Conversion of arbitrary data into an owned [`Value`] tree.
///
/// Implementations must not retain references into `self`; the returned
/// tree is handed to other threads.
pub trait Destructure {
    fn to_value(&self) -> Value;

    #[doc(hidden)]
    fn slice_to_value(items: &[Self]) -> Value
    where
        Self: Sized,
    {
        Value::Seq(items.iter().map(Destructure::to_value).collect())
    }
}

macro_rules! destructure_signed {
    ($($ty:ty),*) => {
        $(
            impl Destructure for $ty {
                fn to_value(&self) -> Value {
                    Value::Scalar(Scalar::Int(*self as i64))
                }
            }
        )*
    };
}

macro_rules! destructure_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Destructure for $ty {
                fn to_value(&self) -> Value {
                    Value::Scalar(Scalar::Uint(*self as u64))
                }
            }
        )*
    };
}

destructure_signed!(i8, i16, i32, i64, isize);
destructure_unsigned!(u16, u32, u64, usize);

impl Destructure for u8 {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::Uint(u64::from(*self)))
    }

    fn slice_to_value(items: &[Self]) -> Value {
        Value::Scalar(Scalar::Bytes(items.to_vec()))
    }
}

impl Destructure for i128 {
    fn to_value(&self) -> Value {
        match i64::try_from(*self) {
            Ok(v) => Value::Scalar(Scalar::Int(v)),
            Err(_) => Value::str(self.to_string()),
        }
    }
}

impl Destructure for u128 {
    fn to_value(&self) -> Value {
        match u64::try_from(*self) {
            Ok(v) => Value::Scalar(Scalar::Uint(v)),
            Err(_) => Value::str(self.to_string()),
        }
    }
}

impl Destructure for f32 {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::Float(f64::from(*self)))
    }
}

impl Destructure for f64 {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::Float(*self))
    }
}

impl Destructure for bool {
    fn to_value(&self) -> Value {
        Value::Scalar(Scalar::Bool(*self))
    }
}

impl Destructure for char {
    fn to_value(&self) -> Value {
        Value::str(self.to_string())
    }
}

impl Destructure for str {
    fn to_value(&self) -> Value {
        Value::str(self)
    }
}

impl Destructure for String {
    fn to_value(&self) -> Value {
        Value::str(self.as_str())
    }
}

impl Destructure for Cow<'_, str> {
    fn to_value(&self) -> Value {
        Value::str(self.as_ref())
    }
}

impl Destructure for Path {
    fn to_value(&self) -> Value {
        Value::str(self.to_string_lossy())
    }
}

impl Destructure for PathBuf {
    fn to_value(&self) -> Value {
        self.as_path().to_value()
    }
}

impl Destructure for () {
    fn to_value(&self) -> Value {
        Value::Nil
    }
}

impl<T: Destructure> Destructure for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

macro_rules! destructure_deref {
    ($($ptr:ty),*) => {
        $(
            impl<T: Destructure + ?Sized> Destructure for $ptr {
                fn to_value(&self) -> Value {
                    (**self).to_value()
                }
            }
        )*
    };
}

destructure_deref!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

impl<T: Destructure> Destructure for [T] {
    fn to_value(&self) -> Value {
        T::slice_to_value(self)
    }
}

impl<T: Destructure, const N: usize> Destructure for [T; N] {
    fn to_value(&self) -> Value {
        T::slice_to_value(self)
    }
}

impl<T: Destructure> Destructure for Vec<T> {
    fn to_value(&self) -> Value {
        T::slice_to_value(self)
    }
}

impl<T: Destructure, S: BuildHasher> Destructure for HashSet<T, S> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Destructure::to_value).collect())
    }
}

impl<T: Destructure> Destructure for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Destructure::to_value).collect())
    }
}

impl<K: Destructure, V: Destructure, S: BuildHasher> Destructure for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: Destructure, V: Destructure> Destructure for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

macro_rules! destructure_tuple {
    ($(($($name:ident . $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Destructure),+> Destructure for ($($name,)+) {
                fn to_value(&self) -> Value {
                    Value::Seq(vec![$(self.$idx.to_value()),+])
                }
            }
        )*
    };
}

destructure_tuple! {
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
}

// Channel endpoints and function pointers have no copyable content.
macro_rules! destructure_nil {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T> Destructure for $ty {
                fn to_value(&self) -> Value {
                    Value::Nil
                }
            }
        )*
    };
}

destructure_nil! {
    std::sync::mpsc::Sender<T>,
    std::sync::mpsc::SyncSender<T>,
    std::sync::mpsc::Receiver<T>,
    crossbeam_channel::Sender<T>,
    crossbeam_channel::Receiver<T>,
    fn() -> T,
}

impl<A, R> Destructure for fn(A) -> R {
    fn to_value(&self) -> Value {
        Value::Nil
    }
}

impl<A, B, R> Destructure for fn(A, B) -> R {
    fn to_value(&self) -> Value {
        Value::Nil
    }
}

impl Destructure for dyn std::error::Error + 'static {
    fn to_value(&self) -> Value {
        Value::described_error(self.to_string(), Value::Nil)
    }
}

impl Destructure for dyn std::error::Error + Send + Sync + 'static {
    fn to_value(&self) -> Value {
        Value::described_error(self.to_string(), Value::Nil)
    }
}

impl Destructure for std::io::Error {
    fn to_value(&self) -> Value {
        Value::described_error(self.to_string(), Value::Nil)
    }
}

impl Destructure for crate::core::error::LoggerError {
    fn to_value(&self) -> Value {
        Value::described_error(self.to_string(), Value::Nil)
    }
}

impl Destructure for Ipv4Addr {
    fn to_value(&self) -> Value {
        Value::described_text(self.to_string(), Value::Scalar(Scalar::Bytes(self.octets().to_vec())))
    }
}

impl Destructure for Ipv6Addr {
    fn to_value(&self) -> Value {
        Value::described_text(self.to_string(), Value::Scalar(Scalar::Bytes(self.octets().to_vec())))
    }
}

impl Destructure for IpAddr {
    fn to_value(&self) -> Value {
        match self {
            IpAddr::V4(addr) => addr.to_value(),
            IpAddr::V6(addr) => addr.to_value(),
        }
    }
}

impl Destructure for SocketAddr {
    fn to_value(&self) -> Value {
        Value::described_text(self.to_string(), Value::Nil)
    }
}

impl Destructure for Duration {
    fn to_value(&self) -> Value {
        Value::described_text(format!("{:?}", self), Value::Nil)
    }
}

impl<Tz: chrono::TimeZone> Destructure for chrono::DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn to_value(&self) -> Value {
        Value::described_text(self.to_rfc3339(), Value::Nil)
    }
}

impl Destructure for SystemTime {
    fn to_value(&self) -> Value {
        chrono::DateTime::<chrono::Utc>::from(*self).to_value()
    }
}

impl Destructure for serde_json::Value {
    fn to_value(&self) -> Value {
        use serde_json::Value as Json;
        match self {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Scalar(Scalar::Uint(u))
                } else {
                    Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Json::String(s) => Value::str(s.as_str()),
            Json::Array(items) => Value::Seq(items.iter().map(Destructure::to_value).collect()),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::str(k.as_str()), v.to_value()))
                    .collect(),
            ),
        }
    }
}

impl Destructure for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Destructure for Scalar {
    fn to_value(&self) -> Value {
        Value::Scalar(self.clone())
    }
}

/// Wraps any `Display` value so it is logged through its textual form.
#[derive(Debug, Clone, Copy)]
pub struct Text<T>(pub T);

impl<T: fmt::Display> Destructure for Text<T> {
    fn to_value(&self) -> Value {
        Value::described_text(self.0.to_string(), Value::Nil)
    }
}

/// Wraps an error so it is logged through its message.
#[derive(Debug, Clone, Copy)]
pub struct ErrorText<E>(pub E);

impl<E: fmt::Display> Destructure for ErrorText<E> {
    fn to_value(&self) -> Value {
        Value::described_error(self.0.to_string(), Value::Nil)
    }
}

/// Ordered set of named fields, the usual payload of a log call.
///
/// ```
/// use sawmill::Fields;
///
/// let fields = Fields::new().with("user", &"alice").with("attempts", &3);
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<V: Destructure + ?Sized>(mut self, key: impl Into<String>, value: &V) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, keeping the position of an existing key.
    pub fn insert<V: Destructure + ?Sized>(&mut self, key: impl Into<String>, value: &V) {
        self.insert_value(key, value.to_value());
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_value(self) -> Value {
        Value::Record(self.entries)
    }
}

impl Destructure for Fields {
    fn to_value(&self) -> Value {
        Value::Record(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_collapse() {
        assert_eq!(7i8.to_value(), Value::Scalar(Scalar::Int(7)));
        assert_eq!(7usize.to_value(), Value::Scalar(Scalar::Uint(7)));
        assert_eq!(u128::MAX.to_value(), Value::str(u128::MAX.to_string()));
    }

    #[test]
    fn test_bytes_are_atomic() {
        let bytes: Vec<u8> = b"abc".to_vec();
        assert_eq!(bytes.to_value(), Value::Scalar(Scalar::Bytes(b"abc".to_vec())));
        assert_eq!(b"xy".to_value(), Value::Scalar(Scalar::Bytes(b"xy".to_vec())));

        let words = vec![1u16, 2];
        assert!(matches!(words.to_value(), Value::Seq(items) if items.len() == 2));
    }

    #[test]
    fn test_option_and_channels_are_nil() {
        let none: Option<i32> = None;
        assert!(none.to_value().is_nil());

        let (tx, rx) = crossbeam_channel::bounded::<u8>(1);
        assert!(tx.to_value().is_nil());
        assert!(rx.to_value().is_nil());
    }

    #[test]
    fn test_error_is_described() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        match err.to_value() {
            Value::Described(d) => {
                assert_eq!(d.kind, DescriptionKind::Error);
                assert_eq!(d.text, "missing");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fields_replace_in_place() {
        let mut fields = Fields::new().with("a", &1).with("b", &2);
        fields.insert("a", &"one");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("a"), Some(&Value::str("one")));
        assert_eq!(fields.iter().next().map(|(k, _)| k), Some("a"));
    }

    #[test]
    fn test_complex_display() {
        assert_eq!(Scalar::Complex { re: 1.0, im: 2.0 }.to_string(), "(1+2i)");
        assert_eq!(Scalar::Complex { re: 1.0, im: -2.0 }.to_string(), "(1-2i)");
    }

    #[test]
    fn test_value_serializes_to_json() {
        let value = Fields::new()
            .with("name", &"disk")
            .with("sizes", &vec![1u32, 2])
            .with("missing", &Option::<i32>::None)
            .into_value();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"name":"disk","sizes":[1,2],"missing":null}"#);
    }
}
