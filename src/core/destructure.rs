//! Destructure engine
//!
//! Produces two views of a payload in one pass: a deep owned copy and a flat
//! map from dot-separated paths to scalars. Handlers get both so they never
//! need to walk the tree themselves.

use super::value::{Described, Destructure, Scalar, Value};
use std::collections::BTreeMap;

/// Key used for a scalar payload that has no enclosing field.
pub const ROOT_KEY: &str = "_";

/// Reserved key carrying the text of a described value that also has fields.
pub const ERROR_KEY: &str = "Error";

/// Nodes nested deeper than this are copied as [`Value::Nil`] and add no
/// flat entries.
///
/// The bound applies to the walk over an already built [`Value`] tree. It
/// truncates the copy handed to handlers; it does not limit the recursion of
/// [`Destructure::to_value`] or the serde bridge that builds that tree.
pub const MAX_DEPTH: usize = 64;

/// Dot-separated path to scalar leaf.
pub type FlatFields = BTreeMap<String, Scalar>;

/// Copy and flatten `data`.
///
/// Paths join field names, textual map keys and decimal sequence indices
/// with `.`. Nil leaves produce no flat entry. When two paths collide the
/// later write wins.
pub fn destructure<D: Destructure + ?Sized>(data: &D) -> (Value, FlatFields) {
    destructure_value(data.to_value())
}

/// Same as [`destructure`] for an already tagged tree.
pub fn destructure_value(value: Value) -> (Value, FlatFields) {
    let mut flat = FlatFields::new();
    let copy = walk(value, "", 0, &mut flat);
    (copy, flat)
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

fn leaf_key(path: &str) -> String {
    if path.is_empty() {
        ROOT_KEY.to_string()
    } else {
        path.to_string()
    }
}

fn has_visible_fields(value: &Value) -> bool {
    matches!(value, Value::Record(fields) if !fields.is_empty())
}

fn walk(value: Value, path: &str, depth: usize, flat: &mut FlatFields) -> Value {
    if depth > MAX_DEPTH {
        return Value::Nil;
    }

    match value {
        Value::Nil => Value::Nil,
        Value::Scalar(s) => {
            flat.insert(leaf_key(path), s.clone());
            Value::Scalar(s)
        }
        Value::Record(fields) => Value::Record(
            fields
                .into_iter()
                .map(|(name, child)| {
                    let child_path = join(path, &name);
                    let copy = walk(child, &child_path, depth + 1, flat);
                    (name, copy)
                })
                .collect(),
        ),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, child)| {
                    let child_path = join(path, &key.to_string());
                    let copy = walk(child, &child_path, depth + 1, flat);
                    (key, copy)
                })
                .collect(),
        ),
        Value::Seq(items) => Value::Seq(
            items
                .into_iter()
                .enumerate()
                .map(|(index, child)| walk(child, &join(path, &index.to_string()), depth + 1, flat))
                .collect(),
        ),
        Value::Described(described) => {
            let Described { kind, text, value } = *described;
            let value = if has_visible_fields(&value) {
                let copy = walk(value, path, depth, flat);
                flat.insert(join(path, ERROR_KEY), Scalar::Str(text.clone()));
                copy
            } else {
                flat.insert(leaf_key(path), Scalar::Str(text.clone()));
                // The textual form replaces whatever the inner value would flatten to.
                walk(value, path, depth, &mut FlatFields::new())
            };
            Value::Described(Box::new(Described { kind, text, value }))
        }
    }
}
