//! Allow-list based property filtering.
//!
//! # Design
//! An `AllowList` is a read-only table of `FieldSpec`s keyed by property
//! name. `filter_properties` consumes a JSON value and builds a new one that
//! holds only the allowed properties, with per-field transforms applied.
//! Filtering is shallow: nested objects and lists are only filtered when the
//! caller filters them explicitly (see `filter_each`).

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// Rewrites the value of a kept property.
pub type Transform = fn(Value) -> Value;

/// One allow-list entry.
///
/// `transform: None` keeps the value as received.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub transform: Option<Transform>,
}

impl FieldSpec {
    pub const fn keep(name: &'static str) -> Self {
        Self {
            name,
            transform: None,
        }
    }

    pub const fn map(name: &'static str, transform: Transform) -> Self {
        Self {
            name,
            transform: Some(transform),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Property names that survive filtering, with optional transforms.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    fields: HashMap<&'static str, FieldSpec>,
}

impl AllowList {
    pub fn new(specs: &[FieldSpec]) -> Self {
        Self {
            fields: specs.iter().map(|spec| (spec.name, *spec)).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn filter(&self, value: Value) -> Value {
        filter_properties(value, self)
    }
}

impl From<&[FieldSpec]> for AllowList {
    fn from(specs: &[FieldSpec]) -> Self {
        Self::new(specs)
    }
}

/// Keep only allowed properties of an object, applying their transforms.
///
/// Anything that is not a JSON object is returned unchanged.
pub fn filter_properties(value: Value, allow: &AllowList) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let filtered: Map<String, Value> = map
        .into_iter()
        .filter_map(|(key, value)| {
            let spec = allow.fields.get(key.as_str())?;
            let value = match spec.transform {
                Some(transform) => transform(value),
                None => value,
            };
            Some((key, value))
        })
        .collect();
    Value::Object(filtered)
}

/// Filter every element of an array; non-arrays are returned unchanged.
pub fn filter_each(value: Value, allow: &AllowList) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| filter_properties(item, allow))
                .collect(),
        ),
        other => other,
    }
}

/// Filter the array stored under `key` of an object, leaving the rest alone.
pub fn filter_nested_list(mut value: Value, key: &str, allow: &AllowList) -> Value {
    if let Some(slot) = value.get_mut(key) {
        *slot = filter_each(slot.take(), allow);
    }
    value
}
