//! Request parameters.
//!
//! A [`ParamSet`] keeps its fields in insertion order. That order decides the
//! column list of an INSERT and the placeholder order of every statement, so
//! it is stored as a vector rather than a hash map.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The field identifying a single row.
pub const IDENTITY_KEY: &str = "ID";

/// Request keys that steer the operation and never name a column.
pub const CONTROL_KEYS: &[&str] = &["partialMatch"];

/// Returns whether `key` is a reserved control key.
#[must_use]
pub fn is_control_key(key: &str) -> bool {
    CONTROL_KEYS.contains(&key)
}

/// A raw parameter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Absent / JSON null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Non-integral number.
    Float(f64),
    /// Text value.
    Text(String),
}

impl ParamValue {
    /// Returns whether the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a short name of the value's runtime type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

/// Trait for types that can be converted to parameter values.
pub trait ToParamValue {
    /// Converts the value to a `ParamValue`.
    fn to_param_value(self) -> ParamValue;
}

impl ToParamValue for ParamValue {
    fn to_param_value(self) -> ParamValue {
        self
    }
}

impl ToParamValue for bool {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Bool(self)
    }
}

impl ToParamValue for i64 {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Int(self)
    }
}

impl ToParamValue for i32 {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Int(i64::from(self))
    }
}

impl ToParamValue for u32 {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Int(i64::from(self))
    }
}

impl ToParamValue for f64 {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Float(self)
    }
}

impl ToParamValue for String {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Text(self)
    }
}

impl ToParamValue for &str {
    fn to_param_value(self) -> ParamValue {
        ParamValue::Text(String::from(self))
    }
}

impl<T: ToParamValue> ToParamValue for Option<T> {
    fn to_param_value(self) -> ParamValue {
        match self {
            Some(v) => v.to_param_value(),
            None => ParamValue::Null,
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
        Ok(ParamValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
        Ok(ParamValue::Int(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
        Ok(i64::try_from(v).map_or(ParamValue::Float(v as f64), ParamValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
        Ok(ParamValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
        Ok(ParamValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ParamValue, E> {
        Ok(ParamValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ParamValue, E> {
        Ok(ParamValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<ParamValue, E> {
        Ok(ParamValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ParamValue, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

/// An ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParamSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn with<T: ToParamValue>(mut self, key: &str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a field.
    ///
    /// An existing field keeps its position and takes the new value.
    pub fn insert<T: ToParamValue>(&mut self, key: &str, value: T) {
        let value = value.to_param_value();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((String::from(key), value)),
        }
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns whether a field is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the set has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: ToParamValue> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            let key: String = k.into();
            set.insert(&key, v);
        }
        set
    }
}

impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ParamSetVisitor;

impl<'de> Visitor<'de> for ParamSetVisitor {
    type Value = ParamSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of field names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ParamSet, A::Error> {
        let mut set = ParamSet::new();
        while let Some((key, value)) = access.next_entry::<String, ParamValue>()? {
            set.insert(&key, value);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for ParamSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ParamSetVisitor)
    }
}
