//! Parameter values and the flat parameter map.
//!
//! This module provides the value model shared by the query normalizer and
//! the path formatter:
//!
//! - [`ParamValue`]: a single request parameter, either a scalar or a list
//!   of scalars
//! - [`Params`]: the flat key→value map mixing path and query values for one
//!   request
//! - [`ParamsError`]: errors raised when bridging typed structs into the map
//!
//! # Overview
//!
//! Callers usually build a [`Params`] with the fluent `set`/`set_opt`
//! methods, or bridge an existing typed parameter struct with
//! [`Params::from_serialize`]. The serialization engine treats the map as
//! read-only input; every call produces fresh output and nothing is cached
//! between calls.
//!
//! # Example
//!
//! ```rust
//! use wirequest::{ParamValue, Params};
//!
//! let params = Params::new()
//!     .set("id", "bitcoin")
//!     .set("vs_currencies", ["usd", "eur"])
//!     .set("precision", 2)
//!     .set_opt("page", None::<u32>); // omitted entirely
//!
//! assert_eq!(params.get("id"), Some(&ParamValue::from("bitcoin")));
//! assert!(params.get("page").is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single request parameter value.
///
/// `ParamValue` covers every shape the wire format can express: scalars
/// (strings, numbers, booleans, dates, epoch timestamps, an explicit null)
/// and homogeneous lists of scalars. Lists are treated as unordered sets for
/// encoding purposes: input order never affects output.
///
/// Values with no wire representation (nested lists, non-finite floats,
/// out-of-range timestamps) are dropped by the query normalizer and reported
/// as issues by the path formatter; constructing them is not an error.
///
/// # Example
///
/// ```rust
/// use wirequest::ParamValue;
///
/// let id: ParamValue = "bitcoin".into();
/// let limit: ParamValue = 50u32.into();
/// let currencies: ParamValue = vec!["usd", "eur"].into();
///
/// assert_eq!(id.to_string(), "bitcoin");
/// assert_eq!(limit.to_string(), "50");
/// assert_eq!(currencies.to_string(), "[usd, eur]");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An explicit null, distinct from an absent key.
    Null,
    /// A boolean, rendered as `true` / `false`.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number. Only finite values have a wire form.
    Float(f64),
    /// A string. Leading and trailing whitespace is trimmed on the wire.
    Str(String),
    /// A date, rendered as ISO-8601 with millisecond precision.
    DateTime(DateTime<Utc>),
    /// Epoch seconds, rendered as a decimal string after being validated as
    /// a representable calendar date.
    Timestamp(i64),
    /// A list of scalar values.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Creates a timestamp value from epoch seconds.
    ///
    /// The value is validated lazily: serialization checks that chrono can
    /// represent it as a real calendar date and rejects it otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wirequest::ParamValue;
    ///
    /// let from = ParamValue::timestamp(1_700_000_000);
    /// assert_eq!(from.to_string(), "1700000000");
    /// ```
    #[must_use]
    pub const fn timestamp(epoch_seconds: i64) -> Self {
        Self::Timestamp(epoch_seconds)
    }

    /// Returns `true` for scalar values (everything except a list).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// Returns a short name for the value's shape, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
        }
    }

    /// Converts a JSON value into a `ParamValue`.
    ///
    /// Returns `None` for JSON objects, which have no query wire form.
    /// Numbers map to the narrowest matching variant (`Int`, then `UInt`,
    /// then `Float`); array elements that are themselves objects are
    /// silently omitted from the resulting list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wirequest::ParamValue;
    /// use serde_json::json;
    ///
    /// assert_eq!(ParamValue::from_json(&json!(7)), Some(ParamValue::Int(7)));
    /// assert_eq!(ParamValue::from_json(&json!({"nested": true})), None);
    /// ```
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(flag) => Some(Self::Bool(*flag)),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_u64().map(Self::UInt))
                .or_else(|| number.as_f64().map(Self::Float)),
            serde_json::Value::String(text) => Some(Self::Str(text.clone())),
            serde_json::Value::Array(items) => {
                Some(Self::List(items.iter().filter_map(Self::from_json).collect()))
            }
            serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(number) => write!(f, "{number}"),
            Self::UInt(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
            Self::Str(text) => write!(f, "{text}"),
            Self::DateTime(date) => {
                write!(f, "{}", date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Timestamp(seconds) => write!(f, "{seconds}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("JSON objects have no query wire form"))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self> + Clone> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        Self::List(values.iter().cloned().map(Into::into).collect())
    }
}

/// Errors raised when building a [`Params`] map from external data.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The serialized value was not a JSON object.
    ///
    /// Request parameters are a flat key→value map, so the bridged struct
    /// must serialize to an object at the top level.
    #[error("cannot build parameters from JSON {kind}: expected an object at the top level")]
    NotAnObject {
        /// The JSON shape that was actually produced.
        kind: &'static str,
    },

    /// Serializing the source struct failed.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// The flat parameter map for one request.
///
/// A `Params` mixes path and query values: the URL composer consumes the
/// keys named by the path template and routes everything else through the
/// query normalizer. Keys are held in lexicographic order, which is what
/// makes the serialized output deterministic regardless of insertion order.
///
/// # Undefined vs. null
///
/// An absent key is the systems-language rendering of JavaScript
/// `undefined`: [`Params::set_opt`] with `None` omits the key entirely. An
/// explicit [`ParamValue::Null`] is a distinct state controlled by the
/// query normalizer's skip-null policy.
///
/// # Example
///
/// ```rust
/// use wirequest::Params;
///
/// let params = Params::new()
///     .set("vs_currency", "usd")
///     .set("per_page", 100)
///     .set_opt("category", None::<&str>);
///
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Sets a parameter, replacing any previous value for the key.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets a parameter only when a value is present.
    ///
    /// `None` omits the key entirely: the key never reaches the wire and
    /// no skip policy applies to it.
    #[must_use]
    pub fn set_opt<T: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.values.insert(key.into(), value.into());
        }
        self
    }

    /// Inserts a parameter through a mutable reference.
    ///
    /// Non-builder counterpart of [`Params::set`] for incremental
    /// construction.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes a parameter, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    /// Returns the value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the map holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// Iterates over keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Bridges a typed parameter struct into a flat map.
    ///
    /// The struct is serialized to JSON and its top-level entries become
    /// parameters. Fields annotated `skip_serializing_if = "Option::is_none"`
    /// never appear, which matches the absent-key semantics of
    /// [`Params::set_opt`]. Values with no wire form (nested objects) are
    /// silently omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::NotAnObject`] if the struct serializes to a
    /// non-object, or [`ParamsError::Serialize`] if serialization itself
    /// fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde::Serialize;
    /// use wirequest::Params;
    ///
    /// #[derive(Serialize)]
    /// struct MarketsQuery {
    ///     vs_currency: String,
    ///     #[serde(skip_serializing_if = "Option::is_none")]
    ///     per_page: Option<u32>,
    /// }
    ///
    /// let params = Params::from_serialize(&MarketsQuery {
    ///     vs_currency: "usd".to_string(),
    ///     per_page: None,
    /// })
    /// .unwrap();
    ///
    /// assert!(params.contains_key("vs_currency"));
    /// assert!(!params.contains_key("per_page"));
    /// ```
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ParamsError> {
        let json = serde_json::to_value(value)?;
        match json {
            serde_json::Value::Object(entries) => {
                let mut params = Self::new();
                for (key, entry) in entries {
                    if let Some(value) = ParamValue::from_json(&entry) {
                        params.values.insert(key, value);
                    }
                }
                Ok(params)
            }
            other => Err(ParamsError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ParamValue>();
    assert_send_sync::<Params>();
    assert_send_sync::<ParamsError>();
};
