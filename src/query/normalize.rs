//! Canonical query normalization.
//!
//! This module turns a [`Params`] map into a deterministic list of wire
//! pairs: keys in lexicographic order, list values deduplicated and sorted,
//! empty and unrepresentable values dropped. The same input always produces
//! the same output regardless of insertion order, which keeps request URLs
//! stable for caching.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat};

use crate::params::{ParamValue, Params};

/// A single key/value string pair destined for query-string encoding.
///
/// Pairs hold decoded text; percent-encoding happens when the pair list is
/// rendered (see [`query_string`](crate::query::query_string) and
/// [`QueryParams`](crate::query::QueryParams)).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WirePair {
    /// The wire key. Under bracket encoding this carries the `[]` suffix.
    pub key: String,
    /// The normalized value text.
    pub value: String,
}

impl WirePair {
    /// Creates a new wire pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for WirePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            urlencoding::encode(&self.key),
            urlencoding::encode(&self.value)
        )
    }
}

/// How a multi-valued key is rendered as wire pairs.
///
/// The policy is a pure function of configuration, never of input shape,
/// so a given endpoint always encodes its arrays the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArrayFormat {
    /// One pair with the values joined by commas: `key=a,b,c`.
    #[default]
    Comma,
    /// One pair per value with the key repeated: `key=a&key=b`.
    Repeat,
    /// One pair per value with a bracketed key: `key[]=a&key[]=b`.
    Bracket,
}

impl ArrayFormat {
    /// Returns the policy name as used in registry metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Repeat => "repeat",
            Self::Bracket => "bracket",
        }
    }
}

/// Per-key array-encoding overrides supplied by the endpoint registry.
///
/// Most endpoints use one array policy across the board; a few document
/// specific parameters that diverge. `QueryRules` carries those exceptions
/// as plain data, keyed by parameter name.
///
/// # Example
///
/// ```rust
/// use wirequest::{ArrayFormat, QueryRules};
///
/// let rules = QueryRules::new().with_format("ids", ArrayFormat::Repeat);
/// assert_eq!(rules.format_for("ids"), Some(ArrayFormat::Repeat));
/// assert_eq!(rules.format_for("names"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryRules {
    formats: BTreeMap<String, ArrayFormat>,
}

impl QueryRules {
    /// Creates an empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// Adds an array-format override for one key.
    #[must_use]
    pub fn with_format(mut self, key: impl Into<String>, format: ArrayFormat) -> Self {
        self.formats.insert(key.into(), format);
        self
    }

    /// Returns the override for a key, if one is configured.
    #[must_use]
    pub fn format_for(&self, key: &str) -> Option<ArrayFormat> {
        self.formats.get(key).copied()
    }

    /// Returns `true` if no overrides are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Encode hook for query values.
///
/// The hook runs before the built-in rendering and may replace it by
/// returning `Some`. Returning `None` falls through to the built-in
/// rendering of the original value. This is the fail-open contract: a hook
/// that cannot encode a value must not halt normalization.
pub type QueryEncodeFn = dyn Fn(&str, &ParamValue) -> Option<String> + Send + Sync;

/// Options controlling query normalization.
///
/// # Example
///
/// ```rust
/// use wirequest::{ArrayFormat, Params, QueryOptions, query_string};
///
/// let params = Params::new().set("ids", ["b", "a"]);
/// let options = QueryOptions::new().array_format(ArrayFormat::Repeat);
///
/// assert_eq!(query_string(&params, &options), "ids=a&ids=b");
/// ```
#[derive(Clone, Copy)]
pub struct QueryOptions<'a> {
    array_format: ArrayFormat,
    rules: Option<&'a QueryRules>,
    skip_null: bool,
    encode: Option<&'a QueryEncodeFn>,
}

impl<'a> QueryOptions<'a> {
    /// Creates options with the defaults: comma arrays, nulls skipped, no
    /// overrides, no encode hook.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            array_format: ArrayFormat::Comma,
            rules: None,
            skip_null: true,
            encode: None,
        }
    }

    /// Sets the default array-encoding policy.
    #[must_use]
    pub const fn array_format(mut self, format: ArrayFormat) -> Self {
        self.array_format = format;
        self
    }

    /// Attaches registry-supplied per-key array-format overrides.
    #[must_use]
    pub const fn rules(mut self, rules: &'a QueryRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Controls whether explicit nulls are dropped (default) or rendered as
    /// the literal `null`.
    #[must_use]
    pub const fn skip_null(mut self, skip: bool) -> Self {
        self.skip_null = skip;
        self
    }

    /// Attaches an encode hook that runs before the built-in rendering.
    #[must_use]
    pub const fn encode(mut self, hook: &'a QueryEncodeFn) -> Self {
        self.encode = Some(hook);
        self
    }

    /// Returns the effective array format for a key, honoring overrides.
    #[must_use]
    pub fn format_for(&self, key: &str) -> ArrayFormat {
        self.rules
            .and_then(|rules| rules.format_for(key))
            .unwrap_or(self.array_format)
    }

    /// Returns whether explicit nulls are dropped.
    #[must_use]
    pub const fn skips_null(&self) -> bool {
        self.skip_null
    }

    pub(crate) const fn encode_hook(&self) -> Option<&'a QueryEncodeFn> {
        self.encode
    }
}

impl Default for QueryOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("array_format", &self.array_format)
            .field("rules", &self.rules)
            .field("skip_null", &self.skips_null())
            .field("encode", &self.encode.map(|_| "<hook>"))
            .finish()
    }
}

/// Normalizes one scalar to its wire text, or drops it.
///
/// The encode hook (if any) runs first; its output is trimmed and dropped
/// if empty, like a string. Built-in rendering follows: strings are
/// trimmed (empty drops), non-finite floats drop, booleans render
/// `true`/`false`, dates render ISO-8601, timestamps must be representable
/// as a calendar date, and nested lists drop. Explicit nulls drop here;
/// the skip-null policy is applied by the map-level normalizer.
pub(crate) fn normalize_scalar(
    key: &str,
    value: &ParamValue,
    encode: Option<&QueryEncodeFn>,
) -> Option<String> {
    if matches!(value, ParamValue::Null) {
        return None;
    }

    if let Some(hook) = encode {
        if let Some(text) = hook(key, value) {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    }

    match value {
        ParamValue::Null | ParamValue::List(_) => None,
        ParamValue::Bool(flag) => Some(flag.to_string()),
        ParamValue::Int(number) => Some(number.to_string()),
        ParamValue::UInt(number) => Some(number.to_string()),
        ParamValue::Float(number) => number.is_finite().then(|| number.to_string()),
        ParamValue::Str(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        ParamValue::DateTime(date) => {
            Some(date.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        ParamValue::Timestamp(seconds) => {
            DateTime::from_timestamp(*seconds, 0).map(|_| seconds.to_string())
        }
    }
}

/// Normalizes a parameter map into canonical wire pairs.
///
/// Output is deterministic: keys in lexicographic order, list values
/// deduplicated and sorted before rendering under the configured
/// [`ArrayFormat`]. A list whose elements all drop is omitted entirely,
/// deliberately different from a bare empty string. Explicit nulls are
/// dropped under the default skip-null policy, or rendered as the literal
/// `null` when the policy is disabled.
///
/// # Example
///
/// ```rust
/// use wirequest::{normalize_query, Params, QueryOptions, WirePair};
///
/// let params = Params::new().set("a", ["b", "a", "a"]);
/// let pairs = normalize_query(&params, &QueryOptions::new());
///
/// assert_eq!(pairs, vec![WirePair::new("a", "a,b")]);
/// ```
#[must_use]
pub fn normalize_query(params: &Params, options: &QueryOptions<'_>) -> Vec<WirePair> {
    let mut pairs = Vec::new();

    for (key, value) in params {
        match value {
            ParamValue::Null => {
                if !options.skips_null() {
                    pairs.push(WirePair::new(key.clone(), "null"));
                }
            }
            ParamValue::List(items) => {
                let mut rendered: Vec<String> = items
                    .iter()
                    .filter_map(|item| normalize_scalar(key, item, options.encode_hook()))
                    .collect();
                rendered.sort();
                rendered.dedup();
                if rendered.is_empty() {
                    continue;
                }
                match options.format_for(key) {
                    ArrayFormat::Comma => {
                        pairs.push(WirePair::new(key.clone(), rendered.join(",")));
                    }
                    ArrayFormat::Repeat => {
                        for value in rendered {
                            pairs.push(WirePair::new(key.clone(), value));
                        }
                    }
                    ArrayFormat::Bracket => {
                        for value in rendered {
                            pairs.push(WirePair::new(format!("{key}[]"), value));
                        }
                    }
                }
            }
            scalar => {
                if let Some(value) = normalize_scalar(key, scalar, options.encode_hook()) {
                    pairs.push(WirePair::new(key.clone(), value));
                }
            }
        }
    }

    pairs
}

/// Serializes a parameter map into a fully percent-encoded query string.
///
/// # Example
///
/// ```rust
/// use wirequest::{query_string, Params, QueryOptions};
///
/// let params = Params::new().set("vs_currency", "usd").set("ids", ["bitcoin"]);
/// assert_eq!(
///     query_string(&params, &QueryOptions::new()),
///     "ids=bitcoin&vs_currency=usd"
/// );
/// ```
#[must_use]
pub fn query_string(params: &Params, options: &QueryOptions<'_>) -> String {
    encode_pairs(&normalize_query(params, options))
}

/// Renders wire pairs as a percent-encoded `k=v&k2=v2` string.
pub(crate) fn encode_pairs(pairs: &[WirePair]) -> String {
    let mut out = String::new();
    for pair in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&pair.to_string());
    }
    out
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WirePair>();
    assert_send_sync::<ArrayFormat>();
    assert_send_sync::<QueryRules>();
    assert_send_sync::<QueryOptions<'static>>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pairs_of(params: &Params, options: &QueryOptions<'_>) -> Vec<(String, String)> {
        normalize_query(params, options)
            .into_iter()
            .map(|pair| (pair.key, pair.value))
            .collect()
    }

    #[test]
    fn test_keys_are_emitted_in_lexicographic_order() {
        let params = Params::new().set("z", "1").set("a", "2").set("m", "3");
        let keys: Vec<String> = normalize_query(&params, &QueryOptions::new())
            .into_iter()
            .map(|pair| pair.key)
            .collect();
        assert_eq!(keys, ["a", "m", "z"]);
    }

    #[test]
    fn test_strings_are_trimmed_and_empty_strings_drop() {
        let params = Params::new().set("kept", "  x  ").set("dropped", "   ");
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("kept".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn test_non_finite_floats_drop() {
        let params = Params::new()
            .set("nan", f64::NAN)
            .set("inf", f64::INFINITY)
            .set("ok", 2.5);
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("ok".to_string(), "2.5".to_string())]
        );
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        let params = Params::new().set("n", 3.0);
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("n".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn test_booleans_render_lowercase_words() {
        let params = Params::new().set("a", true).set("b", false);
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [
                ("a".to_string(), "true".to_string()),
                ("b".to_string(), "false".to_string())
            ]
        );
    }

    #[test]
    fn test_datetimes_render_iso_8601_millis() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let params = Params::new().set("before", date);
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("before".to_string(), "2024-01-15T00:00:00.000Z".to_string())]
        );
    }

    #[test]
    fn test_out_of_range_timestamps_drop() {
        let params = Params::new()
            .set("from", ParamValue::timestamp(1_700_000_000))
            .set("broken", ParamValue::timestamp(i64::MAX));
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("from".to_string(), "1700000000".to_string())]
        );
    }

    #[test]
    fn test_comma_arrays_dedupe_and_sort() {
        let params = Params::new().set("a", ["b", "a", "a"]);
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("a".to_string(), "a,b".to_string())]
        );
    }

    #[test]
    fn test_repeat_arrays_emit_one_pair_per_value() {
        let params = Params::new().set("a", ["b", "a", "a"]);
        let options = QueryOptions::new().array_format(ArrayFormat::Repeat);
        assert_eq!(
            pairs_of(&params, &options),
            [
                ("a".to_string(), "a".to_string()),
                ("a".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_bracket_arrays_suffix_the_key() {
        let params = Params::new().set("a", ["b", "a", "a"]);
        let options = QueryOptions::new().array_format(ArrayFormat::Bracket);
        assert_eq!(
            pairs_of(&params, &options),
            [
                ("a[]".to_string(), "a".to_string()),
                ("a[]".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_array_surviving_no_elements_is_dropped_entirely() {
        let params = Params::new()
            .set("empty", Vec::<String>::new())
            .set("invalid", ParamValue::List(vec![ParamValue::Null]))
            .set("kept", "x");
        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("kept".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn test_null_is_dropped_by_default_and_rendered_when_policy_disabled() {
        let params = Params::new().set("a", ParamValue::Null).set("c", "x");

        assert_eq!(
            pairs_of(&params, &QueryOptions::new()),
            [("c".to_string(), "x".to_string())]
        );
        assert_eq!(
            pairs_of(&params, &QueryOptions::new().skip_null(false)),
            [
                ("a".to_string(), "null".to_string()),
                ("c".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn test_rules_override_the_default_array_format() {
        let rules = QueryRules::new().with_format("ids", ArrayFormat::Repeat);
        let params = Params::new().set("ids", ["b", "a"]).set("names", ["y", "x"]);
        let options = QueryOptions::new().rules(&rules);

        assert_eq!(
            pairs_of(&params, &options),
            [
                ("ids".to_string(), "a".to_string()),
                ("ids".to_string(), "b".to_string()),
                ("names".to_string(), "x,y".to_string())
            ]
        );
    }

    #[test]
    fn test_encode_hook_replaces_builtin_rendering() {
        let hook = |key: &str, value: &ParamValue| {
            (key == "shout").then(|| value.to_string().to_uppercase())
        };
        let params = Params::new().set("shout", "loud").set("plain", "quiet");
        let options = QueryOptions::new().encode(&hook);

        assert_eq!(
            pairs_of(&params, &options),
            [
                ("plain".to_string(), "quiet".to_string()),
                ("shout".to_string(), "LOUD".to_string())
            ]
        );
    }

    #[test]
    fn test_encode_hook_empty_output_drops_the_value() {
        let hook = |_: &str, _: &ParamValue| Some("   ".to_string());
        let params = Params::new().set("a", "x");
        let options = QueryOptions::new().encode(&hook);

        assert!(pairs_of(&params, &options).is_empty());
    }

    #[test]
    fn test_encode_hook_never_sees_nulls() {
        let hook = |_: &str, value: &ParamValue| -> Option<String> {
            assert!(!matches!(value, ParamValue::Null));
            None
        };
        let params = Params::new().set("a", ParamValue::Null);
        let options = QueryOptions::new().encode(&hook).skip_null(false);

        assert_eq!(
            pairs_of(&params, &options),
            [("a".to_string(), "null".to_string())]
        );
    }

    #[test]
    fn test_query_string_percent_encodes_keys_and_values() {
        let params = Params::new().set("q", "a b&c").set("tags", ["x y", "z"]);
        assert_eq!(
            query_string(&params, &QueryOptions::new()),
            "q=a%20b%26c&tags=x%20y%2Cz"
        );
    }

    #[test]
    fn test_bracket_keys_are_percent_encoded() {
        let params = Params::new().set("a", ["v"]);
        let options = QueryOptions::new().array_format(ArrayFormat::Bracket);
        assert_eq!(query_string(&params, &options), "a%5B%5D=v");
    }
}
