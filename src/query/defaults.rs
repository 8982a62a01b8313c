//! Server-default stripping for stable cache keys.
//!
//! Remote APIs document default values for many query parameters. Sending
//! `order=market_cap_desc` when the server assumes it anyway only bloats
//! the URL and fragments HTTP caches. The defaults resolver compares each
//! supplied parameter against the endpoint's documented default, using the
//! same normalization rules as the query serializer, and omits the pair
//! when they are equal.
//!
//! Only documented server defaults are eligible: a key with no configured
//! default is always kept, even when it happens to equal some natural
//! schema default, so explicit caller intent survives on the wire.

use std::collections::{BTreeMap, BTreeSet};

use crate::params::ParamValue;
use crate::query::normalize::{normalize_scalar, QueryOptions, WirePair};

/// Documented server defaults for one endpoint.
///
/// Supplied by the endpoint registry as plain data; read-only input to
/// [`drop_defaults`].
///
/// # Example
///
/// ```rust
/// use wirequest::ServerDefaults;
///
/// let defaults = ServerDefaults::new()
///     .with_default("order", "market_cap_desc")
///     .with_default("per_page", 100);
///
/// assert_eq!(defaults.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerDefaults {
    values: BTreeMap<String, ParamValue>,
}

impl ServerDefaults {
    /// Creates an empty defaults map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Adds a documented default for one parameter.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builds a defaults map from registry JSON.
    ///
    /// Non-object input produces an empty map; entries whose values have no
    /// wire form (nested objects) are omitted. The registry owns the data
    /// shape, so this constructor is deliberately lenient.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wirequest::ServerDefaults;
    /// use serde_json::json;
    ///
    /// let defaults = ServerDefaults::from_json(&json!({
    ///     "order": "market_cap_desc",
    ///     "sparkline": false,
    /// }));
    /// assert_eq!(defaults.len(), 2);
    /// ```
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut defaults = Self::new();
        if let serde_json::Value::Object(entries) = value {
            for (key, entry) in entries {
                if let Some(value) = ParamValue::from_json(entry) {
                    defaults.values.insert(key.clone(), value);
                }
            }
        }
        defaults
    }

    /// Returns the documented default for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Returns `true` if a default is documented for the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of documented defaults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no defaults are documented.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical wire rendering of the default for a key.
    ///
    /// Lists render as their sorted, deduplicated CSV regardless of the
    /// configured array format, so comparison is insensitive to how the
    /// supplied value was expanded into pairs.
    fn canonical_default(&self, key: &str, options: &QueryOptions<'_>) -> Option<String> {
        canonical_value(key, self.values.get(key)?, options)
    }
}

/// Per-endpoint server defaults supplied by the endpoint registry.
///
/// # Example
///
/// ```rust
/// use wirequest::ServerDefaultsMap;
/// use serde_json::json;
///
/// let map = ServerDefaultsMap::from_json(&json!({
///     "coins/markets": { "order": "market_cap_desc", "per_page": 100 },
///     "coins/list": { "include_platform": false },
/// }));
///
/// let defaults = map.defaults_for("coins/markets").unwrap();
/// assert!(defaults.contains_key("order"));
/// assert!(map.defaults_for("simple/price").is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerDefaultsMap {
    endpoints: BTreeMap<String, ServerDefaults>,
}

impl ServerDefaultsMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            endpoints: BTreeMap::new(),
        }
    }

    /// Adds the defaults for one endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, key: impl Into<String>, defaults: ServerDefaults) -> Self {
        self.endpoints.insert(key.into(), defaults);
        self
    }

    /// Builds the map from registry JSON (`endpoint → { param → default }`).
    ///
    /// Like [`ServerDefaults::from_json`], this is lenient: non-object
    /// input produces an empty map.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut map = Self::new();
        if let serde_json::Value::Object(entries) = value {
            for (endpoint, defaults) in entries {
                map.endpoints
                    .insert(endpoint.clone(), ServerDefaults::from_json(defaults));
            }
        }
        map
    }

    /// Returns the defaults documented for an endpoint, if any.
    #[must_use]
    pub fn defaults_for(&self, endpoint: &str) -> Option<&ServerDefaults> {
        self.endpoints.get(endpoint)
    }

    /// Returns the number of endpoints with documented defaults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns `true` if no endpoint has documented defaults.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Removes wire pairs whose value equals the endpoint's documented default.
///
/// Pairs are grouped by base key (a bracketed `key[]` folds back to `key`)
/// and the group's combined CSV is compared against the canonical rendering
/// of the default. Equality is computed on normalized values, never on raw
/// structural equality, which would miss equivalent-but-differently-ordered
/// lists.
///
/// # Example
///
/// ```rust
/// use wirequest::{drop_defaults, normalize_query, Params, QueryOptions, ServerDefaults};
///
/// let defaults = ServerDefaults::new().with_default("order", "market_cap_desc");
/// let options = QueryOptions::new();
///
/// let params = Params::new().set("order", "market_cap_desc").set("page", 2);
/// let pairs = drop_defaults(normalize_query(&params, &options), &defaults, &options);
///
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].key, "page");
/// ```
#[must_use]
pub fn drop_defaults(
    pairs: Vec<WirePair>,
    defaults: &ServerDefaults,
    options: &QueryOptions<'_>,
) -> Vec<WirePair> {
    if defaults.is_empty() || pairs.is_empty() {
        return pairs;
    }

    let mut supplied: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for pair in &pairs {
        supplied
            .entry(base_key(&pair.key))
            .or_default()
            .push(pair.value.as_str());
    }

    let mut omitted: BTreeSet<String> = BTreeSet::new();
    for (&base, values) in &supplied {
        let Some(canonical) = defaults.canonical_default(base, options) else {
            continue;
        };
        if canonical == values.join(",") {
            tracing::debug!(
                key = %base,
                "omitting query parameter equal to documented server default"
            );
            omitted.insert(base.to_string());
        }
    }

    if omitted.is_empty() {
        return pairs;
    }
    pairs
        .into_iter()
        .filter(|pair| !omitted.contains(base_key(&pair.key)))
        .collect()
}

/// Canonical wire rendering of one value under the supplied options.
fn canonical_value(key: &str, value: &ParamValue, options: &QueryOptions<'_>) -> Option<String> {
    match value {
        ParamValue::List(items) => {
            let mut rendered: Vec<String> = items
                .iter()
                .filter_map(|item| normalize_scalar(key, item, options.encode_hook()))
                .collect();
            rendered.sort();
            rendered.dedup();
            (!rendered.is_empty()).then(|| rendered.join(","))
        }
        scalar => normalize_scalar(key, scalar, options.encode_hook()),
    }
}

fn base_key(key: &str) -> &str {
    key.strip_suffix("[]").unwrap_or(key)
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServerDefaults>();
    assert_send_sync::<ServerDefaultsMap>();
};
