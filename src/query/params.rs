//! Ordered-pair container over normalized query output.
//!
//! [`QueryParams`] is the manipulable form of a normalized query: callers
//! that need to inspect, amend, or re-serialize the pair list work with it
//! instead of the raw string.

use std::fmt;

use crate::params::Params;
use crate::query::normalize::{encode_pairs, normalize_query, QueryOptions, WirePair};

/// An ordered collection of normalized wire pairs.
///
/// Pairs keep the canonical order produced by the normalizer (sorted by
/// key, then by value within array expansions). `Display` renders the fully
/// percent-encoded query string.
///
/// # Example
///
/// ```rust
/// use wirequest::{query_params, Params, QueryOptions};
///
/// let params = Params::new().set("vs_currency", "usd").set("page", 2);
/// let mut query = query_params(&params, &QueryOptions::new());
///
/// assert_eq!(query.get("vs_currency"), Some("usd"));
/// query.append("x_cg_demo_api_key", "key");
/// assert_eq!(query.to_string(), "page=2&vs_currency=usd&x_cg_demo_api_key=key");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<WirePair>,
}

impl QueryParams {
    /// Creates a container from an existing pair list, preserving order.
    #[must_use]
    pub const fn new(pairs: Vec<WirePair>) -> Self {
        Self { pairs }
    }

    /// Returns the first value for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    /// Returns every value for a key, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
            .collect()
    }

    /// Appends a pair at the end of the list.
    ///
    /// Appended pairs bypass normalization; use this for values that are
    /// already wire-ready (signatures, API keys).
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push(WirePair::new(key, value));
    }

    /// Returns the pairs as a slice.
    #[must_use]
    pub fn pairs(&self) -> &[WirePair] {
        &self.pairs
    }

    /// Consumes the container, returning the pair list.
    #[must_use]
    pub fn into_pairs(self) -> Vec<WirePair> {
        self.pairs
    }

    /// Iterates over the pairs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, WirePair> {
        self.pairs.iter()
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the container holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode_pairs(&self.pairs))
    }
}

impl IntoIterator for QueryParams {
    type Item = WirePair;
    type IntoIter = std::vec::IntoIter<WirePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = &'a WirePair;
    type IntoIter = std::slice::Iter<'a, WirePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl From<Vec<WirePair>> for QueryParams {
    fn from(pairs: Vec<WirePair>) -> Self {
        Self::new(pairs)
    }
}

/// Normalizes a parameter map into an ordered-pair container.
///
/// Equivalent to [`normalize_query`] wrapped in [`QueryParams`] for callers
/// that want to manipulate the result before serializing it.
#[must_use]
pub fn query_params(params: &Params, options: &QueryOptions<'_>) -> QueryParams {
    QueryParams::new(normalize_query(params, options))
}

// Verify QueryParams is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryParams>();
};
