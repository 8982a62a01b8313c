//! URL composition: joining base, path, and query.
//!
//! The composer is the top of the serialization pipeline. Given a base URL,
//! a path template, and one flat parameter map, [`compose_url`] formats the
//! path, routes the remaining parameters through the query normalizer,
//! strips documented server defaults, and joins everything into a single
//! well-formed URL.
//!
//! # Example
//!
//! ```rust
//! use wirequest::{compose_url, ComposeOptions, Params};
//!
//! let params = Params::new().set("id", "bitcoin").set("vs_currency", "usd");
//! let url = compose_url(
//!     "https://api.example.com/v3",
//!     "/coins/{id}/market_chart",
//!     &params,
//!     &ComposeOptions::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     url,
//!     "https://api.example.com/v3/coins/bitcoin/market_chart?vs_currency=usd"
//! );
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::params::Params;
use crate::path::{extract_tokens, format_path_strict, FormatOptions, FormatPathError};
use crate::query::{drop_defaults, normalize_query, QueryOptions, QueryParams, ServerDefaults};

/// Returns `true` for `http://` / `https://` URLs (ASCII-case-insensitive).
///
/// # Example
///
/// ```rust
/// use wirequest::is_absolute_url;
///
/// assert!(is_absolute_url("https://api.example.com/v3"));
/// assert!(is_absolute_url("HTTP://api.example.com"));
/// assert!(!is_absolute_url("/coins/bitcoin"));
/// assert!(!is_absolute_url("ftp://example.com"));
/// ```
#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    value
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http://"))
        || value
            .get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("https://"))
}

/// Returns the path with exactly one leading slash prepended when absent.
///
/// # Example
///
/// ```rust
/// use wirequest::ensure_leading_slash;
///
/// assert_eq!(ensure_leading_slash("coins"), "/coins");
/// assert_eq!(ensure_leading_slash("/coins"), "/coins");
/// ```
#[must_use]
pub fn ensure_leading_slash(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// Joins a base URL and a path with exactly one slash between them.
///
/// The base's trailing slashes and the path's leading slashes are stripped
/// before joining, so both spellings of each side produce the same URL. An
/// absolute `http(s)://` path bypasses the base entirely and is returned
/// unchanged.
///
/// # Example
///
/// ```rust
/// use wirequest::join_base_and_path;
///
/// let joined = join_base_and_path("https://api.example.com/v3/", "/coins");
/// assert_eq!(joined, "https://api.example.com/v3/coins");
/// assert_eq!(joined, join_base_and_path("https://api.example.com/v3", "coins"));
///
/// // Absolute paths ignore the base.
/// assert_eq!(
///     join_base_and_path("https://api.example.com", "https://other.example.com/x"),
///     "https://other.example.com/x"
/// );
/// ```
#[must_use]
pub fn join_base_and_path(base: &str, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Options for [`compose_url`]: query, path, and defaults configuration.
///
/// # Example
///
/// ```rust
/// use wirequest::{ArrayFormat, ComposeOptions, QueryOptions, ServerDefaults};
///
/// let defaults = ServerDefaults::new().with_default("order", "market_cap_desc");
/// let options = ComposeOptions::new()
///     .query(QueryOptions::new().array_format(ArrayFormat::Repeat))
///     .defaults(&defaults);
/// ```
#[derive(Clone, Copy, Default)]
pub struct ComposeOptions<'a> {
    query: QueryOptions<'a>,
    format: FormatOptions<'a>,
    defaults: Option<&'a ServerDefaults>,
}

impl<'a> ComposeOptions<'a> {
    /// Creates options with every layer at its defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            query: QueryOptions::new(),
            format: FormatOptions::new(),
            defaults: None,
        }
    }

    /// Sets the query normalization options.
    #[must_use]
    pub const fn query(mut self, options: QueryOptions<'a>) -> Self {
        self.query = options;
        self
    }

    /// Sets the path formatting options.
    #[must_use]
    pub const fn format(mut self, options: FormatOptions<'a>) -> Self {
        self.format = options;
        self
    }

    /// Attaches the endpoint's documented server defaults.
    #[must_use]
    pub const fn defaults(mut self, defaults: &'a ServerDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

impl fmt::Debug for ComposeOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeOptions")
            .field("query", &self.query)
            .field("format", &self.format)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Composes the full request URL from one flat parameter map.
///
/// The template's tokens are formatted into the path; every remaining
/// parameter goes through the query normalizer; pairs equal to the
/// endpoint's documented server defaults are stripped; and the result is
/// joined onto the base. The `?` suffix appears only when the serialized
/// query is non-empty.
///
/// # Errors
///
/// Returns [`FormatPathError`] when any path token cannot be substituted,
/// with the same diagnostics as [`format_path_strict`].
///
/// # Example
///
/// ```rust
/// use wirequest::{compose_url, ComposeOptions, Params, ServerDefaults};
///
/// let defaults = ServerDefaults::new().with_default("order", "market_cap_desc");
/// let options = ComposeOptions::new().defaults(&defaults);
///
/// let params = Params::new()
///     .set("id", "bitcoin")
///     .set("order", "market_cap_desc")
///     .set("page", 2);
///
/// let url = compose_url("https://api.example.com/v3", "/coins/{id}/tickers", &params, &options)
///     .unwrap();
///
/// // The default-valued `order` never reaches the wire.
/// assert_eq!(url, "https://api.example.com/v3/coins/bitcoin/tickers?page=2");
/// ```
pub fn compose_url(
    base: &str,
    template: &str,
    params: &Params,
    options: &ComposeOptions<'_>,
) -> Result<String, FormatPathError> {
    let path = format_path_strict(template, params, &options.format)?;

    let mut query_values = params.clone();
    for token in extract_tokens(template) {
        query_values.remove(&token);
    }

    let mut pairs = normalize_query(&query_values, &options.query);
    if let Some(defaults) = options.defaults {
        pairs = drop_defaults(pairs, defaults, &options.query);
    }

    let url = join_base_and_path(base, &path);
    if pairs.is_empty() {
        Ok(url)
    } else {
        Ok(format!("{url}?{}", QueryParams::new(pairs)))
    }
}

// Verify ComposeOptions is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ComposeOptions<'static>>();
};
