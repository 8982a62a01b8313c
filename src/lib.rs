//! # wirequest
//!
//! Typed request serialization for REST API clients: canonical query
//! strings, `{token}` path templates, and URL composition.
//!
//! ## Overview
//!
//! This crate is the serialization core of a typed API client. It turns
//! structured request parameters into exact, deterministic wire
//! representations:
//!
//! - **Query normalization** via [`normalize_query`], [`query_string`], and
//!   [`query_params`]: keys alphabetized, list values deduplicated and
//!   sorted, empty and unrepresentable values dropped, arrays rendered
//!   under a configurable [`ArrayFormat`] (comma, repeat, or bracket)
//! - **Server-default stripping** via [`drop_defaults`]: parameters equal
//!   to the endpoint's documented default never reach the wire, keeping
//!   request URLs small and cacheable
//! - **Path formatting** via [`format_path`], [`format_path_safe`], and
//!   [`format_path_strict`]: three escalating failure-handling postures
//!   over the same substitution engine, with structured [`PathIssue`]
//!   diagnostics
//! - **URL composition** via [`compose_url`] and [`join_base_and_path`]:
//!   one flat parameter map in, one well-formed URL out
//!
//! Schema validation, transport, retries, and response parsing are owned by
//! the layers around this crate; everything here is a pure, synchronous
//! transformation with no I/O and no shared state.
//!
//! ## Quick Start
//!
//! ```rust
//! use wirequest::{compose_url, ComposeOptions, Params, ServerDefaults};
//!
//! // The endpoint registry documents the server's defaults.
//! let defaults = ServerDefaults::new().with_default("order", "market_cap_desc");
//! let options = ComposeOptions::new().defaults(&defaults);
//!
//! // One flat map carries both path and query values.
//! let params = Params::new()
//!     .set("id", "bitcoin")
//!     .set("vs_currencies", ["usd", "eur"])
//!     .set("order", "market_cap_desc")
//!     .set_opt("page", None::<u32>);
//!
//! let url = compose_url(
//!     "https://api.example.com/v3",
//!     "/coins/{id}/tickers",
//!     &params,
//!     &options,
//! )?;
//!
//! // Deterministic output: sorted keys, CSV arrays, defaults stripped.
//! assert_eq!(
//!     url,
//!     "https://api.example.com/v3/coins/bitcoin/tickers?vs_currencies=eur%2Cusd"
//! );
//! # Ok::<(), wirequest::FormatPathError>(())
//! ```
//!
//! ## Failure-Handling Modes
//!
//! Path formatting exposes three postures over one engine:
//!
//! ```rust
//! use wirequest::{format_path, format_path_safe, format_path_strict, FormatOptions, Params};
//!
//! let options = FormatOptions::new();
//!
//! // Soft: best-effort, never fails. Bad tokens degrade per policy.
//! assert_eq!(
//!     format_path("/coins/{id}/tickers", &Params::new(), &options),
//!     "/coins/tickers"
//! );
//!
//! // Safe: a discriminated result carrying the full issue list.
//! assert!(format_path_safe("/coins/{id}", &Params::new(), &options).is_err());
//!
//! // Strict: the issue list as one enumerated error message.
//! let error = format_path_strict("/coins/{id}", &Params::new(), &options).unwrap_err();
//! assert!(error.to_string().contains("[missing] id"));
//! ```
//!
//! ## Design Principles
//!
//! - **Deterministic output**: serialization depends only on input
//!   contents, never on insertion order, so URLs double as cache keys
//! - **Failures are data**: path problems are [`PathIssue`] values; errors
//!   are returned, never panicked, and caller-supplied hooks cannot unwind
//!   through the library
//! - **No global state**: options are plain values passed explicitly
//! - **Thread-safe**: all public types are `Send + Sync`

pub mod params;
pub mod path;
pub mod query;
pub mod url;

// Re-export public types at crate root for convenience
pub use params::{ParamValue, Params, ParamsError};
pub use path::{
    extract_tokens, format_path, format_path_safe, format_path_strict, EncodeError, FormatOptions,
    FormatPathError, IssueKind, MissingPolicy, PathEncodeFn, PathIssue,
};
pub use query::{
    drop_defaults, normalize_query, query_params, query_string, ArrayFormat, QueryEncodeFn,
    QueryOptions, QueryParams, QueryRules, ServerDefaults, ServerDefaultsMap, WirePair,
};
pub use url::{
    compose_url, ensure_leading_slash, is_absolute_url, join_base_and_path, ComposeOptions,
};
