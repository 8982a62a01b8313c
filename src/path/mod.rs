//! Path-template formatting: tokens, issues, and the three modes.
//!
//! This module is the path half of the request serialization engine. A
//! template like `/coins/{id}/market_chart` is formatted against the
//! caller's parameters, with every problem surfaced as structured data:
//!
//! - **[`PathIssue`] / [`IssueKind`]**: the issue taxonomy (`missing`,
//!   `empty`, `invalid-type`, `invalid-number`, `invalid-date`,
//!   `unsupported`), created during substitution and collected into a list,
//!   never used for unwinding
//! - **[`format_path_safe`]**: discriminated success/failure result
//! - **[`format_path_strict`]**: failure converted into [`FormatPathError`]
//! - **[`format_path`]**: best-effort soft mode that never fails
//!
//! Which entry point to use depends on the call path: production request
//! building wants soft mode's resilience, validation layers want the safe
//! result, and developer-facing diagnostics want the strict error message.
//!
//! # Example
//!
//! ```rust
//! use wirequest::{format_path, format_path_safe, FormatOptions, Params};
//!
//! let params = Params::new().set("id", "bitcoin");
//! let options = FormatOptions::new();
//!
//! assert_eq!(
//!     format_path_safe("/coins/{id}/tickers", &params, &options).unwrap(),
//!     "/coins/bitcoin/tickers"
//! );
//!
//! // Soft mode degrades instead of failing.
//! assert_eq!(
//!     format_path("/coins/{id}/tickers", &Params::new(), &options),
//!     "/coins/tickers"
//! );
//! ```

mod format;
mod issues;

pub use format::{
    extract_tokens, format_path, format_path_safe, format_path_strict, FormatOptions,
    MissingPolicy, PathEncodeFn,
};
pub use issues::{EncodeError, FormatPathError, IssueKind, PathIssue};
