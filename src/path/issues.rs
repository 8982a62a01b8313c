//! Issue taxonomy and errors for path formatting.
//!
//! Path formatting problems are data, not unwinding: every problem found
//! during substitution becomes a [`PathIssue`] collected into a list. The
//! issue list only turns into an error object at the strict-mode boundary
//! ([`FormatPathError`]), and even that is returned, never panicked.
//!
//! # Example
//!
//! ```rust
//! use wirequest::{format_path_strict, FormatOptions, Params};
//!
//! let error = format_path_strict("/coins/{id}", &Params::new(), &FormatOptions::new())
//!     .unwrap_err();
//!
//! assert!(error.to_string().contains("missing"));
//! assert!(error.to_string().contains("id"));
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The kind of problem found while substituting one path token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// No value was supplied for the token (absent key or explicit null).
    Missing,
    /// The value rendered to an empty segment.
    Empty,
    /// The value's shape cannot be a path segment (a list).
    InvalidType,
    /// The value is a non-finite number.
    InvalidNumber,
    /// The value is a timestamp outside the representable calendar range.
    InvalidDate,
    /// A custom encoder rejected the value.
    Unsupported,
}

impl IssueKind {
    /// Returns the kind in its wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::InvalidType => "invalid-type",
            Self::InvalidNumber => "invalid-number",
            Self::InvalidDate => "invalid-date",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found while formatting a path template.
///
/// Issues are plain data so callers can log or surface them structurally;
/// `Display` renders the `[kind] key: message` form used in
/// [`FormatPathError`] messages.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathIssue {
    /// What went wrong.
    pub kind: IssueKind,
    /// The token name the issue belongs to.
    pub key: String,
    /// A rendering of the offending value, when one was supplied.
    pub value: Option<String>,
    /// A human-readable description of the problem.
    pub message: String,
}

impl PathIssue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(
        kind: IssueKind,
        key: impl Into<String>,
        value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            key: key.into(),
            value,
            message: message.into(),
        }
    }
}

impl fmt::Display for PathIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.key, self.message)
    }
}

/// A value could not be encoded by a custom path encoder.
///
/// Custom encoders return this instead of panicking; the formatter converts
/// it into an [`IssueKind::Unsupported`] issue at the call site, so encoder
/// failures never unwind through the library.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EncodeError {
    /// Why the value could not be encoded.
    pub message: String,
}

impl EncodeError {
    /// Creates a new encode error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by strict-mode path formatting.
///
/// The message enumerates every collected issue as `[kind] key: message`,
/// joined by `"; "`, for developer-facing diagnostics.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{}", join_issues(.issues))]
pub struct FormatPathError {
    issues: Vec<PathIssue>,
}

impl FormatPathError {
    /// Creates an error from a non-empty issue list.
    #[must_use]
    pub fn new(issues: Vec<PathIssue>) -> Self {
        Self { issues }
    }

    /// Returns the collected issues.
    #[must_use]
    pub fn issues(&self) -> &[PathIssue] {
        &self.issues
    }

    /// Consumes the error, returning the issue list.
    #[must_use]
    pub fn into_issues(self) -> Vec<PathIssue> {
        self.issues
    }
}

impl From<Vec<PathIssue>> for FormatPathError {
    fn from(issues: Vec<PathIssue>) -> Self {
        Self::new(issues)
    }
}

pub(crate) fn join_issues(issues: &[PathIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<IssueKind>();
    assert_send_sync::<PathIssue>();
    assert_send_sync::<EncodeError>();
    assert_send_sync::<FormatPathError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_kind_wire_spelling() {
        assert_eq!(IssueKind::Missing.as_str(), "missing");
        assert_eq!(IssueKind::InvalidType.as_str(), "invalid-type");
        assert_eq!(IssueKind::InvalidNumber.as_str(), "invalid-number");
        assert_eq!(IssueKind::InvalidDate.as_str(), "invalid-date");
        assert_eq!(IssueKind::Unsupported.as_str(), "unsupported");
        assert_eq!(IssueKind::Empty.as_str(), "empty");
    }

    #[test]
    fn test_issue_display_has_kind_key_and_message() {
        let issue = PathIssue::new(
            IssueKind::Missing,
            "id",
            None,
            "no value supplied for path parameter",
        );
        assert_eq!(
            issue.to_string(),
            "[missing] id: no value supplied for path parameter"
        );
    }

    #[test]
    fn test_error_message_joins_every_issue() {
        let error = FormatPathError::new(vec![
            PathIssue::new(IssueKind::Missing, "id", None, "no value supplied"),
            PathIssue::new(
                IssueKind::InvalidType,
                "tags",
                Some("[a, b]".to_string()),
                "path segments must be single scalar values",
            ),
        ]);

        let message = error.to_string();
        assert_eq!(
            message,
            "[missing] id: no value supplied; \
             [invalid-type] tags: path segments must be single scalar values"
        );
    }

    #[test]
    fn test_issues_serialize_with_kebab_case_kinds() {
        let issue = PathIssue::new(IssueKind::InvalidNumber, "page", Some("NaN".to_string()), "x");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "invalid-number");
        assert_eq!(json["key"], "page");
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = FormatPathError::new(vec![]);
        let _: &dyn std::error::Error = &error;

        let encode = EncodeError::new("unsupported shape");
        let _: &dyn std::error::Error = &encode;
    }
}
