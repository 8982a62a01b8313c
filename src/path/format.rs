//! Path-template formatting with three failure-handling modes.
//!
//! A path template names its parameters with `{token}` placeholders:
//! `/coins/{id}/market_chart`. The formatter substitutes each token with
//! the percent-encoded rendering of the caller's value, collecting a
//! [`PathIssue`] for every token that cannot be substituted cleanly.
//!
//! Three entry points trade strictness for resilience:
//!
//! - [`format_path_safe`]: returns `Ok(path)` or `Err(issues)`, the
//!   discriminated result for callers that react to malformed parameters
//! - [`format_path_strict`]: converts the failure into a
//!   [`FormatPathError`] enumerating every issue
//! - [`format_path`]: best-effort soft mode that never fails; bad tokens
//!   substitute per [`MissingPolicy`] and the collected issues are logged
//!   at debug level
//!
//! # Example
//!
//! ```rust
//! use wirequest::{format_path_safe, FormatOptions, Params};
//!
//! let params = Params::new().set("id", "a/b ?&");
//! let path = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap();
//! assert_eq!(path, "/coins/a%2Fb%20%3F%26");
//! ```

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat};

use crate::params::{ParamValue, Params};
use crate::path::issues::{join_issues, EncodeError, FormatPathError, IssueKind, PathIssue};

/// How soft mode substitutes a token that could not be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MissingPolicy {
    /// Leave the literal `{key}` in place.
    KeepToken,
    /// Remove the token text, keeping surrounding slashes as-is.
    Empty,
    /// Remove the token text, then collapse the duplicate slashes it leaves
    /// behind (protocol separators like `https://` are preserved).
    #[default]
    DropSegment,
}

/// Custom per-segment encoder.
///
/// When supplied, the encoder runs instead of the built-in rendering for
/// every resolvable token. An `Err` becomes an [`IssueKind::Unsupported`]
/// issue at the call site (encoder failures never unwind through the
/// formatter), and an `Ok` that is empty after trimming becomes an
/// [`IssueKind::Empty`] issue.
pub type PathEncodeFn = dyn Fn(&str, &ParamValue) -> Result<String, EncodeError> + Send + Sync;

/// Options controlling path formatting.
///
/// # Example
///
/// ```rust
/// use wirequest::{format_path, FormatOptions, MissingPolicy, Params};
///
/// let options = FormatOptions::new().on_missing(MissingPolicy::KeepToken);
/// let path = format_path("/coins/{id}", &Params::new(), &options);
/// assert_eq!(path, "/coins/{id}");
/// ```
#[derive(Clone, Copy, Default)]
pub struct FormatOptions<'a> {
    on_missing: MissingPolicy,
    encode: Option<&'a PathEncodeFn>,
}

impl<'a> FormatOptions<'a> {
    /// Creates options with the defaults: drop-segment policy, built-in
    /// encoding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            on_missing: MissingPolicy::DropSegment,
            encode: None,
        }
    }

    /// Sets the soft-mode substitution policy for unresolved tokens.
    #[must_use]
    pub const fn on_missing(mut self, policy: MissingPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    /// Attaches a custom segment encoder.
    #[must_use]
    pub const fn encode(mut self, encoder: &'a PathEncodeFn) -> Self {
        self.encode = Some(encoder);
        self
    }
}

impl fmt::Debug for FormatOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatOptions")
            .field("on_missing", &self.on_missing)
            .field("encode", &self.encode.map(|_| "<encoder>"))
            .finish()
    }
}

/// Extracts the token names from a path template.
///
/// Scans `{...}` groups, trims inner whitespace, and deduplicates by first
/// occurrence. The token set is derived fresh on every call; templates are
/// never cached or mutated.
///
/// # Example
///
/// ```rust
/// use wirequest::extract_tokens;
///
/// let tokens = extract_tokens("/coins/{id}/contract/{ address }/{id}");
/// assert_eq!(tokens, ["id", "address"]);
/// ```
#[must_use]
pub fn extract_tokens(template: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = after[1..end].trim();
        if !name.is_empty() && !tokens.iter().any(|token| token == name) {
            tokens.push(name.to_string());
        }
        rest = &after[end + 1..];
    }

    tokens
}

enum Replacement {
    /// Substitute the percent-encoded segment text.
    Text(String),
    /// Leave the literal `{...}` group in place.
    Keep,
    /// Remove the group text.
    Remove,
}

struct Formatted {
    path: String,
    issues: Vec<PathIssue>,
}

/// Formats a path template, returning a discriminated result.
///
/// Any issue (a missing value, a list in segment position, an encoder
/// failure) fails the whole call with the complete issue list; the path is
/// returned only when every token substituted cleanly. This function never
/// panics.
///
/// # Errors
///
/// Returns every [`PathIssue`] collected during substitution.
///
/// # Example
///
/// ```rust
/// use wirequest::{format_path_safe, FormatOptions, IssueKind, Params};
///
/// let issues =
///     format_path_safe("/coins/{id}", &Params::new(), &FormatOptions::new()).unwrap_err();
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].kind, IssueKind::Missing);
/// assert_eq!(issues[0].key, "id");
/// ```
pub fn format_path_safe(
    template: &str,
    params: &Params,
    options: &FormatOptions<'_>,
) -> Result<String, Vec<PathIssue>> {
    let formatted = format_template(template, params, options, false);
    if formatted.issues.is_empty() {
        Ok(formatted.path)
    } else {
        Err(formatted.issues)
    }
}

/// Formats a path template, converting failure into a [`FormatPathError`].
///
/// The error's message enumerates every issue as `[kind] key: message`
/// joined by `"; "`: developer-facing diagnostics for validation layers
/// that surface one message.
///
/// # Errors
///
/// Returns [`FormatPathError`] wrapping the collected issues.
pub fn format_path_strict(
    template: &str,
    params: &Params,
    options: &FormatOptions<'_>,
) -> Result<String, FormatPathError> {
    format_path_safe(template, params, options).map_err(FormatPathError::new)
}

/// Formats a path template in best-effort soft mode.
///
/// Never fails: each unresolvable token is substituted per the configured
/// [`MissingPolicy`] and the path is always returned. Issues are still
/// collected for diagnostic completeness and logged at debug level, so
/// production call paths keep working while development environments see
/// what went wrong.
///
/// # Example
///
/// ```rust
/// use wirequest::{format_path, FormatOptions, Params};
///
/// // Missing required parameter: the segment is dropped, not an error.
/// let path = format_path("/coins/{id}/tickers", &Params::new(), &FormatOptions::new());
/// assert_eq!(path, "/coins/tickers");
/// ```
#[must_use]
pub fn format_path(template: &str, params: &Params, options: &FormatOptions<'_>) -> String {
    let formatted = format_template(template, params, options, true);
    if !formatted.issues.is_empty() {
        tracing::debug!(
            template,
            issues = %join_issues(&formatted.issues),
            "path formatted with issues"
        );
    }
    formatted.path
}

fn format_template(
    template: &str,
    params: &Params,
    options: &FormatOptions<'_>,
    soft: bool,
) -> Formatted {
    let tokens = extract_tokens(template);
    let mut issues: Vec<PathIssue> = Vec::new();
    let mut replacements: BTreeMap<String, Replacement> = BTreeMap::new();

    for token in tokens {
        let resolved = resolve_token(&token, params.get(&token), options, &mut issues);
        let replacement = resolved.map_or_else(
            || {
                if soft {
                    match options.on_missing {
                        MissingPolicy::KeepToken => Replacement::Keep,
                        MissingPolicy::Empty | MissingPolicy::DropSegment => Replacement::Remove,
                    }
                } else {
                    Replacement::Keep
                }
            },
            |text| Replacement::Text(urlencoding::encode(&text).into_owned()),
        );
        replacements.insert(token, replacement);
    }

    let mut path = substitute(template, &replacements);
    if soft && options.on_missing == MissingPolicy::DropSegment {
        path = collapse_duplicate_slashes(&path);
    }

    report_unresolved(&path, &mut issues);

    Formatted { path, issues }
}

/// Resolves one token to its raw (pre-encoding) segment text.
///
/// Resolution order: missing/null, then shape, then the custom encoder,
/// then built-in rendering. Returns `None` when an issue was recorded.
fn resolve_token(
    key: &str,
    value: Option<&ParamValue>,
    options: &FormatOptions<'_>,
    issues: &mut Vec<PathIssue>,
) -> Option<String> {
    let value = match value {
        None | Some(ParamValue::Null) => {
            issues.push(PathIssue::new(
                IssueKind::Missing,
                key,
                None,
                "no value supplied for path parameter",
            ));
            return None;
        }
        Some(value) => value,
    };

    if let ParamValue::List(_) = value {
        issues.push(PathIssue::new(
            IssueKind::InvalidType,
            key,
            Some(value.to_string()),
            "path segments must be single scalar values",
        ));
        return None;
    }

    if let Some(encoder) = options.encode {
        return match encoder(key, value) {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    issues.push(PathIssue::new(
                        IssueKind::Empty,
                        key,
                        Some(value.to_string()),
                        "custom encoder produced an empty segment",
                    ));
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(error) => {
                issues.push(PathIssue::new(
                    IssueKind::Unsupported,
                    key,
                    Some(value.to_string()),
                    error.to_string(),
                ));
                None
            }
        };
    }

    encode_builtin(key, value, issues)
}

fn encode_builtin(
    key: &str,
    value: &ParamValue,
    issues: &mut Vec<PathIssue>,
) -> Option<String> {
    match value {
        ParamValue::Str(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                issues.push(PathIssue::new(
                    IssueKind::Empty,
                    key,
                    Some(text.clone()),
                    "value is empty after trimming",
                ));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        ParamValue::Int(number) => Some(number.to_string()),
        ParamValue::UInt(number) => Some(number.to_string()),
        ParamValue::Float(number) => {
            if number.is_finite() {
                Some(number.to_string())
            } else {
                issues.push(PathIssue::new(
                    IssueKind::InvalidNumber,
                    key,
                    Some(number.to_string()),
                    "number is not finite",
                ));
                None
            }
        }
        ParamValue::Bool(flag) => Some(flag.to_string()),
        ParamValue::DateTime(date) => {
            Some(date.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        ParamValue::Timestamp(seconds) => {
            if DateTime::from_timestamp(*seconds, 0).is_some() {
                Some(seconds.to_string())
            } else {
                issues.push(PathIssue::new(
                    IssueKind::InvalidDate,
                    key,
                    Some(seconds.to_string()),
                    "timestamp is outside the representable date range",
                ));
                None
            }
        }
        // Handled by resolve_token before built-in encoding runs.
        ParamValue::Null | ParamValue::List(_) => None,
    }
}

/// Substitutes every `{...}` group per the replacement map.
///
/// Groups whose trimmed name has no replacement entry (empty names, stray
/// braces) are copied through untouched and picked up by the unresolved
/// scan.
fn substitute(template: &str, replacements: &BTreeMap<String, Replacement>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let Some(start) = rest.find('{') else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find('}') else {
            out.push_str(after);
            break;
        };
        let group = &after[..=end];
        let name = group[1..group.len() - 1].trim();
        match replacements.get(name) {
            Some(Replacement::Text(encoded)) => out.push_str(encoded),
            Some(Replacement::Remove) => {}
            Some(Replacement::Keep) | None => out.push_str(group),
        }
        rest = &after[end + 1..];
    }

    out
}

/// Reports a `Missing` issue for every `{token}` still present after
/// substitution, skipping keys that already carry an issue.
fn report_unresolved(path: &str, issues: &mut Vec<PathIssue>) {
    let mut seen: BTreeSet<String> = issues.iter().map(|issue| issue.key.clone()).collect();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let after = &rest[start..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = after[1..end].trim();
        if !seen.contains(name) {
            seen.insert(name.to_string());
            issues.push(PathIssue::new(
                IssueKind::Missing,
                name,
                None,
                "placeholder was never substituted",
            ));
        }
        rest = &after[end + 1..];
    }
}

/// Collapses duplicate slashes left behind by dropped segments, while
/// preserving protocol separators (`https://`).
fn collapse_duplicate_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') && !out.ends_with(":/") {
            continue;
        }
        out.push(ch);
    }
    out
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MissingPolicy>();
    assert_send_sync::<FormatOptions<'static>>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_extract_tokens_trims_and_dedupes_by_first_occurrence() {
        assert_eq!(
            extract_tokens("/x/{ b }/{a}/{b}"),
            vec!["b".to_string(), "a".to_string()]
        );
        assert!(extract_tokens("/plain/path").is_empty());
        assert!(extract_tokens("/{}/x").is_empty());
    }

    #[test]
    fn test_substitution_percent_encodes_segments() {
        let params = Params::new().set("id", "a/b ?&");
        let path = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap();
        assert_eq!(path, "/coins/a%2Fb%20%3F%26");
    }

    #[test]
    fn test_repeated_tokens_substitute_from_the_same_value() {
        let params = Params::new().set("id", "dup");
        let path = format_path("/x/{id}/y/{id}/z", &params, &FormatOptions::new());
        assert_eq!(path, "/x/dup/y/dup/z");
    }

    #[test]
    fn test_whitespace_variants_of_a_token_substitute_consistently() {
        let params = Params::new().set("id", "v");
        let path = format_path("/a/{ id }/b/{id}", &params, &FormatOptions::new());
        assert_eq!(path, "/a/v/b/v");
    }

    #[test]
    fn test_strings_are_trimmed_before_encoding() {
        let params = Params::new().set("id", "  bitcoin  ");
        let path = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap();
        assert_eq!(path, "/coins/bitcoin");
    }

    #[test]
    fn test_numbers_booleans_and_dates_encode_builtin() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap();
        let params = Params::new()
            .set("n", 42)
            .set("b", true)
            .set("d", date)
            .set("t", ParamValue::timestamp(1_700_000_000));

        let path = format_path_safe("/{n}/{b}/{d}/{t}", &params, &FormatOptions::new()).unwrap();
        assert_eq!(path, "/42/true/2024-01-15T12%3A30%3A00.000Z/1700000000");
    }

    #[test]
    fn test_missing_value_fails_safe_mode_with_issue() {
        let issues =
            format_path_safe("/coins/{id}", &Params::new(), &FormatOptions::new()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Missing);
        assert_eq!(issues[0].key, "id");
    }

    #[test]
    fn test_explicit_null_counts_as_missing() {
        let params = Params::new().set("id", ParamValue::Null);
        let issues = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::Missing);
    }

    #[test]
    fn test_list_value_is_invalid_type() {
        let params = Params::new().set("id", ["a", "b"]);
        let issues = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::InvalidType);
        assert_eq!(issues[0].value.as_deref(), Some("[a, b]"));
    }

    #[test]
    fn test_non_finite_number_is_invalid_number() {
        let params = Params::new().set("page", f64::NAN);
        let issues = format_path_safe("/p/{page}", &params, &FormatOptions::new()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::InvalidNumber);
    }

    #[test]
    fn test_out_of_range_timestamp_is_invalid_date() {
        let params = Params::new().set("from", ParamValue::timestamp(i64::MAX));
        let issues = format_path_safe("/r/{from}", &params, &FormatOptions::new()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::InvalidDate);
    }

    #[test]
    fn test_empty_string_is_empty_issue() {
        let params = Params::new().set("id", "   ");
        let issues = format_path_safe("/coins/{id}", &params, &FormatOptions::new()).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::Empty);
    }

    #[test]
    fn test_strict_mode_message_enumerates_issues() {
        let error =
            format_path_strict("/coins/{id}", &Params::new(), &FormatOptions::new()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("missing"));
        assert!(message.contains("id"));
    }

    #[test]
    fn test_safe_mode_collects_every_issue_before_failing() {
        let params = Params::new().set("tags", ["a"]).set("page", f64::INFINITY);
        let issues = format_path_safe(
            "/x/{id}/{tags}/{page}",
            &params,
            &FormatOptions::new(),
        )
        .unwrap_err();

        let kinds: Vec<IssueKind> = issues.iter().map(|issue| issue.kind).collect();
        assert_eq!(
            kinds,
            [
                IssueKind::Missing,
                IssueKind::InvalidType,
                IssueKind::InvalidNumber
            ]
        );
    }

    #[test]
    fn test_soft_mode_drop_segment_collapses_slashes() {
        let path = format_path("/coins/{id}/tickers", &Params::new(), &FormatOptions::new());
        assert_eq!(path, "/coins/tickers");
    }

    #[test]
    fn test_soft_mode_drop_segment_preserves_protocol_separator() {
        let path = format_path(
            "https://api.example.com/coins/{id}/tickers",
            &Params::new(),
            &FormatOptions::new(),
        );
        assert_eq!(path, "https://api.example.com/coins/tickers");
    }

    #[test]
    fn test_soft_mode_keep_token_leaves_the_literal() {
        let options = FormatOptions::new().on_missing(MissingPolicy::KeepToken);
        let path = format_path("/coins/{id}/tickers", &Params::new(), &options);
        assert_eq!(path, "/coins/{id}/tickers");
    }

    #[test]
    fn test_soft_mode_empty_policy_leaves_raw_slashes() {
        let options = FormatOptions::new().on_missing(MissingPolicy::Empty);
        let path = format_path("/coins/{id}/tickers", &Params::new(), &options);
        assert_eq!(path, "/coins//tickers");
    }

    #[test]
    fn test_custom_encoder_replaces_builtin_encoding() {
        let encoder = |_: &str, value: &ParamValue| -> Result<String, EncodeError> {
            Ok(value.to_string().to_uppercase())
        };
        let options = FormatOptions::new().encode(&encoder);
        let params = Params::new().set("id", "btc");

        let path = format_path_safe("/coins/{id}", &params, &options).unwrap();
        assert_eq!(path, "/coins/BTC");
    }

    #[test]
    fn test_custom_encoder_error_is_unsupported_issue() {
        let encoder = |_: &str, _: &ParamValue| -> Result<String, EncodeError> {
            Err(EncodeError::new("refused by custom encoder"))
        };
        let options = FormatOptions::new().encode(&encoder);
        let params = Params::new().set("id", "btc");

        let issues = format_path_safe("/coins/{id}", &params, &options).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::Unsupported);
        assert_eq!(issues[0].message, "refused by custom encoder");
    }

    #[test]
    fn test_custom_encoder_empty_output_is_empty_issue() {
        let encoder = |_: &str, _: &ParamValue| -> Result<String, EncodeError> {
            Ok("   ".to_string())
        };
        let options = FormatOptions::new().encode(&encoder);
        let params = Params::new().set("id", "btc");

        let issues = format_path_safe("/coins/{id}", &params, &options).unwrap_err();
        assert_eq!(issues[0].kind, IssueKind::Empty);
    }

    #[test]
    fn test_custom_encoder_never_sees_missing_or_list_values() {
        let encoder = |_: &str, _: &ParamValue| -> Result<String, EncodeError> {
            panic!("encoder must not run for missing or list values");
        };
        let options = FormatOptions::new().encode(&encoder);
        let params = Params::new().set("tags", ["a"]);

        let issues = format_path_safe("/x/{id}/{tags}", &params, &options).unwrap_err();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_unresolved_placeholder_is_reported_without_double_counting() {
        // "{}" is not a token; it survives substitution and is reported once.
        let issues =
            format_path_safe("/x/{}/y", &Params::new(), &FormatOptions::new()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Missing);
        assert_eq!(issues[0].key, "");

        // A kept token is already issued as missing; the scan adds nothing.
        let options = FormatOptions::new().on_missing(MissingPolicy::KeepToken);
        let formatted = format_template("/coins/{id}", &Params::new(), &options, true);
        assert_eq!(formatted.issues.len(), 1);
    }

    #[test]
    fn test_unclosed_brace_is_copied_through() {
        let params = Params::new().set("id", "v");
        let path = format_path("/a/{id}/b{rest", &params, &FormatOptions::new());
        assert_eq!(path, "/a/v/b{rest");
    }
}
