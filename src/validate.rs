//! Argument extraction and validation for tool calls.
//!
//! Every helper treats `null` as absent and names the offending field in the
//! error it returns. Nothing here touches the network.

use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Largest `per_page` the upstream accepts.
pub const MAX_PER_PAGE: u64 = 100;

fn present<'a>(args: &'a Map<String, JsonValue>, name: &str) -> Option<&'a JsonValue> {
    args.get(name).filter(|v| !v.is_null())
}

fn invalid(name: &str, reason: impl Into<String>) -> McpError {
    McpError::InvalidArg {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// A required, non-empty string argument.
pub fn required_string(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match present(args, name) {
        None => Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::String(s)) if s.trim().is_empty() => {
            Err(McpError::MissingArg(name.to_string()))
        }
        Some(JsonValue::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(invalid(name, "expected a string")),
    }
}

/// A required identifier that will be placed in the URL path.
///
/// Slashes are allowed (OpenStates ids contain them) but `.` and `..`
/// components are not.
pub fn required_path_id(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    let id = required_string(args, name)?;
    if id.split('/').any(|part| part == "." || part == "..") {
        return Err(invalid(name, "must not contain '.' or '..' path components"));
    }
    Ok(id)
}

/// A required argument that must fit in exactly one path segment.
pub fn required_path_segment(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    let value = required_string(args, name)?;
    path_segment(name, value)
}

/// Check that `value` is a single path segment: no `/`, and not `.` or `..`.
pub fn path_segment(name: &str, value: String) -> Result<String> {
    if value.contains('/') {
        return Err(invalid(name, "must not contain '/'"));
    }
    if value == "." || value == ".." {
        return Err(invalid(name, "must not be '.' or '..'"));
    }
    Ok(value)
}

/// An optional string argument; empty strings count as absent.
pub fn optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match present(args, name) {
        None => Ok(None),
        Some(JsonValue::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(_) => Err(invalid(name, "expected a string")),
    }
}

/// An optional list of strings. A bare string is accepted as a one-element list.
pub fn optional_string_list(
    args: &Map<String, JsonValue>,
    name: &str,
) -> Result<Option<Vec<String>>> {
    let items = match present(args, name) {
        None => return Ok(None),
        Some(JsonValue::String(s)) => vec![s.as_str()],
        Some(JsonValue::Array(arr)) => arr
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| invalid(name, "expected an array of strings"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(invalid(name, "expected a string or an array of strings")),
    };

    let cleaned: Vec<String> = items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    Ok((!cleaned.is_empty()).then_some(cleaned))
}

/// An optional positive integer. Zero, negatives, and fractions are rejected.
pub fn optional_positive_int(args: &Map<String, JsonValue>, name: &str) -> Result<Option<u64>> {
    match present(args, name) {
        None => Ok(None),
        Some(JsonValue::Number(n)) => match n.as_u64() {
            Some(0) | None => Err(invalid(name, "must be a positive integer")),
            Some(v) => Ok(Some(v)),
        },
        Some(_) => Err(invalid(name, "must be a positive integer")),
    }
}

/// Optional `page` and `per_page`, with `per_page` clamped to [`MAX_PER_PAGE`].
///
/// `limit` is accepted as an alias for `per_page`; `per_page` wins when both are given.
pub fn pagination(args: &Map<String, JsonValue>) -> Result<(Option<u64>, Option<u64>)> {
    let page = optional_positive_int(args, "page")?;
    let per_page = match optional_positive_int(args, "per_page")? {
        Some(p) => Some(p),
        None => optional_positive_int(args, "limit")?,
    };
    let per_page = per_page.map(|p| {
        if p > MAX_PER_PAGE {
            tracing::debug!(requested = p, "clamping per_page to {}", MAX_PER_PAGE);
        }
        p.min(MAX_PER_PAGE)
    });
    Ok((page, per_page))
}

/// An optional boolean.
pub fn optional_bool(args: &Map<String, JsonValue>, name: &str) -> Result<Option<bool>> {
    match present(args, name) {
        None => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(name, "expected a boolean")),
    }
}

/// A required finite number within `[min, max]`.
///
/// Returns the JSON number untouched so it reaches the query string exactly as sent.
pub fn required_number_in_range(
    args: &Map<String, JsonValue>,
    name: &str,
    min: f64,
    max: f64,
) -> Result<serde_json::Number> {
    let number = match present(args, name) {
        None => return Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::Number(n)) => n.clone(),
        Some(_) => return Err(invalid(name, "expected a number")),
    };

    let value = number
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(name, "must be a finite number"))?;
    if value < min || value > max {
        return Err(invalid(
            name,
            format!("{} is outside [{}, {}]", value, min, max),
        ));
    }
    Ok(number)
}
