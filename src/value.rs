//! Scalar coercion with defaults. Every helper takes the raw string (if
//! any) and a caller-supplied default; absence and parse failure both
//! degrade to the default, so nothing in this module can fail outward.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;

/// Parse through `FromStr`, falling back to `default` when the value is
/// absent or does not parse.
pub fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Booleans accept `true`/`false` in any case plus `1`/`0`.
pub fn bool_or(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => default,
    }
}

/// Timestamps are parsed with a caller-supplied chrono layout, e.g.
/// `%Y-%m-%d %H:%M:%S`.
pub fn time_or(value: Option<&str>, layout: &str, default: NaiveDateTime) -> NaiveDateTime {
    value
        .and_then(|v| NaiveDateTime::parse_from_str(v, layout).ok())
        .unwrap_or(default)
}

/// Durations are human-readable strings such as `30s`, `750ms`, or `2h 15m`.
pub fn duration_or(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|v| humantime::parse_duration(v).ok())
        .unwrap_or(default)
}
