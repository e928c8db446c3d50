//! Lenient numeric parsing for controller telemetry.

/// Parses a lag value reported as a string.
///
/// Accepts a base-10 integer with an optional sign. Anything else (empty,
/// placeholders such as `"UNAVAILABLE"`, out of range) yields `0`, so a
/// single bad partition never fails a whole table.
pub fn parse_lag(raw: &str) -> i64 {
    raw.parse::<i64>().unwrap_or(0)
}
