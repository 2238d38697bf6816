//! Parsing of human-written durations from configuration (`"24h"`, `"1h30m"`).

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Parses a duration made of `<integer><unit>` segments.
///
/// Units: `ms`, `s`, `m`, `h`, `d`. Segments add up, so `"1h30m"` is
/// ninety minutes. Empty, unit-less, unknown-unit and zero durations are
/// rejected; a bad value in config must stop startup rather than fall back
/// to a default.
pub fn parse_duration(input: &str) -> CoreResult<Duration> {
    let text = input.trim();
    if text.is_empty() {
        return Err(CoreError::Config("empty duration".to_string()));
    }

    let bad = || CoreError::Config(format!("invalid duration: {input:?}"));
    let mut total = Duration::ZERO;
    let mut rest = text;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(bad)?;
        if digits_end == 0 {
            return Err(bad());
        }
        let value: u64 = rest[..digits_end].parse().map_err(|_| bad())?;
        rest = &rest[digits_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit_secs = match &rest[..unit_end] {
            "ms" => {
                total = total
                    .checked_add(Duration::from_millis(value))
                    .ok_or_else(bad)?;
                rest = &rest[unit_end..];
                continue;
            }
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86_400,
            _ => return Err(bad()),
        };
        let secs = value.checked_mul(unit_secs).ok_or_else(bad)?;
        total = total.checked_add(Duration::from_secs(secs)).ok_or_else(bad)?;
        rest = &rest[unit_end..];
    }

    if total.is_zero() {
        return Err(CoreError::Config(format!("duration must be positive: {input:?}")));
    }
    Ok(total)
}
