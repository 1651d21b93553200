// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elapsed-time resolution.
//!
//! TRX records carry one of two mutually exclusive duration encodings: an
//! explicit .NET `TimeSpan` string (`[d.]hh:mm:ss[.fffffff]`), or a pair of
//! start/end timestamps. Both resolve to milliseconds here.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Parses a .NET `TimeSpan` string into milliseconds.
///
/// Returns `None` when the string does not look like a time span; callers
/// treat that as an unknown duration.
pub(crate) fn parse_time_span(value: &str) -> Option<f64> {
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let mut parts = value.split(':');
    let (hours_part, minutes_part, seconds_part) =
        (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    // The leading component is either "hh" or "d.hh".
    let (days, hours_part) = match hours_part.split_once('.') {
        Some((days, hours)) => (days.parse::<u64>().ok()?, hours),
        None => (0, hours_part),
    };
    let hours: u64 = hours_part.parse().ok()?;
    let minutes: u64 = minutes_part.parse().ok()?;

    let (seconds_part, fraction_millis) = match seconds_part.split_once('.') {
        Some((seconds, fraction)) => {
            let fraction: f64 = format!("0.{fraction}").parse().ok()?;
            (seconds, fraction * 1000.0)
        }
        None => (seconds_part, 0.0),
    };
    let seconds: u64 = seconds_part.parse().ok()?;

    let whole_millis = (((days * 24 + hours) * 60 + minutes) * 60 + seconds) * 1000;
    let millis = whole_millis as f64 + fraction_millis;
    Some(if negative { -millis } else { millis })
}

/// Parses a TRX timestamp.
///
/// The runner emits RFC 3339 timestamps with a UTC offset
/// (`2024-01-01T00:00:00.0000000+01:00`); offset-less local timestamps are
/// accepted as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// The difference `end - start` in milliseconds.
///
/// The result is not clamped: out-of-order timestamps yield a negative
/// duration, which callers surface as a diagnostic.
pub(crate) fn difference_in_millis(start: &str, end: &str) -> Option<f64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let delta = end.signed_duration_since(start);
    Some(match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1000.0,
        // Beyond the microsecond range; millisecond precision is plenty.
        None => delta.num_milliseconds() as f64,
    })
}
