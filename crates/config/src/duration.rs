//! Human-friendly duration strings.
//!
//! A duration is one or more whitespace-separated `<number><unit>` tokens,
//! summed: `"15s"`, `"1h 30m"`, `"2d 12h"`. Units are `y` (365 days),
//! `M` (30 days), `d`, `h`, `m` and `s`. Numbers may be fractional.

use std::time::Duration;

use crate::error::{Error, Result};

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 60.0 * SECS_PER_MINUTE;
const SECS_PER_DAY: f64 = 24.0 * SECS_PER_HOUR;

fn unit_seconds(unit: &str) -> Option<f64> {
    Some(match unit {
        "y" => 365.0 * SECS_PER_DAY,
        "M" => 30.0 * SECS_PER_DAY,
        "d" => SECS_PER_DAY,
        "h" => SECS_PER_HOUR,
        "m" => SECS_PER_MINUTE,
        "s" => 1.0,
        _ => return None,
    })
}

/// Parse a duration string.
///
/// # Errors
///
/// [`Error::InvalidDuration`] for empty input, a token without a unit, an
/// unknown unit, or a number that does not parse or is negative.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let mut total = 0.0_f64;
    let mut tokens = 0;

    for token in input.split_whitespace() {
        tokens += 1;
        let split = token
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::invalid_duration(input, format!("'{token}' has no unit")))?;
        let (number, unit) = token.split_at(split);
        let seconds = unit_seconds(unit).ok_or_else(|| {
            Error::invalid_duration(input, format!("unknown unit '{unit}' (expected y/M/d/h/m/s)"))
        })?;
        let value: f64 = number
            .parse()
            .map_err(|_| Error::invalid_duration(input, format!("invalid number '{number}'")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_duration(input, format!("invalid number '{number}'")));
        }
        total += value * seconds;
    }

    if tokens == 0 {
        return Err(Error::invalid_duration(input, "empty duration string"));
    }
    Duration::try_from_secs_f64(total).map_err(|e| Error::invalid_duration(input, e.to_string()))
}

/// Format a duration back into the largest whole units, e.g. `"1h 30m"`.
pub fn format_duration(duration: Duration) -> String {
    const UNITS: [(&str, u64); 6] = [
        ("y", 365 * 86_400),
        ("M", 30 * 86_400),
        ("d", 86_400),
        ("h", 3_600),
        ("m", 60),
        ("s", 1),
    ];
    let mut secs = duration.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }
    let mut parts = Vec::new();
    for (unit, size) in UNITS {
        if secs >= size {
            parts.push(format!("{}{unit}", secs / size));
            secs %= size;
        }
    }
    parts.join(" ")
}

/// Serde adapter for `Duration` fields written as duration strings.
pub mod serde_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter for `Option<Duration>` fields written as duration strings.
pub mod serde_str_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&super::format_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_duration(&raw).map_err(D::Error::custom))
            .transpose()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("15s", 15)]
    #[case("5m", 300)]
    #[case("2h", 7_200)]
    #[case("1d", 86_400)]
    #[case("1M", 2_592_000)]
    #[case("1y", 31_536_000)]
    #[case("1h 30m", 5_400)]
    #[case("  1m   1s ", 61)]
    fn parses_units(#[case] input: &str, #[case] secs: u64) {
        assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(secs));
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1_500));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("15")]
    #[case("15x")]
    #[case("s")]
    #[case("-5s")]
    #[case("1h nope")]
    fn rejects_bad_input(#[case] input: &str) {
        let err = parse_duration(input).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration { .. }), "{input}: {err}");
    }

    #[test]
    fn format_uses_largest_units() {
        assert_eq!(format_duration(Duration::from_secs(5_400)), "1h 30m");
        assert_eq!(format_duration(Duration::from_secs(15)), "15s");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
