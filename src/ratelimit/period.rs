//! Refill period parsing and formatting.
//!
//! Periods are written either in ISO-8601 form (`PT1M`, `PT0.5S`, `P1DT2H`),
//! in humantime form (`500ms`, `30s`, `1m`, `2h 30m`, `1d`), or as a bare
//! number of seconds. They are always rendered back in ISO-8601 form.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Parse a period string into a [`Duration`].
pub fn parse_period(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    if let Some(rest) = input.strip_prefix(['P', 'p']) {
        return parse_iso8601(rest).ok_or_else(|| format!("invalid ISO-8601 duration '{}'", input));
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| format!("invalid duration '{}': {}", input, e));
    }

    humantime::parse_duration(input).map_err(|e| format!("invalid duration '{}': {}", input, e))
}

/// Render a duration in ISO-8601 form, e.g. `PT1M` or `PT1H30M` or `PT0.25S`.
pub fn format_period(duration: Duration) -> String {
    let total = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if total == 0 && nanos == 0 {
        return "PT0S".to_string();
    }

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 || nanos > 0 {
        out.push_str(&seconds.to_string());
        if nanos > 0 {
            let fraction = format!("{:09}", nanos);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push('S');
    }
    out
}

fn parse_iso8601(rest: &str) -> Option<Duration> {
    let rest = rest.to_ascii_uppercase();
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date.to_string(), time.to_string())
        }
        None => (rest, String::new()),
    };

    let mut total = Duration::ZERO;
    let mut seen_component = false;

    if !date.is_empty() {
        let days: u64 = date.strip_suffix('D')?.parse().ok()?;
        total = total.checked_add(Duration::from_secs(days.checked_mul(86_400)?))?;
        seen_component = true;
    }

    let mut number = String::new();
    for c in time.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' => {
                let value: u64 = number.parse().ok()?;
                let factor = if c == 'H' { 3600 } else { 60 };
                total = total.checked_add(Duration::from_secs(value.checked_mul(factor)?))?;
                number.clear();
                seen_component = true;
            }
            'S' => {
                total = total.checked_add(parse_fractional_seconds(&number)?)?;
                number.clear();
                seen_component = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !seen_component {
        return None;
    }
    Some(total)
}

fn parse_fractional_seconds(number: &str) -> Option<Duration> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    let secs: u64 = whole.parse().ok()?;
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse::<u32>().ok()?
    };
    Some(Duration::new(secs, nanos))
}

/// Serde adapter for `Duration` fields written as period strings.
pub mod serde_period {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_period(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PeriodVisitor)
    }

    struct PeriodVisitor;

    impl<'de> Visitor<'de> for PeriodVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a duration such as \"PT1M\", \"30s\" or a number of seconds")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("negative duration: {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            parse_period(v).map_err(E::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso8601() {
        assert_eq!(parse_period("PT1M").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_period("PT1H30M").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_period("PT0.5S").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_period("P1DT1S").unwrap(), Duration::from_secs(86_401));
        assert_eq!(parse_period("pt10s").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(parse_period("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_period("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_period("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_period("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_period("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_period("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_period("1h 30m").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_period("").is_err());
        assert!(parse_period("PT").is_err());
        assert!(parse_period("P").is_err());
        assert!(parse_period("PT5X").is_err());
        assert!(parse_period("PT5").is_err());
        assert!(parse_period("ten seconds").is_err());
        assert!(parse_period("5 fortnights").is_err());
    }

    #[test]
    fn test_overflowing_iso8601_is_an_error() {
        assert!(parse_period("PT5000000000000000H300000000000000000M").is_err());
        assert!(parse_period("P213503982334601DT18446744073709551615S").is_err());
        assert!(parse_period("PT18446744073709551615S18446744073709551615S").is_err());
    }

    #[test]
    fn test_format_period() {
        assert_eq!(format_period(Duration::from_secs(60)), "PT1M");
        assert_eq!(format_period(Duration::from_secs(5400)), "PT1H30M");
        assert_eq!(format_period(Duration::from_secs(86_400)), "PT24H");
        assert_eq!(format_period(Duration::from_millis(250)), "PT0.25S");
        assert_eq!(format_period(Duration::from_secs(61)), "PT1M1S");
        assert_eq!(format_period(Duration::ZERO), "PT0S");
    }

    #[test]
    fn test_format_parses_back() {
        for secs in [1, 59, 60, 3599, 3661, 90_000] {
            let d = Duration::from_secs(secs);
            assert_eq!(parse_period(&format_period(d)).unwrap(), d);
        }
    }
}
