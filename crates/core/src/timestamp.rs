use std::fmt;
use std::sync::OnceLock;

use chrono::FixedOffset;
use regex::Regex;

/// Display value used when an exported timestamp cannot be read
pub const UNKNOWN_TIME: &str = "Unknown time";

// `DD.MM.YYYY HH:MM:SS UTC±HH:MM`, anchored at the start only
const EXPORT_TIME_PATTERN: &str =
    r"^([0-9]{2})\.([0-9]{2})\.([0-9]{4})\s+([0-9]{2}):([0-9]{2}):([0-9]{2})\s+UTC([+-][0-9]{2}):([0-9]{2})";

fn export_time_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(EXPORT_TIME_PATTERN).ok()).as_ref()
}

/// Date and time fields exactly as written in the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    /// Parsed for completeness, never applied to the displayed time
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalTime {
    Known(ParsedTimestamp),
    Unknown,
}

impl CanonicalTime {
    pub fn is_known(&self) -> bool {
        matches!(self, CanonicalTime::Known(_))
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalTime::Known(ts) => write!(
                f,
                "{}/{}/{} - {}:{}:{}",
                ts.day, ts.month, ts.year, ts.hour, ts.minute, ts.second
            ),
            CanonicalTime::Unknown => f.write_str(UNKNOWN_TIME),
        }
    }
}

/// Normalizes an exported timestamp such as `05.03.2022 14:30:00 UTC+02:00`
/// into `05/03/2022 - 14:30:00`. No timezone conversion is performed.
/// Absent or non-matching input yields `CanonicalTime::Unknown`.
pub fn normalize_timestamp(raw: Option<&str>) -> CanonicalTime {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return CanonicalTime::Unknown;
    };
    let Some(caps) = export_time_regex().and_then(|re| re.captures(raw)) else {
        return CanonicalTime::Unknown;
    };

    let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
    let offset = parse_offset(&field(7), &field(8));

    CanonicalTime::Known(ParsedTimestamp {
        day: field(1),
        month: field(2),
        year: field(3),
        hour: field(4),
        minute: field(5),
        second: field(6),
        offset,
    })
}

/// `+02` / `30` -> UTC+02:30. Out-of-range offsets are dropped.
fn parse_offset(hours: &str, minutes: &str) -> Option<FixedOffset> {
    let sign = if hours.starts_with('-') { -1 } else { 1 };
    let h: i32 = hours.trim_start_matches(['+', '-']).parse().ok()?;
    let m: i32 = minutes.parse().ok()?;
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_timestamp_positive_offset() {
        let result = normalize_timestamp(Some("05.03.2022 14:30:00 UTC+02:00"));
        assert_eq!(result.to_string(), "05/03/2022 - 14:30:00");
    }

    #[test]
    fn test_normalize_timestamp_negative_offset_is_not_applied() {
        let result = normalize_timestamp(Some("31.12.2021 23:59:59 UTC-05:00"));
        assert_eq!(result.to_string(), "31/12/2021 - 23:59:59");
    }

    #[test]
    fn test_normalize_timestamp_keeps_offset_separately() {
        match normalize_timestamp(Some("05.03.2022 14:30:00 UTC-03:30")) {
            CanonicalTime::Known(ts) => {
                assert_eq!(ts.offset, FixedOffset::west_opt(3 * 3600 + 30 * 60));
            }
            CanonicalTime::Unknown => panic!("expected a known timestamp"),
        }
    }

    #[test]
    fn test_normalize_timestamp_out_of_range_offset_still_known() {
        let result = normalize_timestamp(Some("05.03.2022 14:30:00 UTC+99:00"));
        assert!(result.is_known());
        assert_eq!(result.to_string(), "05/03/2022 - 14:30:00");
    }

    #[test]
    fn test_normalize_timestamp_is_pure_rearrangement() {
        // Field values are not validated as a calendar date
        let result = normalize_timestamp(Some("99.42.0001 77:88:99 UTC+00:00"));
        assert_eq!(result.to_string(), "99/42/0001 - 77:88:99");
    }

    #[test]
    fn test_normalize_timestamp_trailing_text_ignored() {
        let result = normalize_timestamp(Some("05.03.2022 14:30:00 UTC+02:00 (edited)"));
        assert_eq!(result.to_string(), "05/03/2022 - 14:30:00");
    }

    #[test]
    fn test_normalize_timestamp_absent() {
        assert_eq!(normalize_timestamp(None), CanonicalTime::Unknown);
        assert_eq!(normalize_timestamp(Some("")), CanonicalTime::Unknown);
    }

    #[test]
    fn test_normalize_timestamp_non_matching() {
        for raw in [
            "not-a-timestamp",
            "2022-03-05T14:30:00Z",
            "5.3.2022 14:30:00 UTC+02:00",
            "05.03.2022 14:30 UTC+02:00",
            "05.03.2022 14:30:00",
            " 05.03.2022 14:30:00 UTC+02:00",
        ] {
            assert_eq!(normalize_timestamp(Some(raw)), CanonicalTime::Unknown, "{raw}");
        }
    }

    #[test]
    fn test_unknown_time_display() {
        assert_eq!(CanonicalTime::Unknown.to_string(), UNKNOWN_TIME);
    }
}
