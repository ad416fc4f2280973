//! Field normalization
//!
//! Pure conversions from raw interchange values to display fields: work
//! durations, priority buckets, timestamps and the finish-date fallback
//! chain. Nothing in here fails; unparseable input is either passed through
//! verbatim or reported as unknown.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use super::task::Priority;

/// Working hours per day used when converting work durations
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Renders a number with at most two decimals and no trailing zeros
fn format_number(value: f64) -> String {
    let rendered = format!("{:.2}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses an ISO-8601 duration (`PT16H0M0S`, `P2DT4H`, `PT7.5H`) into hours
///
/// Year and month designators have no fixed length and are rejected.
pub fn parse_duration_hours(raw: &str) -> Option<f64> {
    let rest = raw.trim().strip_prefix('P')?;
    let mut hours = 0.0;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            designator => {
                let value: f64 = number.parse().ok()?;
                number.clear();
                hours += match (in_time, designator) {
                    (false, 'W') => value * 168.0,
                    (false, 'D') => value * 24.0,
                    (true, 'H') => value,
                    (true, 'M') => value / 60.0,
                    (true, 'S') => value / 3600.0,
                    _ => return None,
                };
                saw_component = true;
            }
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Some(hours)
}

/// Formats a work duration for display
///
/// Durations of at least one working day render as `"<n> days"`, shorter
/// ones as `"<n> hours"`. Input that is not a duration is returned as-is.
pub fn format_duration(raw: &str, hours_per_day: f64) -> String {
    match parse_duration_hours(raw) {
        Some(hours) => format_hours(hours, hours_per_day),
        None => raw.to_string(),
    }
}

/// Formats an hour count using the working-day convention
pub fn format_hours(hours: f64, hours_per_day: f64) -> String {
    let days = hours / hours_per_day;
    if days >= 1.0 {
        format!("{} days", format_number(days))
    } else {
        format!("{} hours", format_number(hours))
    }
}

/// Maps a numeric priority (0..=1000 scale) to a bucket
pub fn format_priority(raw: &str) -> Priority {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Priority::Other(raw.to_string()),
    };

    if value < 500.0 {
        Priority::Low
    } else if value == 500.0 {
        Priority::Medium
    } else if value < 1000.0 {
        Priority::High
    } else {
        Priority::Critical
    }
}

/// Parses an interchange timestamp
///
/// Accepts local date-times with or without seconds, RFC 3339 timestamps
/// (the offset is dropped) and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts working hours into a calendar offset
///
/// Whole working days become whole calendar days; the remainder is added as
/// plain hours. Returns `None` for negative, non-finite or unrepresentable
/// durations.
pub fn working_offset(hours: f64, hours_per_day: f64) -> Option<Duration> {
    if !hours.is_finite() || hours < 0.0 || !hours_per_day.is_finite() || hours_per_day <= 0.0 {
        return None;
    }

    let days = (hours / hours_per_day).floor();
    if days >= i64::MAX as f64 {
        return None;
    }
    let remainder = hours - days * hours_per_day;

    Duration::try_days(days as i64)?
        .checked_add(&Duration::try_seconds((remainder * 3600.0).round() as i64)?)
}

/// How the finish date of a schedule was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSource {
    /// Both dates parsed from the document
    Given,
    /// Finish computed as start + work duration
    FromDuration,
    /// Finish set equal to start
    ZeroLength,
    /// Work duration too large to add to start; finish set equal to start
    OutOfRange,
    /// Finish preceded start and was moved up to it
    Clamped,
    /// No usable start date
    Unknown,
}

/// A resolved start/finish pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
    pub source: ScheduleSource,
}

/// Resolves start and finish dates, filling in a missing finish
///
/// Fallback chain: finish unparseable but start and duration present ⇒
/// start + duration; still unresolved but start present ⇒ start; no start ⇒
/// both unknown. A duration that overflows the calendar also yields start.
pub fn resolve_schedule(
    start: Option<&str>,
    finish: Option<&str>,
    duration: Option<&str>,
    hours_per_day: f64,
) -> Schedule {
    let Some(start) = start.and_then(parse_timestamp) else {
        return Schedule {
            start: None,
            finish: None,
            source: ScheduleSource::Unknown,
        };
    };

    if let Some(finish) = finish.and_then(parse_timestamp) {
        return if finish < start {
            Schedule {
                start: Some(start),
                finish: Some(start),
                source: ScheduleSource::Clamped,
            }
        } else {
            Schedule {
                start: Some(start),
                finish: Some(finish),
                source: ScheduleSource::Given,
            }
        };
    }

    if let Some(hours) = duration.and_then(parse_duration_hours) {
        let finish = working_offset(hours, hours_per_day)
            .and_then(|offset| start.checked_add_signed(offset));
        return match finish {
            Some(finish) => Schedule {
                start: Some(start),
                finish: Some(finish),
                source: ScheduleSource::FromDuration,
            },
            None => Schedule {
                start: Some(start),
                finish: Some(start),
                source: ScheduleSource::OutOfRange,
            },
        };
    }

    Schedule {
        start: Some(start),
        finish: Some(start),
        source: ScheduleSource::ZeroLength,
    }
}

/// Formats the calendar span between two dates as days
pub fn format_span(start: NaiveDateTime, finish: NaiveDateTime) -> String {
    let seconds = (finish - start).num_seconds().max(0) as f64;
    format!("{} days", format_number(seconds / 86_400.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn sixteen_hours_is_two_days() {
        assert_eq!(format_duration("PT16H0M0S", DEFAULT_HOURS_PER_DAY), "2 days");
    }

    #[test]
    fn four_hours_stays_in_hours() {
        assert_eq!(format_duration("PT4H0M0S", DEFAULT_HOURS_PER_DAY), "4 hours");
    }

    #[test]
    fn fractional_days_keep_two_decimals() {
        assert_eq!(format_duration("PT12H0M0S", DEFAULT_HOURS_PER_DAY), "1.5 days");
        assert_eq!(format_duration("PT10H0M0S", DEFAULT_HOURS_PER_DAY), "1.25 days");
        assert_eq!(format_duration("PT0H30M0S", DEFAULT_HOURS_PER_DAY), "0.5 hours");
        assert_eq!(format_duration("PT0H0M0S", DEFAULT_HOURS_PER_DAY), "0 hours");
    }

    #[test]
    fn day_designators_count_elapsed_hours() {
        assert_eq!(parse_duration_hours("P1DT4H"), Some(28.0));
        assert_eq!(parse_duration_hours("P1W"), Some(168.0));
        assert_eq!(parse_duration_hours("PT7.5H"), Some(7.5));
    }

    #[test]
    fn unparseable_duration_passes_through() {
        assert_eq!(format_duration("three days", DEFAULT_HOURS_PER_DAY), "three days");
        assert_eq!(format_duration("P1M", DEFAULT_HOURS_PER_DAY), "P1M");
        assert_eq!(format_duration("PT", DEFAULT_HOURS_PER_DAY), "PT");
        assert_eq!(format_duration("PT5", DEFAULT_HOURS_PER_DAY), "PT5");
    }

    #[test]
    fn custom_working_day_length() {
        assert_eq!(format_duration("PT16H0M0S", 4.0), "4 days");
    }

    #[test]
    fn priority_thresholds() {
        assert_eq!(format_priority("250"), Priority::Low);
        assert_eq!(format_priority("500"), Priority::Medium);
        assert_eq!(format_priority("750"), Priority::High);
        assert_eq!(format_priority("1000"), Priority::Critical);
        assert_eq!(format_priority("0"), Priority::Low);
        assert_eq!(format_priority("999"), Priority::High);
        assert_eq!(format_priority("1200"), Priority::Critical);
    }

    #[test]
    fn unmapped_priority_is_kept_verbatim() {
        assert_eq!(format_priority("urgent"), Priority::Other("urgent".to_string()));
        assert_eq!(format_priority(""), Priority::Other(String::new()));
    }

    #[test]
    fn timestamps_in_several_shapes() {
        assert_eq!(ts("2024-03-01T08:00:00"), ts("2024-03-01T08:00"));
        assert_eq!(ts("2024-03-01T08:00:00.000"), ts("2024-03-01T08:00:00"));
        assert_eq!(ts("2024-03-01T08:00:00+02:00"), ts("2024-03-01T08:00:00"));
        assert_eq!(ts("2024-03-01"), ts("2024-03-01T00:00:00"));
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("NA").is_none());
    }

    #[test]
    fn missing_finish_uses_work_duration() {
        let schedule = resolve_schedule(
            Some("2024-03-01T08:00:00"),
            None,
            Some("PT24H0M0S"),
            DEFAULT_HOURS_PER_DAY,
        );

        assert_eq!(schedule.source, ScheduleSource::FromDuration);
        assert_eq!(schedule.finish, Some(ts("2024-03-04T08:00:00")));
    }

    #[test]
    fn partial_working_day_adds_hours() {
        let schedule = resolve_schedule(
            Some("2024-03-01T08:00:00"),
            Some("garbage"),
            Some("PT12H0M0S"),
            DEFAULT_HOURS_PER_DAY,
        );

        assert_eq!(schedule.finish, Some(ts("2024-03-02T12:00:00")));
    }

    #[test]
    fn huge_duration_falls_back_to_start() {
        for duration in ["PT1000000000H0M0S", "PT999999999999999999999999999999H"] {
            let schedule = resolve_schedule(
                Some("2024-01-01T08:00:00"),
                None,
                Some(duration),
                DEFAULT_HOURS_PER_DAY,
            );

            assert_eq!(schedule.source, ScheduleSource::OutOfRange);
            assert_eq!(schedule.finish, schedule.start);
        }
    }

    #[test]
    fn working_offset_rejects_unrepresentable_hours() {
        assert_eq!(working_offset(12.0, 8.0), Some(Duration::days(1) + Duration::hours(4)));
        assert!(working_offset(f64::INFINITY, 8.0).is_none());
        assert!(working_offset(f64::NAN, 8.0).is_none());
        assert!(working_offset(-8.0, 8.0).is_none());
        assert!(working_offset(1e30, 8.0).is_none());
        assert!(working_offset(8.0, 0.0).is_none());
    }

    #[test]
    fn missing_finish_and_duration_is_zero_length() {
        let schedule = resolve_schedule(Some("2024-03-01T08:00:00"), None, None, DEFAULT_HOURS_PER_DAY);

        assert_eq!(schedule.source, ScheduleSource::ZeroLength);
        assert_eq!(schedule.finish, schedule.start);
    }

    #[test]
    fn missing_start_leaves_both_unknown() {
        let schedule = resolve_schedule(None, Some("2024-03-05T08:00:00"), Some("PT8H"), DEFAULT_HOURS_PER_DAY);

        assert_eq!(schedule.source, ScheduleSource::Unknown);
        assert!(schedule.start.is_none());
        assert!(schedule.finish.is_none());
    }

    #[test]
    fn finish_before_start_is_clamped() {
        let schedule = resolve_schedule(
            Some("2024-03-05T08:00:00"),
            Some("2024-03-01T08:00:00"),
            None,
            DEFAULT_HOURS_PER_DAY,
        );

        assert_eq!(schedule.source, ScheduleSource::Clamped);
        assert_eq!(schedule.finish, schedule.start);
    }

    #[test]
    fn span_in_calendar_days() {
        assert_eq!(format_span(ts("2024-03-01T08:00:00"), ts("2024-03-05T08:00:00")), "4 days");
        assert_eq!(format_span(ts("2024-03-01T08:00:00"), ts("2024-03-01T20:00:00")), "0.5 days");
        assert_eq!(format_span(ts("2024-03-01T08:00:00"), ts("2024-03-01T08:00:00")), "0 days");
    }
}
