use crate::types::{GridError, GridResult};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Position of the timestamp token in an underscore-delimited batch id
const TIMESTAMP_SEGMENT: usize = 2;

/// Length of the packed YYYYDDDHHMMSS token
const TIMESTAMP_LEN: usize = 13;

/// Extract the acquisition time embedded in a batch identifier.
///
/// Identifiers look like `GEDI02_B_2019018115033_O00957_...`; the third
/// underscore-delimited segment of the basename is a packed UTC timestamp of
/// year, day-of-year, hour, minute, second. The token is sliced at fixed
/// widths rather than handed to a format string because the fields have no
/// separators.
pub fn parse_acquisition_time(asset_id: &str) -> GridResult<DateTime<Utc>> {
    let basename = asset_id.rsplit('/').next().unwrap_or(asset_id);
    let token = basename.split('_').nth(TIMESTAMP_SEGMENT).ok_or_else(|| {
        GridError::Format(format!(
            "no timestamp segment in batch id '{}'",
            asset_id
        ))
    })?;

    if token.len() != TIMESTAMP_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GridError::Format(format!(
            "timestamp token '{}' in batch id '{}' is not {} digits",
            token, asset_id, TIMESTAMP_LEN
        )));
    }

    let field = |range: std::ops::Range<usize>| -> GridResult<u32> {
        token[range]
            .parse()
            .map_err(|_| GridError::Format(format!("unparseable timestamp field in '{}'", token)))
    };

    let year = field(0..4)? as i32;
    let ordinal = field(4..7)?;
    let hour = field(7..9)?;
    let minute = field(9..11)?;
    let second = field(11..13)?;

    let naive = NaiveDate::from_yo_opt(year, ordinal)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            GridError::Format(format!(
                "timestamp token '{}' is not a valid UTC date-time",
                token
            ))
        })?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Convert a calendar datetime into mission delta-time seconds.
///
/// Delta-time is seconds since 2018-01-01T00:00:00 computed by naive calendar
/// subtraction, matching how the upstream ingestion populates the
/// `delta_time` field on shot records. Do not fold this into
/// `metadata_timestamp_ms`: the two conversions use different epoch and
/// timezone handling, and the record time filter depends on this one.
pub fn mission_epoch_seconds(moment: DateTime<Utc>) -> f64 {
    // Both constructions are infallible for these literals; fall back to zero
    // offset rather than panicking in library code.
    let offset = NaiveDate::from_ymd_opt(2018, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .zip(NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|(mission, unix)| (mission - unix).num_seconds())
        .unwrap_or(0);
    moment.timestamp() as f64 - offset as f64
}

/// Convert a calendar datetime into epoch milliseconds for product metadata.
///
/// The datetime's calendar fields are interpreted in the host's local
/// timezone, which is what the export system records for time_start/time_end.
/// This intentionally differs from `mission_epoch_seconds`.
pub fn metadata_timestamp_ms(moment: DateTime<Utc>) -> i64 {
    let naive = moment.naive_utc();
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.timestamp() * 1000,
        // Ambiguous or skipped local times (DST transitions) fall back to UTC
        None => moment.timestamp() * 1000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_acquisition_time() {
        let parsed =
            parse_acquisition_time("GEDI02_B_2019018115033_O00957_T03334_02_001_01").unwrap();
        // Day 018 of 2019 is January 18
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 1, 18, 11, 50, 33).unwrap());
    }

    #[test]
    fn test_parse_acquisition_time_strips_path() {
        let parsed = parse_acquisition_time(
            "projects/x/assets/tables/GEDI02_B_2020200000000_O00001_T00001",
        )
        .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 7, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_missing_segment() {
        let err = parse_acquisition_time("GEDI02_B").unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
    }

    #[test]
    fn test_parse_rejects_short_token() {
        let err = parse_acquisition_time("GEDI02_B_2019018_O00957").unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
    }

    #[test]
    fn test_parse_rejects_non_digit_token() {
        let err = parse_acquisition_time("GEDI02_B_2019018x15033_O00957").unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_day_of_year() {
        // Day 366 of a non-leap year
        let err = parse_acquisition_time("GEDI02_B_2019366115033_O00957").unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
    }

    #[test]
    fn test_mission_epoch_zero_at_mission_start() {
        let t = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(mission_epoch_seconds(t), 0.0);
    }

    #[test]
    fn test_mission_epoch_one_day_in() {
        let t = Utc.with_ymd_and_hms(2018, 1, 2, 0, 0, 0).unwrap();
        assert_relative_eq!(mission_epoch_seconds(t), 86_400.0);
    }

    #[test]
    fn test_mission_epoch_monotonic_over_window() {
        let start = Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap();
        assert!(mission_epoch_seconds(start) < mission_epoch_seconds(end));
    }

    #[test]
    fn test_metadata_timestamp_is_milliseconds() {
        let t = Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap();
        let ms = metadata_timestamp_ms(t);
        // Whole seconds regardless of host timezone
        assert_eq!(ms % 1000, 0);
        // Within a day of the UTC epoch value, for any sane host offset
        assert!((ms - t.timestamp() * 1000).abs() <= 86_400_000);
    }
}
