// libs/appointment-cell/src/services/validation.rs
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::models::{SchedulingError, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"))
}

/// `YYYY-MM-DD`, and a real calendar date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, SchedulingError> {
    let raw = raw.trim();
    if !date_pattern().is_match(raw) {
        return Err(SchedulingError::validation(field, format!("'{}' is not in YYYY-MM-DD format", raw)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| SchedulingError::validation(field, format!("'{}' is not a valid date", raw)))
}

/// `HH:MM`, 24-hour clock.
pub fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, SchedulingError> {
    let raw = raw.trim();
    if !time_pattern().is_match(raw) {
        return Err(SchedulingError::validation(field, format!("'{}' is not in HH:MM 24h format", raw)));
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| SchedulingError::validation(field, format!("'{}' is not a valid time", raw)))
}

pub fn validate_duration(duration_minutes: i32) -> Result<i32, SchedulingError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(SchedulingError::validation(
            "duration_minutes",
            format!("must be between {} and {} minutes, got {}",
                    MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, duration_minutes),
        ));
    }
    Ok(duration_minutes)
}

pub fn validate_payment_amount(amount: Option<f64>) -> Result<(), SchedulingError> {
    match amount {
        Some(value) if !value.is_finite() || value < 0.0 => Err(SchedulingError::validation(
            "payment_amount",
            "must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn dates_need_strict_shape() {
        assert!(parse_date("scheduled_date", "2025-03-10").is_ok());
        assert_matches!(parse_date("scheduled_date", "2025-3-10"), Err(SchedulingError::Validation { field: "scheduled_date", .. }));
        assert_matches!(parse_date("scheduled_date", "2025-02-30"), Err(SchedulingError::Validation { .. }));
        assert_matches!(parse_date("scheduled_date", "10/03/2025"), Err(SchedulingError::Validation { .. }));
    }

    #[test]
    fn times_are_24h_minutes() {
        assert_eq!(parse_time("scheduled_time", "09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_time("scheduled_time", "23:59").is_ok());
        assert!(parse_time("scheduled_time", "24:00").is_err());
        assert!(parse_time("scheduled_time", "9:30").is_err());
        assert!(parse_time("scheduled_time", "09:30:00").is_err());
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(validate_duration(15).is_ok());
        assert!(validate_duration(480).is_ok());
        assert!(validate_duration(14).is_err());
        assert!(validate_duration(481).is_err());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-30).is_err());
    }

    #[test]
    fn payment_amount_must_be_non_negative() {
        assert!(validate_payment_amount(None).is_ok());
        assert!(validate_payment_amount(Some(150.0)).is_ok());
        assert!(validate_payment_amount(Some(-1.0)).is_err());
        assert!(validate_payment_amount(Some(f64::NAN)).is_err());
    }
}
