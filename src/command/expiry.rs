//! Turns the `--expiry` argument into an absolute timestamp.
//!
//! Accepted forms:
//! - `<n><unit>`: a positive interval, unit one of `s`, `m`, `h`, `d`
//! - `<day>.<month>`: a calendar date at the current time of day, rolled into
//!   next year when it already passed
//! - `never`: the status does not expire

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;

use super::registry::{ParameterKind, ParameterRegistry};
use super::tokenizer::Flags;

const NEVER: &str = "never";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpiryError {
    #[error("the expiry option needs a value, e.g. --expiry=3d")]
    MissingArgument,

    #[error("'{0}' is not a valid day.month date")]
    InvalidDate(String),

    #[error("'{0}' must be a positive interval")]
    NonPositiveInterval(String),

    #[error("'{0}' is not a valid interval")]
    InvalidInterval(String),

    #[error("'{0}' has an unknown unit, use s, m, h or d")]
    UnknownUnit(String),
}

/// How long a status lives when no expiry is given.
pub fn default_lifetime() -> Duration {
    Duration::days(1)
}

/// Resolve the expiry of a new status from its flags.
///
/// Without an expiry flag the status lives for [`default_lifetime`].
/// `Ok(None)` means the status never expires.
pub fn resolve_expiry(
    flags: &Flags,
    registry: &ParameterRegistry,
    reference: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ExpiryError> {
    let argument = registry
        .by_kind(ParameterKind::Expiry)
        .and_then(|parameter| flags.argument_for(parameter));

    match argument {
        None => Ok(Some(reference + default_lifetime())),
        Some(argument) => parse_expiry(argument, reference),
    }
}

/// Parse a single expiry argument relative to `reference`.
pub fn parse_expiry(
    argument: &str,
    reference: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ExpiryError> {
    let argument = argument.trim().to_lowercase();

    if argument.is_empty() {
        return Err(ExpiryError::MissingArgument);
    }
    if argument == NEVER {
        return Ok(None);
    }
    if argument.contains('.') {
        return parse_date(&argument, reference).map(Some);
    }
    parse_interval(&argument, reference).map(Some)
}

fn parse_date(argument: &str, reference: DateTime<Utc>) -> Result<DateTime<Utc>, ExpiryError> {
    let invalid = || ExpiryError::InvalidDate(argument.to_string());

    let (day, month) = argument.split_once('.').ok_or_else(invalid)?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    let at_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| date.and_time(reference.time()).and_utc())
            .ok_or_else(invalid)
    };

    let this_year = at_year(reference.year())?;
    if this_year < reference {
        at_year(reference.year() + 1)
    } else {
        Ok(this_year)
    }
}

fn parse_interval(argument: &str, reference: DateTime<Utc>) -> Result<DateTime<Utc>, ExpiryError> {
    let invalid = || ExpiryError::InvalidInterval(argument.to_string());

    let unit = argument.chars().last().ok_or_else(invalid)?;
    let amount = &argument[..argument.len() - unit.len_utf8()];

    let to_duration: fn(i64) -> Option<Duration> = match unit {
        's' => Duration::try_seconds,
        'm' => Duration::try_minutes,
        'h' => Duration::try_hours,
        'd' => Duration::try_days,
        _ if unit.is_ascii_digit() => return Err(invalid()),
        _ => return Err(ExpiryError::UnknownUnit(argument.to_string())),
    };

    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(ExpiryError::NonPositiveInterval(argument.to_string()));
    }

    to_duration(amount)
        .and_then(|interval| reference.checked_add_signed(interval))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tokenize;
    use chrono::TimeZone;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::load_default().unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn resolve(command: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, ExpiryError> {
        let registry = registry();
        let parsed = tokenize(command, &registry);
        resolve_expiry(&parsed.flags, &registry, now)
    }

    #[test]
    fn defaults_to_one_day() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve_expiry(&Flags::new(), &registry(), now), Ok(Some(now + Duration::days(1))));
    }

    #[test]
    fn relative_intervals() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry=3d x", now), Ok(Some(now + Duration::days(3))));
        assert_eq!(resolve("--expiry=5h x", now), Ok(Some(now + Duration::hours(5))));
        assert_eq!(resolve("--expiry=90m x", now), Ok(Some(now + Duration::minutes(90))));
        assert_eq!(resolve("--expires=45s x", now), Ok(Some(now + Duration::seconds(45))));
    }

    #[test]
    fn zero_or_negative_interval_is_rejected() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(
            resolve("--expiry=0d x", now),
            Err(ExpiryError::NonPositiveInterval("0d".to_string()))
        );
        assert!(matches!(
            resolve("--expiry=-2h x", now),
            Err(ExpiryError::NonPositiveInterval(_))
        ));
    }

    #[test]
    fn malformed_intervals_are_rejected() {
        let now = at(2024, 4, 1, 9, 30);
        assert!(matches!(resolve("--expiry=3w x", now), Err(ExpiryError::UnknownUnit(_))));
        assert!(matches!(resolve("--expiry=xd x", now), Err(ExpiryError::InvalidInterval(_))));
        assert!(matches!(resolve("--expiry=12 x", now), Err(ExpiryError::InvalidInterval(_))));
        assert!(matches!(
            resolve("--expiry=99999999999999d x", now),
            Err(ExpiryError::InvalidInterval(_))
        ));
    }

    #[test]
    fn empty_argument_is_rejected() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry x", now), Err(ExpiryError::MissingArgument));
        assert_eq!(resolve("--expiry= x", now), Err(ExpiryError::MissingArgument));
    }

    #[test]
    fn date_later_this_year_keeps_the_year() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry=24.12 x", now), Ok(Some(at(2024, 12, 24, 9, 30))));
    }

    #[test]
    fn date_already_passed_rolls_into_next_year() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry=10.03 x", now), Ok(Some(at(2025, 3, 10, 9, 30))));
    }

    #[test]
    fn today_at_the_same_time_is_not_rolled() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry=1.4 x", now), Ok(Some(now)));
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        let now = at(2024, 4, 1, 9, 30);
        assert!(matches!(resolve("--expiry=32.01 x", now), Err(ExpiryError::InvalidDate(_))));
        assert!(matches!(resolve("--expiry=10.13 x", now), Err(ExpiryError::InvalidDate(_))));
        assert!(matches!(resolve("--expiry=1.2.3 x", now), Err(ExpiryError::InvalidDate(_))));
        assert!(matches!(resolve("--expiry=.5 x", now), Err(ExpiryError::InvalidDate(_))));
    }

    #[test]
    fn leap_day_rolling_into_a_common_year_is_rejected() {
        let now = at(2024, 3, 1, 9, 30);
        assert!(matches!(resolve("--expiry=29.02 x", now), Err(ExpiryError::InvalidDate(_))));
    }

    #[test]
    fn never_means_no_expiry() {
        let now = at(2024, 4, 1, 9, 30);
        assert_eq!(resolve("--expiry=never x", now), Ok(None));
    }
}
