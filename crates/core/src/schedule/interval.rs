//! Interval arithmetic over UTC timestamps.
//!
//! Every occurrence is computed from the anchor, never from the previous
//! occurrence, so a day-of-month that had to be clamped in a short month
//! is restored in the following longer month.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::ScheduleError;

/// Unit an installment schedule advances by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalUnit {
    /// One day per step.
    Daily,
    /// Seven days per step.
    Weekly,
    /// One calendar month per step.
    #[default]
    Monthly,
    /// Three calendar months per step.
    Quarterly,
    /// Twelve calendar months per step.
    Yearly,
    /// A caller-supplied number of days per step.
    Custom,
    /// Any tag this engine does not recognise. Treated as monthly.
    #[serde(other)]
    Unknown,
}

/// Concrete step size an [`IntervalUnit`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalStep {
    /// Fixed number of days.
    Days(u32),
    /// Fixed number of calendar months.
    Months(u32),
}

impl IntervalUnit {
    /// Resolves the step size, falling back to one month for
    /// [`IntervalUnit::Unknown`] and for a custom unit without a positive day count.
    #[must_use]
    pub fn step(self, custom_day_count: Option<u32>) -> IntervalStep {
        match self {
            Self::Daily => IntervalStep::Days(1),
            Self::Weekly => IntervalStep::Days(7),
            Self::Monthly => IntervalStep::Months(1),
            Self::Quarterly => IntervalStep::Months(3),
            Self::Yearly => IntervalStep::Months(12),
            Self::Custom => match custom_day_count {
                Some(days) if days > 0 => IntervalStep::Days(days),
                _ => IntervalStep::Months(1),
            },
            Self::Unknown => IntervalStep::Months(1),
        }
    }

    /// Returns true when [`IntervalUnit::step`] has to use the monthly fallback.
    #[must_use]
    pub fn falls_back(self, custom_day_count: Option<u32>) -> bool {
        match self {
            Self::Unknown => true,
            Self::Custom => !matches!(custom_day_count, Some(days) if days > 0),
            _ => false,
        }
    }
}

/// Returns the date of the occurrence `offset` intervals after `anchor`.
///
/// Month-based units clamp the day-of-month to the target month's length.
///
/// # Errors
///
/// Returns `ScheduleError::DateOutOfRange` if the result overflows chrono's range.
pub fn add_interval(
    anchor: DateTime<Utc>,
    unit: IntervalUnit,
    offset: u32,
    custom_day_count: Option<u32>,
) -> Result<DateTime<Utc>, ScheduleError> {
    let out_of_range = || ScheduleError::DateOutOfRange { anchor, offset };

    match unit.step(custom_day_count) {
        IntervalStep::Days(days) => {
            let total = u64::from(days) * u64::from(offset);
            anchor
                .checked_add_days(Days::new(total))
                .ok_or_else(out_of_range)
        }
        IntervalStep::Months(months) => {
            let total = months.checked_mul(offset).ok_or_else(out_of_range)?;
            anchor
                .checked_add_months(Months::new(total))
                .ok_or_else(out_of_range)
        }
    }
}

/// Signed month difference from `anchor` to the target month, clamped at zero.
#[must_use]
pub fn periods_between(anchor: DateTime<Utc>, target_year: i32, target_month: u32) -> u32 {
    let months = (i64::from(target_year) - i64::from(anchor.year())) * 12
        + i64::from(target_month)
        - i64::from(anchor.month());
    u32::try_from(months.max(0)).unwrap_or(u32::MAX)
}

/// Largest `k` such that `add_interval(anchor, unit, k)` is not after `target`.
///
/// Zero when `target` precedes `anchor`.
///
/// # Errors
///
/// Returns `ScheduleError::DateOutOfRange` if the candidate date overflows.
pub fn elapsed_periods(
    anchor: DateTime<Utc>,
    target: DateTime<Utc>,
    unit: IntervalUnit,
    custom_day_count: Option<u32>,
) -> Result<u32, ScheduleError> {
    if target <= anchor {
        return Ok(0);
    }

    match unit.step(custom_day_count) {
        IntervalStep::Days(days) => {
            let elapsed_days = (target - anchor).num_days();
            let steps = elapsed_days / i64::from(days);
            Ok(u32::try_from(steps).unwrap_or(u32::MAX))
        }
        IntervalStep::Months(months) => {
            let steps = periods_between(anchor, target.year(), target.month()) / months;
            if steps > 0 && add_interval(anchor, unit, steps, custom_day_count)? > target {
                Ok(steps - 1)
            } else {
                Ok(steps)
            }
        }
    }
}

/// Returns the month following `(year, month)`.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` if `month` is not in `1..=12`.
pub fn next_month(year: i32, month: u32) -> Result<(i32, u32), ScheduleError> {
    match month {
        12 => Ok((year + 1, 1)),
        1..=11 => Ok((year, month + 1)),
        _ => Err(ScheduleError::InvalidMonth { year, month }),
    }
}

/// Number of days in the given month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, ScheduleError> {
    let invalid = || ScheduleError::InvalidMonth { year, month };
    let (next_year, next) = next_month(year, month)?;
    let last_day = NaiveDate::from_ymd_opt(next_year, next, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(invalid)?;
    Ok(last_day.day())
}

/// Projects `day` onto the given month, clamping to the month's last day.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` for an invalid month.
pub fn clamp_day(year: i32, month: u32, day: u32) -> Result<NaiveDate, ScheduleError> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
        .ok_or(ScheduleError::InvalidMonth { year, month })
}

/// Midnight UTC on the first day of the given month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` for an invalid month.
pub fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, ScheduleError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or(ScheduleError::InvalidMonth { year, month })
}

/// Moves `timestamp` into the given month, keeping its time-of-day and
/// its (clamped) day-of-month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` for an invalid month.
pub fn project_onto_month(
    timestamp: DateTime<Utc>,
    year: i32,
    month: u32,
) -> Result<DateTime<Utc>, ScheduleError> {
    let date = clamp_day(year, month, timestamp.day())?;
    Ok(move_to_date(timestamp, date))
}

/// Moves `timestamp` onto `date`, keeping its time-of-day.
#[must_use]
pub fn move_to_date(timestamp: DateTime<Utc>, date: NaiveDate) -> DateTime<Utc> {
    date.and_time(timestamp.time()).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 30, 0).unwrap()
    }

    #[rstest]
    #[case(IntervalUnit::Daily, 3, None, at(2024, 1, 18))]
    #[case(IntervalUnit::Weekly, 2, None, at(2024, 1, 29))]
    #[case(IntervalUnit::Monthly, 2, None, at(2024, 3, 15))]
    #[case(IntervalUnit::Quarterly, 2, None, at(2024, 7, 15))]
    #[case(IntervalUnit::Yearly, 1, None, at(2025, 1, 15))]
    #[case(IntervalUnit::Custom, 3, Some(10), at(2024, 2, 14))]
    #[case(IntervalUnit::Custom, 1, None, at(2024, 2, 15))]
    #[case(IntervalUnit::Unknown, 1, None, at(2024, 2, 15))]
    fn test_add_interval(
        #[case] unit: IntervalUnit,
        #[case] offset: u32,
        #[case] custom: Option<u32>,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(add_interval(at(2024, 1, 15), unit, offset, custom).unwrap(), expected);
    }

    #[test]
    fn test_add_interval_zero_offset_is_anchor() {
        let anchor = at(2024, 5, 31);
        assert_eq!(add_interval(anchor, IntervalUnit::Monthly, 0, None).unwrap(), anchor);
    }

    #[test]
    fn test_monthly_clamps_and_restores_day() {
        let anchor = at(2024, 1, 31);
        assert_eq!(
            add_interval(anchor, IntervalUnit::Monthly, 1, None).unwrap(),
            at(2024, 2, 29)
        );
        assert_eq!(
            add_interval(anchor, IntervalUnit::Monthly, 2, None).unwrap(),
            at(2024, 3, 31)
        );
        assert_eq!(
            add_interval(at(2023, 1, 31), IntervalUnit::Monthly, 1, None).unwrap(),
            at(2023, 2, 28)
        );
    }

    #[test]
    fn test_add_interval_overflow() {
        let result = add_interval(at(2024, 1, 1), IntervalUnit::Yearly, u32::MAX, None);
        assert!(matches!(result, Err(ScheduleError::DateOutOfRange { .. })));
    }

    #[test]
    fn test_periods_between() {
        let anchor = at(2024, 11, 20);
        assert_eq!(periods_between(anchor, 2024, 11), 0);
        assert_eq!(periods_between(anchor, 2025, 2), 3);
        assert_eq!(periods_between(anchor, 2024, 6), 0);
        assert_eq!(periods_between(anchor, 2023, 12), 0);
    }

    #[test]
    fn test_elapsed_periods_monthly() {
        let anchor = at(2024, 1, 15);
        assert_eq!(elapsed_periods(anchor, at(2024, 3, 14), IntervalUnit::Monthly, None).unwrap(), 1);
        assert_eq!(elapsed_periods(anchor, at(2024, 3, 15), IntervalUnit::Monthly, None).unwrap(), 2);
        assert_eq!(elapsed_periods(anchor, at(2023, 3, 15), IntervalUnit::Monthly, None).unwrap(), 0);
        assert_eq!(elapsed_periods(anchor, at(2025, 2, 1), IntervalUnit::Quarterly, None).unwrap(), 4);
    }

    #[test]
    fn test_elapsed_periods_days() {
        let anchor = at(2024, 1, 1);
        assert_eq!(elapsed_periods(anchor, at(2024, 1, 15), IntervalUnit::Weekly, None).unwrap(), 2);
        assert_eq!(elapsed_periods(anchor, at(2024, 1, 14), IntervalUnit::Weekly, None).unwrap(), 1);
        assert_eq!(elapsed_periods(anchor, at(2024, 1, 31), IntervalUnit::Custom, Some(15)).unwrap(), 2);
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u32, #[case] expected: u32) {
        assert_eq!(days_in_month(year, month).unwrap(), expected);
    }

    #[test]
    fn test_clamp_day() {
        assert_eq!(clamp_day(2024, 2, 31).unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(clamp_day(2023, 2, 31).unwrap(), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert_eq!(clamp_day(2024, 3, 15).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(clamp_day(2024, 13, 1).is_err());
    }

    #[test]
    fn test_next_month_and_month_start() {
        assert_eq!(next_month(2024, 12).unwrap(), (2025, 1));
        assert_eq!(next_month(2024, 3).unwrap(), (2024, 4));
        assert!(next_month(2024, 0).is_err());
        assert_eq!(
            month_start(2024, 4).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_project_onto_month_keeps_time() {
        let projected = project_onto_month(at(2024, 1, 31), 2024, 4).unwrap();
        assert_eq!(projected, at(2024, 4, 30));
    }

    #[test]
    fn test_falls_back() {
        assert!(IntervalUnit::Unknown.falls_back(None));
        assert!(IntervalUnit::Custom.falls_back(Some(0)));
        assert!(!IntervalUnit::Custom.falls_back(Some(5)));
    }

    #[test]
    fn test_unknown_tag_deserializes() {
        let unit: IntervalUnit = serde_json::from_str("\"BIWEEKLY\"").unwrap();
        assert_eq!(unit, IntervalUnit::Unknown);
        let unit: IntervalUnit = serde_json::from_str("\"YEARLY\"").unwrap();
        assert_eq!(unit, IntervalUnit::Yearly);
    }
}
