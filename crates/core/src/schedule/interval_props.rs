//! Property-based tests for interval arithmetic.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use proptest::prelude::*;

use super::interval::{
    IntervalUnit, add_interval, days_in_month, elapsed_periods, periods_between,
    project_onto_month,
};

fn anchor_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (2000i32..2100, 1u32..=12, 1u32..=31, 0u32..24, 0u32..60).prop_map(
        |(year, month, day, hour, minute)| {
            let day = day.min(days_in_month(year, month).unwrap());
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
        },
    )
}

fn unit_strategy() -> impl Strategy<Value = IntervalUnit> {
    prop_oneof![
        Just(IntervalUnit::Daily),
        Just(IntervalUnit::Weekly),
        Just(IntervalUnit::Monthly),
        Just(IntervalUnit::Quarterly),
        Just(IntervalUnit::Yearly),
        Just(IntervalUnit::Custom),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Monthly offsets land in the expected month with a clamped day.
    #[test]
    fn prop_monthly_lands_in_target_month(anchor in anchor_strategy(), offset in 0u32..240) {
        let result = add_interval(anchor, IntervalUnit::Monthly, offset, None).unwrap();
        prop_assert_eq!(periods_between(anchor, result.year(), result.month()), offset);
        let expected_day = anchor.day().min(days_in_month(result.year(), result.month()).unwrap());
        prop_assert_eq!(result.day(), expected_day);
        prop_assert_eq!(result.time(), anchor.time());
    }

    /// Schedules never move backwards.
    #[test]
    fn prop_add_interval_monotonic(
        anchor in anchor_strategy(),
        unit in unit_strategy(),
        custom in 1u32..60,
        offset in 0u32..120,
    ) {
        let here = add_interval(anchor, unit, offset, Some(custom)).unwrap();
        let next = add_interval(anchor, unit, offset + 1, Some(custom)).unwrap();
        prop_assert!(here < next);
    }

    /// The elapsed count is the last step not after the target.
    #[test]
    fn prop_elapsed_periods_is_tight(
        anchor in anchor_strategy(),
        target in anchor_strategy(),
        unit in unit_strategy(),
        custom in 1u32..60,
    ) {
        prop_assume!(target > anchor);
        let k = elapsed_periods(anchor, target, unit, Some(custom)).unwrap();
        prop_assert!(add_interval(anchor, unit, k, Some(custom)).unwrap() <= target);
        prop_assert!(add_interval(anchor, unit, k + 1, Some(custom)).unwrap() > target);
    }

    /// Projection never produces an invalid day and keeps the time-of-day.
    #[test]
    fn prop_projection_is_valid(anchor in anchor_strategy(), year in 2000i32..2100, month in 1u32..=12) {
        let projected = project_onto_month(anchor, year, month).unwrap();
        prop_assert_eq!(projected.year(), year);
        prop_assert_eq!(projected.month(), month);
        prop_assert!(projected.day() <= anchor.day());
        prop_assert_eq!(projected.time(), anchor.time());
    }
}
