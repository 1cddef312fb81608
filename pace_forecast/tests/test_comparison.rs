use chrono::{Datelike, Days, NaiveDate, Weekday};
use pace_forecast::comparison::{resolve_comparison_range, ComparisonResolver};
use pace_forecast::data::{Bucket, ComparisonMode, DateRange};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn arb_range() -> impl Strategy<Value = DateRange> {
    (0u64..15_000, 0u64..400).prop_map(|(offset, len)| {
        let start = base_date() + Days::new(offset);
        DateRange::new(start, start + Days::new(len)).unwrap()
    })
}

fn arb_bucket() -> impl Strategy<Value = Bucket> {
    prop_oneof![Just(Bucket::Day), Just(Bucket::Week), Just(Bucket::Month)]
}

proptest! {
    #[test]
    fn previous_period_ends_the_day_before(range in arb_range(), bucket in arb_bucket()) {
        let comparison =
            resolve_comparison_range(&range, ComparisonMode::PreviousPeriod, bucket).unwrap();
        prop_assert_eq!(comparison.end() + Days::new(1), range.start());
        prop_assert_eq!(comparison.day_count(), range.day_count());
    }

    #[test]
    fn previous_year_day_keeps_weekday(range in arb_range()) {
        let comparison =
            resolve_comparison_range(&range, ComparisonMode::PreviousYear, Bucket::Day).unwrap();
        prop_assert_eq!(comparison.start().weekday(), range.start().weekday());
        prop_assert_eq!(comparison.day_count(), range.day_count());
    }

    #[test]
    fn previous_year_week_starts_on_monday(range in arb_range()) {
        let comparison =
            resolve_comparison_range(&range, ComparisonMode::PreviousYear, Bucket::Week).unwrap();
        prop_assert_eq!(comparison.start().weekday(), Weekday::Mon);
        prop_assert_eq!(comparison.day_count(), range.day_count());
    }

    #[test]
    fn previous_year_week_keeps_weekday_of_week_aligned_ranges(range in arb_range()) {
        let start = Bucket::Week.start_of(range.start());
        let aligned = DateRange::new(start, range.end()).unwrap();
        let comparison =
            resolve_comparison_range(&aligned, ComparisonMode::PreviousYear, Bucket::Week).unwrap();
        prop_assert_eq!(comparison.start().weekday(), aligned.start().weekday());
        prop_assert_eq!(comparison.start() + Days::new(364), aligned.start());
    }

    #[test]
    fn previous_year_month_starts_on_first_of_month(range in arb_range()) {
        let comparison =
            resolve_comparison_range(&range, ComparisonMode::PreviousYear, Bucket::Month).unwrap();
        prop_assert_eq!(comparison.start().day(), 1);
        prop_assert_eq!(comparison.start().month(), range.start().month());
        prop_assert_eq!(comparison.start().year() + 1, range.start().year());
    }

    #[test]
    fn resolution_is_idempotent(range in arb_range(), bucket in arb_bucket()) {
        let resolver = ComparisonResolver::default();
        for mode in [ComparisonMode::None, ComparisonMode::PreviousPeriod, ComparisonMode::PreviousYear] {
            prop_assert_eq!(
                resolver.resolve(&range, mode, bucket),
                resolver.resolve(&range, mode, bucket)
            );
        }
    }
}

#[test]
fn test_march_year_over_year() {
    let primary = DateRange::parse("2024-03-01", "2024-03-31").unwrap();
    let comparison =
        resolve_comparison_range(&primary, ComparisonMode::PreviousYear, Bucket::Day).unwrap();

    assert_eq!(primary.start().weekday(), Weekday::Fri);
    assert_eq!(comparison.start(), "2023-03-03".parse::<NaiveDate>().unwrap());
    assert_eq!(comparison.start().weekday(), Weekday::Fri);
    assert_eq!(comparison.end(), "2023-04-02".parse::<NaiveDate>().unwrap());
}

#[test]
fn test_single_day_ranges() {
    let day = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
    let previous =
        resolve_comparison_range(&day, ComparisonMode::PreviousPeriod, Bucket::Day).unwrap();
    assert_eq!(previous, DateRange::parse("2023-12-31", "2023-12-31").unwrap());
}
