use approx::assert_relative_eq;
use chrono::NaiveDate;
use pace_forecast::data::DateValues;
use pace_forecast::reconcile::{
    reconcile_model, reconcile_pickup, reconcile_point, ForecastPoint, ReconcileConfig,
};
use pace_math::DaysCountPolicy;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn june_dates(days: u32) -> Vec<NaiveDate> {
    (1..=days)
        .map(|d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap())
        .collect()
}

fn values(pairs: &[(NaiveDate, f64)]) -> DateValues {
    pairs.iter().copied().collect()
}

#[rstest]
#[case(None, None, None)]
#[case(Some(40.0), None, None)]
#[case(None, Some(30.0), None)]
#[case(None, None, Some(50.0))]
#[case(Some(40.0), Some(30.0), None)]
#[case(Some(40.0), None, Some(50.0))]
#[case(None, Some(30.0), Some(50.0))]
#[case(Some(40.0), Some(30.0), Some(50.0))]
fn test_reconciler_is_total(
    #[case] current: Option<f64>,
    #[case] prior_otb: Option<f64>,
    #[case] prior_final: Option<f64>,
) {
    let point = reconcile_point(date("2024-06-01"), current, prior_otb, prior_final);

    let has_forecast = current.is_some() && prior_otb.is_some() && prior_final.is_some();
    let has_pace = current.is_some() && prior_otb.is_some();

    assert_eq!(point.forecast.is_some(), has_forecast);
    assert_eq!(point.pace_vs_prior_pct.is_some(), has_pace);
    assert_eq!(
        point.pickup.is_some(),
        prior_otb.is_some() && prior_final.is_some()
    );
    assert_eq!(point.current_otb, current);
}

#[test]
fn test_pickup_scenario() {
    let point = reconcile_point(date("2024-06-01"), Some(40.0), Some(30.0), Some(50.0));

    assert_eq!(point.pickup, Some(20.0));
    assert_eq!(point.forecast, Some(60.0));
    assert_relative_eq!(point.pace_vs_prior_pct.unwrap(), 33.33, epsilon = 0.01);
}

#[test]
fn test_zero_prior_otb_is_not_infinite() {
    let point = reconcile_point(date("2024-06-01"), Some(40.0), Some(0.0), Some(50.0));
    assert_eq!(point.pace_vs_prior_pct, None);

    let flat = reconcile_point(date("2024-06-01"), Some(30.0), Some(30.0), Some(50.0));
    assert_eq!(flat.pace_vs_prior_pct, Some(0.0));
}

#[test]
fn test_pickup_forecast_with_bands_and_summary() {
    let dates = june_dates(4);
    let current = values(&[(dates[0], 40.0), (dates[1], 20.0), (dates[2], 10.0)]);
    let prior_otb = values(&[(dates[0], 30.0), (dates[1], 20.0), (dates[3], 5.0)]);
    let prior_final = values(&[(dates[0], 50.0), (dates[1], 30.0), (dates[3], 9.0)]);

    let result = reconcile_pickup(
        &dates,
        &current,
        &prior_otb,
        &prior_final,
        &ReconcileConfig::default(),
    );

    assert_eq!(result.points.len(), 4);
    assert_eq!(result.forecasts(), vec![Some(60.0), Some(30.0), None, None]);

    // Pickups 20, 10, 4: every forecast carries an ordered band
    for point in result.points.iter().filter(|p| p.forecast.is_some()) {
        assert!(point.forecast_lower.is_some() && point.forecast_upper.is_some());
        assert!(point.has_ordered_band());
    }
    assert_eq!(result.points[2].forecast_lower, None);

    let summary = &result.summary;
    assert_eq!(summary.days_count, 4);
    assert_eq!(summary.days_with_forecast, 2);
    assert_eq!(summary.total_current_otb, Some(70.0));
    assert_eq!(summary.total_forecast, Some(90.0));
    assert_eq!(summary.average_forecast, Some(45.0));
    // Paired days: 40+20 against 30+20
    assert_relative_eq!(summary.pace_vs_prior_pct.unwrap(), 20.0, epsilon = 1e-9);
    // 60 > 50 counts; 30 against 30 is a tie and counts toward neither
    assert_eq!(summary.days_forecasting_more, 1);
    assert_eq!(summary.days_forecasting_less, 0);
    assert_eq!(summary.invalid_bands, 0);
}

#[test]
fn test_missing_days_dilute_only_under_include_policy() {
    let dates = june_dates(4);
    let current = values(&[(dates[0], 10.0), (dates[1], 30.0)]);
    let empty = DateValues::new();

    let exclude = reconcile_pickup(
        &dates,
        &current,
        &empty,
        &empty,
        &ReconcileConfig::new(None, DaysCountPolicy::ExcludeMissing).unwrap(),
    );
    let include = reconcile_pickup(
        &dates,
        &current,
        &empty,
        &empty,
        &ReconcileConfig::new(None, DaysCountPolicy::IncludeMissing).unwrap(),
    );

    assert_eq!(exclude.summary.days_count, 4);
    assert_eq!(include.summary.days_count, 4);
    assert_eq!(exclude.summary.average_current_otb, Some(20.0));
    assert_eq!(include.summary.average_current_otb, Some(10.0));
    assert_eq!(exclude.summary.total_forecast, None);
    assert_eq!(exclude.summary.pace_vs_prior_pct, None);
}

#[test]
fn test_disabled_bands() {
    let dates = june_dates(2);
    let current = values(&[(dates[0], 10.0), (dates[1], 10.0)]);
    let prior_otb = values(&[(dates[0], 5.0), (dates[1], 5.0)]);
    let prior_final = values(&[(dates[0], 8.0), (dates[1], 12.0)]);

    let config = ReconcileConfig::new(None, DaysCountPolicy::default()).unwrap();
    let result = reconcile_pickup(&dates, &current, &prior_otb, &prior_final, &config);
    assert!(result.points.iter().all(|p| p.forecast_lower.is_none()));
}

#[test]
fn test_model_forecast_validation() {
    let dates = june_dates(4);
    let model_points = vec![
        ForecastPoint::model_output(dates[0], Some(55.0), Some(50.0), Some(60.0)),
        // lower above the point forecast
        ForecastPoint::model_output(dates[1], Some(20.0), Some(25.0), Some(30.0)),
        ForecastPoint::model_output(dates[2], Some(9.0), None, None),
        ForecastPoint::model_output(dates[3], Some(f64::NAN), Some(1.0), Some(2.0)),
    ];
    let current = values(&[(dates[0], 40.0), (dates[1], 15.0)]);
    let prior_otb = values(&[(dates[0], 30.0), (dates[1], 0.0)]);
    let prior_final = values(&[(dates[0], 50.0), (dates[1], 25.0), (dates[2], 9.0)]);

    let result = reconcile_model(
        &model_points,
        &current,
        &prior_otb,
        &prior_final,
        &ReconcileConfig::default(),
    );

    let first = &result.points[0];
    assert_eq!(first.forecast, Some(55.0));
    assert_eq!(first.forecast_lower, Some(50.0));
    assert_eq!(first.pickup, Some(20.0));
    assert_relative_eq!(first.pace_vs_prior_pct.unwrap(), 33.33, epsilon = 0.01);

    let second = &result.points[1];
    assert_eq!(second.forecast, Some(20.0));
    assert_eq!(second.forecast_lower, None);
    assert_eq!(second.forecast_upper, None);
    assert_eq!(second.pace_vs_prior_pct, None);

    assert_eq!(result.points[3].forecast, None);

    let summary = &result.summary;
    assert_eq!(summary.invalid_bands, 1);
    assert_eq!(summary.days_forecasting_more, 1);
    assert_eq!(summary.days_forecasting_less, 1);
    assert_eq!(summary.days_with_forecast, 3);
}

#[test]
fn test_model_rows_keep_their_own_history() {
    let mut row = ForecastPoint::model_output(date("2024-06-01"), Some(70.0), None, None);
    row.current_otb = Some(50.0);
    row.prior_year_otb = Some(40.0);

    let empty = DateValues::new();
    let result = reconcile_model(&[row], &empty, &empty, &empty, &ReconcileConfig::default());
    assert_relative_eq!(
        result.points[0].pace_vs_prior_pct.unwrap(),
        25.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_reconciliation_is_idempotent() {
    let dates = june_dates(5);
    let current = values(&[(dates[0], 40.0), (dates[2], 12.0), (dates[4], 3.0)]);
    let prior_otb = values(&[(dates[0], 30.0), (dates[2], 10.0), (dates[3], 0.0)]);
    let prior_final = values(&[(dates[0], 50.0), (dates[2], 11.0), (dates[3], 4.0)]);
    let config = ReconcileConfig::default();

    let first = reconcile_pickup(&dates, &current, &prior_otb, &prior_final, &config);
    let second = reconcile_pickup(&dates, &current, &prior_otb, &prior_final, &config);
    assert_eq!(first, second);

    let model = first.points.clone();
    assert_eq!(
        reconcile_model(&model, &current, &prior_otb, &prior_final, &config),
        reconcile_model(&model, &current, &prior_otb, &prior_final, &config)
    );
}

#[test]
fn test_summary_without_data_has_no_totals() {
    let empty = DateValues::new();
    let result = reconcile_pickup(
        &june_dates(3),
        &empty,
        &empty,
        &empty,
        &ReconcileConfig::default(),
    );

    let summary = &result.summary;
    assert_eq!(summary.days_count, 3);
    assert_eq!(summary.days_with_forecast, 0);
    assert_eq!(summary.total_current_otb, None);
    assert_eq!(summary.total_prior_year_otb, None);
    assert_eq!(summary.total_prior_year_final, None);
    assert_eq!(summary.total_forecast, None);
    assert_eq!(summary.average_current_otb, None);
    assert_eq!(summary.average_forecast, None);
    assert_eq!(summary.pace_vs_prior_pct, None);
}
