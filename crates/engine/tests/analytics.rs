use chrono::NaiveDate;

use engine::{
    AnalyticsEngine, BucketPolicy, ChartType, DateRange, EngineError, Granularity, MAX_BUCKETS,
    MoneyCents, Transaction, TransactionStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(category: &str, amount: &str, on: NaiveDate) -> Transaction {
    Transaction::new(category, amount.parse().unwrap(), on, None).unwrap()
}

fn january_store() -> TransactionStore {
    TransactionStore::from_transactions([
        tx("Food", "-20.00", date(2025, 1, 5)),
        tx("Salary", "2000.00", date(2025, 1, 1)),
        tx("Food", "-15.50", date(2025, 1, 20)),
    ])
}

fn mixed_store() -> TransactionStore {
    TransactionStore::from_transactions([
        tx("Rent", "-900", date(2024, 11, 1)),
        tx("Salary", "2500", date(2024, 11, 27)),
        tx("Food", "-42.10", date(2024, 12, 3)),
        tx("Refund", "12.99", date(2024, 12, 3)),
        tx("Food", "-8.90", date(2024, 12, 31)),
        tx("Transport", "-60", date(2025, 1, 14)),
        tx("Rent", "-900", date(2025, 2, 1)),
        tx("Salary", "2500", date(2025, 2, 27)),
        tx("Gift", "-35.35", date(2025, 3, 9)),
    ])
}

#[test]
fn january_scenario_totals() {
    let store = january_store();
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
            ChartType::Line,
            None,
        )
        .unwrap();

    assert_eq!(result.total_income, MoneyCents::new(200_000));
    assert_eq!(result.total_expense, MoneyCents::new(3_550));
    assert_eq!(result.category_breakdown.len(), 1);
    assert_eq!(result.category_breakdown["Food"], MoneyCents::new(3_550));
    assert_eq!(result.granularity, Granularity::Day);
    assert_eq!(result.series.len(), 31);
    assert_eq!(result.series[0].income, MoneyCents::new(200_000));
    assert_eq!(result.series[4].expense, MoneyCents::new(2_000));
    assert_eq!(result.series[19].expense, MoneyCents::new(1_550));
    assert_eq!(result.net(), MoneyCents::new(196_450));

    let points = result.points();
    assert_eq!(points[0], ("2025-01-01", MoneyCents::new(200_000), MoneyCents::ZERO));
    assert_eq!(points[30].0, "2025-01-31");
}

#[test]
fn end_date_is_inclusive() {
    let store = TransactionStore::from_transactions([
        tx("Food", "-10", date(2025, 1, 31)),
        tx("Food", "-99", date(2025, 2, 1)),
    ]);
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
            ChartType::Bar,
            None,
        )
        .unwrap();

    assert_eq!(result.transaction_count, 1);
    assert_eq!(result.total_expense, MoneyCents::new(1_000));
}

#[test]
fn reversed_window_is_empty_not_an_error() {
    let store = january_store();
    let d = date(2025, 1, 10);
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(d, d.pred_opt().unwrap()),
            ChartType::Pie,
            Some(Granularity::Day),
        )
        .unwrap();

    assert_eq!(result.total_income, MoneyCents::ZERO);
    assert_eq!(result.total_expense, MoneyCents::ZERO);
    assert!(result.category_breakdown.is_empty());
    assert!(result.series.is_empty());
}

#[test]
fn totals_match_absolute_sum_of_window() {
    let store = mixed_store();
    let range = DateRange::new(date(2024, 12, 1), date(2025, 2, 28));
    let result = AnalyticsEngine::default()
        .analyze(&store, range, ChartType::Bar, None)
        .unwrap();

    let absolute: i64 = store
        .query(range.start, range.end)
        .iter()
        .map(|t| t.amount.cents().abs())
        .sum();
    assert_eq!(
        result.total_income.cents() + result.total_expense.cents(),
        absolute
    );
}

#[test]
fn breakdown_and_series_reconcile_with_totals() {
    let store = mixed_store();
    for granularity in [Granularity::Day, Granularity::Week, Granularity::Month] {
        let result = AnalyticsEngine::default()
            .analyze(
                &store,
                DateRange::new(date(2024, 11, 15), date(2025, 3, 15)),
                ChartType::Line,
                Some(granularity),
            )
            .unwrap();

        let breakdown = result
            .category_breakdown
            .values()
            .fold(MoneyCents::ZERO, |acc, v| acc + *v);
        assert_eq!(breakdown, result.total_expense);

        let (income, expense) = result
            .series
            .iter()
            .fold((MoneyCents::ZERO, MoneyCents::ZERO), |(i, e), p| {
                (i + p.income, e + p.expense)
            });
        assert_eq!(income, result.total_income, "{granularity:?}");
        assert_eq!(expense, result.total_expense, "{granularity:?}");
    }
}

#[test]
fn series_is_contiguous_even_when_sparse() {
    let store = mixed_store();
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2024, 11, 1), date(2025, 3, 31)),
            ChartType::Line,
            None,
        )
        .unwrap();

    assert_eq!(result.granularity, Granularity::Month);
    let labels: Vec<&str> = result.series.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["2024-11", "2024-12", "2025-01", "2025-02", "2025-03"]
    );
    for pair in result.series.windows(2) {
        assert_eq!(pair[0].end.succ_opt(), Some(pair[1].start));
    }
    assert_eq!(result.series[2].income, MoneyCents::ZERO);
    assert_eq!(result.series[2].expense, MoneyCents::new(6_000));
}

#[test]
fn breakdown_omits_income_only_categories() {
    let store = mixed_store();
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2024, 12, 1), date(2024, 12, 31)),
            ChartType::Pie,
            None,
        )
        .unwrap();

    let keys: Vec<&str> = result.category_breakdown.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Food"]);
    assert_eq!(result.category_breakdown["Food"], MoneyCents::new(5_100));
    assert_eq!(result.total_income, MoneyCents::new(1_299));
}

#[test]
fn chart_type_does_not_change_numbers() {
    let store = mixed_store();
    let engine = AnalyticsEngine::default();
    let range = DateRange::new(date(2024, 11, 1), date(2025, 3, 31));
    let line = engine.analyze(&store, range, ChartType::Line, None).unwrap();
    let pie = engine.analyze(&store, range, ChartType::Pie, None).unwrap();

    assert_eq!(line.series, pie.series);
    assert_eq!(line.category_breakdown, pie.category_breakdown);
    assert_eq!(line.total_income, pie.total_income);
    assert_eq!(pie.chart_type, ChartType::Pie);
}

#[test]
fn analyze_is_idempotent() {
    let store = mixed_store();
    let engine = AnalyticsEngine::default();
    let range = DateRange::new(date(2024, 11, 1), date(2025, 3, 31));
    let first = engine.analyze(&store, range, ChartType::Bar, None).unwrap();
    let second = engine.analyze(&store, range, ChartType::Bar, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn pie_slices_are_sorted_by_amount() {
    let store = mixed_store();
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2024, 11, 1), date(2025, 3, 31)),
            ChartType::Pie,
            None,
        )
        .unwrap();

    let slices = result.pie_slices();
    let order: Vec<&str> = slices.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(order, vec!["Rent", "Transport", "Food", "Gift"]);
    let percent: f64 = slices.iter().map(|s| s.percent).sum();
    assert!((percent - 100.0).abs() < 1e-9);
}

#[test]
fn raw_bounds_are_validated() {
    let store = january_store();
    let engine = AnalyticsEngine::default();

    let missing = engine.analyze_raw(&store, None, Some("2025-01-31"), ChartType::Line, None);
    assert!(matches!(missing, Err(EngineError::InvalidRange(_))));

    let garbage = engine.analyze_raw(
        &store,
        Some("2025-01-01"),
        Some("last tuesday"),
        ChartType::Line,
        None,
    );
    assert!(matches!(garbage, Err(EngineError::InvalidRange(_))));

    let reversed = engine
        .analyze_raw(
            &store,
            Some("2025-02-01"),
            Some("2025-01-01"),
            ChartType::Line,
            None,
        )
        .unwrap();
    assert_eq!(reversed.transaction_count, 0);
}

#[test]
fn custom_policy_is_honoured() {
    let store = january_store();
    let engine = AnalyticsEngine::new(BucketPolicy {
        month_after_days: 365,
        week_after_days: Some(7),
    });
    let result = engine
        .analyze(
            &store,
            DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
            ChartType::Bar,
            None,
        )
        .unwrap();
    assert_eq!(result.granularity, Granularity::Week);
    assert_eq!(result.series.first().unwrap().label, "2025-W01");
    assert_eq!(result.series.last().unwrap().label, "2025-W05");
}

#[test]
fn overflowing_totals_are_reported() {
    let store = TransactionStore::from_transactions([
        Transaction::new("A", MoneyCents::new(i64::MAX), date(2025, 1, 1), None).unwrap(),
        Transaction::new("B", MoneyCents::new(1), date(2025, 1, 2), None).unwrap(),
    ]);
    let err = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(2025, 1, 1), date(2025, 1, 2)),
            ChartType::Line,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::AmountOverflow(_)));
}

#[test]
fn century_of_days_is_served_as_weeks() {
    let store = mixed_store();
    let result = AnalyticsEngine::default()
        .analyze(
            &store,
            DateRange::new(date(1950, 1, 1), date(2049, 12, 31)),
            ChartType::Line,
            Some(Granularity::Day),
        )
        .unwrap();

    assert_eq!(result.granularity, Granularity::Week);
    assert!(result.series.len() as i64 <= MAX_BUCKETS);
    assert_eq!(result.transaction_count, 9);
}

#[test]
fn unbounded_window_is_rejected() {
    let err = AnalyticsEngine::default()
        .analyze(
            &TransactionStore::default(),
            DateRange::new(NaiveDate::MIN, NaiveDate::MAX),
            ChartType::Line,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}
