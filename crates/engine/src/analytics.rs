//! Aggregation of a transaction window into chart-ready summaries.
//!
//! [`AnalyticsEngine::analyze`] is a pure function of the store contents and
//! its arguments: the breakdown is an ordered map and the series is
//! chronological, so repeated calls produce identical results.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionStore, transactions::parse_date,
};

/// Chart the caller intends to draw. It never changes the computed numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

impl TryFrom<&str> for ChartType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            other => Err(EngineError::Validation(format!(
                "invalid chart type: {other}"
            ))),
        }
    }
}

/// Width of a series bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    /// ISO weeks, Monday to Sunday.
    Week,
    /// Calendar months.
    Month,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Last day of the period containing `date`.
    fn period_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => {
                let remaining = 6 - u64::from(date.weekday().num_days_from_monday());
                date.checked_add_days(Days::new(remaining))
                    .unwrap_or(NaiveDate::MAX)
            }
            Self::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|first| first.pred_opt())
                    .unwrap_or(NaiveDate::MAX)
            }
        }
    }

    fn coarser(self) -> Option<Self> {
        match self {
            Self::Day => Some(Self::Week),
            Self::Week => Some(Self::Month),
            Self::Month => None,
        }
    }

    /// Number of buckets needed to cover `range`.
    fn bucket_count(self, range: &DateRange) -> i64 {
        if range.is_empty() {
            return 0;
        }
        match self {
            Self::Day => range.span_days(),
            Self::Week => {
                let monday = |d: NaiveDate| {
                    d.num_days_from_ce() - d.weekday().num_days_from_monday() as i32
                };
                i64::from(monday(range.end) - monday(range.start)) / 7 + 1
            }
            Self::Month => {
                let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(range.end) - months(range.start) + 1
            }
        }
    }

    /// Axis label of the period containing `date`.
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }
}

impl TryFrom<&str> for Granularity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(EngineError::Validation(format!(
                "invalid granularity: {other}"
            ))),
        }
    }
}

/// Longest series [`AnalyticsEngine::summarize`] will build.
pub const MAX_BUCKETS: i64 = 10_000;

/// Picks a granularity when the caller does not ask for one.
///
/// Spans are counted in days, both ends included. A span longer than
/// `month_after_days` is bucketed by month; otherwise, if `week_after_days`
/// is set and exceeded, by week; otherwise by day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketPolicy {
    pub month_after_days: i64,
    pub week_after_days: Option<i64>,
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self {
            month_after_days: 60,
            week_after_days: None,
        }
    }
}

impl BucketPolicy {
    pub fn granularity_for(&self, range: &DateRange) -> Granularity {
        let span = range.span_days();
        if span > self.month_after_days {
            Granularity::Month
        } else if self.week_after_days.is_some_and(|limit| span > limit) {
            Granularity::Week
        } else {
            Granularity::Day
        }
    }
}

/// Inclusive date window `[start, end]`. `start > end` is an empty window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses both bounds as `YYYY-MM-DD`.
    ///
    /// A missing or unparseable bound is an [`EngineError::InvalidRange`];
    /// a reversed range is not.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ResultEngine<Self> {
        Ok(Self {
            start: parse_bound("start", start)?,
            end: parse_bound("end", end)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of days covered, both ends included. Zero for an empty window.
    pub fn span_days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> ResultEngine<NaiveDate> {
    let value =
        value.ok_or_else(|| EngineError::InvalidRange(format!("{name} date is required")))?;
    parse_date(value)
        .ok_or_else(|| EngineError::InvalidRange(format!("invalid {name} date: {value}")))
}

/// Aggregates of one bucket of the series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: MoneyCents,
    pub expense: MoneyCents,
}

/// A slice of the expense pie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub category: String,
    pub amount: MoneyCents,
    /// Share of total expense, in percent.
    pub percent: f64,
}

/// Presentation-ready summary of a date window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub range: DateRange,
    pub chart_type: ChartType,
    pub granularity: Granularity,
    pub transaction_count: usize,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    /// Expense per category. Categories without expenses are absent.
    pub category_breakdown: BTreeMap<String, MoneyCents>,
    pub series: Vec<SeriesPoint>,
}

impl AnalysisResult {
    /// Income minus expense, saturating at the `i64` cent bounds.
    pub fn net(&self) -> MoneyCents {
        self.total_income - self.total_expense
    }

    /// Breakdown sorted by amount, largest first, ties by category name.
    pub fn pie_slices(&self) -> Vec<PieSlice> {
        let total = self.total_expense.cents();
        let mut slices: Vec<PieSlice> = self
            .category_breakdown
            .iter()
            .map(|(category, amount)| PieSlice {
                category: category.clone(),
                amount: *amount,
                percent: if total == 0 {
                    0.0
                } else {
                    amount.cents() as f64 * 100.0 / total as f64
                },
            })
            .collect();
        slices.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        slices
    }

    /// `(label, income, expense)` per bucket, for line and bar charts.
    pub fn points(&self) -> Vec<(&str, MoneyCents, MoneyCents)> {
        self.series
            .iter()
            .map(|p| (p.label.as_str(), p.income, p.expense))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnalyticsEngine {
    policy: BucketPolicy,
}

impl AnalyticsEngine {
    pub fn new(policy: BucketPolicy) -> Self {
        Self { policy }
    }

    /// Summarizes `store` over `range`.
    ///
    /// `granularity = None` lets the [`BucketPolicy`] choose. When the chosen
    /// granularity would need more than [`MAX_BUCKETS`] buckets the next
    /// coarser one is used; a window too wide even for months is an
    /// [`EngineError::InvalidRange`].
    pub fn analyze(
        &self,
        store: &TransactionStore,
        range: DateRange,
        chart_type: ChartType,
        granularity: Option<Granularity>,
    ) -> ResultEngine<AnalysisResult> {
        let transactions = store.query(range.start, range.end);
        self.summarize(&transactions, range, chart_type, granularity)
    }

    /// Like [`analyze`](Self::analyze), with textual date bounds.
    pub fn analyze_raw(
        &self,
        store: &TransactionStore,
        start: Option<&str>,
        end: Option<&str>,
        chart_type: ChartType,
        granularity: Option<Granularity>,
    ) -> ResultEngine<AnalysisResult> {
        let range = DateRange::parse(start, end)?;
        self.analyze(store, range, chart_type, granularity)
    }

    /// Summarizes an already materialized snapshot.
    ///
    /// Transactions outside `range` are ignored.
    pub fn summarize(
        &self,
        transactions: &[Transaction],
        range: DateRange,
        chart_type: ChartType,
        granularity: Option<Granularity>,
    ) -> ResultEngine<AnalysisResult> {
        let granularity = fit_granularity(
            &range,
            granularity.unwrap_or_else(|| self.policy.granularity_for(&range)),
        )?;
        let mut series = buckets(&range, granularity);
        let mut total_income = MoneyCents::ZERO;
        let mut total_expense = MoneyCents::ZERO;
        let mut category_breakdown: BTreeMap<String, MoneyCents> = BTreeMap::new();
        let mut transaction_count = 0;

        for tx in transactions.iter().filter(|tx| range.contains(tx.date)) {
            transaction_count += 1;
            // Buckets are contiguous and cover the range, so one always matches.
            let index = series
                .partition_point(|point| point.start <= tx.date)
                .saturating_sub(1);
            let point = &mut series[index];

            if tx.is_expense() {
                let amount = tx
                    .amount
                    .checked_abs()
                    .ok_or_else(|| overflow("expense amount"))?;
                total_expense = add(total_expense, amount, "total expense")?;
                point.expense = add(point.expense, amount, "bucket expense")?;
                let slot = category_breakdown
                    .entry(tx.category.clone())
                    .or_insert(MoneyCents::ZERO);
                *slot = add(*slot, amount, "category expense")?;
            } else {
                total_income = add(total_income, tx.amount, "total income")?;
                point.income = add(point.income, tx.amount, "bucket income")?;
            }
        }

        tracing::debug!(
            start = %range.start,
            end = %range.end,
            granularity = granularity.as_str(),
            chart = chart_type.as_str(),
            transactions = transaction_count,
            buckets = series.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            range,
            chart_type,
            granularity,
            transaction_count,
            total_income,
            total_expense,
            category_breakdown,
            series,
        })
    }
}

fn fit_granularity(range: &DateRange, requested: Granularity) -> ResultEngine<Granularity> {
    let mut granularity = requested;
    while granularity.bucket_count(range) > MAX_BUCKETS {
        granularity = granularity.coarser().ok_or_else(|| {
            EngineError::InvalidRange(format!(
                "{} to {} needs more than {MAX_BUCKETS} monthly buckets",
                range.start, range.end
            ))
        })?;
    }
    if granularity != requested {
        tracing::debug!(
            requested = requested.as_str(),
            used = granularity.as_str(),
            "granularity coarsened to fit the bucket limit"
        );
    }
    Ok(granularity)
}

fn add(lhs: MoneyCents, rhs: MoneyCents, what: &str) -> ResultEngine<MoneyCents> {
    lhs.checked_add(rhs).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> EngineError {
    EngineError::AmountOverflow(format!("{what} exceeds the representable range"))
}

/// Zero-valued buckets covering `range` without gaps.
fn buckets(range: &DateRange, granularity: Granularity) -> Vec<SeriesPoint> {
    let mut out = Vec::new();
    if range.is_empty() {
        return out;
    }
    let mut cursor = range.start;
    loop {
        let end = granularity.period_end(cursor).min(range.end);
        out.push(SeriesPoint {
            label: granularity.label(cursor),
            start: cursor,
            end,
            income: MoneyCents::ZERO,
            expense: MoneyCents::ZERO,
        });
        match end.succ_opt() {
            Some(next) if end < range.end => cursor = next,
            _ => break,
        }
    }
    out
}
