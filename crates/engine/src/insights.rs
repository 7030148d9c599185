//! Short, plain-language suggestions derived from an [`AnalysisResult`].
//!
//! Insights only read the result; they never look at the store again and do
//! not forecast.

use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    NoActivity,
    Saved,
    Overspent,
    SavingsRate,
    TopCategory,
    PeakPeriod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Builds the suggestions for `result`, in a fixed order.
pub fn insights(result: &AnalysisResult) -> Vec<Insight> {
    if result.transaction_count == 0 {
        return vec![Insight::new(
            InsightKind::NoActivity,
            format!(
                "No transactions between {} and {}.",
                result.range.start, result.range.end
            ),
        )];
    }

    let mut out = Vec::new();
    let net = result
        .total_income
        .checked_sub(result.total_expense)
        .unwrap_or(MoneyCents::ZERO);
    if net.is_negative() {
        out.push(Insight::new(
            InsightKind::Overspent,
            format!("You spent {} more than you earned.", -net),
        ));
    } else {
        out.push(Insight::new(
            InsightKind::Saved,
            format!("You kept {} of your income.", net),
        ));
    }

    if result.total_income.is_positive() {
        let rate = basis_points(net, result.total_income);
        out.push(Insight::new(
            InsightKind::SavingsRate,
            format!("Savings rate: {}.", format_bp(rate)),
        ));
    }

    if let Some(top) = result.pie_slices().into_iter().next() {
        let share = basis_points(top.amount, result.total_expense);
        out.push(Insight::new(
            InsightKind::TopCategory,
            format!(
                "Your largest expense category is {} ({}, {} of spending).",
                top.category,
                top.amount,
                format_bp(share)
            ),
        ));
    }

    // First bucket wins on ties so the answer is stable.
    let peak = result
        .series
        .iter()
        .filter(|p| p.expense.is_positive())
        .fold(None, |best: Option<&crate::SeriesPoint>, p| match best {
            Some(b) if b.expense >= p.expense => Some(b),
            _ => Some(p),
        });
    if let Some(peak) = peak
        && result.series.len() > 1
    {
        out.push(Insight::new(
            InsightKind::PeakPeriod,
            format!("Spending peaked in {} at {}.", peak.label, peak.expense),
        ));
    }

    out
}

/// `part / whole` in basis points, truncated toward zero.
fn basis_points(part: MoneyCents, whole: MoneyCents) -> i64 {
    if whole.is_zero() {
        return 0;
    }
    let ratio = i128::from(part.cents()) * 10_000 / i128::from(whole.cents());
    i64::try_from(ratio).unwrap_or(if ratio.is_negative() { i64::MIN } else { i64::MAX })
}

fn format_bp(bp: i64) -> String {
    let sign = if bp < 0 { "-" } else { "" };
    let abs = bp.unsigned_abs();
    format!("{sign}{}.{:02}%", abs / 100, abs % 100)
}
