//! Plain-text rendering of engine results.

use std::fmt::Write;

use engine::{AnalysisResult, ChartType, Insight, Transaction};

const BAR_WIDTH: usize = 20;

/// Creates a simple ASCII-based horizontal bar, e.g. `████░░░░`.
fn ascii_bar(value: i64, max: i64, width: usize) -> String {
    if max <= 0 {
        return "░".repeat(width);
    }
    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} .. {} ({} transactions, by {})",
        result.range.start,
        result.range.end,
        result.transaction_count,
        result.granularity.as_str()
    );
    let _ = writeln!(out, "income   {:>12}", result.total_income);
    let _ = writeln!(out, "expense  {:>12}", result.total_expense);
    let _ = writeln!(out, "net      {:>12}", result.net());

    match result.chart_type {
        ChartType::Pie => {
            let _ = writeln!(out, "\nexpenses by category");
            for slice in result.pie_slices() {
                let _ = writeln!(
                    out,
                    "{:<16} {:>12} {:>6.2}% {}",
                    slice.category,
                    slice.amount,
                    slice.percent,
                    ascii_bar(slice.amount.cents(), result.total_expense.cents(), BAR_WIDTH)
                );
            }
        }
        ChartType::Line | ChartType::Bar => {
            let max = result
                .series
                .iter()
                .map(|p| p.income.cents().max(p.expense.cents()))
                .max()
                .unwrap_or(0);
            let _ = writeln!(out, "\n{:<12} {:>12} {:>12}", "period", "income", "expense");
            for point in &result.series {
                let _ = writeln!(
                    out,
                    "{:<12} {:>12} {:>12} {}",
                    point.label,
                    point.income,
                    point.expense,
                    ascii_bar(point.expense.cents(), max, BAR_WIDTH)
                );
            }
        }
    }
    out
}

pub fn transactions(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(|tx| {
            let mut line = format!("{}  {:>12}  {}", tx.date, tx.amount, tx.category);
            if let Some(description) = &tx.description {
                let _ = write!(line, "  {description}");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insights(insights: &[Insight]) -> String {
    insights
        .iter()
        .map(|i| format!("- {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_scales_and_clamps() {
        assert_eq!(ascii_bar(0, 0, 4), "░░░░");
        assert_eq!(ascii_bar(50, 100, 4), "██░░");
        assert_eq!(ascii_bar(500, 100, 4), "████");
    }
}
