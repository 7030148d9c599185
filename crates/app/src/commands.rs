use clap::{Args, Subcommand};
use engine::{
    ChartType, DateRange, Flow, Granularity, Session, TransactionFilter, insights,
};

use crate::{error::Result, output, settings::OutputFormat};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Totals, category breakdown and time series for a date window.
    Summary(SummaryArgs),
    /// Transactions in a date window, oldest first.
    List(ListArgs),
    /// Plain-language suggestions for a date window.
    Insights(WindowArgs),
    /// Distinct categories in the ledger.
    Categories,
}

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// First day of the window (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub from: Option<String>,
    /// Last day of the window (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub to: Option<String>,
}

impl WindowArgs {
    fn range(&self) -> Result<DateRange> {
        Ok(DateRange::parse(self.from.as_deref(), self.to.as_deref())?)
    }
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub window: WindowArgs,
    /// line, bar or pie.
    #[arg(long, default_value = "line")]
    pub chart: String,
    /// day, week or month. Picked from the window length when omitted.
    #[arg(long)]
    pub bucket: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub window: WindowArgs,
    #[arg(long)]
    pub category: Option<String>,
    /// income or expense.
    #[arg(long)]
    pub flow: Option<String>,
}

/// Runs `command` against `session` and returns the rendered output.
pub fn run(session: &Session, command: &Command, format: OutputFormat) -> Result<String> {
    match command {
        Command::Summary(args) => {
            let range = args.window.range()?;
            let chart = ChartType::try_from(args.chart.as_str())?;
            let bucket = args
                .bucket
                .as_deref()
                .map(Granularity::try_from)
                .transpose()?;
            let result = session.analyze(range, chart, bucket)?;
            match format {
                OutputFormat::Text => Ok(output::summary(&result)),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&result)?),
            }
        }
        Command::List(args) => {
            let range = args.window.range()?;
            let filter = TransactionFilter {
                from: range.start,
                to: range.end,
                category: args.category.clone(),
                flow: args.flow.as_deref().map(Flow::try_from).transpose()?,
            };
            let transactions = session.store().query_filtered(&filter)?;
            match format {
                OutputFormat::Text => Ok(output::transactions(&transactions)),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&transactions)?),
            }
        }
        Command::Insights(window) => {
            let result = session.analyze(window.range()?, ChartType::default(), None)?;
            let insights = insights(&result);
            match format {
                OutputFormat::Text => Ok(output::insights(&insights)),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&insights)?),
            }
        }
        Command::Categories => {
            let categories = session.store().categories()?;
            match format {
                OutputFormat::Text => Ok(categories.join("\n")),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&categories)?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{EngineError, MoneyCents, Transaction, User};

    use super::*;
    use crate::error::AppError;

    fn session() -> Session {
        let session = Session::new(User::new("alice", "pw").unwrap());
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        for (category, cents, d) in [("Food", -2_000, 5), ("Salary", 200_000, 1), ("Food", -1_550, 20)] {
            session
                .store()
                .add(Transaction::new(category, MoneyCents::new(cents), day(d), None).unwrap())
                .unwrap();
        }
        session
    }

    fn window(from: &str, to: &str) -> WindowArgs {
        WindowArgs {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    #[test]
    fn summary_json_contains_totals() {
        let command = Command::Summary(SummaryArgs {
            window: window("2025-01-01", "2025-01-31"),
            chart: "pie".to_string(),
            bucket: Some("week".to_string()),
        });
        let out = run(&session(), &command, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total_income"], 200_000);
        assert_eq!(value["total_expense"], 3_550);
        assert_eq!(value["category_breakdown"]["Food"], 3_550);
        assert_eq!(value["chart_type"], "pie");
        assert_eq!(value["series"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn summary_without_bounds_is_an_invalid_range() {
        let command = Command::Summary(SummaryArgs {
            window: WindowArgs { from: None, to: None },
            chart: "line".to_string(),
            bucket: None,
        });
        let err = run(&session(), &command, OutputFormat::Text).unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::InvalidRange(_))));
    }

    #[test]
    fn list_filters_by_flow() {
        let command = Command::List(ListArgs {
            window: window("2025-01-01", "2025-01-31"),
            category: None,
            flow: Some("expense".to_string()),
        });
        let out = run(&session(), &command, OutputFormat::Text).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().next().unwrap().starts_with("2025-01-05"));
    }

    #[test]
    fn categories_are_listed_once() {
        let out = run(&session(), &Command::Categories, OutputFormat::Text).unwrap();
        assert_eq!(out, "Food\nSalary");
    }
}
