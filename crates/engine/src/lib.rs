//! Transaction analytics core.
//!
//! A [`TransactionStore`] holds one user's transactions; the
//! [`AnalyticsEngine`] turns a date window of them into an
//! [`AnalysisResult`] (totals, per-category expenses and a contiguous
//! time series) ready to be drawn as a line, bar or pie chart.
//!
//! Amounts are signed [`MoneyCents`]: positive is income, negative is
//! expense.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use engine::{AnalyticsEngine, ChartType, DateRange, MoneyCents, Transaction, TransactionStore};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
//! let mut store = TransactionStore::new();
//! store.add(Transaction::new("Salary", MoneyCents::new(200_000), day(1), None).unwrap());
//! store.add(Transaction::new("Food", MoneyCents::new(-2_000), day(5), None).unwrap());
//!
//! let result = AnalyticsEngine::default()
//!     .analyze(&store, DateRange::new(day(1), day(31)), ChartType::Pie, None)
//!     .unwrap();
//! assert_eq!(result.total_expense, MoneyCents::new(2_000));
//! assert_eq!(result.series.len(), 31);
//! ```

pub use analytics::{
    AnalysisResult, AnalyticsEngine, BucketPolicy, ChartType, DateRange, Granularity,
    MAX_BUCKETS, PieSlice, SeriesPoint,
};
pub use error::EngineError;
pub use insights::{Insight, InsightKind, insights};
pub use money::MoneyCents;
pub use session::{Session, SharedStore, User};
pub use store::{TransactionFilter, TransactionStore};
pub use transactions::{
    AmountInput, DATE_FORMAT, Flow, Transaction, TransactionInput, TransactionUpdate, parse_date,
};

mod analytics;
mod error;
mod insights;
mod money;
mod session;
mod store;
mod transactions;

pub type ResultEngine<T> = Result<T, EngineError>;
