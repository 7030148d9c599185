//! Transaction primitives.
//!
//! A `Transaction` is an immutable, dated movement of money. The sign of
//! `amount` carries its direction: positive is income, negative is expense.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Date format accepted at the input boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction of a transaction, derived from the sign of its amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Income,
    Expense,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for Flow {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!("invalid flow: {other}"))),
        }
    }
}

/// Only built through [`Transaction::new`] or a [`TransactionInput`], so it is
/// serializable but never deserialized directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub category: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Transaction {
    /// Builds a validated transaction with a fresh id.
    ///
    /// The category is trimmed and must not be empty; a blank description
    /// becomes `None`.
    pub fn new(
        category: impl Into<String>,
        amount: MoneyCents,
        date: NaiveDate,
        description: Option<String>,
    ) -> ResultEngine<Self> {
        let category = normalize_category(category.into())?;
        Ok(Self {
            id: Uuid::new_v4(),
            category,
            amount,
            date,
            description: normalize_description(description),
        })
    }

    /// Zero-valued transactions count as income.
    pub fn flow(&self) -> Flow {
        if self.amount.is_negative() {
            Flow::Expense
        } else {
            Flow::Income
        }
    }

    pub fn is_expense(&self) -> bool {
        self.flow() == Flow::Expense
    }
}

fn normalize_category(category: String) -> ResultEngine<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "category must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Amount as it arrives from manual entry or an importer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    fn to_cents(&self) -> ResultEngine<MoneyCents> {
        match self {
            Self::Number(value) => MoneyCents::try_from(*value),
            Self::Text(value) => value.parse(),
        }
    }
}

/// Loosely typed transaction record handed over by the input boundary.
///
/// Converting it into a [`Transaction`] enforces every invariant and reports
/// problems as [`EngineError::Validation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Missing in the source becomes empty and is rejected on conversion.
    #[serde(default)]
    pub category: String,
    pub amount: Option<AmountInput>,
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<TransactionInput> for Transaction {
    type Error = EngineError;

    fn try_from(input: TransactionInput) -> Result<Self, Self::Error> {
        let raw_date = input
            .date
            .ok_or_else(|| EngineError::Validation("date is required".to_string()))?;
        let date = parse_date(&raw_date)
            .ok_or_else(|| EngineError::Validation(format!("invalid date: {raw_date}")))?;
        let amount = input
            .amount
            .ok_or_else(|| EngineError::Validation("amount is required".to_string()))?
            .to_cents()
            .map_err(|err| match err {
                EngineError::InvalidAmount(msg) => EngineError::Validation(msg),
                other => other,
            })?;

        Transaction::new(input.category, amount, date, input.description)
    }
}

/// Partial update applied by `TransactionStore::update`.
///
/// `None` leaves a field untouched; `description: Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionUpdate {
    pub category: Option<String>,
    pub amount: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
    pub description: Option<Option<String>>,
}

impl TransactionUpdate {
    /// Returns the updated copy of `tx`, keeping its id.
    pub(crate) fn apply(self, tx: &Transaction) -> ResultEngine<Transaction> {
        let category = match self.category {
            Some(category) => normalize_category(category)?,
            None => tx.category.clone(),
        };
        Ok(Transaction {
            id: tx.id,
            category,
            amount: self.amount.unwrap_or(tx.amount),
            date: self.date.unwrap_or(tx.date),
            description: match self.description {
                Some(description) => normalize_description(description),
                None => tx.description.clone(),
            },
        })
    }
}
