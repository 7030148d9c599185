//! In-memory transaction store for a single user.
//!
//! The store keeps transactions in insertion order. Every read returns an
//! owned, date-sorted snapshot so callers never hold a view into the live
//! collection.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    EngineError, Flow, ResultEngine, Transaction, TransactionInput, TransactionUpdate,
};

/// Filters for querying transactions.
///
/// `from` and `to` are both inclusive (`[from, to]`).
#[derive(Clone, Debug)]
pub struct TransactionFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// If present, only transactions with exactly this category are returned.
    pub category: Option<String>,
    /// If present, only transactions in this direction are returned.
    pub flow: Option<Flow>,
}

impl TransactionFilter {
    pub fn range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            category: None,
            flow: None,
        }
    }

    fn matches(&self, tx: &Transaction) -> bool {
        tx.date >= self.from
            && tx.date <= self.to
            && self.category.as_deref().is_none_or(|c| tx.category == c)
            && self.flow.is_none_or(|f| tx.flow() == f)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already validated transactions, keeping their order.
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            transactions: transactions.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Appends a transaction and returns its id.
    pub fn add(&mut self, tx: Transaction) -> Uuid {
        let id = tx.id;
        tracing::debug!(%id, date = %tx.date, category = %tx.category, "adding transaction");
        self.transactions.push(tx);
        id
    }

    /// Validates a boundary record and appends it.
    pub fn add_input(&mut self, input: TransactionInput) -> ResultEngine<Uuid> {
        let tx = Transaction::try_from(input)?;
        Ok(self.add(tx))
    }

    pub fn get(&self, id: Uuid) -> ResultEngine<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Removes a transaction, returning it.
    pub fn remove(&mut self, id: Uuid) -> ResultEngine<Transaction> {
        let index = self.position(id)?;
        tracing::debug!(%id, "removing transaction");
        Ok(self.transactions.remove(index))
    }

    /// Replaces a transaction in place, keeping its insertion position.
    ///
    /// The update is validated before anything is written.
    pub fn update(&mut self, id: Uuid, update: TransactionUpdate) -> ResultEngine<&Transaction> {
        let index = self.position(id)?;
        let updated = update.apply(&self.transactions[index])?;
        tracing::debug!(%id, "updating transaction");
        self.transactions[index] = updated;
        Ok(&self.transactions[index])
    }

    /// Returns every transaction with `start <= date <= end`.
    ///
    /// `start > end` is a valid empty window. The result is ascending by
    /// date, ties kept in insertion order.
    pub fn query(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.query_filtered(&TransactionFilter::range(start, end))
    }

    /// Same ordering as [`query`](Self::query), with category/flow filters.
    pub fn query_filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        if filter.from > filter.to {
            return Vec::new();
        }
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        // `sort_by_key` is stable, so equal dates keep insertion order.
        out.sort_by_key(|tx| tx.date);
        tracing::debug!(
            from = %filter.from,
            to = %filter.to,
            matched = out.len(),
            "queried transactions"
        );
        out
    }

    /// Distinct category labels, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.transactions
            .iter()
            .map(|tx| tx.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn position(&self, id: Uuid) -> ResultEngine<usize> {
        self.transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }
}
