//! The module contains the errors the engine can return.
//!
//! The errors surfaced to callers are:
//!
//! - [`Validation`] returned when a transaction is malformed on add/update.
//! - [`InvalidRange`] returned when a date bound is missing or unparseable.
//! - [`KeyNotFound`] returned when a transaction id is unknown.
//!
//! None of them is fatal: an empty window is never an error.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidRange`]: EngineError::InvalidRange
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid transaction: {0}")]
    Validation(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}
