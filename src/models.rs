//! Data models for Fio API statements.
//!
//! Strongly-typed representations of statement headers, movements and
//! export formats, plus newtype id wrappers.

mod format;
mod ids;
mod statement;
mod transaction;

pub use chrono::{DateTime, FixedOffset, NaiveDate};
pub use format::{ExportFormat, UnknownFormat};
pub use ids::{AccountId, TransactionId};
pub use rust_decimal::Decimal;
pub use statement::{Statement, StatementInfo};
pub use transaction::Transaction;
