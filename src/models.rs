//! Data models for `CallTrack` API entities.
//!
//! This module contains the canonical [`Transaction`] shape the report
//! pipeline operates on, the tolerant wire-side [`RawRecord`] /
//! [`Envelope`] types, newtype ID wrappers, and the [`ReportKind`]
//! enumeration.

mod ids;
mod kind;
mod raw;
mod transaction;

pub use chrono::{NaiveDate, NaiveDateTime};
pub use ids::{ClientId, TransactionId};
pub use kind::ReportKind;
pub use raw::{Envelope, NewCall, RawId, RawRecord};
pub use transaction::Transaction;
