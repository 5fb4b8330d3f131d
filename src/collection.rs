//! In-memory transaction collection and the record-source seam.
//!
//! The collection owns the authoritative ordered sequence of normalized
//! [`Transaction`]s for one report kind. Where the records come from is
//! abstracted behind [`RecordSource`] / [`BlockingRecordSource`]: the
//! HTTP clients in [`crate::client`] implement both, and tests inject
//! in-memory sources.

use crate::error::Result;
use crate::models::{RawRecord, ReportKind, Transaction};

#[cfg(feature = "async")]
use core::future::Future;

/// Async source of raw records for a report kind.
#[cfg(feature = "async")]
pub trait RecordSource: core::fmt::Debug + Send + Sync {
    /// Fetches all raw records backing the given report kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails; the caller's
    /// collection is left unchanged in that case.
    fn fetch(&self, kind: ReportKind) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;
}

/// Blocking source of raw records for a report kind.
#[cfg(feature = "blocking")]
pub trait BlockingRecordSource: core::fmt::Debug {
    /// Fetches all raw records backing the given report kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails; the caller's
    /// collection is left unchanged in that case.
    fn fetch(&self, kind: ReportKind) -> Result<Vec<RawRecord>>;
}

/// Ordered in-memory sequence of transactions for the active report kind.
///
/// Created empty, populated by a bulk [`load`](Self::load), optionally
/// appended to after local create actions, and simply dropped when the
/// caller is done — no persistence responsibility lives here.
#[derive(Debug, Clone)]
pub struct TransactionCollection {
    /// Report kind every held record belongs to.
    kind: ReportKind,
    /// Held records, newest first for appended items.
    records: Vec<Transaction>,
}

impl TransactionCollection {
    /// Creates an empty collection for the given kind.
    #[inline]
    #[must_use]
    pub const fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    /// Report kind this collection holds.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Read-only snapshot of the held records.
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[Transaction] {
        &self.records
    }

    /// Number of held records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are held.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fetches from the source, normalizes, and replaces the held
    /// records. Returns the new record count.
    ///
    /// Replacement happens only after a fully successful fetch: on any
    /// source error the previously held collection is left untouched,
    /// never partially overwritten.
    ///
    /// # Errors
    ///
    /// Propagates the source's error.
    #[cfg(feature = "async")]
    #[tracing::instrument(skip_all, fields(kind = %self.kind))]
    pub async fn load<S: RecordSource>(&mut self, source: &S) -> Result<usize> {
        let raw = source.fetch(self.kind).await?;
        self.records = normalize(self.kind, raw);
        tracing::debug!(count = self.records.len(), "collection loaded");
        Ok(self.records.len())
    }

    /// Blocking variant of [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Propagates the source's error.
    #[cfg(feature = "blocking")]
    #[tracing::instrument(skip_all, fields(kind = %self.kind))]
    pub fn load_blocking<S: BlockingRecordSource>(&mut self, source: &S) -> Result<usize> {
        let raw = source.fetch(self.kind)?;
        self.records = normalize(self.kind, raw);
        tracing::debug!(count = self.records.len(), "collection loaded");
        Ok(self.records.len())
    }

    /// Inserts a locally-created record at the head of the collection
    /// (newest-first convention).
    ///
    /// No external write happens here; persist separately, e.g. via
    /// `register_call` on the HTTP client.
    #[inline]
    pub fn append(&mut self, record: Transaction) {
        self.records.insert(0, record);
    }
}

/// Normalizes a batch of raw records, assigning positional fallback ids.
fn normalize(kind: ReportKind, raw: Vec<RawRecord>) -> Vec<Transaction> {
    raw.into_iter()
        .enumerate()
        .map(|(seq, record)| Transaction::from_raw(kind, record, seq))
        .collect()
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use super::*;
    use crate::error::CallTrackError;
    use crate::models::{RawId, TransactionId};
    use std::sync::Mutex;

    /// Test source returning canned records or a canned failure.
    #[derive(Debug)]
    struct FakeSource {
        /// Outcome returned by the next `fetch` call.
        outcome: Mutex<Option<Vec<RawRecord>>>,
    }

    impl FakeSource {
        fn ok(records: Vec<RawRecord>) -> Self {
            Self {
                outcome: Mutex::new(Some(records)),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Mutex::new(None),
            }
        }
    }

    impl RecordSource for FakeSource {
        async fn fetch(&self, _kind: ReportKind) -> Result<Vec<RawRecord>> {
            self.outcome
                .lock()
                .unwrap()
                .clone()
                .ok_or(CallTrackError::Api {
                    status: 500,
                    message: "boom".to_owned(),
                })
        }
    }

    fn raw_with_id(id: i64) -> RawRecord {
        RawRecord {
            id: Some(RawId::Num(id)),
            amount: Some(100.0),
            ..RawRecord::default()
        }
    }

    #[tokio::test]
    async fn load_replaces_records() {
        let mut collection = TransactionCollection::new(ReportKind::Payment);
        let source = FakeSource::ok(vec![raw_with_id(1), raw_with_id(2)]);
        let count = collection.load(&source).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.all()[0].id, TransactionId::new("1".to_owned()));
    }

    #[tokio::test]
    async fn failed_load_retains_previous_records() {
        let mut collection = TransactionCollection::new(ReportKind::Payment);
        let good = FakeSource::ok(vec![raw_with_id(1)]);
        let _ = collection.load(&good).await.unwrap();

        let bad = FakeSource::failing();
        let err = collection.load(&bad).await.unwrap_err();
        assert!(matches!(err, CallTrackError::Api { status: 500, .. }));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.all()[0].id, TransactionId::new("1".to_owned()));
    }

    #[tokio::test]
    async fn missing_ids_get_positional_fallbacks() {
        let mut collection = TransactionCollection::new(ReportKind::Call);
        let source = FakeSource::ok(vec![RawRecord::default(), RawRecord::default()]);
        let _ = collection.load(&source).await.unwrap();
        assert_eq!(collection.all()[0].id.as_inner(), "calls-0");
        assert_eq!(collection.all()[1].id.as_inner(), "calls-1");
    }

    #[tokio::test]
    async fn append_inserts_at_head() {
        let mut collection = TransactionCollection::new(ReportKind::Call);
        let source = FakeSource::ok(vec![raw_with_id(1)]);
        let _ = collection.load(&source).await.unwrap();

        let local = Transaction::from_raw(ReportKind::Call, raw_with_id(99), 0);
        collection.append(local);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.all()[0].id.as_inner(), "99");
    }

    #[test]
    fn new_collection_is_empty() {
        let collection = TransactionCollection::new(ReportKind::Debtor);
        assert!(collection.is_empty());
        assert_eq!(collection.kind(), ReportKind::Debtor);
        assert!(collection.all().is_empty());
    }
}
