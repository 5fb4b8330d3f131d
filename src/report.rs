//! The report pipeline: filter → sort → paginate.
//!
//! One parameterized implementation serves every report kind; the kind
//! travels as data inside the records themselves. All operations here
//! are pure, synchronous, in-memory transforms: they never mutate the
//! source collection and never suspend.

use crate::models::{NaiveDate, Transaction};

/// Default number of rows per report page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Composable filter criteria for the report pipeline.
///
/// All predicates are AND-combined; an unset bound or query is vacuously
/// true. Use builder-style methods to chain criteria.
///
/// # Examples
///
/// ```
/// use calltrack_rs::models::NaiveDate;
/// use calltrack_rs::report::FilterCriteria;
///
/// let criteria = FilterCriteria::new()
///     .date_range(
///         NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
///     )
///     .subject_query("921-555");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Start day (inclusive from 00:00:00).
    pub date_from: Option<NaiveDate>,
    /// End day (inclusive through 23:59:59).
    pub date_to: Option<NaiveDate>,
    /// Phone filter; only its digit characters are compared.
    pub subject_query: Option<String>,
}

impl FilterCriteria {
    /// Creates an empty filter that matches all records.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to records on or after the given day.
    #[inline]
    #[must_use]
    pub const fn date_from(mut self, from: NaiveDate) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Restricts to records on or before the given day.
    #[inline]
    #[must_use]
    pub const fn date_to(mut self, to: NaiveDate) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Restricts to records within the given day range (inclusive at
    /// both ends).
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Restricts to records whose subject number contains the digits of
    /// the given query, ignoring all formatting characters on both sides.
    #[inline]
    #[must_use]
    pub fn subject_query<T: Into<String>>(mut self, query: T) -> Self {
        self.subject_query = Some(query.into());
        self
    }

    /// Returns `true` if the record satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_date(tx) && self.matches_subject(tx)
    }

    /// Checks the date-range criteria.
    ///
    /// Kinds that carry no timestamp (debtors) are exempt and always
    /// pass. A dated record whose timestamp failed to parse does not
    /// pass an active date filter.
    fn matches_date(&self, tx: &Transaction) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        if !tx.kind.is_dated() {
            return true;
        }
        let Some(ts) = tx.timestamp else {
            return false;
        };
        let day = ts.date();
        self.date_from.is_none_or(|from| day >= from) && self.date_to.is_none_or(|to| day <= to)
    }

    /// Checks the subject-number criteria (digits-only substring match).
    fn matches_subject(&self, tx: &Transaction) -> bool {
        self.subject_query.as_deref().is_none_or(|query| {
            let needle = digits(query);
            needle.is_empty() || digits(&tx.subject_number).contains(&needle)
        })
    }
}

/// Extracts only the ASCII digit characters of a string.
fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Sort order applied after filtering.
///
/// Sorting is stable: records with equal keys keep their relative order
/// from the collection (load order, newest-first for appended records).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortSpec {
    /// Collection load order — the default.
    #[default]
    LoadOrder,
    /// Ascending by amount.
    AmountAsc,
    /// Descending by amount.
    AmountDesc,
    /// Ascending by the kind-specific secondary measure (minutes).
    SecondaryAsc,
    /// Descending by the kind-specific secondary measure (minutes).
    SecondaryDesc,
    /// Chronological; records without a timestamp order first.
    TimestampAsc,
    /// Reverse chronological; records without a timestamp order last.
    TimestampDesc,
}

/// Applies filter and sort to a record sequence, producing a new view.
///
/// The result is always a subsequence of `records`: nothing is
/// invented, duplicated, or mutated. Empty input yields empty output.
#[must_use]
pub fn apply(records: &[Transaction], filter: &FilterCriteria, sort: SortSpec) -> Vec<Transaction> {
    let mut filtered: Vec<Transaction> = records
        .iter()
        .filter(|tx| filter.matches(tx))
        .cloned()
        .collect();
    sort_records(&mut filtered, sort);
    filtered
}

/// Stable-sorts records in place in the requested order.
fn sort_records(records: &mut [Transaction], sort: SortSpec) {
    match sort {
        SortSpec::LoadOrder => {}
        SortSpec::AmountAsc => records.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        SortSpec::AmountDesc => records.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        SortSpec::SecondaryAsc => records.sort_by(|a, b| secondary(a).total_cmp(&secondary(b))),
        SortSpec::SecondaryDesc => records.sort_by(|a, b| secondary(b).total_cmp(&secondary(a))),
        SortSpec::TimestampAsc => records.sort_by_key(Transaction::sort_timestamp),
        SortSpec::TimestampDesc => {
            records.sort_by(|a, b| b.sort_timestamp().cmp(&a.sort_timestamp()));
        }
    }
}

/// Secondary measure with its neutral default, for ordering purposes.
fn secondary(tx: &Transaction) -> f64 {
    tx.secondary_measure.unwrap_or(0.0)
}

/// A 1-based page request over the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page_number: usize,
    /// Rows per page; at least 1.
    pub page_size: usize,
}

impl Default for PageRequest {
    #[inline]
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    /// Creates a page request; a zero page size is raised to 1.
    #[inline]
    #[must_use]
    pub const fn new(page_number: usize, page_size: usize) -> Self {
        let page_size = if page_size == 0 { 1 } else { page_size };
        Self {
            page_number,
            page_size,
        }
    }

    /// First page with the given size.
    #[inline]
    #[must_use]
    pub const fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    /// Returns a copy with the page number clamped into
    /// `[1, total_pages]`.
    ///
    /// [`paginate`] itself never clamps; call this before paginating
    /// when an empty out-of-range page is not the desired behavior.
    #[inline]
    #[must_use]
    pub fn clamped(self, total_pages: usize) -> Self {
        Self {
            page_number: self.page_number.clamp(1, total_pages.max(1)),
            page_size: self.page_size,
        }
    }
}

/// Number of pages needed for `count` rows.
///
/// Never less than 1, so "page 1 of 1" is a valid display state even for
/// an empty set.
#[inline]
#[must_use]
pub const fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = if page_size == 0 { 1 } else { page_size };
    let pages = count.div_ceil(page_size);
    if pages == 0 { 1 } else { pages }
}

/// Returns the slice `[(n-1)*size, n*size)` of the filtered set.
///
/// Deliberately non-clamping: an out-of-range page yields an empty
/// slice, not an error. Callers wanting clamping use
/// [`PageRequest::clamped`] first.
#[must_use]
pub fn paginate(records: &[Transaction], page: PageRequest) -> &[Transaction] {
    if page.page_number == 0 {
        return &[];
    }
    let start = (page.page_number - 1).saturating_mul(page.page_size);
    let end = start.saturating_add(page.page_size).min(records.len());
    records.get(start..end).unwrap_or(&[])
}

/// Immutable description of one report recomputation.
///
/// The embedding application keeps a single current query and re-derives
/// display output from it on every change, instead of scattering mutable
/// filter/page state.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportQuery {
    /// Active filter criteria.
    pub filter: FilterCriteria,
    /// Active sort order.
    pub sort: SortSpec,
    /// Requested page.
    pub page: PageRequest,
}

impl ReportQuery {
    /// Runs filter → sort → paginate over the records and returns the
    /// page plus summary figures.
    ///
    /// The page number is clamped into range here, so a filter change
    /// that shrinks the set can never strand the caller on a page past
    /// the end.
    #[must_use]
    pub fn execute(&self, records: &[Transaction]) -> ReportPage {
        let filtered = apply(records, &self.filter, self.sort);
        let total_rows = filtered.len();
        let total_pages = total_pages(total_rows, self.page.page_size);
        let page = self.page.clamped(total_pages);
        let total_amount = filtered.iter().map(|tx| tx.amount).sum();
        let rows = paginate(&filtered, page).to_vec();

        ReportPage {
            rows,
            page_number: page.page_number,
            total_pages,
            total_rows,
            total_amount,
        }
    }
}

/// One computed page of a report, plus summary counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    /// Rows of the current page, in display order.
    pub rows: Vec<Transaction>,
    /// 1-based page number actually rendered (post-clamp).
    pub page_number: usize,
    /// Total pages for the filtered set; at least 1.
    pub total_pages: usize,
    /// Cardinality of the filtered (unpaged) set.
    pub total_rows: usize,
    /// Sum of amounts over the filtered (unpaged) set.
    pub total_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawId, RawRecord, ReportKind, Transaction};

    fn payment(id: i64, date: &str, amount: f64) -> Transaction {
        let raw = RawRecord {
            id: Some(RawId::Num(id)),
            phone_number: Some(RawId::Text(format!("+7 921 555-00-{id:02}"))),
            date: Some(date.to_owned()),
            amount: Some(amount),
            ..RawRecord::default()
        };
        Transaction::from_raw(ReportKind::Payment, raw, 0)
    }

    fn debtor(id: i64, amount: f64) -> Transaction {
        let raw = RawRecord {
            id: Some(RawId::Num(id)),
            amount: Some(amount),
            ..RawRecord::default()
        };
        Transaction::from_raw(ReportKind::Debtor, raw, 0)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn apply_returns_subsequence_without_mutating_source() {
        let records = vec![
            payment(1, "2025-02-01", 10.0),
            payment(2, "2025-02-02", 20.0),
            payment(3, "2025-02-03", 30.0),
        ];
        let snapshot = records.clone();
        let out = apply(&records, &FilterCriteria::new(), SortSpec::AmountDesc);
        assert_eq!(records, snapshot);
        assert_eq!(out.len(), 3);
        for tx in &out {
            assert_eq!(records.iter().filter(|r| r.id == tx.id).count(), 1);
        }
    }

    #[test]
    fn sort_is_stable_on_equal_keys() {
        let records = vec![
            payment(1, "2025-02-01", 50.0),
            payment(2, "2025-02-02", 50.0),
            payment(3, "2025-02-03", 50.0),
        ];
        let out = apply(&records, &FilterCriteria::new(), SortSpec::AmountAsc);
        let ids: Vec<&str> = out.iter().map(|tx| tx.id.as_inner()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn date_range_is_inclusive_at_both_boundaries() {
        let records = vec![
            payment(1, "2025-02-05T00:00:00", 1.0),
            payment(2, "2025-02-28T23:59:59", 2.0),
            payment(3, "2025-03-01T00:00:00", 3.0),
            payment(4, "2025-02-04T23:59:59", 4.0),
        ];
        let filter = FilterCriteria::new().date_range(ymd(2025, 2, 5), ymd(2025, 2, 28));
        let out = apply(&records, &filter, SortSpec::LoadOrder);
        let ids: Vec<&str> = out.iter().map(|tx| tx.id.as_inner()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn debtors_are_exempt_from_date_filters() {
        let records = vec![debtor(1, 500.0), debtor(2, 700.0)];
        let filter = FilterCriteria::new().date_range(ymd(2025, 2, 1), ymd(2025, 2, 28));
        assert_eq!(apply(&records, &filter, SortSpec::LoadOrder).len(), 2);
    }

    #[test]
    fn unparsable_date_fails_active_date_filter() {
        let raw = RawRecord {
            id: Some(RawId::Num(1)),
            date: Some("garbage".to_owned()),
            amount: Some(5.0),
            ..RawRecord::default()
        };
        let records = vec![Transaction::from_raw(ReportKind::Payment, raw, 0)];
        let filter = FilterCriteria::new().date_from(ymd(2025, 1, 1));
        assert!(apply(&records, &filter, SortSpec::LoadOrder).is_empty());
        // Without a date filter the record still passes.
        assert_eq!(
            apply(&records, &FilterCriteria::new(), SortSpec::LoadOrder).len(),
            1
        );
    }

    #[test]
    fn subject_query_compares_digits_only() {
        let records = vec![
            payment(1, "2025-02-01", 1.0),
            payment(2, "2025-02-02", 2.0),
        ];
        // Record 1 carries "+7 921 555-00-01".
        let filter = FilterCriteria::new().subject_query("921-555-00-01");
        let out = apply(&records, &filter, SortSpec::LoadOrder);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.as_inner(), "1");
    }

    #[test]
    fn digitless_subject_query_is_vacuously_true() {
        let records = vec![payment(1, "2025-02-01", 1.0)];
        let filter = FilterCriteria::new().subject_query("---");
        assert_eq!(apply(&records, &filter, SortSpec::LoadOrder).len(), 1);
    }

    #[test]
    fn timestamp_sort_places_missing_dates_at_earliest() {
        let records = vec![
            payment(1, "2025-02-10", 1.0),
            Transaction::from_raw(
                ReportKind::Payment,
                RawRecord {
                    id: Some(RawId::Num(2)),
                    ..RawRecord::default()
                },
                0,
            ),
            payment(3, "2025-02-01", 3.0),
        ];
        let out = apply(&records, &FilterCriteria::new(), SortSpec::TimestampAsc);
        let ids: Vec<&str> = out.iter().map(|tx| tx.id.as_inner()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn total_pages_floors_at_one() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(45, 20), 3);
    }

    #[test]
    fn pagination_slices_and_does_not_clamp() {
        let records: Vec<Transaction> = (0..45)
            .map(|i| payment(i64::from(i), "2025-02-01", f64::from(i)))
            .collect();
        assert_eq!(paginate(&records, PageRequest::new(1, 20)).len(), 20);
        assert_eq!(paginate(&records, PageRequest::new(3, 20)).len(), 5);
        assert!(paginate(&records, PageRequest::new(4, 20)).is_empty());
        assert!(paginate(&records, PageRequest::new(0, 20)).is_empty());
        assert!(paginate(&[], PageRequest::default()).is_empty());
    }

    #[test]
    fn page_request_clamps_into_range() {
        assert_eq!(PageRequest::new(9, 20).clamped(3).page_number, 3);
        assert_eq!(PageRequest::new(0, 20).clamped(3).page_number, 1);
        assert_eq!(PageRequest::new(2, 20).clamped(3).page_number, 2);
    }

    #[test]
    fn february_scenario() {
        let records = vec![
            payment(1, "2025-02-01", 1500.0),
            payment(2, "2025-02-10", 600.0),
            payment(3, "2025-02-12", 2100.0),
        ];
        let filter = FilterCriteria::new().date_range(ymd(2025, 2, 5), ymd(2025, 2, 28));

        let default_order = apply(&records, &filter, SortSpec::LoadOrder);
        let ids: Vec<&str> = default_order.iter().map(|tx| tx.id.as_inner()).collect();
        assert_eq!(ids, ["2", "3"]);

        let by_amount = apply(&records, &filter, SortSpec::AmountDesc);
        let amounts: Vec<f64> = by_amount.iter().map(|tx| tx.amount).collect();
        assert!((amounts[0] - 2100.0).abs() < f64::EPSILON);
        assert!((amounts[1] - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn query_execute_summarizes_and_clamps() {
        let records: Vec<Transaction> = (0..45)
            .map(|i| payment(i, "2025-02-01", 10.0))
            .collect();
        let query = ReportQuery {
            filter: FilterCriteria::new(),
            sort: SortSpec::LoadOrder,
            page: PageRequest::new(7, 20),
        };
        let page = query.execute(&records);
        assert_eq!(page.total_rows, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.rows.len(), 5);
        assert!((page.total_amount - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn query_execute_on_empty_collection() {
        let page = ReportQuery::default().execute(&[]);
        assert!(page.rows.is_empty());
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_rows, 0);
    }
}
