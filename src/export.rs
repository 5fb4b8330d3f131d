//! CSV export of the filtered (unpaged) report set.
//!
//! The exporter reuses the exact display formatting of the on-screen
//! report ([`Transaction::cells`] feeds both), so a downloaded file
//! always matches what the user saw.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::{CallTrackError, Result};
use crate::models::{ReportKind, Transaction};
use crate::report::FilterCriteria;

/// UTF-8 byte-order mark, prepended so spreadsheet applications detect
/// the encoding.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Configurable CSV exporter.
///
/// Defaults match the downloadable-report contract: `;` delimiter, every
/// cell quoted, UTF-8 BOM prepended.
///
/// # Examples
///
/// ```no_run
/// use calltrack_rs::export::CsvExporter;
/// use calltrack_rs::models::ReportKind;
///
/// # fn demo(records: &[calltrack_rs::models::Transaction]) -> calltrack_rs::error::Result<()> {
/// let bytes = CsvExporter::new().delimiter(b',').export(ReportKind::Payment, records)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExporter {
    /// Field delimiter byte.
    delimiter: u8,
    /// Whether to prepend the UTF-8 BOM.
    bom: bool,
}

impl Default for CsvExporter {
    #[inline]
    fn default() -> Self {
        Self {
            delimiter: b';',
            bom: true,
        }
    }
}

impl CsvExporter {
    /// Creates an exporter with the default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter (`;` by default).
    #[inline]
    #[must_use]
    pub const fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enables or disables the UTF-8 BOM prefix (on by default).
    #[inline]
    #[must_use]
    pub const fn bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    /// Serializes the records to CSV bytes: one header row in the
    /// kind's column order, then one row per record.
    ///
    /// Pass the filtered but **unpaged** set — the export covers the
    /// whole report, not the visible page.
    ///
    /// # Errors
    ///
    /// [`CallTrackError::EmptyExport`] when `records` is empty (no
    /// artifact should be produced for an empty report), or
    /// [`CallTrackError::Csv`] on serialization failure.
    #[tracing::instrument(skip_all, fields(kind = %kind, rows = records.len()))]
    pub fn export(&self, kind: ReportKind, records: &[Transaction]) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(CallTrackError::EmptyExport);
        }

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());

        writer.write_record(kind.column_headers())?;
        for record in records {
            writer.write_record(record.cells())?;
        }

        let body = writer
            .into_inner()
            .map_err(|err| CallTrackError::Io(err.into_error()))?;

        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
        if self.bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(&body);
        tracing::debug!(size = bytes.len(), "report exported");
        Ok(bytes)
    }

    /// Exports and writes the artifact to `path`.
    ///
    /// # Errors
    ///
    /// Everything [`export`](Self::export) returns, plus
    /// [`CallTrackError::Io`] on write failure. Nothing is written when
    /// the record set is empty.
    pub fn export_to_path<P: AsRef<Path>>(
        &self,
        kind: ReportKind,
        records: &[Transaction],
        path: P,
    ) -> Result<()> {
        let bytes = self.export(kind, records)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Suggested file name for a report artifact:
/// `{kind}_report_{from|all}_{to|all}_{today}.csv`, with the filter
/// bounds as `YYYYMMDD` or the literal `all` when unset.
#[must_use]
pub fn file_name(kind: ReportKind, filter: &FilterCriteria) -> String {
    let bound = |date: Option<chrono::NaiveDate>| {
        date.map_or_else(|| "all".to_owned(), |d| d.format("%Y%m%d").to_string())
    };
    format!(
        "{kind}_report_{}_{}_{}.csv",
        bound(filter.date_from),
        bound(filter.date_to),
        chrono::Local::now().format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NaiveDate, RawId, RawRecord};

    fn payment(id: i64, phone: &str, amount: f64) -> Transaction {
        let raw = RawRecord {
            id: Some(RawId::Num(id)),
            phone_number: Some(RawId::Text(phone.to_owned())),
            date: Some("2025-02-10T14:30:00".to_owned()),
            amount: Some(amount),
            payment_method: Some("card".to_owned()),
            ..RawRecord::default()
        };
        Transaction::from_raw(ReportKind::Payment, raw, 0)
    }

    #[test]
    fn export_round_trips_rows_and_cells() {
        let records = vec![
            payment(1, "+7 921 555-66-77", 600.0),
            payment(2, "+7 921 555-66-78", 1500.5),
        ];
        let bytes = CsvExporter::new().export(ReportKind::Payment, &records).unwrap();

        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        let body = &bytes[3..];
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(body);

        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            ReportKind::Payment.column_headers()
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some("+7 921 555-66-77"));
        assert_eq!(rows[0].get(1), Some("10.02.2025 14:30"));
        assert_eq!(rows[0].get(2), Some("600.00"));
        assert_eq!(rows[0].get(3), Some("Bank card"));
        assert_eq!(rows[1].get(2), Some("1500.50"));
    }

    #[test]
    fn every_cell_is_quoted_and_interior_quotes_doubled() {
        let records = vec![payment(1, r#"office "north" line"#, 100.0)];
        let bytes = CsvExporter::new()
            .bom(false)
            .export(ReportKind::Payment, &records)
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#""Phone number";"Date""#));
        assert!(text.contains(r#""office ""north"" line""#));
    }

    #[test]
    fn comma_delimiter_is_selectable() {
        let records = vec![payment(1, "+79215550001", 100.0)];
        let bytes = CsvExporter::new()
            .delimiter(b',')
            .bom(false)
            .export(ReportKind::Payment, &records)
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#""Phone number","Date""#));
    }

    #[test]
    fn empty_set_refuses_to_export() {
        let err = CsvExporter::new()
            .export(ReportKind::Call, &[])
            .unwrap_err();
        assert!(matches!(err, CallTrackError::EmptyExport));
    }

    #[test]
    fn export_to_path_writes_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.csv");
        let records = vec![payment(1, "+79215550001", 100.0)];
        CsvExporter::new()
            .export_to_path(ReportKind::Payment, &records, &path)
            .unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(&[0xEF, 0xBB, 0xBF]));
    }

    #[test]
    fn export_to_path_writes_nothing_for_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let err = CsvExporter::new()
            .export_to_path(ReportKind::Call, &[], &path)
            .unwrap_err();
        assert!(matches!(err, CallTrackError::EmptyExport));
        assert!(!path.exists());
    }

    #[test]
    fn file_name_encodes_filter_bounds() {
        let filter = FilterCriteria::new()
            .date_from(NaiveDate::from_ymd_opt(2025, 2, 5).unwrap());
        let name = file_name(ReportKind::Payment, &filter);
        assert!(name.starts_with("payments_report_20250205_all_"));
        assert!(name.ends_with(".csv"));

        let open = file_name(ReportKind::Debtor, &FilterCriteria::new());
        assert!(open.starts_with("debtors_report_all_all_"));
    }
}
