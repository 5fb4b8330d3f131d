//! `CallTrack` command-line report tool.
//!
//! Loads a report collection over HTTP, runs the filter/sort/paginate
//! pipeline, and either prints one page as a table or exports the
//! filtered set to CSV.
//!
//! Requires `CALLTRACK_TOKEN`; payments additionally need
//! `CALLTRACK_CLIENT_ID`. `CALLTRACK_BASE_URL` overrides the API host.
//! A `.env` file is honored.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use owo_colors::OwoColorize;

use calltrack_rs::client::CallTrackBlockingClient;
use calltrack_rs::collection::TransactionCollection;
use calltrack_rs::export::{CsvExporter, file_name};
use calltrack_rs::models::{ClientId, NaiveDate, ReportKind};
use calltrack_rs::report::{
    DEFAULT_PAGE_SIZE, FilterCriteria, PageRequest, ReportQuery, SortSpec, apply,
};

#[derive(Debug, Parser)]
#[command(name = "calltrack", version, about = "CallTrack billing reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of a report.
    Report {
        #[command(flatten)]
        selection: Selection,
        /// Sort order.
        #[arg(long, value_enum, default_value = "load")]
        sort: SortArg,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Export the filtered report to a CSV file.
    Export {
        #[command(flatten)]
        selection: Selection,
        /// Output path; defaults to the generated report file name.
        #[arg(long)]
        output: Option<PathBuf>,
        /// CSV field delimiter.
        #[arg(long, default_value_t = ';')]
        delimiter: char,
    },
}

/// Report kind and filter flags shared by both subcommands.
#[derive(Debug, Args)]
struct Selection {
    /// Report kind.
    #[arg(value_enum)]
    kind: KindArg,
    /// Start day, inclusive (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,
    /// End day, inclusive (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Phone number filter; only digits are compared.
    #[arg(long)]
    phone: Option<String>,
}

impl Selection {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        criteria.date_from = self.from;
        criteria.date_to = self.to;
        criteria.subject_query = self.phone.clone();
        criteria
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Calls,
    Payments,
    Debtors,
}

impl From<KindArg> for ReportKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Calls => Self::Call,
            KindArg::Payments => Self::Payment,
            KindArg::Debtors => Self::Debtor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Load,
    AmountAsc,
    AmountDesc,
    MinutesAsc,
    MinutesDesc,
    DateAsc,
    DateDesc,
}

impl From<SortArg> for SortSpec {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Load => Self::LoadOrder,
            SortArg::AmountAsc => Self::AmountAsc,
            SortArg::AmountDesc => Self::AmountDesc,
            SortArg::MinutesAsc => Self::SecondaryAsc,
            SortArg::MinutesDesc => Self::SecondaryDesc,
            SortArg::DateAsc => Self::TimestampAsc,
            SortArg::DateDesc => Self::TimestampDesc,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report {
            selection,
            sort,
            page,
            page_size,
        } => report(&selection, sort, page, page_size),
        Command::Export {
            selection,
            output,
            delimiter,
        } => export(&selection, output, delimiter),
    }
}

/// Loads the collection for the selected kind from the API.
fn load(kind: ReportKind) -> Result<TransactionCollection, Box<dyn std::error::Error>> {
    let token = std::env::var("CALLTRACK_TOKEN")
        .map_err(|_| "CALLTRACK_TOKEN environment variable not set")?;

    let mut builder = CallTrackBlockingClient::builder().token(token);
    if let Ok(url) = std::env::var("CALLTRACK_BASE_URL") {
        builder = builder.base_url(url);
    }
    if let Ok(id) = std::env::var("CALLTRACK_CLIENT_ID") {
        builder = builder.client_id(ClientId::new(id.parse()?));
    }
    let client = builder.build()?;

    let mut collection = TransactionCollection::new(kind);
    let count = collection.load_blocking(&client)?;
    tracing::info!(kind = %kind, count, "collection loaded");
    Ok(collection)
}

fn report(
    selection: &Selection,
    sort: SortArg,
    page: usize,
    page_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = ReportKind::from(selection.kind);
    let collection = load(kind)?;

    let query = ReportQuery {
        filter: selection.criteria(),
        sort: sort.into(),
        page: PageRequest::new(page, page_size),
    };
    let result = query.execute(collection.all());

    let mut table = Table::new();
    _ = table.set_header(kind.column_headers());
    for row in &result.rows {
        _ = table.add_row(row.cells());
    }
    println!("{table}");
    println!(
        "page {} of {}, {} rows, total {:.2}",
        result.page_number, result.total_pages, result.total_rows, result.total_amount
    );
    Ok(())
}

fn export(
    selection: &Selection,
    output: Option<PathBuf>,
    delimiter: char,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = ReportKind::from(selection.kind);
    let collection = load(kind)?;

    let criteria = selection.criteria();
    let filtered = apply(collection.all(), &criteria, SortSpec::LoadOrder);
    let delimiter = u8::try_from(delimiter).map_err(|_| "delimiter must be an ASCII character")?;
    let path = output.unwrap_or_else(|| PathBuf::from(file_name(kind, &criteria)));

    CsvExporter::new()
        .delimiter(delimiter)
        .export_to_path(kind, &filtered, &path)?;
    println!(
        "{} {} rows to {}",
        "exported".green(),
        filtered.len(),
        path.display()
    );
    Ok(())
}
