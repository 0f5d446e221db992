//! These structs provide the CLI interface for the ledger CLI.

use crate::model::PeriodKey;
use crate::report::ChartKind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A weekly expense ledger.
///
/// Purchases are kept in one sheet per month. Inside a month every week gets its own block of
/// rows with a running total, and the month keeps a grand total. Reports and chart tables are
/// built from those sheets on demand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home with its config file, an empty workbook and the report outbox.
    ///
    /// This is the first command you should run. By default the home is $HOME/ledger; pass
    /// --ledger-home or set LEDGER_HOME to put it somewhere else.
    Init,
    /// Record one purchase.
    Add(AddArgs),
    /// Record every purchase in a CSV file with the headers Date,Store,Product,Quantity,Price.
    ///
    /// The whole file is checked first. If any row is invalid nothing is written.
    Import(ImportArgs),
    /// Rebuild the chart tables in the 'Chart Data' sheet.
    Charts(ChartsArgs),
    /// Print the report for a month, and optionally queue it for email.
    Report(ReportArgs),
    /// Recompute every week total and the month total of a month.
    Repair(RepairArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are kept. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `ledger add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The purchase date, YYYY-MM-DD.
    #[arg(long)]
    date: String,

    #[arg(long)]
    store: String,

    #[arg(long)]
    product: String,

    /// A positive number.
    #[arg(long)]
    quantity: String,

    /// The unit price. Must not be negative.
    #[arg(long)]
    price: String,
}

impl AddArgs {
    pub fn new(
        date: impl Into<String>,
        store: impl Into<String>,
        product: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            store: store.into(),
            product: product.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

/// (Not shown): Args for the `ledger import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The CSV file to read.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// (Not shown): Args for the `ledger charts` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartsArgs {
    /// The month for the weekly and store tables, e.g. "January 2025" or 2025-01. Defaults to
    /// the current month.
    #[arg(long)]
    period: Option<PeriodKey>,

    /// Which tables to rebuild.
    #[arg(long, value_enum, default_value_t = ChartKind::All)]
    kind: ChartKind,
}

impl ChartsArgs {
    pub fn new(period: Option<PeriodKey>, kind: ChartKind) -> Self {
        Self { period, kind }
    }

    pub fn period(&self) -> Option<PeriodKey> {
        self.period
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }
}

/// (Not shown): Args for the `ledger report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The month to report on, e.g. "January 2025" or 2025-01.
    #[arg(long)]
    period: PeriodKey,

    /// Queue the report for this address in the outbox.
    #[arg(long)]
    email: Option<String>,
}

impl ReportArgs {
    pub fn new(period: PeriodKey, email: Option<String>) -> Self {
        Self { period, email }
    }

    pub fn period(&self) -> PeriodKey {
        self.period
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// (Not shown): Args for the `ledger repair` command.
#[derive(Debug, Parser, Clone)]
pub struct RepairArgs {
    /// The month to repair, e.g. "January 2025" or 2025-01.
    #[arg(long)]
    period: PeriodKey,
}

impl RepairArgs {
    pub fn new(period: PeriodKey) -> Self {
        Self { period }
    }

    pub fn period(&self) -> PeriodKey {
        self.period
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
