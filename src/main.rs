use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use week_ledger::args::{Args, Command};
use week_ledger::{commands, Config, Error, ErrorType, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => commands::add(load(home).await?, add_args.clone())
            .await?
            .print(),

        Command::Import(import_args) => commands::import(load(home).await?, import_args.file())
            .await?
            .print(),

        Command::Charts(charts_args) => commands::charts(load(home).await?, charts_args.clone())
            .await?
            .print(),

        Command::Report(report_args) => commands::report(load(home).await?, report_args.clone())
            .await?
            .print(),

        Command::Repair(repair_args) => commands::repair(load(home).await?, repair_args.clone())
            .await?
            .print(),
    };
    Ok(())
}

async fn load(home: &std::path::Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and the binary.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
