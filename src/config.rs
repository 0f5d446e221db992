//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and holds the currency format
//! used by reports, the number of envelopes kept in the outbox and, optionally, a workbook
//! location other than `$LEDGER_HOME/ledger.json`.

use crate::api::WorkbookFile;
use crate::error::Res;
use crate::model::CurrencyFormat;
use crate::outbox::Outbox;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const OUTBOX_COPIES: u32 = 20;
const OUTBOX: &str = ".outbox";
const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "ledger.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It provides
/// paths to the workbook and the outbox.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    outbox: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the ledger home, its outbox directory, an initial `config.json` with default
    /// settings and an empty workbook.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail, or if the home already holds a config file
    ///   or a workbook.
    pub async fn create(dir: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let outbox = root.join(OUTBOX);
        utils::make_dir(&outbox).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!("The ledger home is already initialized at '{}'", root.display())
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            outbox,
            config_path,
            config_file,
        };
        WorkbookFile::create(config.workbook_path())
            .await
            .context("Unable to create the workbook")?;
        Ok(config)
    }

    /// This will
    /// - validate that `ledger_home` and the config file exist
    /// - load the config file
    /// - validate that the outbox directory exists
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = ledger_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger home is missing, run 'ledger init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            outbox: root.join(OUTBOX),
            root,
            config_path,
            config_file,
        };
        if !config.outbox.is_dir() {
            bail!(
                "The outbox directory is missing '{}'",
                config.outbox.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    pub fn outbox_copies(&self) -> u32 {
        self.config_file.outbox_copies
    }

    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(
            &self.config_file.currency_symbol,
            &self.config_file.thousands_separator,
        )
    }

    /// The configured `workbook_path` if it is absolute, otherwise resolved against the home
    /// directory. Defaults to `$LEDGER_HOME/ledger.json`.
    pub fn workbook_path(&self) -> PathBuf {
        let p = self
            .config_file
            .workbook_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LEDGER_JSON));
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Opens the workbook.
    pub async fn workbook(&self) -> Res<WorkbookFile> {
        WorkbookFile::open(self.workbook_path()).await
    }

    /// Creates a new `Outbox` for delivering reports.
    pub fn mailer(&self) -> Outbox {
        Outbox::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "currency_symbol": "$",
///   "thousands_separator": ".",
///   "outbox_copies": 20,
///   "workbook_path": "ledger.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    config_version: u8,

    #[serde(default = "default_symbol")]
    currency_symbol: String,

    #[serde(default = "default_separator")]
    thousands_separator: String,

    /// Number of report envelopes to keep in the outbox
    #[serde(default = "default_outbox_copies")]
    outbox_copies: u32,

    /// Relative to the ledger home, or absolute
    #[serde(skip_serializing_if = "Option::is_none")]
    workbook_path: Option<PathBuf>,
}

fn default_symbol() -> String {
    CurrencyFormat::default().symbol().to_string()
}

fn default_separator() -> String {
    CurrencyFormat::default().thousands_separator().to_string()
}

fn default_outbox_copies() -> u32 {
    OUTBOX_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency_symbol: default_symbol(),
            thousands_separator: default_separator(),
            outbox_copies: OUTBOX_COPIES,
            workbook_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or was not written by this app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
