//! Report delivery.
//!
//! The ledger does not send mail itself. A `Mailer` receives a rendered `Envelope`; the
//! `Outbox` implementation drops each one as a JSON file into `$LEDGER_HOME/.outbox` for whatever
//! transport picks them up, keeping only the newest `outbox_copies` files.

use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::report::{Report, ReportFormatter};
use crate::{utils, Config};
use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uuid::Uuid;

/// Prefix of every envelope file.
pub const REPORT: &str = "report";

const EXTENSION: &str = "json";

/// A rendered report addressed to someone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Envelope {
    /// Renders `report` for `to`.
    ///
    /// # Errors
    /// - `InvalidArgument` if `to` does not look like an email address.
    pub fn new(to: &str, report: &Report, formatter: &ReportFormatter) -> Result<Self> {
        let to = to.trim();
        match to.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(Error::msg(
                    ErrorType::InvalidArgument,
                    format!("'{to}' is not an email address"),
                ))
            }
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            to: to.to_string(),
            subject: formatter.subject(report),
            html: formatter.html(report),
            text: formatter.text(report),
            created: Utc::now(),
        })
    }
}

/// Where a delivered envelope went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub envelope_id: String,
    pub location: String,
}

/// Hands envelopes to a transport.
#[async_trait::async_trait]
pub trait Mailer {
    async fn deliver(&self, envelope: &Envelope) -> Result<Receipt>;
}

/// A `Mailer` that writes envelopes into a directory and rotates old ones.
#[derive(Debug, Clone)]
pub struct Outbox {
    dir: PathBuf,
    copies: u32,
}

impl Outbox {
    pub fn new(config: &Config) -> Self {
        Self::with_dir(config.outbox(), config.outbox_copies())
    }

    pub fn with_dir(dir: impl Into<PathBuf>, copies: u32) -> Self {
        Self {
            dir: dir.into(),
            copies,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn save(&self, envelope: &Envelope) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(&date).await?;
        let path = self.dir.join(format!("{REPORT}.{date}-{seq:03}.{EXTENSION}"));

        let json = serde_json::to_string_pretty(envelope).context("Unable to serialize envelope")?;
        utils::write(&path, json).await?;
        self.rotate().await?;
        Ok(path)
    }

    /// One more than the highest sequence number used today.
    async fn next_sequence_number(&self, date: &str) -> Res<u32> {
        let mut max_seq: u32 = 0;
        for name in self.file_names().await? {
            if let Some(seq) = parse_sequence_number(&name, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Deletes the oldest envelopes beyond `copies`. Names sort by date and sequence.
    async fn rotate(&self) -> Res<()> {
        let mut files: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| is_envelope_file(name))
            .collect();
        files.sort();

        let to_delete = files.len().saturating_sub(self.copies as usize);
        for name in files.into_iter().take(to_delete) {
            trace!("Rotating out {name}");
            utils::remove(self.dir.join(name)).await?;
        }
        Ok(())
    }

    async fn file_names(&self) -> Res<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}

#[async_trait::async_trait]
impl Mailer for Outbox {
    async fn deliver(&self, envelope: &Envelope) -> Result<Receipt> {
        let path = self
            .save(envelope)
            .await
            .with_context(|| format!("Unable to deliver the report to {}", envelope.to))
            .pub_result(ErrorType::Delivery)?;
        debug!("Queued '{}' for {} at {}", envelope.subject, envelope.to, path.display());
        Ok(Receipt {
            envelope_id: envelope.id.clone(),
            location: path.display().to_string(),
        })
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// The sequence number of an envelope file written on `date`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{REPORT}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

fn is_envelope_file(filename: &str) -> bool {
    filename.starts_with(&format!("{REPORT}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
