//! Implements the `GridStore` trait with a `Workbook` that is persisted as a JSON file.

use crate::api::{GridStore, PartitionRef, Workbook};
use crate::error::Res;
use crate::model::RowCol;
use crate::utils;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A `Workbook` backed by a JSON file. The whole workbook is read when opened and written back
/// after every call that changes it, so the file always reflects the last completed write.
#[derive(Debug)]
pub struct WorkbookFile {
    path: PathBuf,
    workbook: Workbook,
}

impl WorkbookFile {
    /// Writes an empty workbook to `path`. Fails if a file is already there.
    pub async fn create(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        if path.exists() {
            bail!("A workbook already exists at '{}'", path.display());
        }
        let file = Self {
            path,
            workbook: Workbook::new(),
        };
        file.save().await?;
        Ok(file)
    }

    /// Loads the workbook at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let workbook: Workbook = utils::deserialize(&path)
            .await
            .with_context(|| format!("Unable to open the workbook at '{}'", path.display()))?;
        Ok(Self { path, workbook })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    async fn save(&self) -> Res<()> {
        trace!("Saving workbook to {}", self.path.display());
        let json =
            serde_json::to_string_pretty(&self.workbook).context("Unable to serialize workbook")?;
        utils::replace(&self.path, json).await
    }
}

#[async_trait::async_trait]
impl GridStore for WorkbookFile {
    async fn create_partition(&mut self, key: &str) -> Res<PartitionRef> {
        let partition = self.workbook.create_partition(key).await?;
        self.save().await?;
        Ok(partition)
    }

    async fn get_partition(&mut self, key: &str) -> Res<Option<PartitionRef>> {
        self.workbook.get_partition(key).await
    }

    async fn list_partitions(&mut self) -> Res<Vec<PartitionRef>> {
        self.workbook.list_partitions().await
    }

    async fn row_count(&mut self, partition: &PartitionRef) -> Res<usize> {
        self.workbook.row_count(partition).await
    }

    async fn read_column(
        &mut self,
        partition: &PartitionRef,
        col: usize,
        row_count: usize,
    ) -> Res<Vec<String>> {
        self.workbook.read_column(partition, col, row_count).await
    }

    async fn read_cell(
        &mut self,
        partition: &PartitionRef,
        row: usize,
        col: usize,
    ) -> Res<String> {
        self.workbook.read_cell(partition, row, col).await
    }

    async fn write_row(
        &mut self,
        partition: &PartitionRef,
        row: usize,
        first_col: usize,
        values: &[String],
    ) -> Res<()> {
        self.workbook
            .write_row(partition, row, first_col, values)
            .await?;
        self.save().await
    }

    async fn insert_row_before(&mut self, partition: &PartitionRef, row: usize) -> Res<()> {
        self.workbook.insert_row_before(partition, row).await?;
        self.save().await
    }

    async fn append_rows(&mut self, partition: &PartitionRef, rows: &[Vec<String>]) -> Res<()> {
        self.workbook.append_rows(partition, rows).await?;
        self.save().await
    }

    async fn find_text(&mut self, partition: &PartitionRef, literal: &str) -> Res<Option<RowCol>> {
        self.workbook.find_text(partition, literal).await
    }

    async fn clear_columns(
        &mut self,
        partition: &PartitionRef,
        first_col: usize,
        last_col: usize,
    ) -> Res<()> {
        self.workbook
            .clear_columns(partition, first_col, last_col)
            .await?;
        self.save().await
    }
}
