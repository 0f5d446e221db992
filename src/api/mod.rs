//! The `GridStore` trait: the tabular storage that the ledger engine reads and writes.
//!
//! A grid store holds named partitions (one per period, plus helper partitions for chart data).
//! Each partition is a list of rows and each row a list of string cells. Rows and columns are
//! zero-based. Nothing in a grid store identifies a row other than its position, which is why the
//! ledger engine rediscovers blocks by scanning on every operation.

mod workbook;
mod workbook_file;

use crate::error::Res;
use crate::model::RowCol;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use workbook::{load_csv, Workbook};
pub use workbook_file::WorkbookFile;

/// A reference to a partition by name. Handles are plain names, never positions, so holding one
/// across writes is always safe.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionRef(String);

impl PartitionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for PartitionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The storage surface the ledger needs. Implementations: `Workbook` (in memory) and
/// `WorkbookFile` (a workbook persisted as JSON).
#[async_trait::async_trait]
pub trait GridStore {
    /// Creates an empty partition named `key`. Fails if one already exists.
    async fn create_partition(&mut self, key: &str) -> Res<PartitionRef>;

    /// Returns the partition named `key`, if it exists.
    async fn get_partition(&mut self, key: &str) -> Res<Option<PartitionRef>>;

    /// All partitions, in creation order.
    async fn list_partitions(&mut self) -> Res<Vec<PartitionRef>>;

    /// The number of rows in the partition, including blank rows that were written explicitly.
    async fn row_count(&mut self, partition: &PartitionRef) -> Res<usize>;

    /// The first `row_count` cells of column `col`. Missing cells read as empty strings.
    async fn read_column(
        &mut self,
        partition: &PartitionRef,
        col: usize,
        row_count: usize,
    ) -> Res<Vec<String>>;

    /// A single cell. Missing cells read as an empty string.
    async fn read_cell(&mut self, partition: &PartitionRef, row: usize, col: usize)
        -> Res<String>;

    /// Writes `values` into `row`, starting at column `first_col`. The partition grows as needed.
    async fn write_row(
        &mut self,
        partition: &PartitionRef,
        row: usize,
        first_col: usize,
        values: &[String],
    ) -> Res<()>;

    /// Inserts a blank row at `row`, shifting every row at or after it down by one.
    async fn insert_row_before(&mut self, partition: &PartitionRef, row: usize) -> Res<()>;

    /// Appends `rows` after the last row of the partition.
    async fn append_rows(&mut self, partition: &PartitionRef, rows: &[Vec<String>]) -> Res<()>;

    /// The first cell, in row-major order, whose text contains `literal`.
    async fn find_text(&mut self, partition: &PartitionRef, literal: &str) -> Res<Option<RowCol>>;

    /// Blanks the columns `first_col..=last_col` in every row of the partition.
    async fn clear_columns(
        &mut self,
        partition: &PartitionRef,
        first_col: usize,
        last_col: usize,
    ) -> Res<()>;
}
