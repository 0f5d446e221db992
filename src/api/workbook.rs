//! Implements the `GridStore` trait using in-memory data.
//!
//! The tests drive the whole ledger through this type, and `WorkbookFile` uses it as the data
//! model that gets persisted.

use crate::api::{GridStore, PartitionRef};
use crate::error::Res;
use crate::model::RowCol;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// A named list of rows.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct Partition {
    name: String,
    rows: Vec<Vec<String>>,
}

impl Partition {
    fn cell(&self, row: usize, col: usize) -> String {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or_default()
    }
}

/// An implementation of the `GridStore` trait that holds every partition in memory, in
/// creation order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    partitions: Vec<Partition>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a workbook holding one partition, `name`, with the given rows.
    pub fn with_partition(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            partitions: vec![Partition {
                name: name.into(),
                rows,
            }],
        }
    }

    /// The raw rows of a partition, for inspection.
    pub fn rows(&self, name: &str) -> Option<&[Vec<String>]> {
        self.partitions
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.rows.as_slice())
    }

    fn partition(&self, partition: &PartitionRef) -> Res<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.name == partition.name())
            .with_context(|| format!("Partition '{partition}' not found"))
    }

    fn partition_mut(&mut self, partition: &PartitionRef) -> Res<&mut Partition> {
        self.partitions
            .iter_mut()
            .find(|p| p.name == partition.name())
            .with_context(|| format!("Partition '{partition}' not found"))
    }
}

#[async_trait::async_trait]
impl GridStore for Workbook {
    async fn create_partition(&mut self, key: &str) -> Res<PartitionRef> {
        if self.partitions.iter().any(|p| p.name == key) {
            bail!("Partition '{key}' already exists");
        }
        self.partitions.push(Partition {
            name: key.to_string(),
            rows: Vec::new(),
        });
        Ok(PartitionRef::new(key))
    }

    async fn get_partition(&mut self, key: &str) -> Res<Option<PartitionRef>> {
        Ok(self
            .partitions
            .iter()
            .find(|p| p.name == key)
            .map(|p| PartitionRef::new(p.name.as_str())))
    }

    async fn list_partitions(&mut self) -> Res<Vec<PartitionRef>> {
        Ok(self
            .partitions
            .iter()
            .map(|p| PartitionRef::new(p.name.as_str()))
            .collect())
    }

    async fn row_count(&mut self, partition: &PartitionRef) -> Res<usize> {
        Ok(self.partition(partition)?.rows.len())
    }

    async fn read_column(
        &mut self,
        partition: &PartitionRef,
        col: usize,
        row_count: usize,
    ) -> Res<Vec<String>> {
        let p = self.partition(partition)?;
        Ok((0..row_count).map(|row| p.cell(row, col)).collect())
    }

    async fn read_cell(
        &mut self,
        partition: &PartitionRef,
        row: usize,
        col: usize,
    ) -> Res<String> {
        Ok(self.partition(partition)?.cell(row, col))
    }

    async fn write_row(
        &mut self,
        partition: &PartitionRef,
        row: usize,
        first_col: usize,
        values: &[String],
    ) -> Res<()> {
        let p = self.partition_mut(partition)?;
        if p.rows.len() <= row {
            p.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut p.rows[row];
        let end = first_col + values.len();
        if cells.len() < end {
            cells.resize(end, String::new());
        }
        cells[first_col..end].clone_from_slice(values);
        Ok(())
    }

    async fn insert_row_before(&mut self, partition: &PartitionRef, row: usize) -> Res<()> {
        let p = self.partition_mut(partition)?;
        if row > p.rows.len() {
            bail!(
                "Cannot insert before row {row} of '{partition}', it has {} rows",
                p.rows.len()
            );
        }
        p.rows.insert(row, Vec::new());
        Ok(())
    }

    async fn append_rows(&mut self, partition: &PartitionRef, rows: &[Vec<String>]) -> Res<()> {
        self.partition_mut(partition)?
            .rows
            .extend(rows.iter().cloned());
        Ok(())
    }

    async fn find_text(&mut self, partition: &PartitionRef, literal: &str) -> Res<Option<RowCol>> {
        let p = self.partition(partition)?;
        for (row_ix, row) in p.rows.iter().enumerate() {
            if let Some(col_ix) = row.iter().position(|cell| cell.contains(literal)) {
                return Ok(Some(RowCol::new(row_ix, col_ix)));
            }
        }
        Ok(None)
    }

    async fn clear_columns(
        &mut self,
        partition: &PartitionRef,
        first_col: usize,
        last_col: usize,
    ) -> Res<()> {
        let p = self.partition_mut(partition)?;
        for row in p.rows.iter_mut() {
            for cell in row.iter_mut().take(last_col + 1).skip(first_col) {
                cell.clear();
            }
            while row.last().is_some_and(|c| c.is_empty()) {
                row.pop();
            }
        }
        Ok(())
    }
}

/// Loads rows from a CSV-formatted string. Every line is a row, including the first.
pub fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Unable to parse CSV row")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}
