//! Finds week blocks by scanning the label column. Nothing about a block's position is stored
//! anywhere, so every lookup starts from the top of the partition.

use crate::api::{GridStore, PartitionRef};
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::ledger::layout::{starts_week_total, LABEL_COL, WEEK_TOTAL_LABEL};
use crate::model::WeekLabel;
use serde::Serialize;
use std::ops::Range;
use tracing::trace;

/// Zero-based rows of a week block, valid only until the next write to its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockCoordinates {
    pub label_row: usize,
    pub header_row: usize,
    pub first_data_row: usize,
    pub total_row: usize,
}

impl BlockCoordinates {
    pub(crate) fn from_label_row(label_row: usize, total_row: usize) -> Self {
        Self {
            label_row,
            header_row: label_row + 1,
            first_data_row: label_row + 2,
            total_row,
        }
    }

    /// The data rows, which may be empty.
    pub fn data_rows(&self) -> Range<usize> {
        self.first_data_row..self.total_row
    }
}

/// A week block as found in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBlock {
    label: WeekLabel,
    coords: BlockCoordinates,
}

impl WeekBlock {
    pub(crate) fn new(label: WeekLabel, coords: BlockCoordinates) -> Self {
        Self { label, coords }
    }

    pub fn label(&self) -> &WeekLabel {
        &self.label
    }

    pub fn coords(&self) -> BlockCoordinates {
        self.coords
    }

    /// The number of transactions in the block.
    pub fn len(&self) -> usize {
        self.coords.data_rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scans `partition` for the block labelled `label`.
///
/// Returns `None` when the label does not appear, in which case the caller creates the block.
/// When the label appears more than once the first occurrence wins.
///
/// # Errors
/// - `BlockNotFound` if the label is present but no week-total row follows it.
/// - `Storage` if the grid cannot be read.
pub async fn locate(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
    label: &WeekLabel,
) -> Result<Option<WeekBlock>> {
    let column = read_label_column(grid, partition).await?;
    locate_in(&column, label)
}

/// Reads the whole label column of `partition`.
pub(crate) async fn read_label_column(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Vec<String>> {
    let rows = grid
        .row_count(partition)
        .await
        .pub_result(ErrorType::Storage)?;
    grid.read_column(partition, LABEL_COL, rows)
        .await
        .pub_result(ErrorType::Storage)
}

pub(crate) fn locate_in(column: &[String], label: &WeekLabel) -> Result<Option<WeekBlock>> {
    let Some(label_row) = column.iter().position(|cell| cell == label.as_str()) else {
        trace!("No block labelled '{label}'");
        return Ok(None);
    };

    let first_data_row = label_row + 2;
    let total_row = column
        .iter()
        .enumerate()
        .skip(first_data_row)
        .find(|(_, cell)| starts_week_total(cell))
        .map(|(row, _)| row)
        .ok_or_else(|| {
            Error::msg(
                ErrorType::BlockNotFound,
                format!(
                    "The block '{label}' at row {} has no '{WEEK_TOTAL_LABEL}' row below it",
                    label_row + 1
                ),
            )
        })?;

    let coords = BlockCoordinates::from_label_row(label_row, total_row);
    trace!("Located '{label}' at {coords:?}");
    Ok(Some(WeekBlock::new(label.clone(), coords)))
}
