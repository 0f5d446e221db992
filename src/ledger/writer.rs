//! Writes transactions into week blocks and keeps the block and period totals in step.
//!
//! Totals are plain values computed here and written after every change. They are never
//! formulas, so a grid store only has to hold strings.

use crate::api::{GridStore, PartitionRef};
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::ledger::layout::{
    is_week_total, starts_week_total, HEADER, LABEL_COL, MONTH_TOTAL_LABEL, PERIOD_TOTAL_CELL,
    TOTAL_COL,
};
use crate::ledger::locator::{self, BlockCoordinates, WeekBlock};
use crate::ledger::too_large;
use crate::model::{Amount, RowCol, Transaction};
use serde::Serialize;
use tracing::{debug, trace};

/// Inserts `transaction` as the last data row of `block` and recomputes the block total and the
/// period total. Returns the block's coordinates after the insertion.
///
/// Every row from the block's total row downwards moves down by one, so coordinates held for
/// this block or any block below it are stale once this returns.
///
/// # Errors
/// - `BlockNotFound` if `block` no longer describes what is in the partition.
/// - `InvalidArgument` if the block or period total would no longer fit. Nothing is written.
/// - `Storage` if the grid cannot be read or written. A failure after the row was inserted
///   leaves that row uncounted until `recompute_totals` runs.
pub async fn append(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
    block: &WeekBlock,
    transaction: &Transaction,
) -> Result<WeekBlock> {
    let coords = block.coords();
    let label = grid
        .read_cell(partition, coords.label_row, LABEL_COL)
        .await
        .pub_result(ErrorType::Storage)?;
    let sentinel = grid
        .read_cell(partition, coords.total_row, LABEL_COL)
        .await
        .pub_result(ErrorType::Storage)?;
    if label != block.label().as_str() || !starts_week_total(&sentinel) {
        return Err(stale(block));
    }
    let (labels, totals) = read_label_and_totals(grid, partition).await?;
    let (block_total, period_total) = check_capacity(&coords, &labels, &totals, transaction)
        .ok_or_else(|| {
            too_large(format!(
                "'{}' after adding {}",
                block.label(),
                transaction.total()
            ))
        })?;
    trace!("'{}' will total {block_total} and '{partition}' {period_total}", block.label());

    grid.insert_row_before(partition, coords.total_row)
        .await
        .pub_result(ErrorType::Storage)?;
    grid.write_row(partition, coords.total_row, LABEL_COL, &transaction.cells())
        .await
        .pub_result(ErrorType::Storage)?;
    debug!(
        "Inserted {} at row {} of '{partition}'",
        transaction.product(),
        coords.total_row + 1
    );

    let block = locator::locate(grid, partition, block.label())
        .await?
        .ok_or_else(|| stale(block))?;
    write_block_total(grid, partition, &block).await?;
    update_period_total(grid, partition).await?;
    Ok(block)
}

/// Sums the data rows of `block` and writes the result into its total row.
pub(crate) async fn write_block_total(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
    block: &WeekBlock,
) -> Result<Amount> {
    let coords = block.coords();
    let totals = grid
        .read_column(partition, TOTAL_COL, coords.total_row)
        .await
        .pub_result(ErrorType::Storage)?;
    let total = Amount::checked_sum(totals[coords.data_rows()].iter().map(|c| Amount::lenient(c)))
        .ok_or_else(|| too_large(format!("'{}'", block.label())))?;
    grid.write_row(partition, coords.total_row, TOTAL_COL, &[total.to_string()])
        .await
        .pub_result(ErrorType::Storage)?;
    trace!("'{}' totals {total}", block.label());
    Ok(total)
}

/// Sums the value of every week-total row and writes it next to the period-total label.
pub(crate) async fn update_period_total(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Amount> {
    let (labels, totals) = read_label_and_totals(grid, partition).await?;
    let total = Amount::checked_sum(
        labels
            .iter()
            .zip(&totals)
            .filter(|(label, _)| is_week_total(label))
            .map(|(_, value)| Amount::lenient(value)),
    )
    .ok_or_else(|| too_large(format!("'{partition}'")))?;
    grid.write_row(
        partition,
        PERIOD_TOTAL_CELL.row(),
        PERIOD_TOTAL_CELL.col(),
        &[MONTH_TOTAL_LABEL.to_string(), total.to_string()],
    )
    .await
    .pub_result(ErrorType::Storage)?;
    debug!("'{partition}' totals {total}");
    Ok(total)
}

/// The outcome of `recompute_totals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recomputed {
    /// Block totals that were wrong and have been rewritten.
    pub corrected: usize,
    pub blocks: usize,
    pub period_total: Amount,
}

/// Recomputes every block total and the period total of `partition` in one pass. This is the
/// way back to consistent totals after an insertion that failed part way, or after rows were
/// edited by hand.
pub async fn recompute_totals(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Recomputed> {
    let (labels, totals) = read_label_and_totals(grid, partition).await?;

    let mut blocks = 0;
    let mut corrected = 0;
    let mut running: Option<Amount> = None;
    for (row, (label, value)) in labels.iter().zip(&totals).enumerate() {
        if label == HEADER[0] {
            running = Some(Amount::ZERO);
        } else if starts_week_total(label) {
            let Some(sum) = running.take() else {
                continue;
            };
            blocks += 1;
            if Amount::lenient(value) != sum || value.trim().is_empty() {
                debug!("Correcting the total at row {} to {sum}", row + 1);
                grid.write_row(partition, row, TOTAL_COL, &[sum.to_string()])
                    .await
                    .pub_result(ErrorType::Storage)?;
                corrected += 1;
            }
        } else if let Some(sum) = running {
            let sum = sum
                .checked_add(Amount::lenient(value))
                .ok_or_else(|| too_large(format!("the block ending at row {}", row + 1)))?;
            running = Some(sum);
        }
    }

    let period_total = update_period_total(grid, partition).await?;
    Ok(Recomputed {
        corrected,
        blocks,
        period_total,
    })
}

async fn read_label_and_totals(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<(Vec<String>, Vec<String>)> {
    let rows = grid
        .row_count(partition)
        .await
        .pub_result(ErrorType::Storage)?;
    let labels = grid
        .read_column(partition, LABEL_COL, rows)
        .await
        .pub_result(ErrorType::Storage)?;
    let totals = grid
        .read_column(partition, TOTAL_COL, rows)
        .await
        .pub_result(ErrorType::Storage)?;
    Ok((labels, totals))
}

/// The block total and the period total `transaction` would produce, as long as both fit.
fn check_capacity(
    coords: &BlockCoordinates,
    labels: &[String],
    totals: &[String],
    transaction: &Transaction,
) -> Option<(Amount, Amount)> {
    let block_total = Amount::checked_sum(totals[coords.data_rows()].iter().map(|c| Amount::lenient(c)))?
        .checked_add(transaction.total())?;
    let other_blocks = labels
        .iter()
        .zip(totals)
        .enumerate()
        .filter(|(row, (label, _))| *row != coords.total_row && is_week_total(label))
        .map(|(_, (_, value))| Amount::lenient(value));
    let period_total = Amount::checked_sum(other_blocks)?.checked_add(block_total)?;
    Some((block_total, period_total))
}

fn stale(block: &WeekBlock) -> Error {
    let coords = block.coords();
    Error::msg(
        ErrorType::BlockNotFound,
        format!(
            "The block '{}' is no longer between {} and {}",
            block.label(),
            RowCol::new(coords.label_row, LABEL_COL),
            RowCol::new(coords.total_row, LABEL_COL)
        ),
    )
}
