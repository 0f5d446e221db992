//! The block layout engine.
//!
//! A transaction travels through the engine in four steps: `period::resolve` finds or creates
//! the month's partition, `locator::locate` finds its week block (or `builder::create` appends
//! one), and `writer::append` inserts the row and refreshes the totals. Nothing is cached
//! between steps; each one reads the partition again.
//!
//! The `aggregate` folds read what has been written, for charts and reports.

pub mod aggregate;
pub mod builder;
pub mod layout;
pub mod locator;
pub mod period;
pub mod writer;

use crate::api::{GridStore, PartitionRef};
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::ledger::layout::{HEADER, PERIOD_TOTAL_CELL, TOTAL_COL};
use crate::ledger::locator::{BlockCoordinates, WeekBlock};
use crate::model::{Amount, Transaction, TransactionInput, WeekLabel};
use serde::Serialize;
use tracing::{debug, info};

/// Where a transaction ended up and the totals right after it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub partition: PartitionRef,
    pub week: WeekLabel,
    pub coords: BlockCoordinates,
    pub block_total: Amount,
    pub period_total: Amount,
}

/// Writes one transaction into the ledger, creating its partition and week block if needed.
///
/// # Errors
/// - `BlockNotFound` if the partition is corrupt around the transaction's week block.
/// - `Storage` if the grid store fails.
pub async fn submit(grid: &mut (dyn GridStore + Send), transaction: &Transaction) -> Result<Posting> {
    let partition = period::resolve(grid, transaction.date()).await?;
    let label = transaction.week_label();
    let block = match locator::locate(grid, &partition, &label).await? {
        Some(block) => block,
        None => builder::create(grid, &partition, &label, &HEADER).await?,
    };
    let block = writer::append(grid, &partition, &block, transaction).await?;
    posting(grid, partition, block).await
}

/// Validates every input and then submits them one after the other, in order.
///
/// A batch with any invalid input is rejected as a whole before anything is written. Once
/// writing starts, a failure stops the batch and the error names the item that failed; the items
/// before it stay written.
///
/// # Errors
/// - `InvalidArgument` naming the first invalid item (1-based).
/// - Anything `submit` returns.
pub async fn submit_all(
    grid: &mut (dyn GridStore + Send),
    inputs: &[TransactionInput],
) -> Result<Vec<Posting>> {
    let transactions = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            input.validate().map_err(|e| {
                Error::msg(
                    ErrorType::InvalidArgument,
                    format!("Transaction {} of {}: {e}", i + 1, inputs.len()),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut postings = Vec::with_capacity(transactions.len());
    for (i, transaction) in transactions.iter().enumerate() {
        let posting = submit(grid, transaction).await.map_err(|e| {
            Error::msg(
                e.error_type(),
                format!(
                    "Transaction {} of {} failed after {i} were written: {e}",
                    i + 1,
                    transactions.len()
                ),
            )
        })?;
        debug!("Posted to '{}' {}", posting.partition, posting.week);
        postings.push(posting);
    }
    info!("Submitted {} transactions", postings.len());
    Ok(postings)
}

async fn posting(
    grid: &mut (dyn GridStore + Send),
    partition: PartitionRef,
    block: WeekBlock,
) -> Result<Posting> {
    let coords = block.coords();
    let block_total = grid
        .read_cell(&partition, coords.total_row, TOTAL_COL)
        .await
        .pub_result(ErrorType::Storage)?;
    let value = PERIOD_TOTAL_CELL.right();
    let period_total = grid
        .read_cell(&partition, value.row(), value.col())
        .await
        .pub_result(ErrorType::Storage)?;
    Ok(Posting {
        week: block.label().clone(),
        coords,
        block_total: Amount::lenient(&block_total),
        period_total: Amount::lenient(&period_total),
        partition,
    })
}

/// A sum that does not fit in an `Amount`.
pub(crate) fn too_large(what: impl std::fmt::Display) -> Error {
    Error::msg(
        ErrorType::InvalidArgument,
        format!("The total of {what} is too large to hold"),
    )
}
