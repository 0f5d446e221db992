use crate::api::{GridStore, PartitionRef};
use crate::error::{ErrorType, IntoResult, Result};
use crate::ledger::layout::{offset_row, week_total_row};
use crate::ledger::locator::{BlockCoordinates, WeekBlock};
use crate::model::WeekLabel;
use tracing::debug;

/// Appends a new, empty week block after the last row of `partition`: the label row, the
/// `header` row, a total row reading zero and one blank spacer row.
///
/// The caller must already know that `label` is not in the partition. Blocks above are never
/// touched, so their coordinates stay valid.
pub async fn create(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
    label: &WeekLabel,
    header: &[&str],
) -> Result<WeekBlock> {
    let label_row = grid
        .row_count(partition)
        .await
        .pub_result(ErrorType::Storage)?;

    let rows = vec![
        offset_row(&[label.as_str()]),
        offset_row(header),
        offset_row(&week_total_row(0)),
        Vec::new(),
    ];
    grid.append_rows(partition, &rows)
        .await
        .pub_result(ErrorType::Storage)?;

    let coords = BlockCoordinates::from_label_row(label_row, label_row + 2);
    debug!("Created block '{label}' in '{partition}' at row {}", label_row + 1);
    Ok(WeekBlock::new(label.clone(), coords))
}
