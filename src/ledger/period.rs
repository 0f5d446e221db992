//! Maps dates to period partitions.

use crate::api::{GridStore, PartitionRef};
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::ledger::layout::{PREAMBLE_ROWS, TITLE_CELL};
use crate::model::PeriodKey;
use chrono::NaiveDate;
use tracing::debug;

/// Returns the partition for the month of `date`, creating it if needed.
pub async fn resolve(grid: &mut (dyn GridStore + Send), date: NaiveDate) -> Result<PartitionRef> {
    resolve_key(grid, PeriodKey::from_date(date)).await
}

/// Returns the partition named by `key`, creating it if needed. A new partition gets its title
/// and an empty period summary row, and no blocks.
pub async fn resolve_key(grid: &mut (dyn GridStore + Send), key: PeriodKey) -> Result<PartitionRef> {
    let name = key.to_string();
    if let Some(partition) = grid.get_partition(&name).await.pub_result(ErrorType::Storage)? {
        return Ok(partition);
    }

    debug!("Creating partition '{name}'");
    let partition = grid
        .create_partition(&name)
        .await
        .pub_result(ErrorType::Storage)?;

    let mut preamble = vec![Vec::new(); PREAMBLE_ROWS];
    let title_row = &mut preamble[TITLE_CELL.row()];
    title_row.resize(TITLE_CELL.col() + 1, String::new());
    title_row[TITLE_CELL.col()] = name;
    grid.append_rows(&partition, &preamble)
        .await
        .pub_result(ErrorType::Storage)?;
    Ok(partition)
}

/// Returns the existing partition for `key`.
///
/// # Errors
/// - `PartitionNotFound` if nothing has been recorded for that period.
pub async fn find(grid: &mut (dyn GridStore + Send), key: PeriodKey) -> Result<PartitionRef> {
    grid.get_partition(&key.to_string())
        .await
        .pub_result(ErrorType::Storage)?
        .ok_or_else(|| {
            Error::msg(
                ErrorType::PartitionNotFound,
                format!("No ledger exists for {key}"),
            )
        })
}

/// Every period partition in workbook order. Helper partitions, such as the chart data, are
/// left out because their names are not periods.
pub async fn ledger_partitions(grid: &mut (dyn GridStore + Send)) -> Result<Vec<PartitionRef>> {
    Ok(grid
        .list_partitions()
        .await
        .pub_result(ErrorType::Storage)?
        .into_iter()
        .filter(|p| p.name().parse::<PeriodKey>().is_ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Workbook;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_creates_titled_partition() {
        let mut book = Workbook::new();
        let p = resolve(&mut book, date("2025-01-06")).await.unwrap();
        assert_eq!(p.name(), "January 2025");
        let rows = book.rows("January 2025").unwrap();
        assert_eq!(rows.len(), PREAMBLE_ROWS);
        assert_eq!(rows[0], vec!["", "January 2025"]);
        assert!(rows[1].is_empty());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let mut book = Workbook::new();
        let a = resolve(&mut book, date("2025-01-06")).await.unwrap();
        let b = resolve(&mut book, date("2025-01-31")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(book.list_partitions().await.unwrap().len(), 1);
        assert_eq!(book.rows("January 2025").unwrap().len(), PREAMBLE_ROWS);
    }

    #[tokio::test]
    async fn test_same_month_different_year_is_a_different_partition() {
        let mut book = Workbook::new();
        let a = resolve(&mut book, date("2024-01-06")).await.unwrap();
        let b = resolve(&mut book, date("2025-01-06")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_find_missing_partition() {
        let mut book = Workbook::new();
        let err = find(&mut book, PeriodKey::new(2025, 2).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
        assert_eq!(err.to_string(), "No ledger exists for February 2025");
    }

    #[tokio::test]
    async fn test_ledger_partitions_skip_helpers() {
        let mut book = Workbook::new();
        resolve(&mut book, date("2025-02-01")).await.unwrap();
        book.create_partition("Chart Data").await.unwrap();
        resolve(&mut book, date("2025-01-01")).await.unwrap();
        let names: Vec<String> = ledger_partitions(&mut book)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["February 2025", "January 2025"]);
    }
}
