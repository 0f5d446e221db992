//! Read-only folds over written rows for charts and reports.
//!
//! Nothing here writes to the ledger. Every fold is one linear pass over whole columns, and an
//! empty partition gives an empty result rather than an error.

use crate::api::{GridStore, PartitionRef};
use crate::error::{ErrorType, IntoResult, Result};
use crate::ledger::layout::{
    is_sentinel, is_week_total, LABEL_COL, MONTH_TOTAL_LABEL, STORE_COL, STORE_HEADER, TOTAL_COL,
};
use crate::ledger::{period, too_large};
use crate::model::{Amount, RowCol};
use serde::Serialize;
use tracing::trace;

/// The total of one week block. Weeks are named `Week 1..N` in the order their blocks appear,
/// which is not necessarily calendar order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekTotal {
    pub week: String,
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreTotal {
    pub store: String,
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: Amount,
}

/// One entry per week-total row of `partition`, in row order.
pub async fn weekly_totals(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Vec<WeekTotal>> {
    let rows = Columns::read(grid, partition).await?;
    Ok(rows.weekly())
}

/// The sum of positive row totals per store, in order of each store's first appearance.
pub async fn store_totals(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Vec<StoreTotal>> {
    let rows = Columns::read(grid, partition).await?;
    rows.stores()
}

/// The total of a single partition: the value beside the period-total label, or the sum of its
/// week-total rows when that value is zero or missing. `None` if the partition has neither.
pub async fn period_total(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
) -> Result<Option<Amount>> {
    let summary = match grid
        .find_text(partition, MONTH_TOTAL_LABEL)
        .await
        .pub_result(ErrorType::Storage)?
    {
        Some(cell) => Some(summary_value(grid, partition, cell).await?),
        None => None,
    };
    if let Some(total) = summary.filter(|t| !t.is_zero()) {
        return Ok(Some(total));
    }

    let weeks = weekly_totals(grid, partition).await?;
    if summary.is_none() && weeks.is_empty() {
        trace!("'{partition}' has no totals");
        return Ok(None);
    }
    let total = Amount::checked_sum(weeks.into_iter().map(|w| w.total))
        .ok_or_else(|| too_large(format!("'{partition}'")))?;
    Ok(Some(total))
}

/// The total of every period partition, in workbook order. Partitions that hold no totals at all
/// are left out.
pub async fn period_totals(grid: &mut (dyn GridStore + Send)) -> Result<Vec<PeriodTotal>> {
    let mut out = Vec::new();
    for partition in period::ledger_partitions(grid).await? {
        if let Some(total) = period_total(grid, &partition).await? {
            out.push(PeriodTotal {
                period: partition.name().to_string(),
                total,
            });
        }
    }
    Ok(out)
}

/// Reads the cell holding the period-total label and then the one to its right. The label cell
/// only counts if someone typed a number into it.
async fn summary_value(
    grid: &mut (dyn GridStore + Send),
    partition: &PartitionRef,
    cell: RowCol,
) -> Result<Amount> {
    let at = grid
        .read_cell(partition, cell.row(), cell.col())
        .await
        .pub_result(ErrorType::Storage)?;
    let value = Amount::lenient(&at);
    if !value.is_zero() {
        return Ok(value);
    }
    let right = cell.right();
    let beside = grid
        .read_cell(partition, right.row(), right.col())
        .await
        .pub_result(ErrorType::Storage)?;
    Ok(Amount::lenient(&beside))
}

/// The three columns every fold needs.
struct Columns {
    labels: Vec<String>,
    stores: Vec<String>,
    totals: Vec<String>,
}

impl Columns {
    async fn read(grid: &mut (dyn GridStore + Send), partition: &PartitionRef) -> Result<Self> {
        let rows = grid
            .row_count(partition)
            .await
            .pub_result(ErrorType::Storage)?;
        let labels = grid
            .read_column(partition, LABEL_COL, rows)
            .await
            .pub_result(ErrorType::Storage)?;
        let stores = grid
            .read_column(partition, STORE_COL, rows)
            .await
            .pub_result(ErrorType::Storage)?;
        let totals = grid
            .read_column(partition, TOTAL_COL, rows)
            .await
            .pub_result(ErrorType::Storage)?;
        Ok(Self {
            labels,
            stores,
            totals,
        })
    }

    fn weekly(&self) -> Vec<WeekTotal> {
        self.labels
            .iter()
            .zip(&self.totals)
            .filter(|(label, _)| is_week_total(label))
            .enumerate()
            .map(|(i, (_, total))| WeekTotal {
                week: format!("Week {}", i + 1),
                total: Amount::lenient(total),
            })
            .collect()
    }

    fn stores(&self) -> Result<Vec<StoreTotal>> {
        let mut out: Vec<StoreTotal> = Vec::new();
        let rows = self.labels.iter().zip(&self.stores).zip(&self.totals);
        for ((label, store), total) in rows {
            if label.trim().is_empty() || is_sentinel(label) {
                continue;
            }
            let store = store.trim();
            if store.is_empty() || store == STORE_HEADER {
                continue;
            }
            let total = Amount::lenient(total);
            if !total.is_positive() {
                continue;
            }
            match out.iter_mut().find(|s| s.store == store) {
                Some(entry) => {
                    entry.total = entry
                        .total
                        .checked_add(total)
                        .ok_or_else(|| too_large(format!("store '{store}'")))?;
                }
                None => out.push(StoreTotal {
                    store: store.to_string(),
                    total,
                }),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{load_csv, Workbook};

    const JANUARY: &str = "\
,January 2025
,,,,,,,,MONTH TOTAL:,4500
,Week 2 (06/01 - 12/01)
,Date,Product,Store,Quantity,Price,Total
,2025-01-06,X,A,2,1000,2000
,2025-01-07,Y,A,1,500,500
,WEEK TOTAL:,,,,,2500
,
,Week 3 (13/01 - 19/01)
,Date,Product,Store,Quantity,Price,Total
,2025-01-14,Z,B,1,2000,2000
,WEEK TOTAL:,,,,,2000
,
";

    fn book_with(name: &str, csv: &str) -> (Workbook, PartitionRef) {
        (
            Workbook::with_partition(name, load_csv(csv).unwrap()),
            PartitionRef::new(name),
        )
    }

    fn amount(s: &str) -> Amount {
        Amount::lenient(s)
    }

    #[tokio::test]
    async fn test_weekly_totals_in_block_order() {
        let (mut book, p) = book_with("January 2025", JANUARY);
        let weeks = weekly_totals(&mut book, &p).await.unwrap();
        assert_eq!(
            weeks,
            vec![
                WeekTotal {
                    week: "Week 1".to_string(),
                    total: amount("2500"),
                },
                WeekTotal {
                    week: "Week 2".to_string(),
                    total: amount("2000"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_weekly_sentinel_match_ignores_case_and_space() {
        let csv = ",Week 1\n,Date\n, week total: ,,,,,10\n";
        let (mut book, p) = book_with("January 2025", csv);
        let weeks = weekly_totals(&mut book, &p).await.unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].total, amount("10"));
    }

    #[tokio::test]
    async fn test_store_totals() {
        let (mut book, p) = book_with("January 2025", JANUARY);
        let stores = store_totals(&mut book, &p).await.unwrap();
        assert_eq!(
            stores,
            vec![
                StoreTotal {
                    store: "A".to_string(),
                    total: amount("2500"),
                },
                StoreTotal {
                    store: "B".to_string(),
                    total: amount("2000"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_store_totals_exclusion_rule() {
        let csv = "\
,Week 1
,Date,Product,Store,Quantity,Price,Total
,2025-01-02,X,A,1,400,400
,2025-01-02,X,B,1,-100,-100
,2025-01-02,X,,1,200,200
,2025-01-02,X, ,1,200,200
,2025-01-02,X,C,0,5,0
,2025-01-02,X,D,1,n/a,n/a
,2025-01-02,X,Store,1,5,5
,WEEK TOTAL:,,,,,600
";
        let (mut book, p) = book_with("January 2025", csv);
        let stores = store_totals(&mut book, &p).await.unwrap();
        assert_eq!(
            stores,
            vec![StoreTotal {
                store: "A".to_string(),
                total: amount("400"),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_partition_yields_empty_aggregates() {
        let (mut book, p) = book_with("January 2025", ",January 2025\n");
        assert!(weekly_totals(&mut book, &p).await.unwrap().is_empty());
        assert!(store_totals(&mut book, &p).await.unwrap().is_empty());
        assert_eq!(period_total(&mut book, &p).await.unwrap(), None);
        assert!(period_totals(&mut book).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_period_total_reads_summary_cell() {
        let (mut book, p) = book_with("January 2025", JANUARY);
        assert_eq!(
            period_total(&mut book, &p).await.unwrap(),
            Some(amount("4500"))
        );
    }

    #[tokio::test]
    async fn test_period_total_falls_back_to_week_sums() {
        let csv = JANUARY.replace("MONTH TOTAL:,4500", "MONTH TOTAL:,");
        let (mut book, p) = book_with("January 2025", &csv);
        assert_eq!(
            period_total(&mut book, &p).await.unwrap(),
            Some(amount("4500"))
        );

        let csv = JANUARY.replace(",,,,,,,,MONTH TOTAL:,4500", ",");
        let (mut book, p) = book_with("January 2025", &csv);
        assert_eq!(
            period_total(&mut book, &p).await.unwrap(),
            Some(amount("4500"))
        );
    }

    #[tokio::test]
    async fn test_period_totals_skip_helper_partitions() {
        let (mut book, _) = book_with("January 2025", JANUARY);
        let feb = book.create_partition("February 2025").await.unwrap();
        book.append_rows(&feb, &load_csv(",February 2025\n,,,,,,,,MONTH TOTAL:,0\n").unwrap())
            .await
            .unwrap();
        let chart = book.create_partition("Chart Data").await.unwrap();
        book.append_rows(&chart, &load_csv("Month,Total Spent\nMONTH TOTAL:,99\n").unwrap())
            .await
            .unwrap();

        let totals = period_totals(&mut book).await.unwrap();
        assert_eq!(
            totals,
            vec![
                PeriodTotal {
                    period: "January 2025".to_string(),
                    total: amount("4500"),
                },
                PeriodTotal {
                    period: "February 2025".to_string(),
                    total: Amount::ZERO,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_totals_too_large_are_errors() {
        let huge = ",Week 2 (06/01 - 12/01)
,Date,Product,Store,Quantity,Price,Total
,2025-01-06,X,A,1,50000000000000000000000000000,50000000000000000000000000000
,2025-01-07,Y,A,1,50000000000000000000000000000,50000000000000000000000000000
,WEEK TOTAL:,,,,,50000000000000000000000000000
,
,Week 3 (13/01 - 19/01)
,Date,Product,Store,Quantity,Price,Total
,WEEK TOTAL:,,,,,50000000000000000000000000000
";
        let (mut book, p) = book_with("January 2025", huge);
        let err = store_totals(&mut book, &p).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "The total of store 'A' is too large to hold"
        );
        let err = period_total(&mut book, &p).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);
    }
}
