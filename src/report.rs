//! Turns aggregates into something a person reads: the period report (subject, HTML and text
//! bodies) and the chart tables kept in the `Chart Data` partition.

use crate::api::GridStore;
use crate::error::{ErrorType, IntoResult, Result};
use crate::ledger::aggregate::{self, PeriodTotal, StoreTotal, WeekTotal};
use crate::ledger::period;
use crate::model::{Amount, CurrencyFormat, PeriodKey};
use maud::{html, Markup, DOCTYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The helper partition that holds chart tables. Its name is not a period, so it never shows up
/// as a ledger.
pub const CHART_PARTITION: &str = "Chart Data";

const HEADER_BG: &str = "#2e7d32";

/// Everything a period report says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub period: PeriodKey,
    pub total_spent: Amount,
    pub weekly: Vec<WeekTotal>,
    pub stores: Vec<StoreTotal>,
}

impl Report {
    /// Aggregates the partition for `period`.
    ///
    /// # Errors
    /// - `PartitionNotFound` if the period has no ledger.
    pub async fn build(grid: &mut (dyn GridStore + Send), period: PeriodKey) -> Result<Self> {
        let partition = period::find(grid, period).await?;
        let total_spent = aggregate::period_total(grid, &partition)
            .await?
            .unwrap_or_default();
        let weekly = aggregate::weekly_totals(grid, &partition).await?;
        let stores = aggregate::store_totals(grid, &partition).await?;
        Ok(Self {
            period,
            total_spent,
            weekly,
            stores,
        })
    }

    /// True when the period has no week blocks.
    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty()
    }
}

/// Renders reports with a currency format.
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    currency: CurrencyFormat,
}

impl ReportFormatter {
    pub fn new(currency: CurrencyFormat) -> Self {
        Self { currency }
    }

    pub fn money(&self, amount: Amount) -> String {
        self.currency.format(amount)
    }

    pub fn subject(&self, report: &Report) -> String {
        format!(
            "Expense Report: {} ({})",
            report.period,
            self.money(report.total_spent)
        )
    }

    pub fn html(&self, report: &Report) -> String {
        self.html_markup(report).into_string()
    }

    fn html_markup(&self, report: &Report) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en"
            {
                body
                {
                    div style="font-family: sans-serif; color: #333; max-width: 600px; \
                        border: 1px solid #e0e0e0; border-radius: 8px;"
                    {
                        div style={"background-color: " (HEADER_BG) "; color: white; \
                            padding: 20px; text-align: center;"}
                        {
                            h1 style="margin:0;" { "Expense Report" }
                            p { (report.period) }
                        }
                        div style="padding: 20px;"
                        {
                            div style="background: #f1f8e9; padding: 15px; text-align: center; \
                                margin-bottom: 20px;"
                            {
                                span style={"display:block; font-weight:bold; color: " (HEADER_BG)}
                                {
                                    "TOTAL SPENT"
                                }
                                span style="font-size: 24px; font-weight:bold;"
                                {
                                    (self.money(report.total_spent))
                                }
                            }
                            @if report.is_empty()
                            {
                                p { "No data for this period." }
                            }
                            @else
                            {
                                h3 { "Weekly" }
                                ul
                                {
                                    @for week in &report.weekly
                                    {
                                        li { b { (week.week) ":" } " " (self.money(week.total)) }
                                    }
                                }
                                h3 { "Stores" }
                                ul
                                {
                                    @for store in &report.stores
                                    {
                                        li { b { (store.store) ":" } " " (self.money(store.total)) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// The plain text body: a heading, the total, then one indented line per week and store.
    pub fn text(&self, report: &Report) -> String {
        let mut lines = vec![
            format!("Expense Report: {}", report.period),
            format!("TOTAL SPENT: {}", self.money(report.total_spent)),
            String::new(),
        ];
        if report.is_empty() {
            lines.push("no data".to_string());
        } else {
            lines.push("Weekly".to_string());
            lines.extend(
                report
                    .weekly
                    .iter()
                    .map(|w| format!("  {}: {}", w.week, self.money(w.total))),
            );
            lines.push(String::new());
            lines.push("Stores".to_string());
            lines.extend(
                report
                    .stores
                    .iter()
                    .map(|s| format!("  {}: {}", s.store, self.money(s.total))),
            );
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// The chart tables that can be regenerated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Weekly,
    Stores,
    Periods,
    #[default]
    All,
}

serde_plain::derive_display_from_serialize!(ChartKind);
serde_plain::derive_fromstr_from_deserialize!(ChartKind);

impl ChartKind {
    /// The kinds that `self` stands for.
    pub fn expand(self) -> Vec<ChartKind> {
        match self {
            ChartKind::All => vec![ChartKind::Weekly, ChartKind::Stores, ChartKind::Periods],
            kind => vec![kind],
        }
    }
}

/// A two-column table written into the chart partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartTable {
    pub kind: ChartKind,
    pub rows: Vec<(String, Amount)>,
}

impl ChartTable {
    pub fn weekly(weeks: &[WeekTotal]) -> Self {
        Self {
            kind: ChartKind::Weekly,
            rows: weeks.iter().map(|w| (w.week.clone(), w.total)).collect(),
        }
    }

    pub fn stores(stores: &[StoreTotal]) -> Self {
        Self {
            kind: ChartKind::Stores,
            rows: stores.iter().map(|s| (s.store.clone(), s.total)).collect(),
        }
    }

    pub fn periods(periods: &[PeriodTotal]) -> Self {
        Self {
            kind: ChartKind::Periods,
            rows: periods.iter().map(|p| (p.period.clone(), p.total)).collect(),
        }
    }

    /// Column headers, in order.
    pub fn headers(&self) -> [&'static str; 2] {
        match self.kind {
            ChartKind::Weekly => ["Week", "Total"],
            ChartKind::Stores => ["Store", "Total"],
            ChartKind::Periods | ChartKind::All => ["Month", "Total Spent"],
        }
    }

    /// The first of the two columns the table occupies: A, C or F.
    pub fn first_col(&self) -> usize {
        match self.kind {
            ChartKind::Weekly => 0,
            ChartKind::Stores => 2,
            ChartKind::Periods | ChartKind::All => 5,
        }
    }
}

/// Builds the chart table of `kind`. Weekly and store tables come from the partition of
/// `period`, the period table from every ledger partition.
///
/// # Errors
/// - `PartitionNotFound` if a weekly or store table is asked for a period with no ledger.
pub async fn chart_table(
    grid: &mut (dyn GridStore + Send),
    period: PeriodKey,
    kind: ChartKind,
) -> Result<ChartTable> {
    Ok(match kind {
        ChartKind::Weekly => {
            let partition = period::find(grid, period).await?;
            ChartTable::weekly(&aggregate::weekly_totals(grid, &partition).await?)
        }
        ChartKind::Stores => {
            let partition = period::find(grid, period).await?;
            ChartTable::stores(&aggregate::store_totals(grid, &partition).await?)
        }
        ChartKind::Periods | ChartKind::All => {
            ChartTable::periods(&aggregate::period_totals(grid).await?)
        }
    })
}

/// Replaces the table's two columns in the chart partition with its header and rows, creating
/// the partition the first time.
pub async fn write_chart(grid: &mut (dyn GridStore + Send), table: &ChartTable) -> Result<()> {
    let partition = match grid
        .get_partition(CHART_PARTITION)
        .await
        .pub_result(ErrorType::Storage)?
    {
        Some(partition) => partition,
        None => grid
            .create_partition(CHART_PARTITION)
            .await
            .pub_result(ErrorType::Storage)?,
    };

    let first_col = table.first_col();
    grid.clear_columns(&partition, first_col, first_col + 1)
        .await
        .pub_result(ErrorType::Storage)?;

    let header = table.headers().map(String::from);
    grid.write_row(&partition, 0, first_col, &header)
        .await
        .pub_result(ErrorType::Storage)?;
    for (i, (name, total)) in table.rows.iter().enumerate() {
        grid.write_row(&partition, i + 1, first_col, &[name.clone(), total.to_string()])
            .await
            .pub_result(ErrorType::Storage)?;
    }
    debug!("Wrote {} {} rows to '{CHART_PARTITION}'", table.rows.len(), table.kind);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Workbook;
    use crate::ledger::submit_all;
    use crate::model::TransactionInput;

    async fn january() -> Workbook {
        let mut book = Workbook::new();
        let batch = vec![
            TransactionInput::new("2025-01-06", "A", "X", "2", "1000"),
            TransactionInput::new("2025-01-07", "B", "Y", "1", "500"),
            TransactionInput::new("2025-01-14", "A", "Z", "1", "2000"),
        ];
        submit_all(&mut book, &batch).await.unwrap();
        book
    }

    fn january_key() -> PeriodKey {
        PeriodKey::new(2025, 1).unwrap()
    }

    #[tokio::test]
    async fn test_build_report() {
        let mut book = january().await;
        let report = Report::build(&mut book, january_key()).await.unwrap();
        assert_eq!(report.total_spent, Amount::lenient("4500"));
        assert_eq!(report.weekly.len(), 2);
        assert_eq!(report.stores[0].store, "A");
        assert_eq!(report.stores[0].total, Amount::lenient("4000"));
        assert_eq!(report.stores[1].total, Amount::lenient("500"));
    }

    #[tokio::test]
    async fn test_build_report_missing_period() {
        let mut book = january().await;
        let err = Report::build(&mut book, PeriodKey::new(2025, 3).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
    }

    #[tokio::test]
    async fn test_renderings() {
        let mut book = january().await;
        let report = Report::build(&mut book, january_key()).await.unwrap();
        let fmt = ReportFormatter::default();

        assert_eq!(fmt.subject(&report), "Expense Report: January 2025 ($4.500)");

        assert_eq!(
            fmt.text(&report),
            "Expense Report: January 2025\n\
            TOTAL SPENT: $4.500\n\
            \n\
            Weekly\n  \
            Week 1: $2.500\n  \
            Week 2: $2.000\n\
            \n\
            Stores\n  \
            A: $4.000\n  \
            B: $500\n"
        );

        let html = fmt.html(&report);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("TOTAL SPENT"));
        assert!(html.contains("<li><b>Week 2:</b> $2.000</li>"));
        assert!(html.contains("<li><b>B:</b> $500</li>"));
    }

    #[test]
    fn test_html_escapes_store_names() {
        let report = Report {
            period: january_key(),
            total_spent: Amount::lenient("10"),
            weekly: vec![WeekTotal {
                week: "Week 1".to_string(),
                total: Amount::lenient("10"),
            }],
            stores: vec![StoreTotal {
                store: "<Tom & Jerry>".to_string(),
                total: Amount::lenient("10"),
            }],
        };
        let html = ReportFormatter::default().html(&report);
        assert!(html.contains("&lt;Tom &amp; Jerry&gt;"));
    }

    #[tokio::test]
    async fn test_empty_period_reports_no_data() {
        let mut book = Workbook::new();
        period::resolve_key(&mut book, january_key()).await.unwrap();
        let report = Report::build(&mut book, january_key()).await.unwrap();
        assert!(report.is_empty());
        assert!(report.total_spent.is_zero());
        let fmt = ReportFormatter::new(CurrencyFormat::new("€", ","));
        assert!(fmt.text(&report).ends_with("no data\n"));
        assert_eq!(fmt.subject(&report), "Expense Report: January 2025 (€0)");
    }

    #[tokio::test]
    async fn test_write_charts() {
        let mut book = january().await;
        for kind in ChartKind::All.expand() {
            let table = chart_table(&mut book, january_key(), kind).await.unwrap();
            write_chart(&mut book, &table).await.unwrap();
        }
        let rows = book.rows(CHART_PARTITION).unwrap();
        assert_eq!(rows[0], vec!["Week", "Total", "Store", "Total", "", "Month", "Total Spent"]);
        assert_eq!(rows[1], vec!["Week 1", "2500", "A", "4000", "", "January 2025", "4500"]);
        assert_eq!(rows[2], vec!["Week 2", "2000", "B", "500"]);

        // Rewriting a shorter table leaves no stale rows behind.
        let table = ChartTable::weekly(&[]);
        write_chart(&mut book, &table).await.unwrap();
        let rows = book.rows(CHART_PARTITION).unwrap();
        assert_eq!(rows[0][0], "Week");
        assert_eq!(rows[2], vec!["", "", "B", "500"]);
    }

    #[tokio::test]
    async fn test_chart_table_needs_the_period() {
        let mut book = january().await;
        let march = PeriodKey::new(2025, 3).unwrap();
        let err = chart_table(&mut book, march, ChartKind::Stores)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
        let table = chart_table(&mut book, march, ChartKind::Periods)
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("stores".parse::<ChartKind>().unwrap(), ChartKind::Stores);
        assert_eq!(ChartKind::Periods.to_string(), "periods");
        assert_eq!(ChartKind::Weekly.expand(), vec![ChartKind::Weekly]);
    }
}
