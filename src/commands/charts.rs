use crate::args::ChartsArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::PeriodKey;
use crate::report::{self, ChartKind, ChartTable, CHART_PARTITION};
use crate::{Config, Result};
use chrono::Local;
use tracing::warn;

/// Rebuilds the chart tables named by `args`. Weekly and store tables are built for the
/// requested month, or the current one. A table with no rows is reported and left as it was.
///
/// # Errors
/// - `PartitionNotFound` if the weekly or store table is asked for a month with no ledger. With
///   `--kind all` those two tables are skipped instead and the period table is still rebuilt.
pub async fn charts(config: Config, args: ChartsArgs) -> Result<Out<Vec<ChartTable>>> {
    let period = args
        .period()
        .unwrap_or_else(|| PeriodKey::from_date(Local::now().date_naive()));
    let mut book = config.workbook().await.pub_result(ErrorType::Config)?;

    let mut written = Vec::new();
    let mut empty = Vec::new();
    for kind in args.kind().expand() {
        let table = match report::chart_table(&mut book, period, kind).await {
            Ok(table) => table,
            Err(e)
                if args.kind() == ChartKind::All
                    && e.error_type() == ErrorType::PartitionNotFound =>
            {
                warn!("Skipping the {kind} chart: {e}");
                empty.push(kind.to_string());
                continue;
            }
            Err(e) => return Err(e),
        };
        if table.rows.is_empty() {
            warn!("No data for the {kind} chart of {period}");
            empty.push(kind.to_string());
            continue;
        }
        report::write_chart(&mut book, &table).await?;
        written.push(table);
    }

    let mut message = if written.is_empty() {
        "No data found".to_string()
    } else {
        let kinds: Vec<String> = written.iter().map(|t| t.kind.to_string()).collect();
        format!(
            "Rebuilt the {} chart tables in '{CHART_PARTITION}' for {period}",
            kinds.join(", ")
        )
    };
    if !written.is_empty() && !empty.is_empty() {
        message.push_str(&format!(", no data for {}", empty.join(", ")));
    }
    Ok(Out::new(message, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    const FEBRUARY: &str = "\
,February 2025
,,,,,,,,MONTH TOTAL:,300
,Week 1 (27/01 - 02/02)
,Date,Product,Store,Quantity,Price,Total
,2025-02-01,X,A,1,300,300
,WEEK TOTAL:,,,,,300
,
";

    fn february() -> Option<PeriodKey> {
        Some(PeriodKey::new(2025, 2).unwrap())
    }

    #[tokio::test]
    async fn test_charts_all() {
        let env = TestEnv::new().await;
        env.seed("February 2025", FEBRUARY).await;

        let out = charts(env.config(), ChartsArgs::new(february(), ChartKind::All))
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "Rebuilt the weekly, stores, periods chart tables in 'Chart Data' for February 2025"
        );

        let book = env.workbook().await;
        let rows = book.workbook().rows(CHART_PARTITION).unwrap();
        assert_eq!(
            rows[1],
            vec!["Week 1", "300", "A", "300", "", "February 2025", "300"]
        );
    }

    #[tokio::test]
    async fn test_charts_missing_period() {
        let env = TestEnv::new().await;
        env.seed("February 2025", FEBRUARY).await;
        let march = Some(PeriodKey::new(2025, 3).unwrap());
        let err = charts(env.config(), ChartsArgs::new(march, ChartKind::Weekly))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
    }

    #[tokio::test]
    async fn test_charts_without_data() {
        let env = TestEnv::new().await;
        env.seed("February 2025", ",February 2025\n,\n").await;
        let out = charts(env.config(), ChartsArgs::new(february(), ChartKind::Stores))
            .await
            .unwrap();
        assert_eq!(out.message(), "No data found");
        assert!(out.structure().unwrap().is_empty());
        let book = env.workbook().await;
        assert_eq!(book.workbook().rows(CHART_PARTITION), None);
    }

    #[tokio::test]
    async fn test_charts_all_without_the_month_still_writes_periods() {
        let env = TestEnv::new().await;
        env.seed("February 2025", FEBRUARY).await;
        let march = Some(PeriodKey::new(2025, 3).unwrap());

        let out = charts(env.config(), ChartsArgs::new(march, ChartKind::All))
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "Rebuilt the periods chart tables in 'Chart Data' for March 2025, \
            no data for weekly, stores"
        );
        let tables = out.structure().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].kind, ChartKind::Periods);

        let book = env.workbook().await;
        let rows = book.workbook().rows(CHART_PARTITION).unwrap();
        assert_eq!(rows[0], vec!["", "", "", "", "", "Month", "Total Spent"]);
        assert_eq!(rows[1], vec!["", "", "", "", "", "February 2025", "300"]);
    }
}
