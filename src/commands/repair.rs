use crate::args::RepairArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::period;
use crate::ledger::writer::{self, Recomputed};
use crate::{Config, Result};

/// Recomputes every week total and the month total of a month from its rows.
pub async fn repair(config: Config, args: RepairArgs) -> Result<Out<Recomputed>> {
    let mut book = config.workbook().await.pub_result(ErrorType::Config)?;
    let partition = period::find(&mut book, args.period()).await?;
    let out = writer::recompute_totals(&mut book, &partition).await?;
    let message = format!(
        "Checked {} week totals in {partition}, corrected {}. Month total {}",
        out.blocks,
        out.corrected,
        config.currency().format(out.period_total)
    );
    Ok(Out::new(message, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GridStore, PartitionRef};
    use crate::model::PeriodKey;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_repair_counts_an_unaccounted_row() {
        let env = TestEnv::new().await;
        // The second data row was inserted but the totals were never updated.
        env.seed(
            "January 2025",
            "\
,January 2025
,,,,,,,,MONTH TOTAL:,2000
,Week 2 (06/01 - 12/01)
,Date,Product,Store,Quantity,Price,Total
,2025-01-06,X,A,2,1000,2000
,2025-01-07,Y,A,1,500,500
,WEEK TOTAL:,,,,,2000
,
",
        )
        .await;

        let args = RepairArgs::new(PeriodKey::new(2025, 1).unwrap());
        let out = repair(env.config(), args).await.unwrap();
        assert_eq!(
            out.message(),
            "Checked 1 week totals in January 2025, corrected 1. Month total $2.500"
        );

        let mut book = env.workbook().await;
        let p = PartitionRef::new("January 2025");
        assert_eq!(book.read_cell(&p, 6, 6).await.unwrap(), "2500");
        assert_eq!(book.read_cell(&p, 1, 9).await.unwrap(), "2500");
    }

    #[tokio::test]
    async fn test_repair_missing_period() {
        let env = TestEnv::new().await;
        let args = RepairArgs::new(PeriodKey::new(2025, 1).unwrap());
        let err = repair(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
    }
}
