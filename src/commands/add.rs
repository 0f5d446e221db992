use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{self, Posting};
use crate::model::TransactionInput;
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::Path;

/// Records one purchase.
///
/// # Errors
/// - `InvalidArgument` if any field is missing or malformed. Nothing is written in that case.
/// - `Config` if the ledger home cannot be loaded.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Posting>> {
    let transaction = TransactionInput::new(
        args.date(),
        args.store(),
        args.product(),
        args.quantity(),
        args.price(),
    )
    .validate()?;

    let mut book = config.workbook().await.pub_result(ErrorType::Config)?;
    let posting = ledger::submit(&mut book, &transaction).await?;

    let currency = config.currency();
    let message = format!(
        "Added {} from {} to {} of {}. Week total {}, month total {}",
        transaction.product(),
        transaction.store(),
        posting.week,
        posting.partition,
        currency.format(posting.block_total),
        currency.format(posting.period_total),
    );
    Ok(Out::new(message, posting))
}

/// Records every purchase in the CSV file at `file`. The header row names the columns `Date`,
/// `Store`, `Product`, `Quantity` and `Price`, in any order.
///
/// # Errors
/// - `InvalidArgument` if the file cannot be parsed or any row is invalid. Nothing is written in
///   that case.
pub async fn import(config: Config, file: &Path) -> Result<Out<Vec<Posting>>> {
    let inputs = read_inputs(file).await?;
    if inputs.is_empty() {
        return Ok(format!("No transactions found in {}", file.display()).into());
    }

    let mut book = config.workbook().await.pub_result(ErrorType::Config)?;
    let postings = ledger::submit_all(&mut book, &inputs).await?;

    let mut periods: Vec<&str> = Vec::new();
    for posting in &postings {
        if !periods.contains(&posting.partition.name()) {
            periods.push(posting.partition.name());
        }
    }
    Ok(Out::new(
        format!(
            "Imported {} transactions into {}",
            postings.len(),
            periods.join(", ")
        ),
        postings,
    ))
}

async fn read_inputs(file: &Path) -> Result<Vec<TransactionInput>> {
    let content = utils::read(file).await.pub_result(ErrorType::InvalidArgument)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    rdr.deserialize::<TransactionInput>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Unable to parse row {} of {}", i + 2, file.display()))
                .pub_result(ErrorType::InvalidArgument)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GridStore;
    use crate::model::Amount;
    use crate::test::TestEnv;

    fn args(date: &str, quantity: &str, price: &str) -> AddArgs {
        AddArgs::new(date, "A", "X", quantity, price)
    }

    #[tokio::test]
    async fn test_add_persists() {
        let env = TestEnv::new().await;
        let out = add(env.config(), args("2025-01-06", "2", "1000"))
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "Added X from A to Week 2 (06/01 - 12/01) of January 2025. \
            Week total $2.000, month total $2.000"
        );

        let out = add(env.config(), args("2025-01-07", "1", "500"))
            .await
            .unwrap();
        let posting = out.structure().unwrap();
        assert_eq!(posting.block_total, Amount::lenient("2500"));

        let mut book = env.workbook().await;
        assert_eq!(book.list_partitions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_invalid_writes_nothing() {
        let env = TestEnv::new().await;
        let err = add(env.config(), args("2025-01-06", "0", "1000"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);
        let mut book = env.workbook().await;
        assert!(book.list_partitions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import() {
        let env = TestEnv::new().await;
        let file = env
            .write_file(
                "january.csv",
                "Date,Store,Product,Quantity,Price\n\
                2025-01-06, A ,X,2,1000\n\
                2025-01-14,B,Y,1,$2,000\n",
            )
            .await;
        let err = import(env.config(), &file).await.unwrap_err();
        // The unquoted thousands separator adds a column.
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);

        let file = env
            .write_file(
                "january.csv",
                "Price,Quantity,Product,Store,Date\n\
                1000,2,X, A ,2025-01-06\n\
                \"$2,000\",1,Y,B,2025-01-14\n",
            )
            .await;
        let out = import(env.config(), &file).await.unwrap();
        assert_eq!(out.message(), "Imported 2 transactions into January 2025");
        let postings = out.structure().unwrap();
        assert_eq!(postings[1].period_total, Amount::lenient("4000"));
    }

    #[tokio::test]
    async fn test_import_rejects_batch_with_missing_field() {
        let env = TestEnv::new().await;
        let file = env
            .write_file(
                "bad.csv",
                "Date,Store,Product,Quantity,Price\n\
                2025-01-06,A,X,2,1000\n\
                2025-01-07,,Y,1,5\n",
            )
            .await;
        let err = import(env.config(), &file).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "Transaction 2 of 2: Missing required fields: store"
        );
        let mut book = env.workbook().await;
        assert!(book.list_partitions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_empty_file() {
        let env = TestEnv::new().await;
        let file = env
            .write_file("empty.csv", "Date,Store,Product,Quantity,Price\n")
            .await;
        let out = import(env.config(), &file).await.unwrap();
        assert!(out.message().starts_with("No transactions found"));
        assert!(out.structure().is_none());
    }
}
