use crate::args::ReportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::outbox::{Envelope, Mailer, Receipt};
use crate::report::{Report, ReportFormatter};
use crate::{Config, Result};
use serde::Serialize;

/// The structured output of `ledger report`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOut {
    pub report: Report,
    /// Set when the report was handed to the outbox.
    pub receipt: Option<Receipt>,
}

/// Builds the report for a month. The text rendering is the message; with an email address the
/// rendered report is also queued in the outbox.
///
/// # Errors
/// - `PartitionNotFound` if the month has no ledger.
/// - `InvalidArgument` if the email address is malformed.
/// - `Delivery` if the outbox cannot take the report.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<ReportOut>> {
    let mut book = config.workbook().await.pub_result(ErrorType::Config)?;
    let report = Report::build(&mut book, args.period()).await?;
    let formatter = ReportFormatter::new(config.currency());

    let mut message = formatter.text(&report);
    let receipt = match args.email() {
        Some(to) => {
            let envelope = Envelope::new(to, &report, &formatter)?;
            let receipt = config.mailer().deliver(&envelope).await?;
            message.push_str(&format!(
                "Queued '{}' for {} at {}",
                envelope.subject, envelope.to, receipt.location
            ));
            Some(receipt)
        }
        None => None,
    };
    Ok(Out::new(message, ReportOut { report, receipt }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PeriodKey;
    use crate::test::TestEnv;

    const JANUARY: &str = "\
,January 2025
,,,,,,,,MONTH TOTAL:,2500
,Week 2 (06/01 - 12/01)
,Date,Product,Store,Quantity,Price,Total
,2025-01-06,X,A,2,1000,2000
,2025-01-07,Y,B,1,500,500
,WEEK TOTAL:,,,,,2500
,
";

    fn january() -> PeriodKey {
        PeriodKey::new(2025, 1).unwrap()
    }

    #[tokio::test]
    async fn test_report_prints_text() {
        let env = TestEnv::new().await;
        env.seed("January 2025", JANUARY).await;
        let out = report(env.config(), ReportArgs::new(january(), None))
            .await
            .unwrap();
        assert!(out.message().contains("TOTAL SPENT: $2.500"));
        assert!(out.message().contains("  B: $500"));
        assert!(out.structure().unwrap().receipt.is_none());
    }

    #[tokio::test]
    async fn test_report_email_goes_to_outbox() {
        let env = TestEnv::new().await;
        env.seed("January 2025", JANUARY).await;
        let args = ReportArgs::new(january(), Some("me@example.com".to_string()));
        let out = report(env.config(), args).await.unwrap();
        let receipt = out.structure().unwrap().receipt.clone().unwrap();
        assert!(receipt.location.contains(".outbox"));
        assert!(out
            .message()
            .contains("Queued 'Expense Report: January 2025 ($2.500)' for me@example.com"));

        let mut entries = tokio::fs::read_dir(env.config().outbox()).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_report_missing_period() {
        let env = TestEnv::new().await;
        let err = report(env.config(), ReportArgs::new(january(), None))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::PartitionNotFound);
        assert_eq!(err.to_string(), "No ledger exists for January 2025");
    }

    #[tokio::test]
    async fn test_report_bad_address() {
        let env = TestEnv::new().await;
        env.seed("January 2025", JANUARY).await;
        let args = ReportArgs::new(january(), Some("nobody".to_string()));
        let err = report(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidArgument);
    }
}
