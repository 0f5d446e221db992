use crate::error::{Error, ErrorType, Result};
use crate::model::{Amount, PeriodKey, WeekLabel};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The format of dates accepted on input and written into the date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A purchase as it arrives from the command line or a CSV file, before validation. Every field
/// is required; `validate` turns this into a `Transaction`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl TransactionInput {
    pub fn new(
        date: impl Into<String>,
        store: impl Into<String>,
        product: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date.into()),
            store: Some(store.into()),
            product: Some(product.into()),
            quantity: Some(quantity.into()),
            price: Some(price.into()),
        }
    }

    /// Checks every field and returns the `Transaction`. Nothing here touches storage, so a
    /// rejected input leaves the ledger untouched.
    ///
    /// # Errors
    /// - `InvalidArgument` if a field is missing or blank, the date is not `YYYY-MM-DD`, the
    ///   quantity is not a positive number or the price is not a non-negative number.
    pub fn validate(&self) -> Result<Transaction> {
        let missing: Vec<&str> = [
            ("date", &self.date),
            ("store", &self.store),
            ("product", &self.product),
            ("quantity", &self.quantity),
            ("price", &self.price),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(invalid(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let date = self.date.as_deref().unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| invalid(format!("Invalid date '{date}': {e}")))?;

        let quantity = self.quantity.as_deref().unwrap_or_default().trim();
        let quantity = Decimal::from_str(quantity)
            .map_err(|e| invalid(format!("Invalid quantity '{quantity}': {e}")))?;

        let price = self.price.as_deref().unwrap_or_default().trim();
        let price = Amount::from_str(price)
            .map_err(|e| invalid(format!("Invalid price '{price}': {e}")))?;

        Transaction::new(
            date,
            self.store.as_deref().unwrap_or_default(),
            self.product.as_deref().unwrap_or_default(),
            quantity,
            price,
        )
    }
}

/// A validated purchase: one data row of a week block. Only `Transaction::new` builds one, so
/// its total always fits in an `Amount`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    store: String,
    product: String,
    quantity: Decimal,
    price: Amount,
    total: Amount,
}

impl Transaction {
    /// # Errors
    /// - `InvalidArgument` if store or product are blank, quantity is not positive, price is
    ///   negative or `quantity × price` is too large to hold.
    pub fn new(
        date: NaiveDate,
        store: impl Into<String>,
        product: impl Into<String>,
        quantity: Decimal,
        price: Amount,
    ) -> Result<Self> {
        let store = store.into().trim().to_string();
        let product = product.into().trim().to_string();
        if store.is_empty() {
            return Err(invalid("Store must not be blank"));
        }
        if product.is_empty() {
            return Err(invalid("Product must not be blank"));
        }
        if quantity <= Decimal::ZERO {
            return Err(invalid(format!("Quantity must be positive, got {quantity}")));
        }
        if price.is_negative() {
            return Err(invalid(format!("Price must not be negative, got {price}")));
        }
        let total = price.checked_mul(quantity).ok_or_else(|| {
            invalid(format!("The total of {quantity} × {price} is too large"))
        })?;
        Ok(Self {
            date,
            store,
            product,
            quantity,
            price,
            total,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    /// `quantity × price`.
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn period(&self) -> PeriodKey {
        PeriodKey::from_date(self.date)
    }

    pub fn week_label(&self) -> WeekLabel {
        WeekLabel::for_date(self.date)
    }

    /// The cells of the data row, in header order: Date, Product, Store, Quantity, Price, Total.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.product.clone(),
            self.store.clone(),
            self.quantity.to_string(),
            self.price.to_string(),
            self.total().to_string(),
        ]
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::msg(ErrorType::InvalidArgument, message.into())
}
