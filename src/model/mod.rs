//! Types that represent the ledger's data model, such as `Transaction`, `Amount` and the keys
//! that name partitions and week blocks.
mod amount;
mod period;
mod row_col;
mod transaction;
mod week;

pub use amount::{Amount, AmountError, CurrencyFormat};
pub use period::PeriodKey;
pub use row_col::RowCol;
pub use transaction::{Transaction, TransactionInput, DATE_FORMAT};
pub use week::{week_of_month, week_range, WeekLabel};
