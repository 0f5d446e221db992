pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod outbox;
pub mod report;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
