pub mod error;
pub mod types;

pub use error::{DcastError, LedgerError, NumericError, ProjectionError, Result, RouteError, WalletError};
pub use types::*;
