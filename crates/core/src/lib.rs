pub mod bank;
pub mod import_result;
pub mod money;
pub mod transaction;

pub use bank::{supported_banks, BankInfo, BankType, UnknownBankType};
pub use import_result::{AccountInfo, ImportResult};
pub use money::Money;
pub use transaction::{BankTransaction, TransactionType};
