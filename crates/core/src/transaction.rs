use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// One normalized movement on a bank statement.
///
/// `amount` is signed: positive for deposits, negative (or zero) for
/// withdrawals. `kind` is always derived from that sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    pub date: NaiveDate,
    /// Time of day, only known for OFX postings that carry `HHMMSS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub content: String,
    pub amount: Money,
    /// Running balance after this transaction; zero when the source has none.
    pub balance: Money,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
}

impl BankTransaction {
    pub fn new(date: NaiveDate, content: impl Into<String>, amount: Money, balance: Money) -> Self {
        let kind = if amount.is_positive() {
            TransactionType::Deposit
        } else {
            TransactionType::Withdrawal
        };
        BankTransaction {
            date,
            time: None,
            content: content.into(),
            amount,
            balance,
            kind,
            memo: None,
            customer_name: None,
            reference_number: None,
        }
    }

    /// Build from unsigned magnitudes the way split-column exports report them:
    /// any positive deposit wins, otherwise the withdrawal is negated.
    pub fn from_magnitudes(
        date: NaiveDate,
        content: impl Into<String>,
        withdrawal: Money,
        deposit: Money,
        balance: Money,
    ) -> Self {
        let amount = if deposit.is_positive() { deposit } else { -withdrawal };
        Self::new(date, content, amount, balance)
    }

    pub fn with_time(mut self, time: Option<NaiveTime>) -> Self {
        self.time = time;
        self
    }

    pub fn with_memo(mut self, memo: Option<String>) -> Self {
        self.memo = memo;
        self
    }

    pub fn with_customer_name(mut self, customer_name: Option<String>) -> Self {
        self.customer_name = customer_name;
        self
    }

    pub fn with_reference_number(mut self, reference_number: Option<String>) -> Self {
        self.reference_number = reference_number;
        self
    }

    pub fn is_deposit(&self) -> bool {
        self.kind == TransactionType::Deposit
    }

    /// Stable key the ledger store uses to detect re-imported transactions.
    /// SHA-256 over `date|amount|content|reference`, truncated to 32 hex chars.
    pub fn dedup_key(&self) -> String {
        let data = format!(
            "{}|{}|{}|{}",
            self.date.format("%Y-%m-%d"),
            self.amount,
            self.content,
            self.reference_number.as_deref().unwrap_or_default()
        );
        let digest = Sha256::digest(data.as_bytes());
        digest.iter().take(16).map(|b| format!("{b:02x}")).collect()
    }
}
