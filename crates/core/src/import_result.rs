use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::bank::BankType;
use super::money::Money;
use super::transaction::BankTransaction;

/// Account identifiers lifted from an OFX `<BANKACCTFROM>` aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "BANKID", default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
    #[serde(rename = "ACCTID", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "ACCTTYPE", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.bank_id.is_none() && self.account_id.is_none() && self.account_type.is_none()
    }
}

/// Outcome of parsing one statement file.
///
/// `success` means every row parsed cleanly, not that the result is usable.
/// Always consume `transactions` and inspect `errors` regardless of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub transactions: Vec<BankTransaction>,
    pub errors: Vec<String>,
    pub total_count: usize,
    pub deposit_count: usize,
    pub withdrawal_count: usize,
    pub total_deposit_amount: Money,
    pub total_withdrawal_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_info: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_bank: Option<BankType>,
}

impl ImportResult {
    /// Aggregates counts and totals over `transactions`. `success` is true
    /// only when no errors were collected.
    pub fn new(transactions: Vec<BankTransaction>, errors: Vec<String>) -> Self {
        let (deposits, withdrawals): (Vec<_>, Vec<_>) =
            transactions.iter().partition(|t| t.is_deposit());
        let total_deposit_amount = deposits.iter().map(|t| t.amount).sum();
        let total_withdrawal_amount = withdrawals.iter().map(|t| t.amount.abs()).sum();

        ImportResult {
            success: errors.is_empty(),
            total_count: transactions.len(),
            deposit_count: deposits.len(),
            withdrawal_count: withdrawals.len(),
            total_deposit_amount,
            total_withdrawal_amount,
            transactions,
            errors,
            account_info: None,
            detected_bank: None,
        }
    }

    /// A structural failure: nothing was parsed.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::new(Vec::new(), vec![error.into()])
    }

    pub fn with_account_info(mut self, account_info: Option<AccountInfo>) -> Self {
        self.account_info = account_info.filter(|info| !info.is_empty());
        self
    }

    pub fn with_detected_bank(mut self, bank: BankType) -> Self {
        self.detected_bank = Some(bank);
        self
    }

    pub fn deposits(&self) -> impl Iterator<Item = &BankTransaction> {
        self.transactions.iter().filter(|t| t.is_deposit())
    }

    /// Dedup keys that occur more than once within this result, in first-seen order.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut repeated = Vec::new();
        for key in self.transactions.iter().map(BankTransaction::dedup_key) {
            let count = seen.entry(key.clone()).or_insert(0);
            *count += 1;
            if *count == 2 {
                repeated.push(key);
            }
        }
        repeated
    }
}
