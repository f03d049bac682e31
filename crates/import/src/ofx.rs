use std::sync::OnceLock;

use ginko_core::{AccountInfo, BankTransaction, ImportResult, Money};
use regex::Regex;
use thiserror::Error;

use crate::counterparty::extract_customer_name;
use crate::util::{parse_decimal, parse_ofx_datetime, RowError};

#[derive(Error, Debug)]
pub enum OfxError {
    #[error("Not an OFX document: no <OFX> element found")]
    MissingRoot,
}

/// Direction implied by `<TRNTYPE>`. Types that name neither direction fall
/// back to the sign of `<TRNAMT>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Deposit,
    Withdrawal,
    FromSign,
}

fn direction_of(trn_type: Option<&str>) -> Direction {
    match trn_type.map(str::to_ascii_uppercase).as_deref() {
        Some("CREDIT" | "DEP" | "INT") => Direction::Deposit,
        Some(
            "DEBIT" | "ATM" | "POS" | "FEE" | "SRVCHG" | "CHECK" | "PAYMENT" | "CASH"
            | "DIRECTDEBIT" | "REPEATPMT",
        ) => Direction::Withdrawal,
        _ => Direction::FromSign,
    }
}

fn re_ofx_root() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)<OFX>").expect("invalid regex"))
}

fn re_stmttrn() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?is)<STMTTRN>(.*?)</STMTTRN>").expect("invalid regex"))
}

pub struct OfxParser;

impl OfxParser {
    /// Parses an OFX 1.x (SGML) or 2.x (XML) statement. Each `<STMTTRN>` that
    /// fails to parse is reported in `errors` as `transaction N: …` and skipped.
    pub fn parse(data: &str) -> ImportResult {
        if !re_ofx_root().is_match(data) {
            tracing::warn!("OFX statement rejected: no <OFX> root");
            return ImportResult::failure(OfxError::MissingRoot.to_string());
        }

        let account_info = AccountInfo {
            bank_id: extract_tag(data, "BANKID"),
            account_id: extract_tag(data, "ACCTID"),
            account_type: extract_tag(data, "ACCTTYPE"),
        };

        let blocks: Vec<&str> = re_stmttrn()
            .captures_iter(data)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        if blocks.is_empty() {
            // Unlike CSV, an empty statement is still a successful parse.
            let mut result = ImportResult::new(
                Vec::new(),
                vec!["No <STMTTRN> transactions found in OFX statement".to_string()],
            )
            .with_account_info(Some(account_info));
            result.success = true;
            return result;
        }

        let mut transactions = Vec::new();
        let mut errors = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            let seq = index + 1;
            match parse_block(block) {
                Ok(tx) => transactions.push(tx),
                Err(e) => {
                    tracing::warn!(transaction = seq, error = %e, "skipping OFX transaction");
                    errors.push(format!("transaction {seq}: {e}"));
                }
            }
        }

        let result = ImportResult::new(transactions, errors).with_account_info(Some(account_info));
        tracing::debug!(
            total = result.total_count,
            deposits = result.deposit_count,
            withdrawals = result.withdrawal_count,
            errors = result.errors.len(),
            "parsed OFX statement"
        );
        result
    }
}

fn parse_block(block: &str) -> Result<BankTransaction, RowError> {
    let posted = extract_tag(block, "DTPOSTED").ok_or(RowError::MissingField("DTPOSTED"))?;
    let raw_amount = extract_tag(block, "TRNAMT").ok_or(RowError::MissingField("TRNAMT"))?;
    let trn_type = extract_tag(block, "TRNTYPE");
    let fit_id = extract_tag(block, "FITID");
    let name = extract_tag(block, "NAME");
    let memo = extract_tag(block, "MEMO");

    let (date, time) = parse_ofx_datetime(&posted)?;
    let parsed = parse_decimal(&raw_amount).ok_or_else(|| RowError::InvalidAmount(raw_amount.clone()))?;

    let is_deposit = match direction_of(trn_type.as_deref()) {
        Direction::Deposit => true,
        Direction::Withdrawal => false,
        Direction::FromSign => parsed.is_positive(),
    };
    // The source sign is not trusted; DEBIT rows sometimes carry positive amounts.
    let amount: Money = if is_deposit { parsed.abs() } else { -parsed.abs() };

    let content = name.clone().or_else(|| memo.clone()).unwrap_or_default();
    let tx = BankTransaction::new(date, content, amount, Money::zero())
        .with_time(time)
        .with_memo(memo)
        .with_reference_number(fit_id);

    let customer_name = if tx.is_deposit() {
        name.as_deref().and_then(extract_customer_name)
    } else {
        None
    };
    Ok(tx.with_customer_name(customer_name))
}

/// Reads `<TAG>value</TAG>`, or for SGML elements without a closing tag,
/// `<TAG>value` up to the next `<` or line break. Tag names match
/// case-insensitively; blank values are treated as absent.
fn extract_tag(data: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag.to_ascii_uppercase());
    let close = format!("</{}>", tag.to_ascii_uppercase());
    // ASCII uppercasing keeps byte offsets aligned with `data`.
    let upper = data.to_ascii_uppercase();

    let start = upper.find(&open)? + open.len();
    let rest = &data[start..];
    let rest_upper = &upper[start..];

    let value = match rest_upper.find('<') {
        Some(end) if rest_upper[end..].starts_with(&close) => &rest[..end],
        _ => {
            let end = rest.find(&['<', '\r', '\n'][..]).unwrap_or(rest.len());
            &rest[..end]
        }
    };

    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn parse(data: &[u8]) -> ImportResult {
    let content = String::from_utf8_lossy(data);
    OfxParser::parse(&content)
}
