use csv::StringRecord;
use ginko_core::{BankTransaction, BankType, ImportResult, Money};
use thiserror::Error;

use crate::banks::{detect_bank_type, schema_for, AmountColumns, BankSchemaConfig};
use crate::counterparty::extract_customer_name;
use crate::util::{parse_amount, parse_date, RowError};

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV parse error: {0}")]
    Malformed(#[from] csv::Error),
    #[error("Could not detect the bank format automatically; select the bank manually")]
    UndeterminedBank,
}

pub struct CsvImporter;

impl CsvImporter {
    /// Parses `content` with a fixed column layout. Bad rows are reported in
    /// `errors` and skipped.
    pub fn parse(content: &str, schema: &BankSchemaConfig) -> ImportResult {
        Self::parse_bytes(content.as_bytes(), schema)
    }

    /// Like [`CsvImporter::parse`] for raw bytes. A file that is not valid
    /// UTF-8 is structurally broken and yields an empty failure result.
    pub fn parse_bytes(data: &[u8], schema: &BankSchemaConfig) -> ImportResult {
        match Self::parse_records(data, schema) {
            Ok(result) => {
                tracing::debug!(
                    total = result.total_count,
                    deposits = result.deposit_count,
                    withdrawals = result.withdrawal_count,
                    errors = result.errors.len(),
                    "parsed CSV statement"
                );
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, "CSV statement rejected");
                ImportResult::failure(e.to_string())
            }
        }
    }

    fn parse_records(data: &[u8], schema: &BankSchemaConfig) -> Result<ImportResult, CsvError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let mut transactions = Vec::new();
        let mut errors = Vec::new();

        for (index, record) in records.iter().skip(schema.skip_lines).enumerate() {
            let line = index + schema.skip_lines + 1;
            match parse_row(record, schema) {
                Ok(Some(tx)) => transactions.push(tx),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(line, error = %e, "skipping CSV row");
                    errors.push(format!("line {line}: {e}"));
                }
            }
        }

        Ok(ImportResult::new(transactions, errors))
    }
}

/// Rows without a date are trailing filler and yield `Ok(None)`.
fn parse_row(
    record: &StringRecord,
    schema: &BankSchemaConfig,
) -> Result<Option<BankTransaction>, RowError> {
    let date_str = field(record, schema.date_column);
    if date_str.is_empty() {
        return Ok(None);
    }
    let date = parse_date(date_str, schema.date_format)
        .ok_or_else(|| RowError::InvalidDate(date_str.to_string()))?;

    let content = field(record, schema.content_column);

    let (withdrawal, deposit) = match schema.amounts {
        AmountColumns::Split { withdrawal, deposit } => (
            parse_amount(field(record, withdrawal))?,
            parse_amount(field(record, deposit))?,
        ),
        AmountColumns::Combined(col) => {
            let amount = parse_amount(field(record, col))?;
            if amount.is_positive() {
                (Money::zero(), amount)
            } else {
                (amount.abs(), Money::zero())
            }
        }
    };
    let balance = parse_amount(field(record, schema.balance_column))?;

    let memo = schema
        .memo_column
        .map(|col| field(record, col))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let tx = BankTransaction::from_magnitudes(date, content, withdrawal, deposit, balance)
        .with_memo(memo);
    let customer_name = if tx.is_deposit() {
        extract_customer_name(&tx.content)
    } else {
        None
    };

    Ok(Some(tx.with_customer_name(customer_name)))
}

fn field(record: &StringRecord, col: usize) -> &str {
    record.get(col).map(str::trim).unwrap_or_default()
}

/// Parses a bank export, auto-detecting the layout when `bank` is `None`.
/// The bank actually used is recorded in `detected_bank`.
pub fn parse_bank_csv(content: &str, bank: Option<BankType>) -> ImportResult {
    let Some(bank) = bank.or_else(|| detect_bank_type(content)) else {
        return ImportResult::failure(CsvError::UndeterminedBank.to_string());
    };
    CsvImporter::parse(content, schema_for(bank)).with_detected_bank(bank)
}
