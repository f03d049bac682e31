pub mod banks;
pub mod counterparty;
pub mod csv;
pub mod ofx;
pub mod rules;
pub mod sniff;
pub mod util;

pub use crate::banks::{detect_bank_type, schema_for, AmountColumns, BankSchemaConfig};
pub use crate::counterparty::extract_customer_name;
pub use crate::csv::{parse_bank_csv, CsvError, CsvImporter};
pub use crate::ofx::{OfxError, OfxParser};
pub use crate::rules::{determine_account_category, CategoryRule, CategoryRuleSet, RuleError};
pub use crate::sniff::{detect_file_type, detect_file_type_with_name, FileType};
pub use crate::util::{DateFormat, RowError};

pub mod import {
    use crate::*;
    use ginko_core::{BankType, ImportResult};
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum ImportError {
        #[error("Could not determine the file format; expected a CSV or OFX statement")]
        UnknownFormat,
        #[error("Could not detect the bank format automatically; select the bank manually")]
        UndeterminedBank,
    }

    /// Sniffs `content` (falling back to the file name's extension) and runs
    /// the matching parser. For CSV, `bank = None` auto-detects the layout.
    pub fn import_statement(
        content: &str,
        file_name: Option<&str>,
        bank: Option<BankType>,
    ) -> Result<ImportResult, ImportError> {
        let file_type = detect_file_type_with_name(content, file_name);
        tracing::debug!(?file_name, %file_type, "statement format detected");

        match file_type {
            FileType::Ofx => Ok(import_ofx(content)),
            FileType::Csv => {
                let bank = bank
                    .or_else(|| detect_bank_type(content))
                    .ok_or(ImportError::UndeterminedBank)?;
                Ok(parse_bank_csv(content, Some(bank)))
            }
            FileType::Unknown => Err(ImportError::UnknownFormat),
        }
    }

    pub fn import_ofx(content: &str) -> ImportResult {
        OfxParser::parse(content)
    }

    pub fn import_csv_with_schema(content: &str, schema: &BankSchemaConfig) -> ImportResult {
        CsvImporter::parse(content, schema)
    }
}
