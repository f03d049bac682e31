use std::sync::OnceLock;

use ginko_core::BankType;
use regex::Regex;
use serde::Serialize;

use crate::util::DateFormat;

/// Where a layout reports the transaction amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountColumns {
    /// Unsigned withdrawal and deposit magnitudes in separate columns.
    Split { withdrawal: usize, deposit: usize },
    /// One signed column; positive values are deposits.
    Combined(usize),
}

/// Column layout of one bank's CSV export. Indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankSchemaConfig {
    pub skip_lines: usize,
    pub date_column: usize,
    pub content_column: usize,
    pub amounts: AmountColumns,
    pub balance_column: usize,
    pub memo_column: Option<usize>,
    pub date_format: DateFormat,
}

impl BankSchemaConfig {
    /// The common single-header, `YYYY/MM/DD`, split-amount layout.
    const fn split(
        content_column: usize,
        withdrawal: usize,
        deposit: usize,
        balance_column: usize,
    ) -> Self {
        BankSchemaConfig {
            skip_lines: 1,
            date_column: 0,
            content_column,
            amounts: AmountColumns::Split { withdrawal, deposit },
            balance_column,
            memo_column: None,
            date_format: DateFormat::YmdSlash,
        }
    }
}

// 日付,内容,出金金額(円),入金金額(円),残高(円),メモ
static SBI: BankSchemaConfig = BankSchemaConfig {
    memo_column: Some(5),
    ..BankSchemaConfig::split(1, 2, 3, 4)
};
// 日付,摘要,お支払金額,お預り金額,差引残高
static MUFG: BankSchemaConfig = BankSchemaConfig::split(1, 2, 3, 4);
// 年月日,お引出し,お預入れ,残高,摘要
static SMBC: BankSchemaConfig = BankSchemaConfig::split(4, 1, 2, 3);
// 日付,摘要,お支払金額,お預かり金額,残高
static MIZUHO: BankSchemaConfig = BankSchemaConfig::split(1, 2, 3, 4);
// 取引日,入出金(税込),取引後残高,摘要
static RAKUTEN: BankSchemaConfig = BankSchemaConfig {
    skip_lines: 1,
    date_column: 0,
    content_column: 3,
    amounts: AmountColumns::Combined(1),
    balance_column: 2,
    memo_column: None,
    date_format: DateFormat::YmdSlash,
};
// 日付,取扱内容,お預入金額,お引出金額,現在高
static JAPAN_POST: BankSchemaConfig = BankSchemaConfig::split(1, 3, 2, 4);
// 取引日,摘要,お支払い金額,お預かり金額,残高
static SONY: BankSchemaConfig = BankSchemaConfig::split(1, 2, 3, 4);
// 取引日,摘要,出金,入金,残高
static AEON: BankSchemaConfig = BankSchemaConfig::split(1, 2, 3, 4);

pub fn schema_for(bank: BankType) -> &'static BankSchemaConfig {
    match bank {
        BankType::Sbi => &SBI,
        BankType::Mufg => &MUFG,
        BankType::Smbc => &SMBC,
        BankType::Mizuho => &MIZUHO,
        BankType::Rakuten => &RAKUTEN,
        BankType::JapanPost => &JAPAN_POST,
        BankType::Sony => &SONY,
        BankType::Aeon => &AEON,
    }
}

enum Signature {
    /// Every phrase must appear somewhere in the header lines.
    AllOf(&'static [&'static str]),
    /// Column names in order on a single line.
    Sequence(fn() -> &'static Regex),
}

fn re_aeon_header() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new("取引日.*摘要.*出金.*入金.*残高").expect("invalid regex"))
}

// Checked in order; MUFG and Mizuho differ only in お預り/お預かり.
const SIGNATURES: [(BankType, Signature); 8] = [
    (BankType::Sbi, Signature::AllOf(&["出金金額(円)", "入金金額(円)"])),
    (BankType::Mufg, Signature::AllOf(&["お支払金額", "お預り金額"])),
    (BankType::Smbc, Signature::AllOf(&["お引出し", "お預入れ"])),
    (BankType::Mizuho, Signature::AllOf(&["お支払金額", "お預かり金額"])),
    (BankType::Rakuten, Signature::AllOf(&["取引日", "入出金"])),
    (BankType::JapanPost, Signature::AllOf(&["お預入金額", "お引出金額"])),
    (BankType::Sony, Signature::AllOf(&["お支払い金額", "お預かり金額"])),
    (BankType::Aeon, Signature::Sequence(re_aeon_header)),
];

/// Guesses the originating bank from the first five lines. `None` means the
/// layout is not recognized and the caller has to ask for a manual choice.
pub fn detect_bank_type(content: &str) -> Option<BankType> {
    let head = content.split('\n').take(5).collect::<Vec<_>>().join("\n");

    let detected = SIGNATURES
        .iter()
        .find(|(_, signature)| match signature {
            Signature::AllOf(phrases) => phrases.iter().all(|p| head.contains(p)),
            Signature::Sequence(re) => re().is_match(&head),
        })
        .map(|(bank, _)| *bank);

    tracing::debug!(bank = ?detected, "bank detection");
    detected
}
