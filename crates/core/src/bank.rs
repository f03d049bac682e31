use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Institutions whose CSV exports have a known column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BankType {
    Sbi,
    Mufg,
    Smbc,
    Mizuho,
    Rakuten,
    JapanPost,
    Sony,
    Aeon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
    /// Four-digit zengin institution code.
    pub code: &'static str,
    pub name: &'static str,
    pub name_en: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown bank type: '{0}'")]
pub struct UnknownBankType(pub String);

impl BankType {
    pub const ALL: [BankType; 8] = [
        BankType::Sbi,
        BankType::Mufg,
        BankType::Smbc,
        BankType::Mizuho,
        BankType::Rakuten,
        BankType::JapanPost,
        BankType::Sony,
        BankType::Aeon,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BankType::Sbi => "sbi",
            BankType::Mufg => "mufg",
            BankType::Smbc => "smbc",
            BankType::Mizuho => "mizuho",
            BankType::Rakuten => "rakuten",
            BankType::JapanPost => "japan-post",
            BankType::Sony => "sony",
            BankType::Aeon => "aeon",
        }
    }

    pub fn info(self) -> BankInfo {
        let (code, name, name_en) = match self {
            BankType::Sbi => ("0038", "住信SBIネット銀行", "SBI Sumishin Net Bank"),
            BankType::Mufg => ("0005", "三菱UFJ銀行", "MUFG Bank"),
            BankType::Smbc => ("0009", "三井住友銀行", "SMBC"),
            BankType::Mizuho => ("0001", "みずほ銀行", "Mizuho Bank"),
            BankType::Rakuten => ("0036", "楽天銀行", "Rakuten Bank"),
            BankType::JapanPost => ("9900", "ゆうちょ銀行", "Japan Post Bank"),
            BankType::Sony => ("0035", "ソニー銀行", "Sony Bank"),
            BankType::Aeon => ("0040", "イオン銀行", "AEON Bank"),
        };
        BankInfo { code, name, name_en }
    }
}

impl fmt::Display for BankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for BankType {
    type Err = UnknownBankType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BankType::ALL
            .into_iter()
            .find(|b| b.id() == wanted)
            .ok_or_else(|| UnknownBankType(s.to_string()))
    }
}

/// Every supported bank paired with its metadata, in declaration order.
pub fn supported_banks() -> Vec<(BankType, BankInfo)> {
    BankType::ALL.into_iter().map(|b| (b, b.info())).collect()
}
