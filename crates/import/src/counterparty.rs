use std::sync::OnceLock;

use regex::Regex;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Transfer notations banks prefix to a payer's name, in full-width kanji,
// katakana and half-width katakana.
re!(re_transfer_prefix, r"^(?:振込[＊*]?|フリコミ[＊*]?|ﾌﾘｺﾐ[＊*]?|入金)\s*(.+)");
// Legal-form abbreviations such as (カ) or （株）.
re!(re_parenthetical, r"[（(].*?[）)]");

/// Pulls the payer name out of a transfer description, e.g.
/// `振込＊ヤマダ（カ）` → `ヤマダ`. Both the CSV and OFX parsers go through
/// here so a deposit gets the same name whichever format it arrived in.
pub fn extract_customer_name(content: &str) -> Option<String> {
    let caps = re_transfer_prefix().captures(content)?;
    let name = re_parenthetical().replace_all(caps.get(1)?.as_str(), "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
