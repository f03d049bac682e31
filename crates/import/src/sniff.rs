use serde::{Deserialize, Serialize};
use std::fmt;

const OFX_MARKERS: [&str; 3] = ["OFXHEADER", "<OFX>", "<STMTTRN>"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Ofx,
    Unknown,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Ofx => write!(f, "ofx"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifies raw statement text by content alone. OFX markers are matched
/// case-sensitively; CSV needs at least two lines and three commas on the first.
pub fn detect_file_type(content: &str) -> FileType {
    if OFX_MARKERS.iter().any(|m| content.contains(m)) {
        return FileType::Ofx;
    }

    let mut lines = content.split('\n');
    let first = lines.next().unwrap_or_default();
    if lines.next().is_some() && first.matches(',').count() >= 3 {
        return FileType::Csv;
    }

    FileType::Unknown
}

/// Like [`detect_file_type`], falling back to the upload's file extension
/// when the content is inconclusive.
pub fn detect_file_type_with_name(content: &str, file_name: Option<&str>) -> FileType {
    let detected = detect_file_type(content);
    if detected != FileType::Unknown {
        return detected;
    }

    let name = file_name.unwrap_or_default().to_lowercase();
    if name.ends_with(".csv") {
        FileType::Csv
    } else if name.ends_with(".ofx") || name.ends_with(".qfx") {
        FileType::Ofx
    } else {
        FileType::Unknown
    }
}
