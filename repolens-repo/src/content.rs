//! File content decoding
//!
//! Binary files are recognised by extension and never fetched. Text files are
//! base64-decoded and then tried against an ordered list of encodings.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use repolens_core::{ErrorContext, RepoLensError, RepoLensResult};
use std::str::FromStr;

/// Extensions whose content is never fetched
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg", ".pdf", ".doc", ".docx", ".xls",
    ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".7z", ".tar", ".gz", ".exe", ".dll", ".so",
    ".dylib", ".bin", ".dat", ".db", ".sqlite",
];

pub fn is_binary_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Character encodings tried when decoding file content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1; every byte maps to a code point, so decoding never fails
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn defaults() -> Vec<TextEncoding> {
        vec![
            TextEncoding::Utf8,
            TextEncoding::Latin1,
            TextEncoding::Windows1252,
        ]
    }

    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = Box<RepoLensError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "windows-1252" | "cp1252" => Ok(TextEncoding::Windows1252),
            other => Err(Box::new(RepoLensError::Validation {
                message: format!("Unsupported encoding: {}", other),
                field: Some("github.encodings".to_string()),
                context: ErrorContext::new("content")
                    .with_suggestion("Use utf-8, latin-1 or windows-1252"),
            })),
        }
    }
}

/// Code points for 0x80..=0x9F; `None` marks bytes undefined in windows-1252
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn windows_1252_char(byte: u8) -> Option<char> {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[(byte - 0x80) as usize],
        _ => Some(byte as char),
    }
}

/// First encoding that decodes without error wins; `None` when none does
pub fn decode_text(bytes: &[u8], encodings: &[TextEncoding]) -> Option<String> {
    encodings.iter().find_map(|encoding| encoding.decode(bytes))
}

/// Decode the base64 payload of a contents response; the API wraps it at 60 columns
pub fn decode_base64_content(content: &str) -> RepoLensResult<Vec<u8>> {
    let cleaned_content = content.replace(['\n', '\r', ' '], "");

    BASE64.decode(&cleaned_content).map_err(|e| {
        Box::new(RepoLensError::Decode {
            message: format!("Failed to decode base64 content: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("content").with_operation("decode_base64_content"),
        })
    })
}
