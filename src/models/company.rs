use serde::{Deserialize, Serialize};

/// A symbol the client has chosen to monitor
///
/// The ordered list of these is what gets mirrored to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntity {
    /// Uppercase ticker symbol
    pub symbol: String,

    /// Display description (usually the company name)
    #[serde(default)]
    pub description: String,

    /// Whether the entry is selected in the list editor
    #[serde(default)]
    pub editing: bool,
}

impl TrackedEntity {
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            description: description.into(),
            editing: false,
        }
    }
}

/// Uppercase and trim a ticker symbol
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Split comma-separated symbol lists into normalized, de-duplicated symbols.
///
/// Order of first appearance is kept.
pub fn parse_symbol_list<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for part in raw.iter().flat_map(|s| s.as_ref().split(',')) {
        let symbol = normalize_symbol(part);
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
