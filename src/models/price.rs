use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time quote snapshot as delivered by the quote capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Uppercase ticker symbol
    pub symbol: String,

    /// Last traded price
    pub last: f64,

    /// Day change; absent (or 0) before the market feed updates
    #[serde(default)]
    pub change: Option<f64>,

    pub week_52_high: f64,
    pub week_52_low: f64,
}

impl Quote {
    /// Whether the live day change carries a usable value.
    ///
    /// Zero, NaN and a missing change all count as "not updated yet".
    pub fn has_live_change(&self) -> bool {
        matches!(self.change, Some(change) if change != 0.0 && !change.is_nan())
    }
}

/// One daily record of the history capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Calendar day in the upstream's own format
    pub date: String,
    pub open: f64,
    pub close: f64,
}

impl HistoryPoint {
    pub fn new(date: impl Into<String>, open: f64, close: f64) -> Self {
        Self {
            date: date.into(),
            open,
            close,
        }
    }

    /// Intraday change: close - open
    pub fn change(&self) -> f64 {
        self.close - self.open
    }
}

/// One point of a merged price series
///
/// Field names match what the browser client already consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub change: f64,
    pub symbol: String,
    pub last: f64,
    pub date: String,
    pub week_52_high: f64,
    pub week_52_low: f64,
}

/// History points plus the synthetic "today" point, oldest first
pub type MergedSeries = Vec<MergedPoint>;

/// Quotes indexed by symbol
pub type QuoteMap = BTreeMap<String, Quote>;

/// History capability response: symbol -> ordered daily points
pub type HistoryMap = BTreeMap<String, Vec<HistoryPoint>>;

/// Merged price response: symbol -> merged series
pub type PriceSeriesMap = BTreeMap<String, MergedSeries>;
