//! Quote + history merge
//!
//! Every history point becomes a [`MergedPoint`] carrying the quote's
//! 52-week bounds, then one synthetic "today" point is appended per symbol
//! from the live quote.
//!
//! ## Stale change fallback
//!
//! Before the market feed updates, every quote reports a zero/absent day
//! change. When that holds for the **whole batch** the synthetic point
//! reuses the previous day's change instead. One symbol with a live change
//! disables the fallback for all of them.

use crate::error::{AppError, Result};
use crate::models::{HistoryMap, MergedPoint, PriceSeriesMap, Quote, QuoteMap};
use crate::utils::format_feed_date;
use chrono::{NaiveDate, Utc};
use tracing::debug;

/// Index a quote list by symbol
pub fn index_quotes(quotes: Vec<Quote>) -> QuoteMap {
    quotes
        .into_iter()
        .map(|quote| (quote.symbol.clone(), quote))
        .collect()
}

/// True iff no quote in the batch has a live change
pub fn use_previous_change_values(quotes: &QuoteMap) -> bool {
    quotes.values().all(|quote| !quote.has_live_change())
}

/// Builds merged per-symbol price series
#[derive(Debug, Clone, Copy)]
pub struct PriceHistoryMerger {
    today: NaiveDate,
}

impl PriceHistoryMerger {
    /// Merger dated on an explicit calendar day
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Merger dated on the current UTC day
    pub fn for_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// Merge quotes and history, keyed by the history's symbol set
    ///
    /// Fails with an input consistency error when a history symbol has no
    /// quote, or when the fallback needs a previous point that does not exist.
    pub fn merge(&self, quotes: &QuoteMap, history: HistoryMap) -> Result<PriceSeriesMap> {
        let use_previous = use_previous_change_values(quotes);
        let today = format_feed_date(self.today);
        let mut merged = PriceSeriesMap::new();

        for (symbol, points) in history {
            let quote = quotes.get(&symbol).ok_or_else(|| {
                AppError::InputConsistency(format!("history returned {} but no quote exists for it", symbol))
            })?;

            let mut series: Vec<MergedPoint> = points
                .iter()
                .map(|point| MergedPoint {
                    change: point.change(),
                    symbol: symbol.clone(),
                    last: point.close,
                    date: point.date.clone(),
                    week_52_high: quote.week_52_high,
                    week_52_low: quote.week_52_low,
                })
                .collect();

            let change = if use_previous {
                series.last().map(|previous| previous.change).ok_or_else(|| {
                    AppError::InputConsistency(format!(
                        "{} has no history to take a previous change from",
                        symbol
                    ))
                })?
            } else {
                quote.change.unwrap_or(0.0)
            };

            series.push(MergedPoint {
                change,
                symbol: symbol.clone(),
                last: quote.last,
                date: today.clone(),
                week_52_high: quote.week_52_high,
                week_52_low: quote.week_52_low,
            });

            debug!(symbol = %symbol, points = series.len(), use_previous, "Merged price series");
            merged.insert(symbol, series);
        }

        Ok(merged)
    }
}
