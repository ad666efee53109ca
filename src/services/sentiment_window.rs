//! Trailing-window news sentiment
//!
//! One news request per UTC day bucket (30 days back through today), all in
//! flight at once. Each bucket's entity list is reduced to a count-weighted
//! average sentiment. Results are reassembled by bucket index, so the output
//! is chronological whatever order the requests complete in.

use crate::constants::{SENTIMENT_ARTICLE_LIMIT, SENTIMENT_ENTITY_LIMIT, SENTIMENT_WINDOW_DAYS};
use crate::error::Result;
use crate::models::{Capability, DayBucket, NewsEntity, NewsResponse, SentimentDay, SentimentHistory};
use crate::services::upstream::UpstreamClient;
use chrono::{Duration, NaiveDate, Utc};
use futures::future::try_join_all;
use std::time::Instant;
use tracing::{debug, info};

/// Ordered day buckets, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentWindow {
    buckets: Vec<DayBucket>,
}

impl SentimentWindow {
    /// `SENTIMENT_WINDOW_DAYS` days back through `today`, inclusive
    pub fn ending_on(today: NaiveDate) -> Self {
        let buckets = (0..=SENTIMENT_WINDOW_DAYS)
            .rev()
            .map(|days_back| DayBucket::new(today - Duration::days(days_back)))
            .collect();
        Self { buckets }
    }

    /// Window ending on the current UTC day
    pub fn trailing() -> Self {
        Self::ending_on(Utc::now().date_naive())
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Count-weighted mean of per-entity average sentiment
///
/// Returns NaN when the bucket has no occurrences at all; callers must not
/// read that as neutral sentiment.
pub fn weighted_average(entities: &[NewsEntity]) -> f64 {
    let (total_count, weighted_sum) = entities.iter().fold((0u64, 0.0f64), |(count, sum), entity| {
        (count + entity.count, sum + entity.count as f64 * entity.average_sentiment)
    });

    if total_count == 0 {
        f64::NAN
    } else {
        weighted_sum / total_count as f64
    }
}

/// Fans out one news request per day bucket and reduces the answers
#[derive(Clone)]
pub struct SentimentWindowAggregator {
    upstream: UpstreamClient,
}

impl SentimentWindowAggregator {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Sentiment history for `symbol` over `window`
    ///
    /// Any failing bucket fails the whole aggregation.
    pub async fn aggregate(
        &self,
        symbol: &str,
        entity: Option<&str>,
        window: &SentimentWindow,
    ) -> Result<SentimentHistory> {
        let started = Instant::now();

        let requests = window.buckets().iter().map(|bucket| {
            let mut params = vec![
                ("symbol", symbol.to_string()),
                ("start", bucket.start_ms().to_string()),
                ("end", bucket.end_ms().to_string()),
                ("alimit", SENTIMENT_ARTICLE_LIMIT.to_string()),
                ("elimit", SENTIMENT_ENTITY_LIMIT.to_string()),
            ];
            if let Some(entity) = entity {
                params.push(("entity", entity.to_string()));
            }
            async move {
                self.upstream
                    .fetch_as::<NewsResponse>(Capability::News, &params)
                    .await
            }
        });

        // try_join_all keeps input order, not completion order
        let responses = try_join_all(requests).await?;

        let mut history = SentimentHistory::default();
        for (bucket, response) in window.buckets().iter().zip(responses) {
            let date = bucket.label();
            let sentiment = weighted_average(&response.entities);
            debug!(symbol, date = %date, entities = response.entities.len(), sentiment, "Reduced sentiment bucket");

            history.sentiment.push(SentimentDay::new(date.clone(), sentiment));
            history.entities.insert(date, response.entities);
        }

        info!(
            symbol,
            days = history.sentiment.len(),
            days_with_data = history.sentiment.iter().filter(|d| d.has_data()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sentiment window aggregated"
        );
        Ok(history)
    }
}
