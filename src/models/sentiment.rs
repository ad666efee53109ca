use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Entity roll-up entry returned by the news capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEntity {
    /// Entity name, doubles as its id
    pub text: String,

    /// Number of occurrences in the bucket
    pub count: u64,

    /// Mean sentiment of this entity's occurrences
    pub average_sentiment: f64,

    /// Related symbols
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// News capability response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub entities: Vec<NewsEntity>,

    #[serde(default)]
    pub articles: Vec<serde_json::Value>,
}

/// One calendar day in UTC, bounded to the millisecond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
}

impl DayBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Start of the day, epoch milliseconds
    pub fn start_ms(&self) -> i64 {
        Self::midnight(self.date).timestamp_millis()
    }

    /// Start of the next day minus one millisecond
    pub fn end_ms(&self) -> i64 {
        Self::midnight(self.date + Duration::days(1)).timestamp_millis() - 1
    }

    /// `YYYY-MM-DD`
    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// Weighted average sentiment for one day
///
/// A day without any occurrences has a non-finite sentiment. It travels as
/// JSON `null` and comes back as NaN, never as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentDay {
    #[serde(
        serialize_with = "serialize_non_finite_as_null",
        deserialize_with = "deserialize_null_as_nan"
    )]
    pub sentiment: f64,

    /// `YYYY-MM-DD`
    pub date: String,
}

impl SentimentDay {
    pub fn new(date: impl Into<String>, sentiment: f64) -> Self {
        Self {
            sentiment,
            date: date.into(),
        }
    }

    /// False when the day had no occurrences at all
    pub fn has_data(&self) -> bool {
        self.sentiment.is_finite()
    }
}

impl PartialEq for SentimentDay {
    fn eq(&self, other: &Self) -> bool {
        let same_value = (self.sentiment.is_nan() && other.sentiment.is_nan())
            || self.sentiment == other.sentiment;
        same_value && self.date == other.date
    }
}

/// Response of `/sentiment-history`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentHistory {
    /// Raw entity list per day, keyed by `YYYY-MM-DD`
    pub entities: BTreeMap<String, Vec<NewsEntity>>,

    /// One entry per day, oldest first
    pub sentiment: Vec<SentimentDay>,
}

fn serialize_non_finite_as_null<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

fn deserialize_null_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or(f64::NAN))
}
