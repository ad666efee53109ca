use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream capability consumed by the aggregation server
///
/// Each capability targets its own credentialed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Free-text company / symbol search
    CompanyLookup,
    /// Point-in-time quote snapshot
    Quote,
    /// Daily open/close history
    History,
    /// News articles and entity roll-up
    News,
    /// Social posts about a symbol/entity pair
    Tweets,
    /// Social sentiment about a symbol/entity pair
    Sentiment,
    /// Localized string bundles
    Strings,
}

impl Capability {
    /// Request path appended to the capability's base URL
    pub fn path(&self) -> &'static str {
        match self {
            Capability::CompanyLookup => "/markets/find",
            Capability::Quote => "/markets/quote",
            Capability::History => "/markets/history",
            Capability::News => "/news/find",
            Capability::Tweets => "/twitter/find",
            Capability::Sentiment => "/sentiment/find",
            Capability::Strings => "/bundles/stock_strings/strings",
        }
    }

    /// Query keys that must be present on every call
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Capability::CompanyLookup => &["name"],
            Capability::Quote | Capability::History => &["symbols"],
            Capability::News => &["symbol"],
            Capability::Tweets | Capability::Sentiment => &["symbol", "entity"],
            Capability::Strings => &["languageId"],
        }
    }

    /// Environment variable prefix holding `{PREFIX}_URL` / `{PREFIX}_CLIENT_ID`
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Capability::CompanyLookup => "COMPANY_LOOKUP",
            Capability::Quote => "STOCK_PRICE",
            Capability::History => "STOCK_HISTORY",
            Capability::News => "STOCK_NEWS",
            Capability::Tweets => "STOCK_TWEETS",
            Capability::Sentiment => "STOCK_SENTIMENT",
            Capability::Strings => "GLOBALIZATION",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CompanyLookup => "company_lookup",
            Capability::Quote => "quote",
            Capability::History => "history",
            Capability::News => "news",
            Capability::Tweets => "tweets",
            Capability::Sentiment => "sentiment",
            Capability::Strings => "strings",
        }
    }

    pub fn all() -> Vec<Capability> {
        vec![
            Capability::CompanyLookup,
            Capability::Quote,
            Capability::History,
            Capability::News,
            Capability::Tweets,
            Capability::Sentiment,
            Capability::Strings,
        ]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_paths() {
        assert_eq!(Capability::Quote.path(), "/markets/quote");
        assert_eq!(Capability::History.path(), "/markets/history");
        assert_eq!(Capability::News.path(), "/news/find");
        assert_eq!(Capability::Tweets.path(), "/twitter/find");
        assert_eq!(Capability::Sentiment.path(), "/sentiment/find");
    }

    #[test]
    fn test_env_prefixes_are_unique() {
        let mut prefixes: Vec<_> = Capability::all().iter().map(|c| c.env_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Capability::all().len());
    }

    #[test]
    fn test_capability_serialize() {
        let json = serde_json::to_string(&Capability::CompanyLookup).unwrap();
        assert_eq!(json, r#""company_lookup""#);
    }
}
