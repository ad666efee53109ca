//! Client view model and its pure transition function
//!
//! Every event produces a fresh [`ViewState`]; the previous snapshot is never
//! touched. Events the reducer does not know are a no-op.

use crate::models::{MergedSeries, NewsEntity, PriceSeriesMap, SentimentDay, StringBundle, TrackedEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-symbol sentiment history slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "series", rename_all = "snake_case")]
pub enum SentimentEntry {
    /// A fetch is in flight
    Loading,
    Loaded(Vec<SentimentDay>),
}

impl SentimentEntry {
    pub fn is_loading(&self) -> bool {
        matches!(self, SentimentEntry::Loading)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Populated,
}

/// Transient company search results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PotentialCompanies {
    pub status: SearchStatus,
    pub companies: Vec<Value>,
}

/// Articles for the selected company
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleList {
    pub loading: bool,
    pub articles: Vec<Value>,
}

/// Entity weight as the entity cloud consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityWeight {
    pub id: String,
    pub value: u64,
    pub color_value: f64,
    pub symbols: Vec<String>,
}

impl From<&NewsEntity> for EntityWeight {
    fn from(entity: &NewsEntity) -> Self {
        Self {
            id: entity.text.clone(),
            value: entity.count,
            color_value: entity.average_sentiment,
            symbols: entity.symbols.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityCloud {
    pub loading: bool,
    pub entities: Vec<EntityWeight>,
}

/// What the tweets panel is showing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetsDescription {
    pub symbols: String,
    pub entity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweetsPanel {
    pub open: bool,
    pub tweets: Vec<Value>,
    pub sentiment: Value,
    pub description: Option<TweetsDescription>,
}

impl Default for TweetsPanel {
    fn default() -> Self {
        Self {
            open: false,
            tweets: Vec::new(),
            sentiment: Value::Object(Default::default()),
            description: None,
        }
    }
}

/// Normalized client view model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    /// Tracked symbols, most recently added first
    pub companies: Vec<TrackedEntity>,
    /// At most one selected symbol
    pub selected: Option<String>,
    pub stock_data: BTreeMap<String, MergedSeries>,
    pub sentiment_history: BTreeMap<String, SentimentEntry>,
    pub potential_companies: PotentialCompanies,
    pub strings: StringBundle,
    pub articles: ArticleList,
    pub entities: EntityCloud,
    pub tweets: TweetsPanel,
    pub current_date: Option<String>,
}

impl ViewState {
    pub fn with_companies(companies: Vec<TrackedEntity>) -> Self {
        Self {
            companies,
            ..Self::default()
        }
    }

    pub fn is_tracked(&self, symbol: &str) -> bool {
        self.companies.iter().any(|c| c.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.companies.iter().map(|c| c.symbol.clone()).collect()
    }
}

/// Discrete update events, decoded from `{"type": "...", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewEvent {
    AddEntity { entity: TrackedEntity },
    RemoveEntity { symbol: String },
    ToggleEditing { symbol: String },
    SelectEntity { symbol: String },
    DeselectEntity,
    PriceLoading { symbols: Vec<String> },
    PriceData { data: PriceSeriesMap },
    SentimentLoading { symbol: String },
    SentimentData { symbol: String, series: Vec<SentimentDay> },
    SearchLoading,
    SearchResults { companies: Vec<Value> },
    SearchClear,
    StringsLoaded { strings: StringBundle },
    NewsLoading,
    NewsData {
        #[serde(default)]
        articles: Vec<Value>,
        #[serde(default)]
        entities: Vec<NewsEntity>,
    },
    CloseArticleList,
    TweetsLoading { symbols: String, entity: String },
    TweetsData { tweets: Value, sentiment: Value },
    CloseTweets,
    SwitchDate { date: String },
    #[serde(other)]
    Unknown,
}

impl ViewEvent {
    /// Events after which the tracked list is mirrored to storage
    pub fn touches_tracked_list(&self) -> bool {
        matches!(
            self,
            ViewEvent::AddEntity { .. } | ViewEvent::RemoveEntity { .. } | ViewEvent::ToggleEditing { .. }
        )
    }
}

/// Fold one event into a new snapshot
pub fn reduce(state: &ViewState, event: &ViewEvent) -> ViewState {
    let mut next = state.clone();

    match event {
        ViewEvent::AddEntity { entity } => {
            if !state.is_tracked(&entity.symbol) {
                next.companies.insert(0, entity.clone());
            }
        }
        ViewEvent::RemoveEntity { symbol } => {
            next.companies.retain(|c| &c.symbol != symbol);
            next.stock_data.remove(symbol);
            next.sentiment_history.remove(symbol);
            if next.selected.as_ref() == Some(symbol) {
                next.selected = None;
            }
        }
        ViewEvent::ToggleEditing { symbol } => {
            if let Some(company) = next.companies.iter_mut().find(|c| &c.symbol == symbol) {
                company.editing = !company.editing;
            }
        }
        ViewEvent::SelectEntity { symbol } => {
            next.selected = Some(symbol.clone());
        }
        ViewEvent::DeselectEntity => {
            next.selected = None;
            next.articles.articles.clear();
            next.entities.entities.clear();
        }
        ViewEvent::PriceData { data } => {
            // last applied wins per symbol; responses are not sequenced
            for (symbol, series) in data {
                next.stock_data.insert(symbol.clone(), series.clone());
            }
        }
        ViewEvent::SentimentLoading { symbol } => {
            next.sentiment_history.insert(symbol.clone(), SentimentEntry::Loading);
        }
        ViewEvent::SentimentData { symbol, series } => {
            next.sentiment_history
                .insert(symbol.clone(), SentimentEntry::Loaded(series.clone()));
        }
        ViewEvent::SearchLoading => {
            next.potential_companies.status = SearchStatus::Loading;
        }
        ViewEvent::SearchResults { companies } => {
            next.potential_companies = PotentialCompanies {
                status: SearchStatus::Populated,
                companies: companies.clone(),
            };
        }
        ViewEvent::SearchClear => {
            next.potential_companies = PotentialCompanies::default();
        }
        ViewEvent::StringsLoaded { strings } => {
            next.strings = strings.clone();
        }
        ViewEvent::NewsLoading => {
            next.articles.loading = true;
        }
        ViewEvent::NewsData { articles, entities } => {
            next.articles = ArticleList {
                loading: false,
                articles: articles.clone(),
            };
            next.entities = EntityCloud {
                loading: false,
                entities: entities.iter().map(EntityWeight::from).collect(),
            };
        }
        ViewEvent::CloseArticleList => {
            next.selected = None;
            next.articles = ArticleList::default();
            next.entities = EntityCloud::default();
        }
        ViewEvent::TweetsLoading { symbols, entity } => {
            next.tweets = TweetsPanel {
                open: true,
                description: Some(TweetsDescription {
                    symbols: symbols.clone(),
                    entity: entity.clone(),
                }),
                ..TweetsPanel::default()
            };
        }
        ViewEvent::TweetsData { tweets, sentiment } => {
            if state.tweets.open {
                next.tweets.tweets = match tweets {
                    Value::Array(items) => items.clone(),
                    _ => Vec::new(),
                };
                next.tweets.sentiment = sentiment.clone();
            }
        }
        ViewEvent::CloseTweets => {
            if state.tweets.open {
                next.tweets = TweetsPanel::default();
            }
        }
        ViewEvent::SwitchDate { date } => {
            next.current_date = Some(date.clone());
        }
        ViewEvent::PriceLoading { .. } | ViewEvent::Unknown => {}
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergedPoint;

    fn point(symbol: &str, date: &str, last: f64) -> MergedPoint {
        MergedPoint {
            change: 1.0,
            symbol: symbol.to_string(),
            last,
            date: date.to_string(),
            week_52_high: 200.0,
            week_52_low: 100.0,
        }
    }

    fn apply(state: ViewState, events: &[ViewEvent]) -> ViewState {
        events.iter().fold(state, |state, event| reduce(&state, event))
    }

    #[test]
    fn test_toggle_editing_flips_one_entry() {
        let before = ViewState::with_companies(vec![
            TrackedEntity::new("IBM", "IBM"),
            TrackedEntity::new("AAPL", "Apple"),
        ]);
        let toggle = |symbol: &str| ViewEvent::ToggleEditing { symbol: symbol.to_string() };

        let after = reduce(&before, &toggle("AAPL"));
        assert!(!after.companies[0].editing);
        assert!(after.companies[1].editing);
        assert!(!before.companies[1].editing);

        assert_eq!(reduce(&after, &toggle("AAPL")), before);
        assert_eq!(reduce(&before, &toggle("MSFT")), before);
    }

    #[test]
    fn test_toggle_editing_decodes() {
        let event: ViewEvent = serde_json::from_str(r#"{"type":"TOGGLE_EDITING","symbol":"IBM"}"#).unwrap();
        assert_eq!(event, ViewEvent::ToggleEditing { symbol: "IBM".to_string() });
        assert!(event.touches_tracked_list());
    }

    #[test]
    fn test_add_then_remove_restores_list_and_clears_maps() {
        let before = ViewState::with_companies(vec![TrackedEntity::new("AAPL", "Apple")]);

        let after = apply(
            before.clone(),
            &[
                ViewEvent::AddEntity { entity: TrackedEntity::new("IBM", "IBM") },
                ViewEvent::PriceData {
                    data: [("IBM".to_string(), vec![point("IBM", "2016-3-7", 140.0)])].into(),
                },
                ViewEvent::SentimentLoading { symbol: "IBM".to_string() },
                ViewEvent::RemoveEntity { symbol: "IBM".to_string() },
            ],
        );

        assert_eq!(after.companies, before.companies);
        assert!(!after.stock_data.contains_key("IBM"));
        assert!(!after.sentiment_history.contains_key("IBM"));
    }

    #[test]
    fn test_add_prepends_and_ignores_duplicates() {
        let state = apply(
            ViewState::default(),
            &[
                ViewEvent::AddEntity { entity: TrackedEntity::new("AAPL", "Apple") },
                ViewEvent::AddEntity { entity: TrackedEntity::new("IBM", "IBM") },
                ViewEvent::AddEntity { entity: TrackedEntity::new("AAPL", "Apple again") },
            ],
        );
        assert_eq!(state.symbols(), vec!["IBM", "AAPL"]);
        assert_eq!(state.companies[1].description, "Apple");
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let state = apply(
            ViewState::default(),
            &[
                ViewEvent::SelectEntity { symbol: "AAPL".to_string() },
                ViewEvent::SelectEntity { symbol: "MSFT".to_string() },
            ],
        );
        assert_eq!(state.selected.as_deref(), Some("MSFT"));

        let state = reduce(&state, &ViewEvent::DeselectEntity);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_removing_selected_symbol_clears_selection() {
        let state = apply(
            ViewState::with_companies(vec![TrackedEntity::new("IBM", "")]),
            &[
                ViewEvent::SelectEntity { symbol: "IBM".to_string() },
                ViewEvent::RemoveEntity { symbol: "IBM".to_string() },
            ],
        );
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_price_data_merges_per_symbol() {
        let state = apply(
            ViewState::default(),
            &[
                ViewEvent::PriceData {
                    data: [
                        ("IBM".to_string(), vec![point("IBM", "2016-3-4", 131.0)]),
                        ("AAPL".to_string(), vec![point("AAPL", "2016-3-4", 99.0)]),
                    ]
                    .into(),
                },
                ViewEvent::PriceData {
                    data: [("IBM".to_string(), vec![point("IBM", "2016-3-7", 140.0)])].into(),
                },
            ],
        );

        assert_eq!(state.stock_data.len(), 2);
        assert_eq!(state.stock_data["IBM"][0].last, 140.0);
        assert_eq!(state.stock_data["AAPL"][0].last, 99.0);
    }

    #[test]
    fn test_sentiment_loading_then_data() {
        let loading = reduce(&ViewState::default(), &ViewEvent::SentimentLoading { symbol: "IBM".to_string() });
        assert!(loading.sentiment_history["IBM"].is_loading());

        let series = vec![SentimentDay::new("2016-03-01", f64::NAN), SentimentDay::new("2016-03-02", 0.0)];
        let loaded = reduce(
            &loading,
            &ViewEvent::SentimentData { symbol: "IBM".to_string(), series: series.clone() },
        );
        assert_eq!(loaded.sentiment_history["IBM"], SentimentEntry::Loaded(series));
        // previous snapshot is untouched
        assert!(loading.sentiment_history["IBM"].is_loading());
    }

    #[test]
    fn test_search_states() {
        let state = reduce(&ViewState::default(), &ViewEvent::SearchLoading);
        assert_eq!(state.potential_companies.status, SearchStatus::Loading);

        let state = reduce(
            &state,
            &ViewEvent::SearchResults { companies: vec![serde_json::json!({"symbol": "IBM"})] },
        );
        assert_eq!(state.potential_companies.status, SearchStatus::Populated);
        assert_eq!(state.potential_companies.companies.len(), 1);

        let state = reduce(&state, &ViewEvent::SearchClear);
        assert_eq!(state.potential_companies, PotentialCompanies::default());
    }

    #[test]
    fn test_news_data_projects_entities() {
        let state = apply(
            ViewState::default(),
            &[
                ViewEvent::SelectEntity { symbol: "IBM".to_string() },
                ViewEvent::NewsLoading,
                ViewEvent::NewsData {
                    articles: vec![serde_json::json!({"title": "Watson"})],
                    entities: vec![NewsEntity {
                        text: "Watson".to_string(),
                        count: 4,
                        average_sentiment: 0.3,
                        symbols: vec!["IBM".to_string()],
                    }],
                },
            ],
        );
        assert!(!state.articles.loading);
        assert_eq!(state.articles.articles.len(), 1);
        assert_eq!(
            state.entities.entities,
            vec![EntityWeight {
                id: "Watson".to_string(),
                value: 4,
                color_value: 0.3,
                symbols: vec!["IBM".to_string()],
            }]
        );

        let closed = reduce(&state, &ViewEvent::CloseArticleList);
        assert_eq!(closed.selected, None);
        assert!(closed.articles.articles.is_empty());
        assert!(closed.entities.entities.is_empty());
    }

    #[test]
    fn test_tweets_panel_ignores_data_while_closed() {
        let data = ViewEvent::TweetsData {
            tweets: serde_json::json!([{"text": "hi"}]),
            sentiment: serde_json::json!({"score": 1}),
        };
        let closed = reduce(&ViewState::default(), &data);
        assert_eq!(closed, ViewState::default());

        let open = reduce(
            &ViewState::default(),
            &ViewEvent::TweetsLoading { symbols: "IBM".to_string(), entity: "Watson".to_string() },
        );
        assert!(open.tweets.open);
        let filled = reduce(&open, &data);
        assert_eq!(filled.tweets.tweets.len(), 1);

        let odd = reduce(
            &open,
            &ViewEvent::TweetsData { tweets: serde_json::json!({"error": "x"}), sentiment: Value::Null },
        );
        assert!(odd.tweets.tweets.is_empty());

        let closed = reduce(&filled, &ViewEvent::CloseTweets);
        assert_eq!(closed.tweets, TweetsPanel::default());
    }

    #[test]
    fn test_events_decode_from_json() {
        let event: ViewEvent = serde_json::from_str(r#"{"type":"REMOVE_ENTITY","symbol":"IBM"}"#).unwrap();
        assert_eq!(event, ViewEvent::RemoveEntity { symbol: "IBM".to_string() });

        let event: ViewEvent = serde_json::from_str(r#"{"type":"SWITCH_DATE","date":"2016-3-4"}"#).unwrap();
        assert_eq!(event, ViewEvent::SwitchDate { date: "2016-3-4".to_string() });

        let event: ViewEvent = serde_json::from_str(r#"{"type":"STOCK_PRICE_BOGUS"}"#).unwrap();
        assert_eq!(event, ViewEvent::Unknown);
    }

    #[test]
    fn test_unknown_and_price_loading_are_noops() {
        let state = ViewState::with_companies(vec![TrackedEntity::new("IBM", "")]);
        assert_eq!(reduce(&state, &ViewEvent::Unknown), state);
        assert_eq!(
            reduce(&state, &ViewEvent::PriceLoading { symbols: vec!["IBM".to_string()] }),
            state
        );
    }
}
