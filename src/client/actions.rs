//! Event sequences for user-level actions
//!
//! Each action dispatches its loading event, awaits the server and then
//! dispatches the data event. A failed request stops after the loading
//! event and hands the error back.

use crate::client::requester::ApiClient;
use crate::client::state::{ViewEvent, ViewState};
use crate::client::storage::SymbolListStorage;
use crate::client::store::ViewStateStore;
use crate::error::Result;
use crate::models::TrackedEntity;
use serde_json::Value;
use std::sync::Arc;

/// Track a company and fetch its price series
pub async fn add_company<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    entity: TrackedEntity,
) -> Result<Arc<ViewState>> {
    let symbol = entity.symbol.clone();
    store.dispatch(ViewEvent::AddEntity { entity })?;
    load_stock_data(store, api, &[symbol]).await
}

/// Stop tracking a company
pub fn remove_company<S: SymbolListStorage>(store: &ViewStateStore<S>, symbol: &str) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::RemoveEntity {
        symbol: symbol.to_string(),
    })
}

/// Flip a tracked company's list-editor selection
pub fn toggle_editing<S: SymbolListStorage>(store: &ViewStateStore<S>, symbol: &str) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::ToggleEditing {
        symbol: symbol.to_string(),
    })
}

/// Refresh price series for a set of symbols
pub async fn load_stock_data<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    symbols: &[String],
) -> Result<Arc<ViewState>> {
    let snapshot = store.dispatch(ViewEvent::PriceLoading {
        symbols: symbols.to_vec(),
    })?;
    if symbols.is_empty() {
        return Ok(snapshot);
    }
    let data = api.stock_price(symbols).await?;
    store.dispatch(ViewEvent::PriceData { data })
}

/// Search companies by free text
pub async fn search_company<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    name: &str,
) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::SearchLoading)?;
    let companies = match api.company_lookup(name).await? {
        Value::Array(companies) => companies,
        _ => Vec::new(),
    };
    store.dispatch(ViewEvent::SearchResults { companies })
}

pub fn clear_search<S: SymbolListStorage>(store: &ViewStateStore<S>) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::SearchClear)
}

/// Fetch the 31-day sentiment history for one symbol
pub async fn load_sentiment_history<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    symbol: &str,
) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::SentimentLoading {
        symbol: symbol.to_string(),
    })?;
    let history = api.sentiment_history(symbol).await?;
    store.dispatch(ViewEvent::SentimentData {
        symbol: symbol.to_string(),
        series: history.sentiment,
    })
}

pub async fn load_strings<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    language: Option<&str>,
) -> Result<Arc<ViewState>> {
    let strings = api.strings(language).await?;
    store.dispatch(ViewEvent::StringsLoaded { strings })
}

/// Articles and entity roll-up for a symbol
pub async fn load_news<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    symbol: &str,
    language: &str,
) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::NewsLoading)?;
    let news = api.stock_news(symbol, language).await?;
    store.dispatch(ViewEvent::NewsData {
        articles: news.articles,
        entities: news.entities,
    })
}

/// Open the tweets panel for a symbol/entity pair and fill it
pub async fn load_tweets<S: SymbolListStorage>(
    store: &ViewStateStore<S>,
    api: &ApiClient,
    symbol: &str,
    entity: &str,
    language: &str,
) -> Result<Arc<ViewState>> {
    store.dispatch(ViewEvent::TweetsLoading {
        symbols: symbol.to_string(),
        entity: entity.to_string(),
    })?;
    let response = api.tweets(symbol, entity, language).await?;
    store.dispatch(ViewEvent::TweetsData {
        tweets: response.tweets,
        sentiment: response.sentiment,
    })
}

/// Select a symbol, or deselect it when it is already the selection
pub fn toggle_select<S: SymbolListStorage>(store: &ViewStateStore<S>, symbol: &str) -> Result<Arc<ViewState>> {
    if store.snapshot().selected.as_deref() == Some(symbol) {
        store.dispatch(ViewEvent::DeselectEntity)
    } else {
        store.dispatch(ViewEvent::SelectEntity {
            symbol: symbol.to_string(),
        })
    }
}
