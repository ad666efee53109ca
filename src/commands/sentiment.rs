use crate::error::Result;
use crate::models::{normalize_symbol, SentimentHistory};
use crate::services::AggregationService;
use crate::utils::init_tracing;

pub async fn run(symbol: String, entity: Option<String>) {
    init_tracing();

    match fetch(&normalize_symbol(&symbol), entity.as_deref()).await {
        Ok(history) => {
            let json = match serde_json::to_string_pretty(&history) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("❌ Error: {}", e);
                    std::process::exit(1);
                }
            };
            println!("{}", json);

            let with_data = history.sentiment.iter().filter(|d| d.has_data()).count();
            eprintln!("📊 {} days, {} with news coverage", history.sentiment.len(), with_data);
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn fetch(symbol: &str, entity: Option<&str>) -> Result<SentimentHistory> {
    let service = AggregationService::from_env()?;
    service.sentiment_history(symbol, entity).await
}
