use crate::models::{parse_symbol_list, PriceSeriesMap};
use crate::services::AggregationService;
use crate::utils::init_tracing;

pub async fn run(symbols: Vec<String>) {
    init_tracing();

    let symbols = parse_symbol_list(&symbols);
    if symbols.is_empty() {
        eprintln!("❌ Error: give at least one symbol, e.g. `price IBM,AAPL`");
        std::process::exit(1);
    }

    match fetch(&symbols).await {
        Ok(merged) => match serde_json::to_string_pretty(&merged) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn fetch(symbols: &[String]) -> crate::error::Result<PriceSeriesMap> {
    let service = AggregationService::from_env()?;
    service.stock_price(symbols).await
}
