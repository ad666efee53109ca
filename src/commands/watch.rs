use crate::cli::WatchAction;
use crate::client::{actions, ApiClient, JsonFileStorage, ViewState, ViewStateStore};
use crate::error::Result;
use crate::models::{normalize_symbol, TrackedEntity};
use crate::utils::{get_watchlist_path, init_tracing};

pub async fn run(action: WatchAction) {
    init_tracing();

    if let Err(e) = execute(action).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn execute(action: WatchAction) -> Result<()> {
    let path = get_watchlist_path();
    let store = ViewStateStore::open(JsonFileStorage::new(&path))?;

    match action {
        WatchAction::Add { symbol, description } => {
            let entity = TrackedEntity::new(symbol, description);
            let symbol = entity.symbol.clone();
            let api = ApiClient::from_env()?;

            match actions::add_company(&store, &api, entity).await {
                Ok(state) => {
                    println!("✅ Tracking {} ({})", symbol, path.display());
                    print_prices(&state);
                }
                Err(e) => {
                    // the symbol is tracked even when prices are unavailable
                    if store.snapshot().is_tracked(&symbol) {
                        println!("✅ Tracking {} ({})", symbol, path.display());
                        eprintln!("⚠️  Could not load prices from {}: {}", api.base_url(), e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }
        WatchAction::Remove { symbol } => {
            let state = actions::remove_company(&store, &normalize_symbol(&symbol))?;
            println!("🗑️  Removed {}, {} symbols tracked", symbol, state.companies.len());
        }
        WatchAction::Mark { symbol } => {
            let symbol = normalize_symbol(&symbol);
            if !store.snapshot().is_tracked(&symbol) {
                println!("⚠️  {} is not tracked", symbol);
                return Ok(());
            }
            let state = actions::toggle_editing(&store, &symbol)?;
            let marked = state.companies.iter().filter(|c| c.editing).count();
            println!("✏️  Toggled {}, {} symbols marked", symbol, marked);
        }
        WatchAction::List => {
            let state = store.snapshot();
            if state.companies.is_empty() {
                println!("⚠️  No symbols tracked. Use `watch add SYMBOL`.");
            }
            for company in &state.companies {
                let marker = if company.editing { "✏️ " } else { "📈" };
                println!("{} {:<8} {}", marker, company.symbol, company.description);
            }
        }
        WatchAction::Refresh => {
            let symbols = store.snapshot().symbols();
            if symbols.is_empty() {
                println!("⚠️  No symbols tracked. Use `watch add SYMBOL`.");
                return Ok(());
            }
            let api = ApiClient::from_env()?;
            let state = actions::load_stock_data(&store, &api, &symbols).await?;
            print_prices(&state);
        }
    }

    Ok(())
}

fn print_prices(state: &ViewState) {
    for company in &state.companies {
        match state.stock_data.get(&company.symbol).and_then(|series| series.last()) {
            Some(point) => println!(
                "   {:<8} {:>10.2} {:>+8.2}  (52w {:.2} - {:.2}, {})",
                point.symbol, point.last, point.change, point.week_52_low, point.week_52_high, point.date
            ),
            None => println!("   {:<8} {:>10}", company.symbol, "-"),
        }
    }
}
