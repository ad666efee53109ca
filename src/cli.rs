use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "stockinsights")]
#[command(about = "Stock price and news sentiment aggregation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the aggregation server
    Serve {
        /// Port to listen on (defaults to $PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print merged price series for symbols (comma separated)
    Price {
        symbols: Vec<String>,
    },
    /// Print 31-day news sentiment history for a symbol
    Sentiment {
        symbol: String,
        /// Only count this entity
        #[arg(short, long)]
        entity: Option<String>,
    },
    /// Print the localized string bundle
    Strings {
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Manage the tracked symbol list
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
}

#[derive(Subcommand)]
pub enum WatchAction {
    /// Track a symbol and fetch its prices from the server
    Add {
        symbol: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Stop tracking a symbol
    Remove { symbol: String },
    /// Mark or unmark a tracked symbol for editing
    Mark { symbol: String },
    /// Show tracked symbols
    List,
    /// Refresh prices for every tracked symbol from the server
    Refresh,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Price { symbols } => {
            commands::price::run(symbols).await;
        }
        Commands::Sentiment { symbol, entity } => {
            commands::sentiment::run(symbol, entity).await;
        }
        Commands::Strings { language } => {
            commands::strings::run(language).await;
        }
        Commands::Watch { action } => {
            commands::watch::run(action).await;
        }
    }
}
