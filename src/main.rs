#[tokio::main]
async fn main() {
    stockinsights::cli::run().await;
}
