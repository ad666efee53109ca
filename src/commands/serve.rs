use crate::server;
use crate::services::AggregationService;
use crate::utils::get_port;
use std::sync::Arc;

pub async fn run(port: Option<u16>) {
    let port = port.unwrap_or_else(get_port);
    println!("🚀 Starting stockinsights server on port {}", port);

    let service = match AggregationService::from_env() {
        Ok(service) => Arc::new(service),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let configured = service.upstream().config().configured();
    println!("🔗 Upstream capabilities configured: {}/7", configured.len());
    for capability in &configured {
        println!("   ✅ {}", capability);
    }

    if let Err(e) = server::serve(service, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
