use crate::models::language::resolve_language;
use crate::services::AggregationService;
use crate::utils::init_tracing;

pub async fn run(language: Option<String>) {
    init_tracing();

    let language = resolve_language(language.as_deref(), None);
    let service = match AggregationService::from_env() {
        Ok(service) => service,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    match service.strings(&language).await {
        Ok(bundle) => {
            println!("🌐 {} ({} strings)\n", language, bundle.len());
            for (key, text) in bundle.iter() {
                println!("{:<32} {}", key, text);
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
