use omnigate::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Discover providers from the environment
    let registry = ProviderRegistry::from_env();
    let manager = GatewayManager::new(registry)?;

    if manager.available_providers().is_empty() {
        eprintln!(
            "No provider credentials found. Set ANTHROPIC_API_KEY, OPENAI_API_KEY, \
             GOOGLE_API_KEY, or XAI_API_KEY."
        );
        return Ok(());
    }

    // Ask the first available provider
    println!("Asking...");
    let result = manager
        .ask("Explain what Rust is in one sentence.", &AskOptions::default())
        .await;

    if result.success {
        println!("\n[{} / {}]", result.provider, result.model);
        println!("{}", result.answer_text().unwrap_or_default());
    } else {
        eprintln!("Error: {}", result.error.unwrap_or_default());
    }

    Ok(())
}
