//! Fan-out example
//!
//! Sends the same question to every provider with credentials configured
//! and prints each answer side by side.
//!
//! Run with: cargo run --example ask_all

use omnigate::gateway::{AskOptions, GatewayManager};
use omnigate::provider::ProviderRegistry;
use omnigate::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let manager = GatewayManager::new(ProviderRegistry::from_env())?;
    let report = manager
        .ask_all("In one sentence, what makes a good systems language?", &AskOptions::default())
        .await;

    if !report.success {
        eprintln!("{}", report.error.unwrap_or_default());
        return Ok(());
    }

    for result in report.responses {
        println!("--- {} ({})", result.provider, result.model);
        match result.answer_text() {
            Some(text) => println!("{}\n", text),
            None => println!("(failed: {})\n", result.error.unwrap_or_default()),
        }
    }

    Ok(())
}
