//! Structured-output example
//!
//! Asks with the ready-made JSON template and prints the decoded object.
//! On a decode failure the raw model text is shown instead.
//!
//! Run with: cargo run --example structured

use omnigate::gateway::{AskOptions, GatewayManager, ResponsePayload, STRUCTURED_TEMPLATE};
use omnigate::provider::ProviderRegistry;
use omnigate::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let manager = GatewayManager::builder(ProviderRegistry::from_env())
        .structured()
        .build()?;

    let options = AskOptions {
        template: STRUCTURED_TEMPLATE.to_string(),
        ..Default::default()
    };
    let result = manager.ask("the Rust borrow checker", &options).await;

    if !result.success {
        eprintln!("Error: {}", result.error.unwrap_or_default());
        if let Some(raw) = result.raw {
            eprintln!("Raw model text: {}", raw);
        }
        return Ok(());
    }

    if let Some(ResponsePayload::Structured(value)) = result.response {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}
