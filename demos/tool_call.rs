//! Tool-calling example
//!
//! The model is offered the default tool catalog and may call one tool
//! before answering. The exchange record shows what was called and what
//! it returned.
//!
//! Run with: cargo run --example tool_call

use omnigate::gateway::{AskOptions, GatewayManager, ResponsePayload};
use omnigate::provider::ProviderRegistry;
use omnigate::tools::ToolRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let manager = GatewayManager::builder(ProviderRegistry::from_env())
        .tools(ToolRegistry::with_defaults())
        .build()?;

    let result = manager
        .ask("What is the current date and time in UTC?", &AskOptions::default())
        .await;

    if !result.success {
        eprintln!("Error: {}", result.error.unwrap_or_default());
        return Ok(());
    }

    if let Some(ResponsePayload::Tool(exchange)) = result.response {
        if let Some(call) = &exchange.tool_call {
            println!("Tool called: {}", call.name);
        }
        if let Some(output) = &exchange.tool_output {
            println!("Tool output: {}", output);
        }
        println!("\nAnswer: {}", exchange.final_answer);
    }

    Ok(())
}
