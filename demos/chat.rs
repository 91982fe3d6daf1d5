//! Interactive chat with durable session memory
//!
//! Conversation turns persist under ./data/sessions and survive restarts:
//! quit, run again, and the model still remembers the conversation.
//!
//! Run with: cargo run --example chat

use omnigate::gateway::{AskOptions, GatewayManager};
use omnigate::memory::FileMemoryStore;
use omnigate::provider::ProviderRegistry;
use std::io::{self, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let store = Arc::new(FileMemoryStore::new("./data")?);
    let manager = GatewayManager::builder(ProviderRegistry::from_env())
        .memory(store)
        .build()?;

    println!("Chat (durable memory)");
    println!("=====================");
    println!("Type your messages and press Enter. Send empty message to exit.\n");

    let options = AskOptions::default();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut topic = String::new();
        io::stdin().read_line(&mut topic)?;
        let topic = topic.trim();

        // Exit on empty input
        if topic.is_empty() {
            println!("\nGoodbye!");
            break;
        }

        let result = manager.ask(topic, &options).await;
        if result.success {
            println!("Assistant: {}\n", result.answer_text().unwrap_or_default());
        } else {
            eprintln!("Error: {}\n", result.error.unwrap_or_default());
        }
    }

    Ok(())
}
