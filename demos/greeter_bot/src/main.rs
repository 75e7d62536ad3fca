//! Greeter Bot Example
//!
//! Two bots talking to in-process loopback gateways:
//!
//! - `Greeter` is expanded inline by `#[bot]`
//! - `Info` is generated into `OUT_DIR` by `build.rs` and included from `info.rs`
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --package greeter-bot
//! ```

mod info;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use info::MagicordInfo;
use magicord::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
pub struct Greeter {
    greeted: AtomicUsize,
}

#[bot(token = "greeter-token")]
impl Greeter {
    /// Greets the author by name.
    #[prefix_command]
    fn hello(&self, event: &MessageCreateEvent) -> String {
        let count = self.greeted.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "Hello, {}! ({count} greeted so far)",
            event.author().unwrap_or("stranger")
        )
    }

    #[prefix_command]
    fn bye(&self) -> String {
        "Goodbye!".to_string()
    }
}

/// Sends `content` as `author` and prints whatever the bot answers.
async fn converse(gateway: &LoopbackGateway, author: &str, content: &str) -> Result<()> {
    let event = MessageCreateEvent::new(content, gateway.channel("general")).with_author(author);
    gateway.inject_event(event)?;

    match tokio::time::timeout(Duration::from_millis(200), gateway.next_reply()).await {
        Ok(Some(reply)) => info!("{author}: {content:?} -> {:?}", reply.content),
        _ => info!("{author}: {content:?} -> (no reply)"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let greeter_gateway = LoopbackGateway::new();
    install_gateway(greeter_gateway.clone());
    let greeter = MagicordGreeter::new().run().await?;

    for content in ["!hello", "hello", "!hello", "!bye", "!unknown"] {
        converse(&greeter_gateway, "alice", content).await?;
    }

    let info_gateway = LoopbackGateway::new();
    let info_client = MagicordInfo::new()
        .run_with(ClientBuilder::new().with_gateway(info_gateway.clone()))
        .await?;

    for content in ["!version", "!whoami"] {
        converse(&info_gateway, "bob", content).await?;
    }

    greeter.shutdown();
    info_client.shutdown();
    Ok(())
}
