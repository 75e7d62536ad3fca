//! # Magicord
//!
//! Declare a chat bot as an impl block; Magicord generates the dispatcher that
//! logs in and routes `!command` messages to your methods.
//!
//! ```rust,ignore
//! use magicord::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[bot(token_env = "DISCORD_TOKEN")]
//! impl Greeter {
//!     #[prefix_command]
//!     fn hello(&self, event: &MessageCreateEvent) -> String {
//!         format!("Hello, {}!", event.author().unwrap_or("stranger"))
//!     }
//!
//!     #[prefix_command]
//!     fn bye(&self) -> String {
//!         "Goodbye!".to_string()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ClientError> {
//!     let client = MagicordGreeter::new().run().await?;
//!     client.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! `run` logs in through the gateway installed with [`install_gateway`]; use
//! `run_with` to pass a [`ClientBuilder`] of your own.

pub use magicord_core::*;
pub use magicord_macros::{bot, prefix_command};

/// Markers for bots generated by a build script instead of `#[bot]`.
///
/// ```rust,ignore
/// #[magicord::declare::bot(token = "abc123")]
/// impl Greeter { ... }
///
/// include!(concat!(env!("OUT_DIR"), "/MagicordGreeter.rs"));
/// ```
pub mod declare {
    pub use magicord_macros::{declare_bot as bot, prefix_command};
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use magicord_core::{
        Channel, Client, ClientBuilder, ClientError, ClientResult, Gateway, LoopbackGateway,
        MessageCreateEvent, install_gateway,
    };
    pub use magicord_macros::{bot, prefix_command};
}

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
