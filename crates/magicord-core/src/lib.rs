//! # Magicord Core
//!
//! The client interface that code generated by `#[magicord::bot]` runs
//! against.
//!
//! A generated bot only needs three things from a chat service: build a client
//! with a token, register a callback for inbound messages, and reply on the
//! channel a message came from. This crate models exactly that:
//!
//! - [`ClientBuilder`] / [`Client`]: login and listener registration
//! - [`MessageCreateEvent`] / [`Channel`]: the inbound message and its reply path
//! - [`Gateway`]: the pluggable network backend, installed with [`install_gateway`]
//! - [`LoopbackGateway`]: an in-process gateway for tests and demos
//!
//! ```text
//! ┌──────────┐  inbound   ┌────────┐  listener  ┌───────────────┐
//! │ Gateway  │──────────▶│ Client │──────────▶│ on_message()  │
//! │          │◀──────────│        │            │ (generated)   │
//! └──────────┘  replies   └────────┘            └───────────────┘
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod gateway;
pub mod loopback;

pub use client::{Client, ClientBuilder, MessageCreateListener};
pub use error::{ClientError, ClientResult};
pub use event::{Channel, MessageCreateEvent, OutboundMessage};
pub use gateway::{BoxedGateway, Gateway, GatewaySession, default_gateway, install_gateway};
pub use loopback::LoopbackGateway;
