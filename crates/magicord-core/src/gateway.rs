//! Gateway abstraction.
//!
//! A [`Gateway`] is the network side of a client: it authenticates with a
//! token and hands back a stream of inbound [`MessageCreateEvent`]s. Concrete
//! chat-service transports implement this trait; the crate itself only ships
//! the in-process [`LoopbackGateway`](crate::LoopbackGateway).
//!
//! Generated bots call [`ClientBuilder::new`](crate::ClientBuilder::new), which
//! picks up whatever gateway was registered through [`install_gateway`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{RwLock, const_rwlock};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::ClientResult;
use crate::event::MessageCreateEvent;

/// A live, authenticated connection returned by [`Gateway::connect`].
#[derive(Debug)]
pub struct GatewaySession {
    /// Inbound message events, in arrival order.
    pub inbound: mpsc::UnboundedReceiver<MessageCreateEvent>,
}

impl GatewaySession {
    /// Wraps an inbound event receiver.
    pub fn new(inbound: mpsc::UnboundedReceiver<MessageCreateEvent>) -> Self {
        Self { inbound }
    }
}

/// The network backend of a client.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Authenticates with `token` and resolves once the session is ready.
    async fn connect(&self, token: &str) -> ClientResult<GatewaySession>;
}

/// Shared gateway handle.
pub type BoxedGateway = Arc<dyn Gateway>;

static DEFAULT_GATEWAY: RwLock<Option<BoxedGateway>> = const_rwlock(None);

/// Registers the process-wide gateway used by `ClientBuilder::new()`.
///
/// Installing again replaces the previous gateway.
pub fn install_gateway(gateway: BoxedGateway) {
    debug!(gateway = gateway.name(), "Installing default gateway");
    *DEFAULT_GATEWAY.write() = Some(gateway);
}

/// Returns the installed gateway, if any.
pub fn default_gateway() -> Option<BoxedGateway> {
    DEFAULT_GATEWAY.read().clone()
}
