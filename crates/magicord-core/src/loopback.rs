//! In-process gateway.
//!
//! [`LoopbackGateway`] stands in for a chat service: tests and demos inject
//! inbound messages and read back the replies a bot queued, without any
//! network involved.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::event::{Channel, MessageCreateEvent, OutboundMessage};
use crate::gateway::{Gateway, GatewaySession};

/// A gateway that loops messages back through local channels.
pub struct LoopbackGateway {
    inbound: Mutex<Option<mpsc::UnboundedSender<MessageCreateEvent>>>,
    token: Mutex<Option<String>>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    outbound_rx: AsyncMutex<mpsc::UnboundedReceiver<OutboundMessage>>,
}

impl LoopbackGateway {
    /// Creates a disconnected loopback gateway.
    pub fn new() -> Arc<Self> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            inbound: Mutex::new(None),
            token: Mutex::new(None),
            outbound_tx,
            outbound_rx: AsyncMutex::new(outbound_rx),
        })
    }

    /// The token the last session logged in with.
    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Whether a session is currently connected.
    pub fn is_connected(&self) -> bool {
        self.inbound
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Delivers `content` as if it had been posted in `channel_id`.
    pub fn inject(&self, channel_id: &str, content: impl Into<String>) -> ClientResult<()> {
        let event = MessageCreateEvent::new(
            content,
            Channel::new(channel_id, self.outbound_tx.clone()),
        );
        self.inject_event(event)
    }

    /// Delivers a prepared event.
    pub fn inject_event(&self, event: MessageCreateEvent) -> ClientResult<()> {
        let guard = self.inbound.lock();
        let tx = guard.as_ref().ok_or(ClientError::Closed)?;
        tx.send(event).map_err(|_| ClientError::Closed)
    }

    /// A channel handle bound to this gateway's outbound queue.
    pub fn channel(&self, channel_id: &str) -> Channel {
        Channel::new(channel_id, self.outbound_tx.clone())
    }

    /// Waits for the next queued reply.
    pub async fn next_reply(&self) -> Option<OutboundMessage> {
        self.outbound_rx.lock().await.recv().await
    }

    /// Returns a queued reply without waiting.
    pub fn try_next_reply(&self) -> Option<OutboundMessage> {
        self.outbound_rx.try_lock().ok()?.try_recv().ok()
    }

    /// Ends the current session; the client sees its inbound stream close.
    pub fn disconnect(&self) {
        if self.inbound.lock().take().is_some() {
            debug!("Loopback session disconnected");
        }
    }
}

#[async_trait]
impl Gateway for LoopbackGateway {
    fn name(&self) -> &'static str {
        "loopback"
    }

    async fn connect(&self, token: &str) -> ClientResult<GatewaySession> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inbound.lock() = Some(tx);
        *self.token.lock() = Some(token.to_string());
        debug!("Loopback session connected");
        Ok(GatewaySession::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientBuilder;

    #[tokio::test]
    async fn test_inject_before_connect_fails() {
        let gateway = LoopbackGateway::new();
        let result = gateway.inject("general", "!ping");
        assert!(matches!(result, Err(ClientError::Closed)));
    }

    #[tokio::test]
    async fn test_round_trip_through_client() {
        let gateway = LoopbackGateway::new();
        let client = ClientBuilder::new()
            .with_gateway(gateway.clone())
            .set_token("abc123")
            .login()
            .await
            .unwrap();

        client.add_message_create_listener(|event| {
            if event.message_content() == "!ping" {
                event.channel().send_message("pong").unwrap();
            }
        });

        assert_eq!(gateway.token().as_deref(), Some("abc123"));
        assert!(gateway.is_connected());

        gateway.inject("general", "hello there").unwrap();
        gateway.inject("general", "!ping").unwrap();

        let reply = gateway.next_reply().await.unwrap();
        assert_eq!(reply.channel_id, "general");
        assert_eq!(reply.content, "pong");
        assert!(gateway.try_next_reply().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_closes_client() {
        let gateway = LoopbackGateway::new();
        let client = ClientBuilder::new()
            .with_gateway(gateway.clone())
            .set_token("abc123")
            .login()
            .await
            .unwrap();

        gateway.disconnect();
        client.closed().await;

        assert!(client.is_closed());
        assert!(!gateway.is_connected());
    }
}
