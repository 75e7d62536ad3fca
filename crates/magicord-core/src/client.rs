//! Client construction, login and listener registration.
//!
//! ```rust,ignore
//! let client = ClientBuilder::new()
//!     .set_token("abc123")
//!     .add_message_create_listener(|event| {
//!         if event.message_content() == "!ping" {
//!             let _ = event.channel().send_message("pong");
//!         }
//!     })
//!     .login()
//!     .await?;
//! ```
//!
//! Listeners added to the builder see every event of the session. Listeners
//! added to the [`Client`] later only see events that arrive after them.
//!
//! A panicking listener is logged and skipped; the session keeps running.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, error, info, span, trace};

use crate::error::{ClientError, ClientResult};
use crate::event::MessageCreateEvent;
use crate::gateway::{BoxedGateway, GatewaySession, default_gateway};

/// Callback invoked for every inbound message.
pub type MessageCreateListener = Arc<dyn Fn(&MessageCreateEvent) + Send + Sync>;

/// Builder for a [`Client`].
pub struct ClientBuilder {
    token: Option<String>,
    gateway: Option<BoxedGateway>,
    listeners: Vec<MessageCreateListener>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a builder bound to the installed default gateway.
    pub fn new() -> Self {
        Self {
            token: None,
            gateway: default_gateway(),
            listeners: Vec::new(),
        }
    }

    /// Uses `gateway` instead of the installed default.
    pub fn with_gateway(mut self, gateway: BoxedGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Sets the authentication token.
    pub fn set_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Registers `listener` before the session starts, so it sees the first
    /// inbound message.
    pub fn add_message_create_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&MessageCreateEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Connects through the gateway and resolves once the session is ready.
    ///
    /// Listeners registered on the builder are in place before the first
    /// inbound event is delivered.
    pub async fn login(self) -> ClientResult<Client> {
        let token = self.token.ok_or(ClientError::MissingToken)?;
        let gateway = self.gateway.ok_or(ClientError::NoGateway)?;

        debug!(gateway = gateway.name(), "Logging in");
        let session = gateway.connect(&token).await?;
        info!(gateway = gateway.name(), "Logged in");

        let client = Client {
            inner: Arc::new(ClientInner {
                gateway_name: gateway.name(),
                listeners: RwLock::new(self.listeners),
                shutdown: CancellationToken::new(),
            }),
        };
        let session_span = span!(Level::DEBUG, "session", gateway = gateway.name());
        tokio::spawn(pump(Arc::clone(&client.inner), session).instrument(session_span));

        Ok(client)
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("gateway", &self.gateway.as_ref().map(|g| g.name()))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

struct ClientInner {
    gateway_name: &'static str,
    listeners: RwLock<Vec<MessageCreateListener>>,
    shutdown: CancellationToken,
}

/// A logged-in client.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Registers `listener` for every subsequent inbound message.
    ///
    /// Listeners run in registration order on the session task.
    pub fn add_message_create_listener<F>(&self, listener: F)
    where
        F: Fn(&MessageCreateEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.write().push(Arc::new(listener));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Stops delivering events.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Resolves once the session has ended, either by [`shutdown`](Self::shutdown)
    /// or by the gateway closing its inbound stream.
    pub async fn closed(&self) {
        self.inner.shutdown.cancelled().await;
    }

    /// Whether the session has ended.
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("gateway", &self.inner.gateway_name)
            .field("listeners", &self.listener_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Delivers inbound events to listeners until shutdown or end of stream.
///
/// The session counts as closed whenever this returns or is torn down.
async fn pump(inner: Arc<ClientInner>, mut session: GatewaySession) {
    let _closed = inner.shutdown.clone().drop_guard();
    loop {
        tokio::select! {
            _ = inner.shutdown.cancelled() => {
                debug!("Session shut down");
                break;
            }
            event = session.inbound.recv() => {
                let Some(event) = event else {
                    debug!("Gateway closed the inbound stream");
                    inner.shutdown.cancel();
                    break;
                };
                trace!(channel = event.channel().id(), "Inbound message");
                let listeners = inner.listeners.read().clone();
                for listener in &listeners {
                    if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                        error!(channel = event.channel().id(), "Message listener panicked");
                    }
                }
            }
        }
    }
}
