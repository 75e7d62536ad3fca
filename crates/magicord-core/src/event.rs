//! Inbound message events and the channels replies are sent on.

use std::fmt;

use tokio::sync::mpsc;

use crate::error::{ClientError, ClientResult};

/// A reply queued for delivery by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Identifier of the channel the reply targets.
    pub channel_id: String,
    /// Reply text.
    pub content: String,
}

/// The channel an inbound message arrived on.
///
/// Cloning is cheap; every clone feeds the same outbound queue.
#[derive(Clone)]
pub struct Channel {
    id: String,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl Channel {
    /// Creates a channel handle that pushes replies into `outbound`.
    pub fn new(id: impl Into<String>, outbound: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            id: id.into(),
            outbound,
        }
    }

    /// Returns the channel identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queues `content` as a reply on this channel.
    ///
    /// Delivery is asynchronous; an error means the gateway has gone away.
    pub fn send_message(&self, content: impl Into<String>) -> ClientResult<()> {
        let message = OutboundMessage {
            channel_id: self.id.clone(),
            content: content.into(),
        };
        self.outbound
            .send(message)
            .map_err(|_| ClientError::SendFailed {
                channel: self.id.clone(),
                reason: "gateway outbound queue closed".to_string(),
            })
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("id", &self.id).finish()
    }
}

/// A message-created event delivered to listeners.
#[derive(Debug, Clone)]
pub struct MessageCreateEvent {
    content: String,
    author: Option<String>,
    channel: Channel,
}

impl MessageCreateEvent {
    /// Creates an event carrying `content` received on `channel`.
    pub fn new(content: impl Into<String>, channel: Channel) -> Self {
        Self {
            content: content.into(),
            author: None,
            channel,
        }
    }

    /// Sets the author name.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// The raw message text.
    pub fn message_content(&self) -> &str {
        &self.content
    }

    /// The author name, when the gateway reports one.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// The channel the message was posted in.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}
