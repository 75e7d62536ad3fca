//! Error types for the Magicord client interface.

use thiserror::Error;

/// Errors that can occur while logging in or talking to a channel.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// No gateway was supplied to the builder and none is installed.
    #[error("no gateway installed; call `magicord::install_gateway` or `ClientBuilder::with_gateway`")]
    NoGateway,

    /// `login` was called before a token was set.
    #[error("no token set on the client builder")]
    MissingToken,

    /// The environment variable holding the token is absent or not unicode.
    #[error("token environment variable `{var}` is not set")]
    TokenEnv {
        /// Name of the variable that was read.
        var: String,
    },

    /// The gateway refused the connection.
    #[error("login failed: {reason}")]
    LoginFailed {
        /// Reason reported by the gateway.
        reason: String,
    },

    /// A reply could not be delivered.
    #[error("failed to send message to channel '{channel}': {reason}")]
    SendFailed {
        /// Target channel identifier.
        channel: String,
        /// Reason for failure.
        reason: String,
    },

    /// The session has been shut down.
    #[error("client session is closed")]
    Closed,
}

impl ClientError {
    /// Creates a login failure with the given reason.
    pub fn login_failed(reason: impl Into<String>) -> Self {
        Self::LoginFailed {
            reason: reason.into(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
