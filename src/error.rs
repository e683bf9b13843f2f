//! Error taxonomy for a single command invocation and for process startup.
//!
//! Every user-facing error kind carries a plain `diagnostic` string so the text shown in
//! Discord (`"❌ An error occurred: {diagnostic}"`) is a fixed contract rather than whatever
//! the underlying library happens to print.

use std::time::Duration;

use thiserror::Error;

/// Raised while building [`crate::config::Config`]. Fatal: the bot does not start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required variable is absent from the environment.
    #[error("{name} not found in environment variables")]
    Missing { name: &'static str },

    /// A variable is present but cannot be used.
    #[error("{name} is invalid: {diagnostic}")]
    Invalid {
        name: &'static str,
        diagnostic: String,
    },
}

/// Raised by a model or image runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The language-model runtime failed or is unreachable.
    #[error("model runtime failure: {diagnostic}")]
    Model { diagnostic: String },

    /// The image runtime failed or is unreachable.
    #[error("image runtime failure: {diagnostic}")]
    Image { diagnostic: String },

    /// The runtime did not answer within the configured limit.
    #[error("generation timed out: {diagnostic}")]
    TimedOut { diagnostic: String },

    /// The requested capability is not available in this bot variant.
    #[error("generation disabled: {diagnostic}")]
    Disabled { diagnostic: String },
}

impl GenerationError {
    pub fn timed_out(after: Duration) -> Self {
        Self::TimedOut {
            diagnostic: format!(
                "no response after {}",
                humantime_serde::re::humantime::format_duration(after)
            ),
        }
    }

    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Model { diagnostic }
            | Self::Image { diagnostic }
            | Self::TimedOut { diagnostic }
            | Self::Disabled { diagnostic } => diagnostic,
        }
    }
}

/// Raised while sending to the chat platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The interaction could not be acknowledged in time.
    #[error("failed to acknowledge interaction: {diagnostic}")]
    Acknowledge { diagnostic: String },

    /// The interaction's follow-up handle rejected the message (e.g. the token expired).
    #[error("follow-up send failed: {diagnostic}")]
    Followup { diagnostic: String },

    /// The origin channel could not be fetched.
    #[error("channel {channel_id} could not be resolved: {diagnostic}")]
    ChannelUnresolved { channel_id: u64, diagnostic: String },

    /// A post into the resolved channel failed.
    #[error("channel send failed: {diagnostic}")]
    ChannelSend { diagnostic: String },

    /// A rendered message would exceed the platform's hard ceiling.
    #[error("message {index} is {length} characters, above the {ceiling} character limit")]
    Oversized {
        index: usize,
        length: usize,
        ceiling: usize,
    },
}

impl DeliveryError {
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Acknowledge { diagnostic }
            | Self::Followup { diagnostic }
            | Self::ChannelSend { diagnostic } => diagnostic.clone(),
            Self::ChannelUnresolved { .. } | Self::Oversized { .. } => self.to_string(),
        }
    }
}

/// Terminal outcome of one failed invocation. The user has already been told by the time a
/// handler returns this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl InvocationError {
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Generation(e) => e.diagnostic().to_string(),
            Self::Delivery(e) => e.diagnostic(),
        }
    }
}
