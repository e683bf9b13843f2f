//! Capabilities the command handlers need from the generation backends.
//!
//! The concrete clients live in [`crate::utils`]; handlers only see these traits so they can
//! run against stubs in tests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GenerationError;

/// One user message of a chat completion request. Chat is single-turn, so no other roles
/// are ever sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A locally hosted language model.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Makes `model` available locally (e.g. pulls its weights). Called once at startup.
    async fn prepare(&self, model: &str) -> Result<(), GenerationError>;

    /// Runs one completion and returns the assistant's text.
    async fn chat_complete(
        &self,
        model: &str,
        messages: Vec<ChatTurn>,
    ) -> Result<String, GenerationError>;
}

/// A locally hosted text-to-image pipeline.
#[async_trait]
pub trait ImageRuntime: Send + Sync {
    /// Releases cached accelerator memory ahead of a generation.
    async fn clear_memory_cache(&self) -> Result<(), GenerationError>;

    /// Generates one image and returns it PNG-encoded.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

/// Awaits `generation`, giving up after `limit` when one is set.
pub async fn bounded<T, F>(limit: Option<Duration>, generation: F) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, GenerationError>>,
{
    let Some(limit) = limit else {
        return generation.await;
    };

    match tokio::time::timeout(limit, generation).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Generation exceeded the {:?} limit", limit);
            Err(GenerationError::timed_out(limit))
        }
    }
}
