use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use tracing::{debug, error, info};
use url::Url;

use crate::error::GenerationError;
use crate::runtime::{ChatTurn, ModelRuntime};

/// Port Ollama listens on when the host URL does not name one.
const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// [`ModelRuntime`] backed by a local Ollama server.
///
/// Requests are single-turn: no conversation history is kept between calls.
pub struct OllamaClient {
    client: Ollama,
}

impl OllamaClient {
    pub fn new(host: &Url) -> Self {
        let scheme = host.scheme();
        let hostname = host.host_str().unwrap_or("localhost");
        let port = host.port().unwrap_or(DEFAULT_OLLAMA_PORT);
        debug!("Creating OllamaClient for {}://{}:{}", scheme, hostname, port);

        Self {
            client: Ollama::new(format!("{scheme}://{hostname}"), port),
        }
    }
}

fn to_ollama_message(turn: ChatTurn) -> ChatMessage {
    ChatMessage::user(turn.content)
}

fn model_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::Model {
        diagnostic: e.to_string(),
    }
}

#[async_trait]
impl ModelRuntime for OllamaClient {
    async fn prepare(&self, model: &str) -> Result<(), GenerationError> {
        info!("Pulling model '{}' from Ollama", model);
        match self.client.pull_model(model.to_string(), false).await {
            Ok(_) => {
                info!("Model '{}' loaded successfully", model);
                Ok(())
            }
            Err(e) => {
                error!("Failed to pull model '{}': {}", model, e);
                Err(model_error(e))
            }
        }
    }

    async fn chat_complete(
        &self,
        model: &str,
        messages: Vec<ChatTurn>,
    ) -> Result<String, GenerationError> {
        debug!(
            "Sending {} message(s) to Ollama model '{}'",
            messages.len(),
            model
        );
        let request = ChatMessageRequest::new(
            model.to_string(),
            messages.into_iter().map(to_ollama_message).collect(),
        );

        match self.client.send_chat_messages(request).await {
            Ok(response) => {
                debug!(
                    "Received {} characters from Ollama",
                    response.message.content.chars().count()
                );
                Ok(response.message.content)
            }
            Err(e) => {
                error!("Failed to get response from Ollama: {}", e);
                Err(model_error(e))
            }
        }
    }
}
