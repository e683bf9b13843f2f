//! Clients for the generation backends the bot talks to.

/// HTTP client for a local Stable Diffusion server (requires the `image` feature).
#[cfg(feature = "image")]
pub mod diffusion_client;
/// Client for a local Ollama server.
pub mod ollama_client;
