//! Client for a locally hosted Stable Diffusion server speaking the Hugging Face
//! inference API shape: `POST /models/{model}` with `{"inputs": prompt}` answers with the
//! encoded image bytes, or a JSON `{"error": ...}` body on failure.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, trace};
use url::Url;

use crate::error::GenerationError;
use crate::runtime::ImageRuntime;

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
    inputs: &'a str,
}

/// [`ImageRuntime`] backed by an HTTP diffusion server.
pub struct DiffusionClient {
    http: Client,
    generate_url: Url,
    clear_cache_url: Option<Url>,
    token: Option<String>,
}

fn image_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::Image {
        diagnostic: e.to_string(),
    }
}

/// Appends `path` below `base`, keeping any path prefix `base` already has.
fn endpoint(base: &Url, path: &str) -> Result<Url, GenerationError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| image_error(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

impl DiffusionClient {
    /// # Arguments
    ///
    /// * `base_url` - Root of the diffusion server.
    /// * `model` - Model identifier, e.g. `runwayml/stable-diffusion-v1-5`.
    /// * `clear_cache_path` - Optional endpoint on the same server that frees GPU memory.
    /// * `token` - Model-hub credential sent as a bearer token.
    pub fn new(
        base_url: &Url,
        model: &str,
        clear_cache_path: Option<&str>,
        token: Option<String>,
    ) -> Result<Self, GenerationError> {
        let generate_url = endpoint(base_url, &format!("models/{model}"))?;
        let clear_cache_url = clear_cache_path
            .map(|path| endpoint(base_url, path))
            .transpose()?;

        info!("Using Stable Diffusion model '{}' at {}", model, generate_url);

        Ok(Self {
            http: Client::new(),
            generate_url,
            clear_cache_url,
            token,
        })
    }

    fn post(&self, url: &Url) -> reqwest::RequestBuilder {
        let builder = self.http.post(url.clone());
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Extracts the most useful message from a failed response.
async fn failure_diagnostic(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<Value>(&body) {
        Ok(json) => match &json["error"] {
            Value::String(message) => message.to_owned(),
            _ => body,
        },
        Err(_) => body,
    };

    match message.trim() {
        "" => status.to_string(),
        message => format!("{status}: {message}"),
    }
}

#[async_trait]
impl ImageRuntime for DiffusionClient {
    async fn clear_memory_cache(&self) -> Result<(), GenerationError> {
        let Some(url) = &self.clear_cache_url else {
            trace!("No cache-clearing endpoint configured");
            return Ok(());
        };

        debug!("Clearing diffusion memory cache via {}", url);
        let response = self.post(url).send().await.map_err(image_error)?;
        if !response.status().is_success() {
            return Err(image_error(failure_diagnostic(response).await));
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        info!(
            "Generating image for prompt of {} characters",
            prompt.chars().count()
        );

        let response = self
            .post(&self.generate_url)
            .header(header::ACCEPT, "image/png")
            .json(&TextToImageRequest { inputs: prompt })
            .send()
            .await
            .map_err(image_error)?;

        if !response.status().is_success() {
            let diagnostic = failure_diagnostic(response).await;
            error!("Image generation failed: {}", diagnostic);
            return Err(GenerationError::Image { diagnostic });
        }

        let image = response.bytes().await.map_err(image_error)?;
        if image.is_empty() {
            return Err(image_error("diffusion server returned an empty image"));
        }

        debug!("Received {} byte image", image.len());
        Ok(image.to_vec())
    }
}
