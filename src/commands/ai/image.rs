//! Defines the `/image` command for text-to-image generation.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::*;
use crate::delivery::interaction::InteractionReplies;
use crate::delivery::{Addressing, ChatPlatform, IMAGE_MARKER, notify_failure};
use crate::error::{GenerationError, InvocationError};
use crate::runtime::{ImageRuntime, bounded};

/// Name of the attachment carrying the generated picture.
pub const IMAGE_FILENAME: &str = "generated_image.png";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSettings {
    pub timeout: Option<Duration>,
}

/// Generate an image with Stable Diffusion
#[poise::command(slash_command, category = "AI")]
pub async fn image(
    ctx: Context<'_>,
    #[description = "The description of the image you want to generate"] prompt: String,
) -> CommandResult {
    let author = ctx.author();
    debug!("Image request received from user {}", author.name);

    let data = ctx.data();
    let replies = InteractionReplies::new(ctx);
    let addressing = replies.addressing(IMAGE_MARKER);

    let images = match require_images(data.images.as_deref()) {
        Ok(images) => images,
        Err(disabled) => {
            warn!("Image request from {} rejected: {}", author.name, disabled);
            notify_failure(&replies, &addressing, disabled.diagnostic()).await;
            return Ok(());
        }
    };

    let settings = ImageSettings {
        timeout: data.config.generation_timeout,
    };

    match handle_image(&replies, images, &settings, &addressing, &prompt).await {
        Ok(()) => info!("Sent generated image to {}", author.name),
        Err(e) => warn!("Image request from {} failed: {}", author.name, e),
    }

    Ok(())
}

/// Returns the image runtime, or [`GenerationError::Disabled`] when the bot was started
/// without one.
///
/// Only a chat-only bot lacks a runtime and it never registers `/image`, so this guards
/// against a registration mistake rather than a user-reachable state.
fn require_images(
    images: Option<&dyn ImageRuntime>,
) -> Result<&dyn ImageRuntime, GenerationError> {
    images.ok_or_else(|| GenerationError::Disabled {
        diagnostic: "image generation is not enabled on this bot".to_string(),
    })
}

/// Runs one image invocation end to end.
///
/// Clearing the runtime's memory cache is best effort; a failure there is logged and the
/// generation still runs.
pub async fn handle_image<P, I>(
    platform: &P,
    runtime: &I,
    settings: &ImageSettings,
    addressing: &Addressing,
    prompt: &str,
) -> Result<(), InvocationError>
where
    P: ChatPlatform + ?Sized,
    I: ImageRuntime + ?Sized,
{
    if let Err(e) = platform.defer_response().await {
        notify_failure(platform, addressing, &e.diagnostic()).await;
        return Err(e.into());
    }

    if let Err(e) = runtime.clear_memory_cache().await {
        warn!("Could not clear image runtime memory: {}", e);
    }

    let image = match bounded(settings.timeout, runtime.generate(prompt)).await {
        Ok(image) => image,
        Err(e) => {
            notify_failure(platform, addressing, e.diagnostic()).await;
            return Err(e.into());
        }
    };

    let caption = format!(
        "{} {} Here is your generated image!",
        addressing.marker, addressing.actor_mention
    );

    if let Err(e) = platform
        .send_file_followup(&caption, image, IMAGE_FILENAME)
        .await
    {
        notify_failure(platform, addressing, &e.diagnostic()).await;
        return Err(e.into());
    }

    Ok(())
}
