//! Defines the `/chat` command: one prompt in, the model's answer out as one or more
//! messages.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::*;
use crate::config::Config;
use crate::delivery::interaction::InteractionReplies;
use crate::delivery::{
    Addressing, CHAT_MARKER, ChatPlatform, deliver, notify_failure, render_empty_notice,
};
use crate::error::InvocationError;
use crate::runtime::{ChatTurn, ModelRuntime, bounded};
use crate::segment::segment;

/// Per-invocation knobs for [`handle_chat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub model: String,
    pub max_segment_length: usize,
    pub timeout: Option<Duration>,
}

impl From<&Config> for ChatSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.chat_model.clone(),
            max_segment_length: config.max_segment_length,
            timeout: config.generation_timeout,
        }
    }
}

/// Chat with the local AI model
#[poise::command(slash_command, category = "AI")]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Your message to the AI"] prompt: String,
) -> CommandResult {
    let author = ctx.author();
    debug!("Chat request received from user {}", author.name);

    let data = ctx.data();
    let replies = InteractionReplies::new(ctx);
    let addressing = replies.addressing(CHAT_MARKER);
    let settings = ChatSettings::from(&data.config);

    match handle_chat(&replies, data.model.as_ref(), &settings, &addressing, &prompt).await {
        Ok(sent) => info!("Answered {} in {} message(s)", author.name, sent),
        Err(e) => warn!("Chat request from {} failed: {}", author.name, e),
    }

    Ok(())
}

/// Runs one chat invocation end to end and returns how many messages were sent.
///
/// The interaction is deferred first, then the model is asked for a single-turn completion.
/// The answer is segmented and delivered in order. Every failure, including a rejected
/// deferral, is reported to the user before it is returned.
pub async fn handle_chat<P, M>(
    platform: &P,
    runtime: &M,
    settings: &ChatSettings,
    addressing: &Addressing,
    prompt: &str,
) -> Result<usize, InvocationError>
where
    P: ChatPlatform + ?Sized,
    M: ModelRuntime + ?Sized,
{
    if let Err(e) = platform.defer_response().await {
        notify_failure(platform, addressing, &e.diagnostic()).await;
        return Err(e.into());
    }

    let completion = bounded(
        settings.timeout,
        runtime.chat_complete(&settings.model, vec![ChatTurn::user(prompt)]),
    )
    .await;

    let text = match completion {
        Ok(text) => text,
        Err(e) => {
            notify_failure(platform, addressing, e.diagnostic()).await;
            return Err(e.into());
        }
    };

    let segments = segment(&text, settings.max_segment_length);
    debug!(
        "Split {} character response into {} segment(s)",
        text.chars().count(),
        segments.len()
    );

    let sent = match segments.is_empty() {
        true => platform
            .send_followup(&render_empty_notice(addressing))
            .await
            .map(|_| 1),
        false => deliver(platform, &segments, addressing).await,
    };

    match sent {
        Ok(sent) => Ok(sent),
        Err(e) => {
            notify_failure(platform, addressing, &e.diagnostic()).await;
            Err(e.into())
        }
    }
}
