//! Turns segments into Discord messages and sends them in order.
//!
//! The first message answers the deferred interaction; every later one is posted straight
//! into the channel the command came from. Nothing here talks to Discord directly: sends go
//! through [`ChatPlatform`], which [`interaction::InteractionReplies`] implements for a live
//! poise context.

pub mod interaction;

use async_trait::async_trait;
use poise::serenity_prelude::ChannelId;
use tracing::{debug, error, warn};

use crate::error::DeliveryError;

/// Discord's hard per-message character limit.
pub const MESSAGE_CHARACTER_CEILING: usize = 2000;

pub const CHAT_MARKER: &str = "💬";
pub const IMAGE_MARKER: &str = "🎨";
pub const ERROR_MARKER: &str = "❌";

/// A channel that has been fetched and can be posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: ChannelId,
}

/// Outbound capabilities of the chat platform, bound to one interaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Acknowledges the interaction so the platform does not time it out.
    async fn defer_response(&self) -> Result<(), DeliveryError>;

    /// Sends a follow-up on the acknowledged interaction.
    async fn send_followup(&self, text: &str) -> Result<(), DeliveryError>;

    async fn resolve_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<ResolvedChannel, DeliveryError>;

    async fn send_to_channel(
        &self,
        channel: &ResolvedChannel,
        text: &str,
    ) -> Result<(), DeliveryError>;

    /// Sends a follow-up carrying one file attachment.
    async fn send_file_followup(
        &self,
        text: &str,
        file: Vec<u8>,
        filename: &str,
    ) -> Result<(), DeliveryError>;
}

/// Who and where a reply is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    pub origin_channel: ChannelId,
    /// Rendered mention of the invoking user, e.g. `<@1234>`.
    pub actor_mention: String,
    /// Emoji prepended to the first message only.
    pub marker: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Follow-up on the originating interaction.
    Followup,
    /// Plain post into the resolved origin channel.
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub body: String,
    pub route: Route,
}

/// Renders one message per segment, in segment order.
pub fn render(segments: &[String], addressing: &Addressing) -> Vec<OutboundMessage> {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| match index {
            0 => OutboundMessage {
                body: format!(
                    "{} {}\n{}",
                    addressing.marker, addressing.actor_mention, segment
                ),
                route: Route::Followup,
            },
            _ => OutboundMessage {
                body: format!("{}\n{}", addressing.actor_mention, segment),
                route: Route::Channel,
            },
        })
        .collect()
}

/// Reply used when the model produced no text at all.
pub fn render_empty_notice(addressing: &Addressing) -> String {
    format!(
        "{} {}\n*The model returned an empty response.*",
        addressing.marker, addressing.actor_mention
    )
}

pub fn render_failure(diagnostic: &str) -> String {
    format!("{ERROR_MARKER} An error occurred: {diagnostic}")
}

fn check_ceiling(messages: &[OutboundMessage]) -> Result<(), DeliveryError> {
    for (index, message) in messages.iter().enumerate() {
        let length = message.body.chars().count();
        if length > MESSAGE_CHARACTER_CEILING {
            return Err(DeliveryError::Oversized {
                index,
                length,
                ceiling: MESSAGE_CHARACTER_CEILING,
            });
        }
    }
    Ok(())
}

/// Sends `segments` in order and returns how many messages went out.
///
/// Every message is rendered and checked against [`MESSAGE_CHARACTER_CEILING`] before the
/// first send. The origin channel is resolved once, up front, when more than one segment
/// exists. Sends are awaited one at a time and the first failure stops the rest.
pub async fn deliver<P>(
    platform: &P,
    segments: &[String],
    addressing: &Addressing,
) -> Result<usize, DeliveryError>
where
    P: ChatPlatform + ?Sized,
{
    let messages = render(segments, addressing);
    check_ceiling(&messages)?;

    let mut messages = messages.into_iter();
    let Some(first) = messages.next() else {
        return Ok(0);
    };
    let rest: Vec<OutboundMessage> = messages.collect();

    let channel = match rest.is_empty() {
        true => None,
        false => Some(platform.resolve_channel(addressing.origin_channel).await?),
    };

    platform.send_followup(&first.body).await?;
    debug!("Sent message 1/{} as interaction follow-up", rest.len() + 1);

    if let Some(channel) = channel {
        for (index, message) in rest.iter().enumerate() {
            platform.send_to_channel(&channel, &message.body).await?;
            debug!(
                "Sent message {}/{} to channel {}",
                index + 2,
                rest.len() + 1,
                channel.id
            );
        }
    }

    Ok(rest.len() + 1)
}

/// Tells the user an invocation failed.
///
/// Tries the interaction follow-up first and falls back to a channel post when the
/// interaction can no longer be answered. Failures here are only logged.
pub async fn notify_failure<P>(platform: &P, addressing: &Addressing, diagnostic: &str)
where
    P: ChatPlatform + ?Sized,
{
    let notice = render_failure(diagnostic);

    let Err(followup_error) = platform.send_followup(&notice).await else {
        return;
    };
    warn!(
        "Could not report failure on the interaction ({}); posting to channel instead",
        followup_error
    );

    let posted = async {
        let channel = platform.resolve_channel(addressing.origin_channel).await?;
        platform.send_to_channel(&channel, &notice).await
    }
    .await;

    if let Err(e) = posted {
        error!("Unable to report failure to the user: {}", e);
    }
}
