use async_trait::async_trait;
use poise::CreateReply;
use poise::serenity_prelude::{ChannelId, CreateAttachment, Mentionable};

use super::{Addressing, ChatPlatform, ResolvedChannel};
use crate::Context;
use crate::error::DeliveryError;

/// [`ChatPlatform`] backed by the poise context of a running slash command.
pub struct InteractionReplies<'a> {
    ctx: Context<'a>,
}

impl<'a> InteractionReplies<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx }
    }

    /// Addresses replies to the invoking user in the channel the command came from.
    pub fn addressing(&self, marker: &'static str) -> Addressing {
        Addressing {
            origin_channel: self.ctx.channel_id(),
            actor_mention: self.ctx.author().mention().to_string(),
            marker,
        }
    }
}

#[async_trait]
impl ChatPlatform for InteractionReplies<'_> {
    async fn defer_response(&self) -> Result<(), DeliveryError> {
        self.ctx
            .defer()
            .await
            .map_err(|e| DeliveryError::Acknowledge {
                diagnostic: e.to_string(),
            })
    }

    async fn send_followup(&self, text: &str) -> Result<(), DeliveryError> {
        self.ctx
            .send(CreateReply::default().content(text))
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Followup {
                diagnostic: e.to_string(),
            })
    }

    async fn resolve_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<ResolvedChannel, DeliveryError> {
        let channel = channel_id
            .to_channel(self.ctx.serenity_context())
            .await
            .map_err(|e| DeliveryError::ChannelUnresolved {
                channel_id: channel_id.get(),
                diagnostic: e.to_string(),
            })?;

        Ok(ResolvedChannel { id: channel.id() })
    }

    async fn send_to_channel(
        &self,
        channel: &ResolvedChannel,
        text: &str,
    ) -> Result<(), DeliveryError> {
        channel
            .id
            .say(self.ctx.serenity_context(), text)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::ChannelSend {
                diagnostic: e.to_string(),
            })
    }

    async fn send_file_followup(
        &self,
        text: &str,
        file: Vec<u8>,
        filename: &str,
    ) -> Result<(), DeliveryError> {
        let reply = CreateReply::default()
            .content(text)
            .attachment(CreateAttachment::bytes(file, filename));

        self.ctx
            .send(reply)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Followup {
                diagnostic: e.to_string(),
            })
    }
}
