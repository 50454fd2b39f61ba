use std::future::Future;

use poise::serenity_prelude::{self as serenity, ChannelId, ChannelType, GuildId};
use tracing::warn;

use crate::models::{ChannelSummary, Error, VoiceOccupant};

/// Outbound operations the handlers need from the chat platform
pub trait Platform: Sync {
    /// Post a plain text message to a channel
    fn send_message(
        &self,
        channel_id: ChannelId,
        content: String,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// List the channels of a guild, in display order
    fn guild_channels(
        &self,
        guild_id: GuildId,
    ) -> impl Future<Output = Result<Vec<ChannelSummary>, Error>> + Send;

    /// Live voice-state list of a guild
    fn voice_occupancy(&self, guild_id: GuildId) -> Vec<VoiceOccupant>;

    /// Guild a channel belongs to, `None` for channels outside a guild
    fn channel_guild(
        &self,
        channel_id: ChannelId,
    ) -> impl Future<Output = Result<Option<GuildId>, Error>> + Send;
}

/// `Platform` backed by a serenity context
pub struct SerenityPlatform<'a> {
    ctx: &'a serenity::Context,
}

impl<'a> SerenityPlatform<'a> {
    pub fn new(ctx: &'a serenity::Context) -> Self {
        Self { ctx }
    }
}

impl Platform for SerenityPlatform<'_> {
    async fn send_message(&self, channel_id: ChannelId, content: String) -> Result<(), Error> {
        channel_id.say(self.ctx, content).await?;
        Ok(())
    }

    async fn guild_channels(&self, guild_id: GuildId) -> Result<Vec<ChannelSummary>, Error> {
        let mut channels: Vec<_> = guild_id
            .channels(self.ctx)
            .await?
            .into_values()
            .collect();
        channels.sort_by_key(|channel| (channel.position, channel.id));

        Ok(channels
            .into_iter()
            .map(|channel| ChannelSummary {
                id: channel.id,
                is_voice: matches!(channel.kind, ChannelType::Voice | ChannelType::Stage),
                name: channel.name,
            })
            .collect())
    }

    fn voice_occupancy(&self, guild_id: GuildId) -> Vec<VoiceOccupant> {
        // Discord does not push reliable member counts, so read the cached voice states
        let Some(guild) = self.ctx.cache.guild(guild_id) else {
            warn!("Guild {} is not cached, voice occupancy unknown", guild_id);
            return Vec::new();
        };

        guild
            .voice_states
            .values()
            .filter_map(|state| {
                state.channel_id.map(|channel_id| VoiceOccupant {
                    user_id: state.user_id,
                    channel_id,
                })
            })
            .collect()
    }

    async fn channel_guild(&self, channel_id: ChannelId) -> Result<Option<GuildId>, Error> {
        let channel = channel_id.to_channel(self.ctx).await?;
        Ok(channel.guild().map(|channel| channel.guild_id))
    }
}
