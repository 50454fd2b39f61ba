use poise::serenity_prelude::{ChannelId, GuildId};
use tracing::info;

use crate::{
    models::{ChannelSummary, WatchedChannel},
    platform::Platform,
    store::{ConfigStore, UnwatchOutcome, WatchOutcome},
    utils::messages::{build_watch_list, channel_mention, format_info, format_success},
    utils::validation::{
        CommandError, parse_channel_reference, require_channel_name, resolve_voice_channel,
    },
};

/// Send this guild's notifications to the channel the command came from
pub async fn set_channel(store: &ConfigStore, guild_id: GuildId, channel_id: ChannelId) -> String {
    store.set_notification_channel(guild_id, channel_id).await;
    format_success("Using this channel for voice chat notifications!")
}

/// Add a voice channel to the guild's watch list
pub async fn watch_channel<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    guild_id: GuildId,
    argument: &str,
) -> Result<String, CommandError> {
    let channel = fetch_voice_channel(platform, guild_id, argument).await?;
    let mention = channel_mention(channel.id);

    let reply = match store
        .watch_channel(guild_id, WatchedChannel::new(channel.name, channel.id))
        .await
    {
        WatchOutcome::Added => {
            format_success(&format!("Now watching {} for voice chat notifications", mention))
        }
        WatchOutcome::AlreadyWatched => format_info(&format!("{} is already being watched", mention)),
    };
    Ok(reply)
}

/// Remove a voice channel from the guild's watch list
pub async fn unwatch_channel<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    guild_id: GuildId,
    argument: &str,
) -> Result<String, CommandError> {
    // A watched id can be removed even after its channel was deleted
    let stored = parse_channel_reference(require_channel_name(argument)?).filter(|id| {
        store
            .guild_config(guild_id)
            .is_some_and(|config| config.watched(*id).is_some())
    });
    let channel_id = match stored {
        Some(id) => id,
        None => fetch_voice_channel(platform, guild_id, argument).await?.id,
    };
    let mention = channel_mention(channel_id);

    let reply = match store.unwatch_channel(guild_id, channel_id).await {
        UnwatchOutcome::Removed(_) => format_success(&format!("Stopped watching {}", mention)),
        UnwatchOutcome::NotWatched => format_info(&format!("{} was not being watched", mention)),
    };
    Ok(reply)
}

/// Show the guild's notification channel and watch list
pub fn watch_list(store: &ConfigStore, guild_id: GuildId) -> String {
    build_watch_list(store.guild_config(guild_id).as_ref())
}

async fn fetch_voice_channel<P: Platform>(
    platform: &P,
    guild_id: GuildId,
    argument: &str,
) -> Result<ChannelSummary, CommandError> {
    // Don't bother the API for an empty argument
    let name = require_channel_name(argument)?;

    let channels = platform
        .guild_channels(guild_id)
        .await
        .map_err(CommandError::Upstream)?;

    let channel = resolve_voice_channel(&channels, name)?;
    info!(
        "Resolved '{}' to voice channel {} in guild {}",
        name, channel.id, guild_id
    );
    Ok(channel.clone())
}
