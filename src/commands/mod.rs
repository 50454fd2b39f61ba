// Command modules
mod channel;
mod help;
mod parser;

pub use parser::{Command, parse_command};

use poise::serenity_prelude::{ChannelId, GuildId};
use tracing::{error, info};

use crate::{
    platform::Platform,
    store::ConfigStore,
    utils::{messages::format_error, validation::CommandError},
};

/// Run a command issued in `channel_id` of `guild_id` and build the reply
pub async fn execute<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    command: Command<'_>,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> String {
    let result = match command {
        Command::Help => Ok(help::help_text().to_string()),
        Command::SetChannel => Ok(channel::set_channel(store, guild_id, channel_id).await),
        Command::WatchList => Ok(channel::watch_list(store, guild_id)),
        Command::WatchChannel(argument) => {
            channel::watch_channel(platform, store, guild_id, argument).await
        }
        Command::UnwatchChannel(argument) => {
            channel::unwatch_channel(platform, store, guild_id, argument).await
        }
    };

    result.unwrap_or_else(|e| {
        match &e {
            CommandError::Upstream(source) => {
                error!("{:?} failed in guild {}: {}", command, guild_id, source)
            }
            _ => info!("{:?} rejected in guild {}: {}", command, guild_id, e),
        }
        format_error(&e.to_string())
    })
}
