use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use tracing::{error, info};

use crate::{
    commands::{execute, parse_command},
    platform::Platform,
    store::ConfigStore,
};

/// The parts of an incoming chat message the command handler looks at
#[derive(Debug, Clone)]
pub struct IncomingMessage<'a> {
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub content: &'a str,
}

/// Handle a chat message that may carry a `snoopy` command
pub async fn handle_message<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    bot_user_id: UserId,
    message: IncomingMessage<'_>,
) {
    // Never answer ourselves or other bots
    if message.author_id == bot_user_id || message.author_is_bot {
        return;
    }

    // Config is per guild, so direct messages are ignored
    let Some(guild_id) = message.guild_id else {
        return;
    };

    let Some(command) = parse_command(message.content) else {
        return;
    };

    info!(
        "{:?} from user {} in guild {} channel {}",
        command, message.author_id, guild_id, message.channel_id
    );

    let reply = execute(platform, store, command, guild_id, message.channel_id).await;

    // The config change stands even if the reply is lost
    if let Err(e) = platform.send_message(message.channel_id, reply).await {
        error!(
            "Failed to reply in channel {}: {}",
            message.channel_id, e
        );
    }
}
