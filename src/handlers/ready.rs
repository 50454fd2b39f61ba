use poise::serenity_prelude::GuildId;
use tracing::{info, warn};

use crate::{platform::Platform, store::ConfigStore};

/// Move a legacy single-guild config under the guild it belongs to
///
/// The legacy file format has no guild ids. The guild is taken from the first
/// of its channels (notification channel, then watched channels) that still
/// resolves, or from `guilds` when the bot is in exactly one guild. When
/// neither works the legacy config stays pending for the next `Ready`.
pub async fn migrate_legacy_config<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    guilds: &[GuildId],
) {
    if !store.has_pending_legacy().await {
        return;
    }

    let mut owner = None;
    for channel_id in store.pending_legacy_channels().await {
        match platform.channel_guild(channel_id).await {
            Ok(Some(guild_id)) => {
                owner = Some(guild_id);
                break;
            }
            Ok(None) => warn!("Legacy channel {} is not a guild channel", channel_id),
            Err(e) => warn!("Failed to look up legacy channel {}: {}", channel_id, e),
        }
    }

    let owner = match (owner, guilds) {
        (Some(guild_id), _) => guild_id,
        (None, [only]) => {
            info!("No legacy channel resolved, using the only guild {}", only);
            *only
        }
        (None, _) => {
            warn!(
                "Could not find the guild of the legacy config among {} guilds, keeping it pending",
                guilds.len()
            );
            return;
        }
    };

    if store.migrate_legacy(owner).await {
        info!("Legacy config migrated to guild {}", owner);
    }
}
