use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use tracing::{debug, error, info};

use crate::{
    models::VoiceOccupant, platform::Platform, store::ConfigStore,
    utils::messages::build_join_notification,
};

/// One user's voice-channel change within a guild
#[derive(Debug, Clone, Copy)]
pub struct VoiceTransition {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// `None` when the user was in no channel or the old state is unknown
    pub before: Option<ChannelId>,
    pub after: Option<ChannelId>,
}

/// Handle voice state updates (user joins/leaves voice channels)
///
/// Only joins of a watched channel are announced; leaves and mute/deafen
/// toggles are ignored.
pub async fn handle_voice_state_update<P: Platform>(
    platform: &P,
    store: &ConfigStore,
    transition: VoiceTransition,
) {
    // Same channel means mute, deafen or similar
    if transition.after == transition.before {
        return;
    }

    let Some(config) = store.guild_config(transition.guild_id) else {
        return;
    };
    let Some(notification_channel) = config.notification_channel_id() else {
        return;
    };

    let Some(joined) = transition.after else {
        return;
    };
    let Some(watched) = config.watched(joined) else {
        return;
    };

    // The joining user is in the channel even if the snapshot lags behind
    let occupancy = count_occupants(&platform.voice_occupancy(transition.guild_id), joined).max(1);
    info!(
        "User {} joined channel {} with {} members",
        transition.user_id, watched.name, occupancy
    );

    let content = build_join_notification(transition.user_id, joined, occupancy);
    match platform.send_message(notification_channel, content).await {
        Ok(()) => debug!("Sent join notification to channel {}", notification_channel),
        Err(e) => error!(
            "Failed to send join notification to channel {}: {}",
            notification_channel, e
        ),
    }
}

/// Number of users currently in `channel_id`, counted from a fresh snapshot
pub fn count_occupants(occupants: &[VoiceOccupant], channel_id: ChannelId) -> usize {
    occupants
        .iter()
        .filter(|occupant| occupant.channel_id == channel_id)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::WatchedChannel,
        test_helpers::{FakePlatform, occupant, temp_store},
    };

    fn guild() -> GuildId {
        GuildId::new(100)
    }

    fn notification_channel() -> ChannelId {
        ChannelId::new(5)
    }

    async fn configured_store() -> (tempfile::TempDir, ConfigStore) {
        let (dir, store) = temp_store();
        store
            .set_notification_channel(guild(), notification_channel())
            .await;
        store
            .watch_channel(guild(), WatchedChannel::new("General", ChannelId::new(7)))
            .await;
        (dir, store)
    }

    fn join(user: u64, before: Option<u64>, after: u64) -> VoiceTransition {
        VoiceTransition {
            guild_id: guild(),
            user_id: UserId::new(user),
            before: before.map(ChannelId::new),
            after: Some(ChannelId::new(after)),
        }
    }

    #[test]
    fn test_count_occupants() {
        let occupants = vec![occupant(1, 7), occupant(2, 7), occupant(3, 8)];
        assert_eq!(count_occupants(&occupants, ChannelId::new(7)), 2);
        assert_eq!(count_occupants(&occupants, ChannelId::new(8)), 1);
        assert_eq!(count_occupants(&occupants, ChannelId::new(9)), 0);
    }

    #[tokio::test]
    async fn test_first_join_starts_voice_chat() {
        let (_dir, store) = configured_store().await;
        let mut platform = FakePlatform::default();
        platform.occupants = vec![occupant(11, 7)];

        handle_voice_state_update(&platform, &store, join(11, None, 7)).await;

        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, notification_channel());
        assert_eq!(sent[0].1, "<@11> started a voice chat in <#7>");
    }

    #[tokio::test]
    async fn test_empty_snapshot_counts_the_joining_user() {
        let (_dir, store) = configured_store().await;
        let platform = FakePlatform::default();

        handle_voice_state_update(&platform, &store, join(11, None, 7)).await;

        assert_eq!(platform.sent()[0].1, "<@11> started a voice chat in <#7>");
    }

    #[tokio::test]
    async fn test_second_join_reports_member_count() {
        let (_dir, store) = configured_store().await;
        let mut platform = FakePlatform::default();
        platform.occupants = vec![occupant(11, 7), occupant(12, 7), occupant(13, 8)];

        handle_voice_state_update(&platform, &store, join(12, None, 7)).await;

        assert_eq!(platform.sent()[0].1, "<@12> joined <#7> with 2 members");
    }

    #[tokio::test]
    async fn test_same_channel_update_is_ignored() {
        let (_dir, store) = configured_store().await;
        let mut platform = FakePlatform::default();
        platform.occupants = vec![occupant(11, 7)];

        handle_voice_state_update(&platform, &store, join(11, Some(7), 7)).await;

        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_no_notification_channel_means_no_message() {
        let (_dir, store) = temp_store();
        store
            .watch_channel(guild(), WatchedChannel::new("General", ChannelId::new(7)))
            .await;
        let mut platform = FakePlatform::default();
        platform.occupants = vec![occupant(11, 7)];

        handle_voice_state_update(&platform, &store, join(11, None, 7)).await;

        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unwatched_channel_is_ignored() {
        let (_dir, store) = configured_store().await;
        let platform = FakePlatform::default();

        handle_voice_state_update(&platform, &store, join(11, None, 8)).await;

        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_leaving_is_not_announced() {
        let (_dir, store) = configured_store().await;
        let platform = FakePlatform::default();
        let leave = VoiceTransition {
            guild_id: guild(),
            user_id: UserId::new(11),
            before: Some(ChannelId::new(7)),
            after: None,
        };

        handle_voice_state_update(&platform, &store, leave).await;

        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_move_between_watched_channels_is_a_join() {
        let (_dir, store) = configured_store().await;
        store
            .watch_channel(guild(), WatchedChannel::new("Gaming", ChannelId::new(8)))
            .await;
        let mut platform = FakePlatform::default();
        platform.occupants = vec![occupant(11, 8), occupant(12, 8), occupant(13, 8)];

        handle_voice_state_update(&platform, &store, join(11, Some(7), 8)).await;

        assert_eq!(platform.sent()[0].1, "<@11> joined <#8> with 3 members");
    }

    #[tokio::test]
    async fn test_unknown_guild_is_ignored() {
        let (_dir, store) = configured_store().await;
        let platform = FakePlatform::default();
        let elsewhere = VoiceTransition {
            guild_id: GuildId::new(999),
            ..join(11, None, 7)
        };

        handle_voice_state_update(&platform, &store, elsewhere).await;

        assert!(platform.sent().is_empty());
    }
}
