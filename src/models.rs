use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::ConfigStore;

/// A voice channel opted into join notifications
///
/// `id` is the identity; `name` only caches the display name seen when the
/// channel was added and may go stale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedChannel {
    pub name: String,
    pub id: String,
}

impl WatchedChannel {
    pub fn new(name: impl Into<String>, id: ChannelId) -> Self {
        Self {
            name: name.into(),
            id: id.to_string(),
        }
    }
}

/// Per-guild configuration as stored on disk
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// Text channel receiving notifications, empty when unset
    #[serde(rename = "notificationChannel", default)]
    pub notification_channel: String,
    #[serde(
        rename = "WatchedVoiceChannels",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub watched_channels: Vec<WatchedChannel>,
}

impl GuildConfig {
    /// Notification channel as a typed id, `None` when unset or unparsable
    pub fn notification_channel_id(&self) -> Option<ChannelId> {
        parse_snowflake(&self.notification_channel).map(ChannelId::new)
    }

    /// Find the watch-list entry for a channel
    pub fn watched(&self, channel_id: ChannelId) -> Option<&WatchedChannel> {
        let id = channel_id.to_string();
        self.watched_channels.iter().find(|watched| watched.id == id)
    }
}

/// Parse a Discord snowflake, rejecting zero which the id types cannot hold
pub fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|id| *id != 0)
}

/// Older bot versions wrote `null` for an empty watch list
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WatchedChannel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WatchedChannel>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A guild channel as reported by the platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub name: String,
    pub is_voice: bool,
}

/// One entry of a guild's live voice-state list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceOccupant {
    pub user_id: UserId,
    pub channel_id: ChannelId,
}

/// Bot state shared across all handlers
#[derive(Clone)]
pub struct Data {
    /// Per-guild configuration backed by the JSON file
    pub store: Arc<ConfigStore>,
}

impl Data {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_channel_id() {
        let mut config = GuildConfig::default();
        assert_eq!(config.notification_channel_id(), None);

        config.notification_channel = "42".to_string();
        assert_eq!(config.notification_channel_id(), Some(ChannelId::new(42)));

        config.notification_channel = "0".to_string();
        assert_eq!(config.notification_channel_id(), None);

        config.notification_channel = "general".to_string();
        assert_eq!(config.notification_channel_id(), None);
    }

    #[test]
    fn test_watched_lookup() {
        let config = GuildConfig {
            notification_channel: String::new(),
            watched_channels: vec![WatchedChannel::new("General", ChannelId::new(7))],
        };

        assert_eq!(
            config.watched(ChannelId::new(7)).map(|w| w.name.as_str()),
            Some("General")
        );
        assert!(config.watched(ChannelId::new(8)).is_none());
    }

    #[test]
    fn test_guild_config_json_keys() {
        let config = GuildConfig {
            notification_channel: "1".to_string(),
            watched_channels: vec![WatchedChannel::new("Lounge", ChannelId::new(2))],
        };
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["notificationChannel"], "1");
        assert_eq!(json["WatchedVoiceChannels"][0]["name"], "Lounge");
        assert_eq!(json["WatchedVoiceChannels"][0]["id"], "2");
    }

    #[test]
    fn test_null_watch_list_reads_as_empty() {
        let config: GuildConfig =
            serde_json::from_str(r#"{"notificationChannel":"1","WatchedVoiceChannels":null}"#)
                .unwrap();
        assert!(config.watched_channels.is_empty());

        let config: GuildConfig = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(config, GuildConfig::default());
    }
}
