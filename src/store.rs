use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    constants::{LEGACY_CONFIG_KEY, NOTIFICATION_CHANNEL_KEY, WATCHED_CHANNELS_KEY},
    models::{GuildConfig, WatchedChannel, parse_snowflake},
};

/// Errors raised while persisting the configuration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of adding a channel to a watch list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Added,
    AlreadyWatched,
}

/// Result of removing a channel from a watch list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnwatchOutcome {
    /// Carries the cached name of the removed entry
    Removed(String),
    NotWatched,
}

/// Shape of a config file on disk
#[derive(Debug, PartialEq)]
pub enum ConfigFile {
    /// Guild id to guild configuration
    PerGuild(BTreeMap<String, GuildConfig>),
    /// Single global configuration written by older versions
    Legacy(GuildConfig),
}

/// Parse either config file layout
///
/// A document with a top-level `notificationChannel` or
/// `WatchedVoiceChannels` key is the legacy single-guild layout.
pub fn parse_config(raw: &str) -> Result<ConfigFile, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let is_legacy =
        value.get(NOTIFICATION_CHANNEL_KEY).is_some() || value.get(WATCHED_CHANNELS_KEY).is_some();

    if is_legacy {
        Ok(ConfigFile::Legacy(serde_json::from_value(value)?))
    } else {
        Ok(ConfigFile::PerGuild(serde_json::from_value(value)?))
    }
}

/// Per-guild configuration, written through to a JSON file
///
/// Every mutation holds `write_lock` across read-modify-write-save so
/// concurrent commands cannot lose each other's updates. Readers take
/// snapshots from the map without waiting on the lock.
pub struct ConfigStore {
    path: PathBuf,
    guilds: DashMap<String, GuildConfig>,
    pending_legacy: Mutex<Option<GuildConfig>>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Create an empty store that will save to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guilds: DashMap::new(),
            pending_legacy: Mutex::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Load the store from `path`
    ///
    /// A missing or unreadable file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Reading config from {}", path.display());

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Unable to read config file {}, using empty config: {}",
                    path.display(),
                    e
                );
                return Self::empty(path);
            }
        };

        let mut store = Self::empty(path);
        match parse_config(&raw) {
            Ok(ConfigFile::PerGuild(mut guilds)) => {
                if let Some(legacy) = guilds.remove(LEGACY_CONFIG_KEY) {
                    info!("Found unmigrated legacy config, it will be migrated once the bot is ready");
                    *store.pending_legacy.get_mut() = Some(legacy);
                }
                info!("Loaded config for {} guilds", guilds.len());
                store.guilds.extend(guilds);
            }
            Ok(ConfigFile::Legacy(config)) => {
                info!("Found legacy config, it will be migrated once the bot is ready");
                *store.pending_legacy.get_mut() = Some(config);
            }
            Err(e) => {
                warn!(
                    "Unable to parse config file {}, using empty config: {}",
                    store.path.display(),
                    e
                );
            }
        }

        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of one guild's configuration
    pub fn guild_config(&self, guild_id: GuildId) -> Option<GuildConfig> {
        self.guilds
            .get(&guild_id.to_string())
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every guild's configuration, ordered by guild id
    pub fn snapshot(&self) -> BTreeMap<String, GuildConfig> {
        self.guilds
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Point a guild's notifications at `channel_id`, creating the guild entry if needed
    pub async fn set_notification_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        let _guard = self.write_lock.lock().await;
        self.guilds
            .entry(guild_id.to_string())
            .or_default()
            .notification_channel = channel_id.to_string();
        info!(
            "Guild {} now sends notifications to channel {}",
            guild_id, channel_id
        );
        self.persist_logged().await;
    }

    /// Add a channel to a guild's watch list unless its id is already there
    pub async fn watch_channel(&self, guild_id: GuildId, channel: WatchedChannel) -> WatchOutcome {
        let _guard = self.write_lock.lock().await;
        {
            let mut config = self.guilds.entry(guild_id.to_string()).or_default();
            if config.watched_channels.iter().any(|w| w.id == channel.id) {
                info!(
                    "Channel {} ({}) is already watched in guild {}",
                    channel.name, channel.id, guild_id
                );
                return WatchOutcome::AlreadyWatched;
            }
            info!(
                "Watching channel {} ({}) in guild {}",
                channel.name, channel.id, guild_id
            );
            config.watched_channels.push(channel);
        }
        self.persist_logged().await;
        WatchOutcome::Added
    }

    /// Remove a channel from a guild's watch list
    pub async fn unwatch_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> UnwatchOutcome {
        let _guard = self.write_lock.lock().await;
        let id = channel_id.to_string();
        let removed = {
            let Some(mut config) = self.guilds.get_mut(&guild_id.to_string()) else {
                return UnwatchOutcome::NotWatched;
            };
            let Some(index) = config.watched_channels.iter().position(|w| w.id == id) else {
                return UnwatchOutcome::NotWatched;
            };
            config.watched_channels.remove(index)
        };
        info!(
            "Stopped watching channel {} ({}) in guild {}",
            removed.name, removed.id, guild_id
        );
        self.persist_logged().await;
        UnwatchOutcome::Removed(removed.name)
    }

    /// Channels of a legacy config still waiting for a guild
    ///
    /// The notification channel comes first, then every watched channel.
    /// Empty when nothing is pending.
    pub async fn pending_legacy_channels(&self) -> Vec<ChannelId> {
        let pending = self.pending_legacy.lock().await;
        let Some(config) = pending.as_ref() else {
            return Vec::new();
        };

        std::iter::once(config.notification_channel.as_str())
            .chain(config.watched_channels.iter().map(|watched| watched.id.as_str()))
            .filter_map(parse_snowflake)
            .map(ChannelId::new)
            .collect()
    }

    /// Whether a legacy config is still waiting for a guild
    pub async fn has_pending_legacy(&self) -> bool {
        self.pending_legacy.lock().await.is_some()
    }

    /// Adopt a pending legacy config as the config of `guild_id`
    ///
    /// Returns `false` when there was nothing to migrate. An existing config
    /// for the guild wins over the legacy one.
    pub async fn migrate_legacy(&self, guild_id: GuildId) -> bool {
        let _guard = self.write_lock.lock().await;
        let Some(legacy) = self.pending_legacy.lock().await.take() else {
            return false;
        };

        let key = guild_id.to_string();
        if self.guilds.contains_key(&key) {
            warn!(
                "Guild {} already has a config, discarding legacy config",
                guild_id
            );
        } else {
            info!(
                "Migrating legacy config with {} watched channels to guild {}",
                legacy.watched_channels.len(),
                guild_id
            );
            self.guilds.insert(key, legacy);
        }

        self.persist_logged().await;
        true
    }

    async fn persist_logged(&self) {
        if let Err(e) = self.persist().await {
            error!("Failed to save config: {}", e);
        }
    }

    /// Caller must hold `write_lock`
    ///
    /// A pending legacy config is written under `LEGACY_CONFIG_KEY` so it
    /// survives until a guild adopts it.
    async fn persist(&self) -> Result<(), StoreError> {
        let mut document = self.snapshot();
        if let Some(legacy) = self.pending_legacy.lock().await.clone() {
            document.insert(LEGACY_CONFIG_KEY.to_string(), legacy);
        }
        let json = serde_json::to_string_pretty(&document)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write_error = |source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };
        tokio::fs::write(&tmp, json).await.map_err(write_error)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(write_error)?;

        info!("Wrote config to {}", self.path.display());
        Ok(())
    }
}
