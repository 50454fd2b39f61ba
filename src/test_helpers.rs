//! Test doubles shared by handler and command tests

use std::{collections::HashMap, sync::Mutex};

use poise::serenity_prelude::{ChannelId, GuildId, UserId};

use crate::{
    models::{ChannelSummary, Error, VoiceOccupant},
    platform::Platform,
    store::ConfigStore,
};

/// In-memory `Platform` that records every message sent
#[derive(Default)]
pub struct FakePlatform {
    pub channels: Vec<ChannelSummary>,
    pub occupants: Vec<VoiceOccupant>,
    pub channel_guilds: HashMap<ChannelId, GuildId>,
    pub fail_channels: bool,
    pub fail_send: bool,
    sent: Mutex<Vec<(ChannelId, String)>>,
}

impl FakePlatform {
    pub fn with_channels(channels: Vec<ChannelSummary>) -> Self {
        Self {
            channels,
            ..Default::default()
        }
    }

    pub fn failing_channels() -> Self {
        Self {
            fail_channels: true,
            ..Default::default()
        }
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Messages sent so far, in order
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Platform for FakePlatform {
    async fn send_message(&self, channel_id: ChannelId, content: String) -> Result<(), Error> {
        if self.fail_send {
            return Err("send failed".into());
        }
        self.sent.lock().unwrap().push((channel_id, content));
        Ok(())
    }

    async fn guild_channels(&self, _guild_id: GuildId) -> Result<Vec<ChannelSummary>, Error> {
        if self.fail_channels {
            return Err("channel list unavailable".into());
        }
        Ok(self.channels.clone())
    }

    fn voice_occupancy(&self, _guild_id: GuildId) -> Vec<VoiceOccupant> {
        self.occupants.clone()
    }

    async fn channel_guild(&self, channel_id: ChannelId) -> Result<Option<GuildId>, Error> {
        Ok(self.channel_guilds.get(&channel_id).copied())
    }
}

pub fn voice(id: u64, name: &str) -> ChannelSummary {
    ChannelSummary {
        id: ChannelId::new(id),
        name: name.to_string(),
        is_voice: true,
    }
}

pub fn occupant(user: u64, channel: u64) -> VoiceOccupant {
    VoiceOccupant {
        user_id: UserId::new(user),
        channel_id: ChannelId::new(channel),
    }
}

/// Empty store saving into a fresh temporary directory
pub fn temp_store() -> (tempfile::TempDir, ConfigStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::empty(dir.path().join("snoopyConfig.json"));
    (dir, store)
}
