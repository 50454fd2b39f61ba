use poise::serenity_prelude::ChannelId;
use thiserror::Error;

use crate::models::{ChannelSummary, Error, parse_snowflake};

/// Failures of a command, displayed to the user as the reply
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Please specify a voice channel name")]
    MissingChannelName,

    #[error("Requested channel ({0}) not found")]
    ChannelNotFound(String),

    #[error(
        "Several voice channels are named {name}: {}. Use the channel id or mention instead",
        format_candidates(.ids)
    )]
    AmbiguousChannelName { name: String, ids: Vec<ChannelId> },

    #[error("Couldn't fetch this server's channels, please try again later")]
    Upstream(#[source] Error),
}

fn format_candidates(ids: &[ChannelId]) -> String {
    ids.iter()
        .map(|id| format!("<#{}> (`{}`)", id, id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject a missing or blank channel argument
pub fn require_channel_name(argument: &str) -> Result<&str, CommandError> {
    let name = argument.trim();
    if name.is_empty() {
        return Err(CommandError::MissingChannelName);
    }
    Ok(name)
}

/// Read a channel id from a raw id or a `<#id>` mention
pub fn parse_channel_reference(argument: &str) -> Option<ChannelId> {
    let raw = argument
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(argument);
    parse_snowflake(raw).map(ChannelId::new)
}

/// Resolve a command argument to exactly one voice channel
///
/// Ids and mentions match by id; anything else must equal the display name
/// of exactly one voice channel (case-sensitive).
pub fn resolve_voice_channel<'a>(
    channels: &'a [ChannelSummary],
    argument: &str,
) -> Result<&'a ChannelSummary, CommandError> {
    let name = require_channel_name(argument)?;
    let voice_channels = || channels.iter().filter(|channel| channel.is_voice);

    if let Some(id) = parse_channel_reference(name)
        && let Some(channel) = voice_channels().find(|channel| channel.id == id)
    {
        return Ok(channel);
    }

    let matches: Vec<_> = voice_channels().filter(|channel| channel.name == name).collect();
    match matches.as_slice() {
        [] => Err(CommandError::ChannelNotFound(name.to_string())),
        [channel] => Ok(*channel),
        _ => Err(CommandError::AmbiguousChannelName {
            name: name.to_string(),
            ids: matches.iter().map(|channel| channel.id).collect(),
        }),
    }
}
