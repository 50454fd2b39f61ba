/// Pure functions for formatting replies and notifications (Discord-agnostic)
use std::fmt::Display;

use crate::models::GuildConfig;

/// Format a validation error message with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success message with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format an info message with emoji
pub fn format_info(message: &str) -> String {
    format!("ℹ️ {}", message)
}

/// Mention a channel so the client renders it as a link
pub fn channel_mention(channel_id: impl Display) -> String {
    format!("<#{}>", channel_id)
}

/// Mention a user so the client renders their name
pub fn user_mention(user_id: impl Display) -> String {
    format!("<@{}>", user_id)
}

/// Text announcing that a user joined a watched voice channel
///
/// The first person in a channel "starts" the voice chat.
pub fn build_join_notification(
    user_id: impl Display,
    channel_id: impl Display,
    occupancy: usize,
) -> String {
    if occupancy == 1 {
        format!(
            "{} started a voice chat in {}",
            user_mention(user_id),
            channel_mention(channel_id)
        )
    } else {
        format!(
            "{} joined {} with {} members",
            user_mention(user_id),
            channel_mention(channel_id),
            occupancy
        )
    }
}

/// Describe a guild's notification channel and watch list
pub fn build_watch_list(config: Option<&GuildConfig>) -> String {
    let notification = match config {
        Some(config) if !config.notification_channel.is_empty() => {
            channel_mention(&config.notification_channel)
        }
        _ => "not set (use `snoopy setchannel`)".to_string(),
    };

    let watched = match config {
        Some(config) if !config.watched_channels.is_empty() => config
            .watched_channels
            .iter()
            .map(|watched| format!("• {} ({})", channel_mention(&watched.id), watched.name))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => "none (use `snoopy watchchannel <channel name>`)".to_string(),
    };

    format!(
        "**Notification channel:** {}\n**Watched voice channels:**\n{}",
        notification, watched
    )
}
