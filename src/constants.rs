/// Literal prefix every command message starts with
pub const COMMAND_PREFIX: &str = "snoopy ";

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "snoopyConfig.json";

/// JSON key holding the notification text channel of a guild
pub const NOTIFICATION_CHANNEL_KEY: &str = "notificationChannel";

/// JSON key holding the watched voice channels of a guild
pub const WATCHED_CHANNELS_KEY: &str = "WatchedVoiceChannels";

/// Key under which an unmigrated legacy config is kept in the per-guild file
pub const LEGACY_CONFIG_KEY: &str = "legacy";

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "snoopy=info";
