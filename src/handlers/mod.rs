/// Handler modules for Discord events
mod message;
mod ready;
mod voice;

// Re-export main handler functions
pub use message::{IncomingMessage, handle_message};
pub use ready::migrate_legacy_config;
pub use voice::{VoiceTransition, handle_voice_state_update};
