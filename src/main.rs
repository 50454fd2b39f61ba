mod commands;
mod constants;
mod handlers;
mod models;
mod platform;
mod store;
#[cfg(test)]
mod test_helpers;
mod utils;

use std::path::PathBuf;

use clap::Parser;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::{
    constants::{DEFAULT_CONFIG_PATH, LOG_DIRECTIVE},
    handlers::{
        IncomingMessage, VoiceTransition, handle_message, handle_voice_state_update,
        migrate_legacy_config,
    },
    models::{Data, Error},
    platform::SerenityPlatform,
    store::ConfigStore,
};

/// Command line configuration
#[derive(Parser)]
#[command(name = "snoopy")]
#[command(about = "Announces when users join watched voice channels")]
#[command(version)]
struct Cli {
    /// Bot token
    #[arg(short = 't', long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// Configuration file path
    #[arg(short = 'c', long, env = "SNOOPY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    let cli = Cli::parse();

    // Missing or broken config files fall back to an empty config
    let store = ConfigStore::load(&cli.config).await;
    info!("Using config file {}", store.path().display());
    let data = Data::new(store);

    // Create and start the bot
    if let Err(e) = start_bot(cli.token, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Create and start the Discord bot
async fn start_bot(token: String, data: Data) -> Result<(), Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework.bot_id, data))
            },
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                Ok(data)
            })
        })
        .build();

    // Message content is privileged but needed to read commands
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    // Start the bot
    info!("Bot is now running. Press CTRL-C to exit.");
    client.start().await?;

    Ok(())
}

/// Route gateway events to the handlers
async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    bot_id: serenity::UserId,
    data: &Data,
) -> Result<(), Error> {
    let platform = SerenityPlatform::new(ctx);

    match event {
        serenity::FullEvent::Message { new_message } => {
            let message = IncomingMessage {
                author_id: new_message.author.id,
                author_is_bot: new_message.author.bot,
                guild_id: new_message.guild_id,
                channel_id: new_message.channel_id,
                content: &new_message.content,
            };
            handle_message(&platform, &data.store, bot_id, message).await;
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            let Some(guild_id) = new
                .guild_id
                .or_else(|| old.as_ref().and_then(|old| old.guild_id))
            else {
                return Ok(());
            };
            let transition = VoiceTransition {
                guild_id,
                user_id: new.user_id,
                before: old.as_ref().and_then(|old| old.channel_id),
                after: new.channel_id,
            };
            handle_voice_state_update(&platform, &data.store, transition).await;
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Bot is ready in {} guilds",
                data_about_bot.guilds.len()
            );
            let guilds: Vec<_> = data_about_bot.guilds.iter().map(|guild| guild.id).collect();
            migrate_legacy_config(&platform, &data.store, &guilds).await;
        }
        _ => {}
    }

    Ok(())
}
