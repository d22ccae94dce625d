// This is the entry point of the news bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic): channel registry, news cycle
// - `infra/` = Implementations of core traits (JSON file, NewsAPI, Gemini, web)
// - `discord/` = Discord-specific adapters (commands, events, embeds)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Start the background tasks (news cycle, liveness server)

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use crate::config::BotConfig;
use crate::core::channels::ChannelRegistry;
use crate::discord::commands::setchannel::ERROR_REPLY;
use crate::discord::guild_join;
use crate::discord::news::spawn_news_task;
use crate::discord::{Data, Error};
use crate::infra::channels::JsonChannelStore;
use crate::infra::web::liveness;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::GuildCreate { guild, is_new } = event {
        if let Err(e) = guild_join::handle_guild_create(ctx, data, guild, *is_new).await {
            tracing::error!(guild_id = guild.id.get(), "Error handling guild join: {}", e);
        }
    }

    Ok(())
}

/// Last-resort error handling for commands: log, and tell the invoker once.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(command = ctx.command().name.as_str(), "Command failed: {}", error);
            let reply = poise::CreateReply::default()
                .content(ERROR_REPLY)
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Could not report command failure to the invoker: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = Arc::new(BotConfig::from_env().context("Invalid bot configuration")?);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let channel_store = JsonChannelStore::new(&config.channels_file);
    let channels = Arc::new(ChannelRegistry::new(channel_store));
    tracing::info!(
        path = %config.channels_file.display(),
        registered = channels.get_all().await.len(),
        "Channel registry loaded"
    );

    // The liveness endpoint is independent of the Discord connection.
    tokio::spawn(liveness::serve(config.port));

    let data = Data {
        channels: Arc::clone(&channels),
        config: Arc::clone(&config),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::setchannel::setchannel()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("🤖 Logged in as {}", ready.user.name);

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("✅ Slash commands registered.");

                spawn_news_task(ctx.http.clone(), &data)?;

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
