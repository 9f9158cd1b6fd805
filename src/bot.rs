use crate::config::AppConfig;
use crate::dialog::surface::GuildId;
use crate::discord::HttpLookup;
use crate::models::Roster;
use crate::runtime::RuntimeContext;
use crate::{commands, errors};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// User data, stored and accessible in all command invocations.
pub struct Data {
    /// Application configuration loaded at startup.
    pub app_config: Arc<AppConfig>,
    /// Injected runtime context for the dialog engine.
    pub runtime: Arc<RuntimeContext>,
    /// Registered member profiles, in memory for the bot's lifetime.
    pub roster: Arc<RwLock<Roster>>,
}

/// Error type Poise will use.
pub type Error = errors::Error;
/// Command invocation context.
pub type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to the gateway and runs the bot until the client stops.
#[instrument(skip(token, app_config))]
pub async fn run_bot(token: String, app_config: Arc<AppConfig>) -> Result<(), serenity::Error> {
    let guild_id = serenity::GuildId::new(app_config.guild_id);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::register(),
                commands::profiles(),
                commands::clear_profiles(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands in guild {}...", guild_id);
                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;
                let runtime = RuntimeContext::new(
                    GuildId(app_config.guild_id),
                    Arc::new(HttpLookup::new(Arc::clone(&ctx.http))),
                    app_config
                        .masters
                        .iter()
                        .map(|id| crate::dialog::surface::UserId(*id))
                        .collect(),
                );
                Ok(Data {
                    app_config: Arc::clone(&app_config),
                    runtime: Arc::new(runtime),
                    roster: Arc::new(RwLock::new(Roster::new())),
                })
            })
        })
        .build();

    // Reaction and message events feed the dialog collectors, so the bot
    // needs more than the usual slash-command intents.
    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await;

    match client {
        Ok(mut c) => {
            info!("Starting bot client...");
            if let Err(why) = c.start().await {
                tracing::error!("Client error: {:?}", why);
                return Err(why);
            }
        }
        Err(e) => {
            tracing::error!("Error creating client: {:?}", e);
            return Err(e);
        }
    }
    Ok(())
}
