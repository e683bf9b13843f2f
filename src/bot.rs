//! Process startup shared by both bot binaries.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::ai::chat::chat;
use crate::commands::general::help::help;
use crate::config::Config;
use crate::runtime::{ImageRuntime, ModelRuntime};
use crate::utils::ollama_client::OllamaClient;
use crate::{Data, Error};

/// Which bot is being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `/chat` only; needs no image backend.
    ChatOnly,
    /// `/chat` and `/image`.
    #[cfg(feature = "image")]
    Combined,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::ChatOnly => "Chanakya AI Discord Bot (Chat Only)",
            #[cfg(feature = "image")]
            Variant::Combined => "Chanakya AI Discord Bot",
        }
    }

    pub fn commands(&self) -> Vec<poise::Command<Data, Error>> {
        let mut commands = vec![help(), chat()];

        #[cfg(feature = "image")]
        {
            use crate::commands::ai::image::image;

            if let Variant::Combined = self {
                commands.push(image());
            }
        }

        commands
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chanakya=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();
}

/// Loads configuration, warms the runtimes and runs the Discord client until shutdown.
///
/// Expects `.env` to have been loaded already.
pub async fn start(variant: Variant) -> Result<(), Error> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("❌ Error: {e}");
            eprintln!("Please create a .env file with your Discord bot token.");
            return Err(e.into());
        }
    };

    let data = build_data(variant, config).await?;
    let token = data.config.discord_token.clone();
    let dev_guild_id = data.config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: variant.commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged on as {}!", ready.user.name);

                let commands = &framework.options().commands;
                let registered = match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(ctx, commands, guild_id).await
                    }
                    None => poise::builtins::register_globally(ctx, commands).await,
                };
                match registered {
                    Ok(()) => info!("Slash commands synced"),
                    Err(e) => error!("Error syncing commands: {}", e),
                }

                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting {}...", variant.name());
    client.start().await.map_err(Into::into)
}

/// Constructs the runtimes for `variant` and pulls the chat model when configured to.
async fn build_data(variant: Variant, config: Config) -> Result<Data, Error> {
    let model = OllamaClient::new(&config.ollama_host);
    if config.pull_model_on_start {
        model.prepare(&config.chat_model).await?;
    } else {
        info!("Skipping pull of model '{}'", config.chat_model);
    }

    let images: Option<Arc<dyn ImageRuntime>> = match variant {
        Variant::ChatOnly => None,
        #[cfg(feature = "image")]
        Variant::Combined => {
            use crate::utils::diffusion_client::DiffusionClient;

            let client: Arc<dyn ImageRuntime> = Arc::new(DiffusionClient::new(
                &config.sd_url,
                &config.sd_model,
                config.sd_clear_cache_path.as_deref(),
                config.hf_token.clone(),
            )?);
            Some(client)
        }
    };

    Ok(Data {
        config,
        model: Arc::new(model),
        images,
    })
}

/// Framework-level error hook. Unrecognized commands are logged and otherwise ignored.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::UnknownCommand { msg_content, .. } => {
            debug!("Ignoring unknown command: {}", msg_content);
        }
        poise::FrameworkError::UnknownInteraction { interaction, .. } => {
            warn!("Ignoring unrecognized command /{}", interaction.data.name);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command /{}: {}", ctx.command().name, error);
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
