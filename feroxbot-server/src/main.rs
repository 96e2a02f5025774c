use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use twilight_http::Client as TwilightClient;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

use feroxbot_common::models::{BotSettings, CommandStatus};
use feroxbot_core::features::{FeatureRegistry, builtin_features};
use feroxbot_core::features::FeatureContext;
use feroxbot_core::platforms::discord::{
    CachedClientStatus, DiscordRuntime, TwilightInteractionApi, gateway_cache,
};
use feroxbot_core::repositories::postgres::{
    PostgresGameStatsRepository, PostgresRegistrationCodeRepository, PostgresStatsRepository,
    PostgresUserSettingsRepository,
};
use feroxbot_core::services::discord::slashcommands::builtin_commands;
use feroxbot_core::services::{
    BotServices, CommandContext, CommandRegistry, ComponentCollector, IdentityResolver,
    InteractionRouter, Responder,
};
use feroxbot_core::{Database, DatabaseOptions, DefaultHttpClient, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "feroxbot")]
#[command(author, version, about = "FeroxBot - slash command bot for the ferox minecraft server")]
struct Args {
    /// Bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://ferox@localhost:5432/ferox")]
    database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
    db_max_connections: u32,

    /// Which commands to push with --update-commands: ENABLED, DEV or ALL
    #[arg(long, env = "CMD_LOAD_LEVEL", default_value = "ENABLED")]
    cmd_load_level: CommandStatus,

    /// Guild to register commands in instead of globally
    #[arg(long, env = "CMD_DEV_GUILD")]
    cmd_dev_guild: Option<u64>,

    /// Register the command catalog with the platform on startup
    #[arg(long, default_value = "false")]
    update_commands: bool,

    #[arg(long, env = "BOT_INVITE_LINK")]
    invite_link: Option<String>,

    /// Shown as the creator by /info
    #[arg(long, env = "BOT_CREATOR")]
    creator: Option<String>,

    /// Minecraft server address shown by /ip and /link info
    #[arg(long, env = "SERVER_IP")]
    server_ip: Option<String>,

    #[arg(long, env = "PRESENCE_NAME")]
    presence_name: Option<String>,

    #[arg(long, env = "PRESENCE_URL")]
    presence_url: Option<String>,

    /// Used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new("warn");
        for krate in ["feroxbot", "feroxbot_core", "feroxbot_common"] {
            if let Ok(directive) = format!("{krate}={level}").parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    });
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }

    std::panic::set_hook(Box::new(|info| {
        error!("Unhandled panic: {info}");
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!(
        "FeroxBot starting. load_level={}, dev_guild={:?}, update_commands={}",
        args.cmd_load_level, args.cmd_dev_guild, args.update_commands
    );

    if let Err(e) = run(args).await {
        error!("Bot error: {:#}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let db_options = DatabaseOptions {
        max_connections: args.db_max_connections,
        ..Default::default()
    };
    let db = Database::connect(&args.database_url, &db_options)
        .await
        .context("Failed to connect to the statistics database")?;
    db.ping().await.context("Statistics database did not answer")?;

    let http = Arc::new(TwilightClient::new(args.token.clone()));
    let application = http
        .current_user_application()
        .await
        .map_err(|e| Error::Platform(format!("Failed to fetch application: {e}")))?
        .model()
        .await
        .map_err(|e| Error::Platform(format!("Failed to read application: {e}")))?;

    let dev_guild = args.cmd_dev_guild.and_then(Id::<GuildMarker>::new_checked);
    let settings = BotSettings {
        bot_name: application.name.clone(),
        server_ip: args.server_ip,
        invite_link: args.invite_link,
        creator: args.creator,
        presence_name: args.presence_name,
        presence_url: args.presence_url,
        command_load_level: args.cmd_load_level,
        dev_guild,
    };

    let api = Arc::new(TwilightInteractionApi::new(http.clone(), application.id));
    let registry = Arc::new(CommandRegistry::load_all(&builtin_commands(), &settings));
    let features = Arc::new(FeatureRegistry::load_all(&builtin_features(), &settings));

    if args.update_commands {
        if settings.command_load_level == CommandStatus::Disabled {
            warn!("CMD_LOAD_LEVEL=DISABLED, not registering commands");
        } else {
            registry
                .export_for_registration(api.as_ref(), settings.command_load_level, dev_guild)
                .await;
        }
    }

    let cache = Arc::new(gateway_cache());
    let services = BotServices {
        identity: Arc::new(IdentityResolver::new(Arc::new(DefaultHttpClient::new()))),
        stats: Arc::new(PostgresStatsRepository::new(db.pool().clone())),
        codes: Arc::new(PostgresRegistrationCodeRepository::new(db.pool().clone())),
        games: Arc::new(PostgresGameStatsRepository::new(db.pool().clone())),
        user_settings: Arc::new(PostgresUserSettingsRepository::new(db.pool().clone())),
        client: Arc::new(CachedClientStatus::new(Arc::clone(&cache))),
        settings: settings.clone(),
    };
    let feature_ctx = FeatureContext::new(services.clone(), api.clone());
    let context = CommandContext::new(
        Responder::new(api, settings.bot_name.clone()),
        ComponentCollector::new(),
        registry,
        services,
    );
    let router = Arc::new(InteractionRouter::new(context));

    let mut runtime = DiscordRuntime::new(args.token, http, cache, router, features, feature_ctx);
    runtime.connect().await.context("Failed to connect to the gateway")?;
    info!("{} is online", settings.bot_name);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down...");
    runtime.disconnect().await?;
    Ok(())
}
