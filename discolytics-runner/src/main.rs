use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};
use twilight_gateway::Intents;

use discolytics_common::models::{LogConfig, LogLevel};
use discolytics_core::gateway::{DispatchFilter, TwilightAdapter, Tracker};
use discolytics_core::{ClientConfig, ClientConfigBuilder, CommandMode};

#[derive(Parser, Debug, Clone)]
#[command(name = "discolytics")]
#[command(author, version, about = "Discolytics telemetry for a single twilight shard")]
struct Args {
    /// Discolytics bot id. Falls back to DISCOLYTICS_BOT_ID.
    #[arg(long)]
    bot_id: Option<String>,

    /// Discolytics API key. Falls back to DISCOLYTICS_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// Discord bot token. Falls back to DISCORD_TOKEN.
    #[arg(long)]
    token: Option<String>,

    #[arg(long)]
    data_api_url: Option<String>,

    #[arg(long)]
    api_url: Option<String>,

    /// Secondary processes only flush; another process owns heartbeats and profile sync.
    #[arg(long, default_value = "false")]
    secondary: bool,

    /// Post every command as soon as it ends instead of batching.
    #[arg(long, default_value = "false")]
    immediate_commands: bool,

    /// Only record events on the server's capture list.
    #[arg(long, default_value = "false")]
    capture_filter: bool,

    /// Turn on the client's debug log lines.
    #[arg(long, short = 'd', default_value = "false")]
    debug: bool,
}

/// `RUST_LOG` wins when set; otherwise the crate targets log at info.
/// `--debug` raises them to debug either way.
fn tracing_filter(debug: bool, env: Option<&str>) -> anyhow::Result<EnvFilter> {
    let mut filter = match env {
        Some(directives) => EnvFilter::try_new(directives).context("Invalid RUST_LOG")?,
        None => EnvFilter::new("discolytics=info,discolytics_core=info"),
    };
    if debug {
        filter = filter
            .add_directive("discolytics=debug".parse()?)
            .add_directive("discolytics_core=debug".parse()?);
    }
    Ok(filter)
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let env = std::env::var("RUST_LOG").ok();
    let filter = tracing_filter(debug, env.as_deref())?;
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).context("Failed to set global subscriber")?;
    Ok(())
}

fn config_from(args: &Args) -> anyhow::Result<ClientConfigBuilder> {
    let mut builder = match (&args.bot_id, &args.api_key) {
        (Some(bot_id), Some(api_key)) => ClientConfig::builder(bot_id, api_key),
        _ => ClientConfig::from_env()?,
    };

    if let Some(url) = &args.data_api_url {
        builder = builder.data_api_url(url);
    }
    if let Some(url) = &args.api_url {
        builder = builder.api_url(url);
    }
    if args.immediate_commands {
        builder = builder.command_mode(CommandMode::Immediate);
    }
    if args.debug {
        builder = builder.log_config(LogConfig::default().set(LogLevel::Debug, true));
    }
    Ok(builder.primary(!args.secondary))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_tracing(args.debug)?;

    let builder = config_from(&args)?;
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("DISCORD_TOKEN").ok())
        .ok_or_else(|| anyhow!("No Discord token; pass --token or set DISCORD_TOKEN"))?;

    let adapter = TwilightAdapter::new(token, Intents::GUILDS | Intents::GUILD_MESSAGES);
    let filter = if args.capture_filter {
        DispatchFilter::CaptureEvents
    } else {
        DispatchFilter::All
    };
    let tracker = Tracker::new(adapter, builder)?.filter(filter);
    let client = tracker.client().clone();

    info!(
        "Discolytics runner starting. bot={}, primary={}, filter={:?}",
        client.config().bot_id(),
        client.config().is_primary(),
        filter
    );

    tokio::select! {
        res = tracker.run() => {
            if let Err(e) = res {
                error!("Gateway listener failed: {:?}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down.");
        }
    }

    let report = client.stop().await;
    info!("Final flush: {:?}", report);
    info!("Runner finished. Goodbye!");
    Ok(())
}
