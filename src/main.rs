use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use standup::command::ParameterRegistry;
use standup::config::AddonConfig;
use standup::hipchat::HipChatClient;
use standup::{api, db, reminder};

#[derive(Parser)]
#[command(name = "standup")]
#[command(about = "HipChat add-on for asynchronous daily standups")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the add-on server
    Serve {
        /// Port for the HTTP server
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
    /// Send the standup reminder to every installed room (run hourly)
    Remind,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "standup=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &AddonConfig) -> anyhow::Result<db::Database> {
    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: AddonConfig, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting standup add-on on {}:{}", host, port);

    let registry =
        Arc::new(ParameterRegistry::load_default().context("Failed to load parameter catalog")?);
    let db = open_database(&config)?;
    let chat = Arc::new(HipChatClient::new(config.from_name.clone()));

    let app = api::create_router(api::AppState::new(db, registry, chat, config));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Standup add-on listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn remind(config: AddonConfig) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let chat = HipChatClient::new(config.from_name.clone());
    let installations = db.get_all_installations()?;

    let summary = reminder::remind_all(
        &installations,
        &db,
        &chat,
        config.reminder_hour,
        chrono::Utc::now(),
    )
    .await;

    if summary.failed > 0 {
        tracing::warn!("{} room(s) could not be reminded", summary.failed);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AddonConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(config, &host, port).await?,
        Some(Commands::Remind) => remind(config).await?,
        None => serve(config, "0.0.0.0", 8080).await?,
    }

    Ok(())
}
