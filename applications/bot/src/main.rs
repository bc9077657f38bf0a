//! Album Queue - download queue bot
use album_queue::{
    api,
    config::BotConfig,
    console::run_console,
    handler::{format_queue_line, CommandHandler},
    resolver::UrlNameResolver,
    state::AppState,
};
use album_queue_core::{
    CreatorId, NewDownloadRequest, NewPlaylistRequest, OpContext, RequestId, RequestLifecycle,
    RequestStore,
};
use album_queue_storage::SqliteRequestStore;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "album-queue")]
#[command(about = "Album download queue bot", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ALBUM_QUEUE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the health endpoint and the console front end
    Serve,
    /// Queue a download request
    Submit {
        /// Source link
        url: String,
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
        /// Number of tracks the source is expected to have
        #[arg(short, long, default_value_t = 0)]
        expected_tracks: u32,
        /// Submitting user (defaults to bot.console_user_id)
        #[arg(long)]
        creator: Option<i64>,
    },
    /// Register a playlist
    Playlist {
        /// Playlist link
        url: String,
        /// Register only, do not download
        #[arg(long)]
        no_pull: bool,
        /// Submitting user (defaults to bot.console_user_id)
        #[arg(long)]
        creator: Option<i64>,
    },
    /// List active download requests
    Queue,
    /// Deactivate a download request
    Deactivate {
        /// Request id
        id: String,
    },
    /// Look up catalog entries by exact artist/title pairs
    Find {
        /// Artist, paired positionally with --title
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        /// Title, paired positionally with --artist
        #[arg(short, long = "title")]
        titles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "album_queue=info,album_queue_core=info,album_queue_storage=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Submit {
            url,
            name,
            expected_tracks,
            creator,
        } => {
            let creator = creator_id(&config, creator)?;
            let lifecycle = open_lifecycle(&config).await?;
            let request = NewDownloadRequest::new(url, creator)
                .with_name(name)
                .with_expected_track_count(expected_tracks);

            let id = lifecycle.submit_download(&OpContext::new(), request).await?;
            println!("{id}");
            lifecycle.store().close().await;
        }
        Commands::Playlist {
            url,
            no_pull,
            creator,
        } => {
            let creator = creator_id(&config, creator)?;
            let lifecycle = open_lifecycle(&config).await?;
            let request = NewPlaylistRequest::new(url, creator, no_pull);

            let id = lifecycle.submit_playlist(&OpContext::new(), request).await?;
            println!("{id}");
            lifecycle.store().close().await;
        }
        Commands::Queue => {
            let lifecycle = open_lifecycle(&config).await?;
            let requests = lifecycle.list_active(&OpContext::new()).await?;

            if requests.is_empty() {
                println!("No active download requests");
            }
            for request in &requests {
                println!("{}", format_queue_line(request));
            }
            lifecycle.store().close().await;
        }
        Commands::Deactivate { id } => {
            let lifecycle = open_lifecycle(&config).await?;
            lifecycle
                .deactivate(&OpContext::new(), &RequestId::new(id))
                .await?;
            lifecycle.store().close().await;
        }
        Commands::Find { artists, titles } => {
            let lifecycle = open_lifecycle(&config).await?;
            let files = lifecycle
                .find_music_files(&OpContext::new(), &artists, &titles)
                .await?;

            for file in &files {
                println!("{} - {}\t{}", file.artist, file.title, file.path);
            }
            lifecycle.store().close().await;
        }
    }

    Ok(())
}

async fn serve(config: BotConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Album Queue");
    tracing::info!("Health endpoint: {}:{}", config.health.host, config.health.port);

    let store: Arc<dyn RequestStore> = Arc::new(
        SqliteRequestStore::connect(
            &config.storage.database_url,
            config.storage.max_connections,
        )
        .await?,
    );
    let lifecycle = RequestLifecycle::new(Arc::clone(&store));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    let handler = CommandHandler::new(
        lifecycle,
        Arc::new(UrlNameResolver),
        config.bot.whitelist.iter().copied(),
    )
    .with_root_context(OpContext::with_token(shutdown.clone()))
    .with_request_timeout(config.request_timeout());

    let console = match config.bot.console_user_id {
        Some(sender_id) => {
            if !handler.is_authorized(sender_id) {
                tracing::warn!(sender_id, "Console user is not in the whitelist");
            }
            let shutdown = shutdown.clone();
            Some(tokio::spawn(async move {
                let stdin = BufReader::new(tokio::io::stdin());
                let stdout = tokio::io::stdout();
                if let Err(e) = run_console(&handler, sender_id, stdin, stdout, shutdown).await {
                    tracing::error!("Console failed: {}", e);
                }
            }))
        }
        None => {
            tracing::info!("No console user configured, console disabled");
            None
        }
    };

    let addr = SocketAddr::from((
        config.health.host.parse::<std::net::IpAddr>()?,
        config.health.port,
    ));
    tracing::info!("Health endpoint listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = api::router(AppState::new(Arc::clone(&store)));
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .await?;

    if let Some(console) = console {
        // Stdin reads are not cancellable, so the console task is left behind
        console.abort();
    }

    store.close().await;
    tracing::info!("Album Queue stopped");

    Ok(())
}

async fn open_lifecycle(config: &BotConfig) -> anyhow::Result<RequestLifecycle> {
    let store = SqliteRequestStore::connect(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await
    .with_context(|| format!("Failed to open {}", config.storage.database_url))?;

    Ok(RequestLifecycle::new(Arc::new(store)))
}

fn creator_id(config: &BotConfig, creator: Option<i64>) -> anyhow::Result<CreatorId> {
    creator
        .or(config.bot.console_user_id)
        .map(CreatorId::new)
        .context("No creator given (use --creator or set bot.console_user_id)")
}
