/// Airwave Server - single-station live audio broadcast
use airwave_core::TrackSource;
use airwave_metadata::MusicDirectory;
use airwave_playback::PlaylistStore;
use airwave_server::{api, config::ServerConfig, services::track_loader, state::AppState};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "airwave-server")]
#[command(about = "Airwave live radio broadcast server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the broadcast and the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List and probe the tracks a music directory would broadcast
    Scan {
        /// Directory path to scan
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airwave_server=info,airwave_playback=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::Scan { path, config } => {
            scan_directory(path, config).await?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Starting Airwave Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Music directory: {}", config.station.music_dir.display());

    // Build the playlist
    let source = MusicDirectory::new(
        config.station.music_dir.clone(),
        config.station.scan_config(),
    );
    let playlist = Arc::new(PlaylistStore::new(Arc::new(source)));
    let tracks = playlist.reload();
    tracing::info!("Playlist initialized with {} tracks", tracks);

    let loader = track_loader(&config.transcoding);

    // Start the broadcast
    let station = airwave_playback::spawn(config.station.engine_config(), playlist, loader)?;
    tracing::info!("Broadcast engine running");

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    // Build application state and router
    let app_state = AppState::new(station, Arc::new(config));
    let app = api::router(app_state);

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn scan_directory(path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ServerConfig::load(config_path.as_deref())?;
    let source = MusicDirectory::new(path, config.station.scan_config());
    let tracks = source.list_tracks()?;
    let loader = track_loader(&config.transcoding);

    println!("{} tracks in {}:", tracks.len(), source.path().display());
    for id in tracks {
        match loader.load(&id).await {
            Ok(track) => println!(
                "  {}  {:.1}s  {} kbps",
                track.name(),
                track.duration().as_secs_f64(),
                track.bitrate() / 1000
            ),
            Err(e) => println!("  {}  error: {}", id.name(), e),
        }
    }

    Ok(())
}
