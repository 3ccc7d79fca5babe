mod audio;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audio::{AudioBackend, UnavailableBackend};
use config::Config;
use controller::AppController;
use model::{AppModel, Catalog, PlaybackStore, SaavnClient};
use view::AppView;

/// Terminal music player for the JioSaavn search API
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/saavn-rs/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Query used for the unfiltered catalog listing
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== saavn-rs starting ===");

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let mut config = config::load_config(&config_path);
    if let Some(query) = cli.query.filter(|q| !q.trim().is_empty()) {
        config.api.default_query = query;
    }
    tracing::debug!(?config, "Configuration loaded");

    let http = SaavnClient::http_client()?;
    let client = SaavnClient::new(http.clone(), &config.api);

    // The output stream must outlive every handle, so it stays on this stack
    let (_output, backend) = setup_audio(&config, http);

    let player = Arc::new(PlaybackStore::new(backend));
    let catalog = Catalog::new(config.api.default_query.clone(), config.api.page_size);
    let model = Arc::new(AppModel::new(client, player.clone(), catalog));
    let controller = AppController::new(model.clone());

    controller.start_track_end_watcher();

    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.load_songs(1).await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.stop().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("saavn-rs shutting down");
    Ok(())
}

#[cfg(feature = "audio")]
type OutputGuard = Option<rodio::OutputStream>;
#[cfg(not(feature = "audio"))]
type OutputGuard = ();

/// Open the default output device. Playback failures surface in the UI
/// instead of aborting startup when no device is available.
#[cfg(feature = "audio")]
fn setup_audio(config: &Config, http: reqwest::Client) -> (OutputGuard, Arc<dyn AudioBackend>) {
    match rodio::OutputStream::try_default() {
        Ok((stream, handle)) => {
            tracing::info!(volume = config.audio.volume, "Audio output ready");
            let backend = audio::RodioBackend::new(
                handle,
                http,
                config.audio.volume,
                config.audio.download_timeout(),
            );
            (Some(stream), Arc::new(backend))
        }
        Err(e) => {
            tracing::error!(error = %e, "No audio output device");
            (None, Arc::new(UnavailableBackend::new(e.to_string())))
        }
    }
}

#[cfg(not(feature = "audio"))]
fn setup_audio(_config: &Config, _http: reqwest::Client) -> (OutputGuard, Arc<dyn AudioBackend>) {
    tracing::warn!("Built without the audio feature, playback disabled");
    ((), Arc::new(UnavailableBackend::new("built without audio support")))
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        model.auto_clear_old_errors().await;

        let (playback, ui_state, catalog, should_quit) = (
            model.get_playback_info().await,
            model.get_ui_state().await,
            model.get_catalog_view().await,
            model.should_quit().await,
        );

        if should_quit {
            break;
        }

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &catalog);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
