mod audio;
mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{Mutex, mpsc, watch};

use audio::Renderer;
use auth::SessionEvent;
use controller::AppController;
use model::{AppModel, DEFAULT_VOLUME, LibraryClient, PlaybackInfo, StreamLoader};
use view::AppView;

/// A fetch that never resolves would leave the controller in Loading forever;
/// every request is cut off after this long and surfaces as a network error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Waves Client Starting ===");

    let cli = config::Cli::parse();
    let base_url = cli.base_url();

    let password = match cli.password.clone() {
        Some(p) => p,
        None => auth::prompt_password(&cli.username)?,
    };

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    // Step 1: authenticate against the session boundary
    let (credential, user) = auth::login(&http, &base_url, &cli.username, &password).await?;
    println!("Logged in as {}", user.username);

    // Step 2: initial catalog
    let library = LibraryClient::new(http.clone(), base_url.clone());
    let songs = library
        .list_songs(&credential)
        .await
        .context("could not fetch the song catalog")?;
    tracing::info!(count = songs.len(), "initial catalog loaded");

    let (playback_tx, playback_rx) = watch::channel(PlaybackInfo::default());
    let (session_tx, session_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let model = Arc::new(Mutex::new(AppModel::new(
        songs,
        base_url.clone(),
        user.username,
        playback_tx,
        session_tx,
    )));

    let loader = Arc::new(StreamLoader::new(http, base_url));
    let renderer = Arc::new(Renderer::start(DEFAULT_VOLUME));

    let controller = AppController::new(
        model.clone(),
        renderer,
        loader,
        library,
        credential,
    );
    controller.start_renderer_event_listener();

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller.clone(), playback_rx, session_rx).await;

    // Restore terminal before tearing down playback
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.shutdown().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Waves client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    playback_rx: watch::Receiver<PlaybackInfo>,
    mut session_rx: mpsc::UnboundedReceiver<SessionEvent>,
) -> io::Result<()> {
    loop {
        // The session boundary forces re-authentication by ending the TUI
        // session; stored credentials stay untouched.
        if let Ok(SessionEvent::Expired) = session_rx.try_recv() {
            let mut model_guard = model.lock().await;
            model_guard.ui.should_quit = true;
            tracing::warn!("session expired, leaving TUI");
        }

        // Playback updates arrive over the watch channel; everything else is
        // read under the model lock.
        let playback = playback_rx.borrow().clone();
        let (queue, should_quit) = {
            let mut model_guard = model.lock().await;
            model_guard.auto_clear_old_errors();
            (model_guard.queue.clone(), model_guard.ui.should_quit)
        };

        {
            let model_guard = model.lock().await;
            terminal.draw(|f| {
                AppView::render(f, &playback, &model_guard.ui, &queue);
            })?;
        }

        // Handle input with a short poll time for smooth progress updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
