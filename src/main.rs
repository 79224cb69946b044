mod audio;
mod auth;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::{Player, RodioOutput};
use auth::{SessionStorage, SessionStore};
use crate::config::Settings;
use controller::AppController;
use model::{ApiClient, AppModel, CatalogCache, LikedSongsCache, PlayerState, Route};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    if let Err(message) = settings.validate() {
        return Err(anyhow::anyhow!("Invalid configuration: {}", message));
    }
    let settings = Arc::new(settings);

    if let Err(e) = logging::init_logging(&settings.logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(base_url = %settings.api.base_url, "=== tunestream Client Starting ===");

    let api = ApiClient::new(&settings.api)?;

    // Restore the previous session, if any; no network involved
    let session = SessionStore::new(api.clone(), SessionStorage::new(&settings.storage.data_dir));
    let restored = session.restore().await;

    let liked = LikedSongsCache::new(&settings.storage.data_dir);
    if let Err(e) = liked.load_from_disk().await {
        tracing::warn!(error = %e, "Could not load liked songs cache");
    }

    let app_model = AppModel::new();
    app_model
        .set_user_name(restored.as_ref().map(|s| s.name.clone()))
        .await;
    let model = Arc::new(Mutex::new(app_model));

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let output = Arc::new(RodioOutput::spawn(
        api.clone(),
        tokio::runtime::Handle::current(),
        events_tx,
        settings.playback.default_volume,
    )?);
    let player = Player::new(
        output.clone(),
        PlayerState::new(settings.playback.default_volume, settings.playback.restart_threshold()),
        settings.playback.error_retry_delay(),
    );

    let controller = AppController::new(
        model.clone(),
        player,
        api,
        session,
        CatalogCache::new(),
        liked,
        settings.clone(),
    );
    controller.start_player_event_listener(events_rx);

    if let Err(e) = controller.refresh_catalog().await {
        tracing::warn!(error = %e, "Initial catalog load failed");
    }

    // An optional path argument such as `/playlist/<id>` picks the start screen
    let start = std::env::args()
        .nth(1)
        .map(|path| Route::parse(&path))
        .unwrap_or(Route::Home);
    controller.show_route(start).await;
    controller.load_user_playlists().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller, &settings).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    output.shutdown();

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("tunestream Client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    settings: &Settings,
) -> io::Result<()> {
    let tick = Duration::from_millis(settings.ui.tick_ms);
    let message_lifetime = Duration::from_secs(settings.ui.error_display_secs);

    loop {
        let playback = controller.player.snapshot().await;
        let liked = controller.liked.snapshot().await;

        // Get current state
        let (ui_state, content_state, should_quit, search_due) = {
            let model_guard = model.lock().await;

            model_guard.auto_clear_old_messages(message_lifetime).await;

            (
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
                model_guard.take_due_search().await,
            )
        };

        if should_quit {
            break;
        }

        if search_due {
            controller.perform_search().await;
        }

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state, &liked);
        })?;

        if event::poll(tick)?
            && let Event::Key(key) = event::read()?
            && let Err(e) = controller.handle_key_event(key).await
        {
            tracing::warn!(error = %e, "Key handling failed");
        }
    }

    Ok(())
}
