mod config;
mod controller;
mod logging;
mod model;
mod player;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use config::Config;
use controller::AppController;
use model::{ApiClient, AppModel, SessionStore};
use player::{Player, RodioSink};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Impulse TUI Starting ===");

    let config = Config::from_env();
    let session = SessionStore::new();
    if let Err(e) = session.load_from_disk().await {
        tracing::warn!(error = %e, "Failed to load persisted session");
    }
    let api = ApiClient::new(&config, session);
    let model = Arc::new(AppModel::new(api));

    // Audio output. A host without a sound device still gets a browsable UI.
    let (player_events_tx, player_events_rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn player::MediaSink> = match RodioSink::new(player_events_tx) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::error!(error = %e, "audio output unavailable, playback disabled");
            model
                .set_error(format!("Audio output unavailable: {}", e))
                .await;
            Arc::new(player::NullSink)
        }
    };
    let player = Arc::new(Player::new(sink, Arc::new(model.api.clone())));

    let controller = AppController::new(model.clone(), player);
    controller.start_player_event_listener(player_events_rx);
    controller.start_session_listener();

    // Resolve the persisted token in the background so startup never blocks
    // on the network.
    let controller_for_session = controller.clone();
    tokio::spawn(async move {
        controller_for_session.restore_session().await;
    });

    controller.load_index().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Impulse TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Auto-clear old errors (after 5 seconds)
        model.auto_clear_old_errors().await;

        let playback = controller.player.playback_info().await;
        let ui_state = model.get_ui_state().await;
        let content_state = model.get_content_state().await;
        let should_quit = model.should_quit().await;

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        // Handle input with shorter poll time for smoother UI updates
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
