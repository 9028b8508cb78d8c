mod app;
mod settings;
mod state;
mod telemetry;
mod ui;

use anyhow::Result;
use app::{poll_event, spawn_dataset_fetches, App, AppAction, DashboardUpdate};
use crossterm::event::Event;
use ratatui::DefaultTerminal;
use settings::Settings;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use ui::draw_ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics on stderr so they never fight the dashboard on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut terminal = ratatui::init();
    terminal.clear()?;

    let result = run_app(&mut terminal).await;

    ratatui::restore();
    result
}

async fn run_app(terminal: &mut DefaultTerminal) -> Result<()> {
    let settings = Settings::from_env();
    tracing::info!(base_url = %settings.api_base_url, "starting dashboard");

    let mut app = App::new(settings);
    let mut update_rx: Option<mpsc::Receiver<DashboardUpdate>> =
        Some(spawn_dataset_fetches(&app.settings));

    loop {
        terminal.draw(|frame| draw_ui(frame, &app))?;

        // Apply whichever dataset resolved, in arrival order.
        if let Some(rx) = update_rx.as_mut() {
            match rx.try_recv() {
                Ok(update) => app.apply_update(update),
                Err(mpsc::error::TryRecvError::Empty) => {}
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    update_rx = None;
                }
            }
        }

        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(30))? {
            if let Some(AppAction::Quit) = app.handle_key_event(key) {
                break;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
