use crate::settings::Settings;
use crate::state::DashboardState;
use crate::telemetry::{self, DatasetError, DatasetKind, PingRecord, SpeedTestRecord};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Pings,
    SpeedTests,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Pings => Panel::SpeedTests,
            Panel::SpeedTests => Panel::Pings,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Panel::Pings => Panel::SpeedTests,
            Panel::SpeedTests => Panel::Pings,
        }
    }
}

pub struct App {
    pub state: DashboardState,
    pub should_quit: bool,

    // UI state
    pub selected_panel: Panel,
    pub expanded: bool,

    pub settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: DashboardState::new(),
            should_quit: false,
            selected_panel: Panel::Pings,
            expanded: false,
            settings,
        }
    }

    pub fn handle_key_event(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(AppAction::Quit)
            }
            KeyCode::Esc => {
                self.expanded = false;
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.expanded = !self.expanded;
                None
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                if !self.expanded {
                    self.selected_panel = self.selected_panel.next();
                }
                None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                if !self.expanded {
                    self.selected_panel = self.selected_panel.prev();
                }
                None
            }
            _ => None,
        }
    }

    /// The dataset error boundary: diagnostics go to the log, the slot gets
    /// either its records or the fixed user-facing message. Each dataset
    /// resolves exactly once; the slots enforce that.
    pub fn apply_update(&mut self, update: DashboardUpdate) {
        match update {
            DashboardUpdate::Pings(Ok(records)) => {
                tracing::debug!(count = records.len(), "ping data ready");
                self.state.pings.mark_ready(records);
            }
            DashboardUpdate::Pings(Err(err)) => {
                tracing::error!(error = %err, "ping fetch failed");
                self.state
                    .pings
                    .mark_error(err.user_message(DatasetKind::Pings));
            }
            DashboardUpdate::SpeedTests(Ok(records)) => {
                tracing::debug!(count = records.len(), "speed test data ready");
                self.state.speed_tests.mark_ready(records);
            }
            DashboardUpdate::SpeedTests(Err(err)) => {
                tracing::error!(error = %err, "speed test fetch failed");
                self.state
                    .speed_tests
                    .mark_error(err.user_message(DatasetKind::SpeedTests));
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AppAction {
    Quit,
}

pub enum DashboardUpdate {
    Pings(Result<Vec<PingRecord>, DatasetError>),
    SpeedTests(Result<Vec<SpeedTestRecord>, DatasetError>),
}

/// Fires both dataset fetches concurrently. Each task sends exactly one
/// update; if the UI loop is gone by then, the send fails and the late
/// result is discarded instead of touching torn-down state.
pub fn spawn_dataset_fetches(settings: &Settings) -> mpsc::Receiver<DashboardUpdate> {
    let (tx, rx) = mpsc::channel(2);
    let client = reqwest::Client::new();

    let pings_tx = tx.clone();
    let pings_client = client.clone();
    let pings_base = settings.api_base_url.clone();
    tokio::spawn(async move {
        let result = telemetry::load_pings(&pings_client, &pings_base).await;
        let _ = pings_tx.send(DashboardUpdate::Pings(result)).await;
    });

    let speed_base = settings.api_base_url.clone();
    tokio::spawn(async move {
        let result = telemetry::load_speed_tests(&client, &speed_base).await;
        let _ = tx.send(DashboardUpdate::SpeedTests(result)).await;
    });

    rx
}

pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
