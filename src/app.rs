use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::UserApi;
use crate::config::AppConfig;
use crate::session::{Action, Session};

/// Seconds a status line message stays visible
const STATUS_TIMEOUT_SECS: u64 = 3;

/// Lines moved per PageUp/PageDown in the result panel
const PAGE_LINES: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub session: Session,
    pub popup: Popup,
    pub config: AppConfig,

    api: UserApi,

    // Finished lookups are sent back from their task and applied in tick()
    results_tx: mpsc::UnboundedSender<Action>,
    results_rx: mpsc::UnboundedReceiver<Action>,

    pub fetch_started: Option<Instant>,
    pub result_scroll: u16,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig, initial_id: String) -> Self {
        let api = UserApi::from_config(&config);
        Self::with_api(config, api, initial_id)
    }

    pub fn with_api(config: AppConfig, api: UserApi, initial_id: String) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        Self {
            session: Session::new(initial_id),
            popup: Popup::None,
            config,
            api,
            results_tx,
            results_rx,
            fetch_started: None,
            result_scroll: 0,
            status_message: None,
            status_message_time: None,
        }
    }

    pub fn delay_secs(&self) -> u32 {
        self.api.delay_secs()
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.submit()?,

            KeyCode::F(1) => self.popup = Popup::Help,

            // Clear the field
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_input(|input| input.clear());
            }

            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.edit_input(|input| input.push(c));
            }

            KeyCode::Backspace => {
                self.edit_input(|input| {
                    input.pop();
                });
            }

            // Result scrolling
            KeyCode::Down => self.scroll_by(1),
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(PAGE_LINES as i32),
            KeyCode::PageUp => self.scroll_by(-(PAGE_LINES as i32)),
            KeyCode::Home => self.result_scroll = 0,

            _ => {}
        }
        Ok(())
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        if !self.session.can_edit() {
            self.set_status("Input is locked while fetching");
            return;
        }

        let mut value = self.session.user_id_input.clone();
        edit(&mut value);
        self.session.dispatch(Action::TypeId(value));
    }

    fn scroll_by(&mut self, delta: i32) {
        if !self.session.is_successful {
            return;
        }

        let max = self.session.result.lines().count().saturating_sub(1);
        let max = u16::try_from(max).unwrap_or(u16::MAX) as i32;
        let next = (self.result_scroll as i32 + delta).clamp(0, max);
        self.result_scroll = next as u16;
    }

    /// Start a lookup for the current input
    pub fn submit(&mut self) -> Result<()> {
        if !self.session.can_submit() {
            self.set_status("A lookup is already in progress");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .context("No async runtime available for the request")?;

        let user_id = self.session.user_id_input.clone();
        self.session.dispatch(Action::StartFetch);
        self.fetch_started = Some(Instant::now());
        self.result_scroll = 0;

        tracing::info!("Looking up user {:?}", user_id);

        let api = self.api.clone();
        let results_tx = self.results_tx.clone();
        runtime.spawn(async move {
            let action = api.fetch_action(&user_id).await;
            // Receiver is gone only when the app has exited
            let _ = results_tx.send(action);
        });

        Ok(())
    }

    /// Apply finished lookups and expire the status line
    pub fn tick(&mut self) {
        while let Ok(action) = self.results_rx.try_recv() {
            let finished = matches!(
                action,
                Action::FetchSucceeded(_) | Action::FetchFailed(_)
            );

            self.session.dispatch(action);

            if finished {
                self.fetch_started = None;
                if self.config.notifications {
                    self.notify_finished();
                }
            }
        }

        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Whole seconds since the outstanding lookup started
    pub fn fetch_elapsed_secs(&self) -> Option<u64> {
        self.fetch_started.map(|start| start.elapsed().as_secs())
    }

    fn notify_finished(&self) {
        let body = if self.session.is_successful {
            format!("User {} loaded", self.session.user_id_input)
        } else {
            self.session.error_message.clone()
        };

        if let Err(e) = notify_rust::Notification::new()
            .summary("userfetch")
            .body(&body)
            .icon("network-transmit-receive")
            .show()
        {
            tracing::debug!("Notification failed: {}", e);
        }
    }
}
