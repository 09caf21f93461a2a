mod api;
mod app;
mod config;
mod session;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::UserApi;
use app::{App, Popup};
use config::AppConfig;
use session::{Action, Session};

#[derive(Parser, Debug)]
#[command(name = "userfetch")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Look up a user by ID from a terminal form")]
struct Args {
    /// ID pre-filled in the form
    #[arg(short, long)]
    id: Option<String>,

    /// API host, e.g. https://reqres.in
    #[arg(short, long)]
    base_url: Option<String>,

    /// Value for the delay query parameter
    #[arg(short, long)]
    delay: Option<u32>,

    /// Look up one user, print the JSON and exit (no TUI)
    #[arg(short, long, value_name = "ID")]
    fetch: Option<String>,
}

impl Args {
    /// Command line wins over the config file
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ref base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(delay) = self.delay {
            config.delay_secs = delay;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so the alternate screen stays clean)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    args.apply(&mut config);

    // Handle CLI-only commands
    if let Some(ref user_id) = args.fetch {
        return fetch_once(&UserApi::from_config(&config), user_id).await;
    }

    let initial_id = args
        .id
        .clone()
        .unwrap_or_else(|| config.default_user_id.clone());

    // Run TUI
    run_tui(config, initial_id).await
}

/// Drive one lookup through the same state machine the form uses
async fn fetch_once(api: &UserApi, user_id: &str) -> Result<()> {
    let session = Session::new(user_id).reduce(Action::StartFetch);
    let action = api.fetch_action(&session.user_id_input).await;
    let session = session.reduce(action);

    if session.is_successful {
        println!("{}", session.result);
        Ok(())
    } else {
        anyhow::bail!("{}", session.error_message)
    }
}

async fn run_tui(config: AppConfig, initial_id: String) -> Result<()> {
    ui::init_theme(theme::Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, initial_id);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll off the runtime threads so the request task keeps running
        let ready = tokio::task::block_in_place(|| {
            event::poll(std::time::Duration::from_millis(100))
        })?;

        if ready {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.set_status(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Apply finished lookups
        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "userfetch",
            "--base-url",
            "http://localhost:9000/",
            "--delay",
            "0",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.delay_secs, 0);
        assert_eq!(config.default_user_id, "1");
    }

    #[tokio::test]
    async fn test_fetch_once_reports_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let api = UserApi::with_client(http, format!("http://{}", addr), 0);

        let err = fetch_once(&api, "1").await.unwrap_err();
        assert!(err.to_string().starts_with("Request failed. Error: "));
    }
}
