use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::session::Phase;
use crate::theme::Theme;

// Set once from config at startup; falls back to the built-in palette
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialized");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn success() -> Color { theme().success }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),               // Info line
            Constraint::Length(3),               // ID input + Fetch button
            Constraint::Length(1),               // Fetching / error line
            Constraint::Min(3),                  // Result
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_form(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2]);
    draw_result(f, app, chunks[3]);
    draw_footer(f, app, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f, app);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > phase summary
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(accent())))
    } else {
        let (label, color) = match app.session.phase() {
            Phase::Idle => ("Ready".to_string(), text_dim()),
            Phase::Fetching => (
                format!("Fetching user {}", app.session.user_id_input),
                accent(),
            ),
            Phase::Success => ("Lookup succeeded".to_string(), success()),
            Phase::Failed => ("Lookup failed".to_string(), danger()),
        };
        Line::from(vec![
            Span::styled("userfetch", Style::default().fg(text()).add_modifier(Modifier::BOLD)),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(label, Style::default().fg(color)),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let editable = app.session.can_edit();
    let submit_enabled = app.session.can_submit();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(11)])
        .split(area);

    let border_color = if editable { accent() } else { inactive() };
    let cursor = if editable { "_" } else { "" };
    let input = Paragraph::new(format!("{}{}", app.session.user_id_input, cursor))
        .style(Style::default().fg(if editable { text() } else { text_dim() }))
        .block(
            Block::default()
                .title(Span::styled(" Enter User ID (1-12) ", Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(input, chunks[0]);

    let button_style = if submit_enabled {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };
    let button_border = if submit_enabled { accent() } else { inactive() };
    let button = Paragraph::new(Span::styled("Fetch", button_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(button_border)),
        );
    f.render_widget(button, chunks[1]);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.session.is_fetching {
        let mut spans = vec![Span::styled(
            format!(
                "Fetching data. Please wait (max wait: {} seconds)...",
                app.delay_secs()
            ),
            Style::default().fg(accent()),
        )];
        if let Some(elapsed) = app.fetch_elapsed_secs() {
            spans.push(Span::styled(format!(" {}s", elapsed), Style::default().fg(text_dim())));
        }
        Line::from(spans)
    } else if app.session.show_error() {
        Line::from(Span::styled(
            app.session.error_message.as_str(),
            Style::default().fg(danger()).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from("")
    };

    f.render_widget(Paragraph::new(line), area);
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    if !app.session.is_successful {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Type an ID and press Enter",
            Style::default().fg(text_dim()),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(inactive())),
        );
        f.render_widget(hint, area);
        return;
    }

    let total = app.session.result.lines().count();
    let title = format!(" Result ({} lines) ", total);
    let title_style = Style::default().fg(success()).add_modifier(Modifier::BOLD);

    let result = Paragraph::new(app.session.result.as_str())
        .style(Style::default().fg(text()))
        .scroll((app.result_scroll, 0))
        .block(
            Block::default()
                .title(Span::styled(title, title_style))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(success())),
        );
    f.render_widget(result, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut hints: Vec<(&str, &str)> = Vec::new();
    if app.session.can_submit() {
        hints.push(("Enter", "Fetch"));
        hints.push(("^U", "Clear"));
    }
    if app.session.is_successful {
        hints.push(("↑↓", "Scroll"));
    }
    hints.push(("F1", "Help"));
    hints.push(("Esc", "Quit"));

    let hint_spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area
    );

    f.render_widget(Clear, popup_area);

    let key_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(accent())),
            Span::raw(desc),
        ])
    };

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(danger()).add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        section("═══ Form ═══"),
        key_line("  0-9 …     ", "Edit the user ID (locked while fetching)"),
        key_line("  Backspace ", "Delete last character"),
        key_line("  Ctrl+U    ", "Clear the field"),
        key_line("  Enter     ", "Fetch the user"),
        Line::from(""),
        section("═══ Result ═══"),
        key_line("  ↑/↓       ", "Scroll one line"),
        key_line("  PgUp/PgDn ", "Scroll one page"),
        key_line("  Home      ", "Back to top"),
        Line::from(""),
        section("═══ Endpoint ═══"),
        Line::from(Span::styled(
            format!("  {}", app.config.base_url),
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("F1", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" userfetch Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::session::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app() -> App {
        App::new(AppConfig::default(), "1".to_string())
    }

    #[test]
    fn test_idle_form() {
        let screen = render(&app());
        assert!(screen.contains("Enter User ID (1-12)"));
        assert!(screen.contains("1_"));
        assert!(screen.contains("Fetch"));
        assert!(!screen.contains("Please wait"));
    }

    #[test]
    fn test_fetching_shows_wait_message() {
        let mut app = app();
        app.session.dispatch(Action::StartFetch);

        let screen = render(&app);
        assert!(screen.contains("Fetching data. Please wait (max wait: 5 seconds)..."));
        assert!(!screen.contains("1_"));
    }

    #[test]
    fn test_error_and_result_regions() {
        let mut app = app();
        app.session.dispatch(Action::StartFetch);
        app.session.dispatch(Action::FetchFailed("404".to_string()));
        let screen = render(&app);
        assert!(screen.contains("Request failed. Error: 404"));
        assert!(!screen.contains("Result"));

        app.session.dispatch(Action::StartFetch);
        app.session
            .dispatch(Action::FetchSucceeded("{\n  \"id\": 1\n}".to_string()));
        let screen = render(&app);
        assert!(screen.contains("Result (3 lines)"));
        assert!(screen.contains("\"id\": 1"));
        assert!(!screen.contains("Request failed"));
    }
}
