use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use biteread::api::{ArticleId, HttpApi};
use biteread::app::{App, AppScreen};
use biteread::config::Config;
use biteread::event::{AppEvent, EventHandler};
use biteread::logging;
use biteread::session::{Feedback, LayoutEvent};
use biteread::ui::components::article_list::ArticleList;
use biteread::ui::components::history_panel::HistoryPanel;
use biteread::ui::components::progress_bar::ProgressBar;
use biteread::ui::components::reference_panel::ReferencePanel;
use biteread::ui::components::session_summary::SummaryView;
use biteread::ui::layout::{StudyLayout, centered_rect, pack_hint_lines};
use biteread::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "biteread",
    version,
    about = "Sentence-by-sentence translation practice in the terminal"
)]
struct Cli {
    #[arg(long, help = "Base URL of the article and translation service")]
    api_url: Option<String>,

    #[arg(short, long, help = "Open this article directly")]
    article: Option<u64>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Write the effective config file and exit")]
    init_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Ignoring unreadable config: {err:#}");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    if cli.init_config {
        let path = Config::config_path();
        config.save_to(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if let Err(err) = logging::init(&config.log_level) {
        eprintln!("Logging disabled: {err:#}");
    }

    let backend = Arc::new(HttpApi::new(&config.api_url, config.request_timeout())?);
    tracing::info!(api_url = backend.base_url(), "starting");

    let theme: &'static Theme = Box::leak(Box::new(Theme::load_or_default(&config.theme)));
    let events = EventHandler::new(config.tick_rate());
    let mut app = App::new(config, theme, backend, events.sender());

    match cli.article {
        Some(id) => app.open_article(ArticleId(id)),
        None => app.refresh_articles(),
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let mut layout = Vec::new();
        terminal.draw(|frame| layout = render(frame, app))?;

        // Measurements change what the list shows, so draw again before
        // waiting for input. A second pass reports nothing new.
        if !layout.is_empty() {
            app.apply_layout(layout);
            continue;
        }

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            event => app.on_event(event),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::ArticleList => handle_list_key(app, key),
        AppScreen::Study => handle_study_key(app, key),
        AppScreen::Complete => handle_complete_key(app, key),
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.articles.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.articles.next(),
        KeyCode::Char('r') => app.refresh_articles(),
        KeyCode::Enter => app.open_selected(),
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => {
                app.session.toggle_history();
                return;
            }
            KeyCode::Char('y') => {
                app.copy_current();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => app.go_to_list(),
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.skip(),
        KeyCode::Up => app.select_relative(-1),
        KeyCode::Down => app.select_relative(1),
        KeyCode::PageUp => app.page_scroll(-1),
        KeyCode::PageDown => app.page_scroll(1),
        _ => {
            app.edit(key);
        }
    }
}

fn handle_complete_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_list(),
        KeyCode::Char('r') => app.select(0),
        KeyCode::Up => {
            let last = app.session.sentence_count().saturating_sub(1);
            app.select(last);
        }
        _ => {}
    }
}

/// Draw the current screen and return the layout measurements it produced.
fn render(frame: &mut ratatui::Frame, app: &App) -> Vec<LayoutEvent> {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::ArticleList => {
            render_article_list(frame, app);
            Vec::new()
        }
        AppScreen::Study => render_study(frame, app),
        AppScreen::Complete => {
            render_complete(frame, app);
            Vec::new()
        }
    }
}

fn render_article_list(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let status = if app.listing {
        Some("Loading articles...")
    } else {
        app.status.as_deref()
    };
    let list = ArticleList {
        menu: &app.articles,
        status,
        theme: app.theme,
    };
    frame.render_widget(list, centered_rect(70, 80, area));

    let hints = pack_hint_lines(
        &["[Enter] Study", "[j/k] Move", "[r] Refresh", "[q] Quit"],
        area.width as usize,
    );
    render_footer(frame, app, area, &hints);
}

fn render_study(frame: &mut ratatui::Frame, app: &App) -> Vec<LayoutEvent> {
    let session = &app.session;
    let colors = &app.theme.colors;
    let layout = StudyLayout::new(frame.area(), session.history_expanded());

    let title = session.article().map(|a| a.title.as_str()).unwrap_or("");
    let state = if session.is_checking() {
        "  checking..."
    } else if session.is_loading() {
        "  loading..."
    } else {
        ""
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " biteread ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {title}"), Style::default().fg(colors.fg())),
        Span::styled(state, Style::default().fg(colors.text_dim())),
    ]));
    frame.render_widget(header, layout.header);

    let (done, total) = session.progress();
    frame.render_widget(ProgressBar::sentences(done, total, app.theme), layout.progress);

    let panel =
        ReferencePanel::new(session, app.theme).copied(app.copied_sentence(Instant::now()));
    let measurements = panel.measure(layout.sentences);
    frame.render_widget(panel, layout.sentences);

    if let Some(area) = layout.history {
        let attempts = session
            .current_sentence()
            .map(|s| session.history().attempts(s.id))
            .unwrap_or(&[]);
        frame.render_widget(HistoryPanel::new(attempts, app.theme), area);
    }

    render_input(frame, app, layout.input);
    render_feedback(frame, app, layout.feedback);

    let hints = pack_hint_lines(
        &[
            "[Enter] Check",
            "[Tab] Skip",
            "[Up/Down] Sentence",
            "[PgUp/PgDn] Scroll",
            "[^R] Attempts",
            "[^Y] Copy",
            "[Esc] Articles",
        ],
        frame.area().width as usize,
    );
    render_footer(frame, app, layout.footer, &hints);

    measurements
}

fn render_input(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let locked = app.session.input_locked();

    let border = if locked {
        colors.border()
    } else {
        colors.border_focused()
    };
    let block = Block::bordered()
        .title(" Your translation ")
        .border_style(Style::default().fg(border));

    let text_style = Style::default().fg(if locked { colors.text_dim() } else { colors.fg() });
    let (before, cursor, after) = app.input.render_parts();
    let mut spans = vec![Span::styled(before, text_style)];
    if !locked {
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
        match cursor {
            Some(ch) => spans.push(Span::styled(ch.to_string(), cursor_style)),
            None => spans.push(Span::styled(" ", cursor_style)),
        }
    } else if let Some(ch) = cursor {
        spans.push(Span::styled(ch.to_string(), text_style));
    }
    spans.push(Span::styled(after, text_style));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_feedback(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let line = if app.session.is_checking() {
        Line::from(Span::styled(
            " Checking...",
            Style::default().fg(colors.text_dim()),
        ))
    } else {
        match app.session.feedback() {
            Some(Feedback::Checked {
                classification,
                message,
            }) => Line::from(vec![
                Span::styled(
                    format!(" {} ", classification.label()),
                    Style::default()
                        .fg(colors.classification(*classification))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(message.clone(), Style::default().fg(colors.fg())),
            ]),
            Some(Feedback::Error(message)) => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(colors.error()),
            )),
            None => Line::from(""),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_complete(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let title = app
        .session
        .article()
        .map(|a| a.title.as_str())
        .unwrap_or("Article");
    let view = SummaryView {
        title,
        summary: app.session.summary(),
        theme: app.theme,
    };
    frame.render_widget(view, centered_rect(50, 50, area));

    let hints = pack_hint_lines(
        &["[Enter] Articles", "[r] Study again", "[Up] Review last"],
        area.width as usize,
    );
    render_footer(frame, app, area, &hints);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[String]) {
    let Some(first) = hints.first() else {
        return;
    };
    // The article list and summary pass the whole screen; use its last row.
    let row = Rect::new(area.x, area.y + area.height.saturating_sub(1), area.width, 1);
    let footer = Paragraph::new(Line::from(Span::styled(
        first.as_str(),
        Style::default().fg(app.theme.colors.text_dim()),
    )))
    .alignment(Alignment::Left);
    frame.render_widget(footer, row);
}
