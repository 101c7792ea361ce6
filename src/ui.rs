use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mystic_companion::{
    reset_chat, simulate_turn, write_export, BirthForm, CompanionGenerator, FormField,
    InputValidationError, Session,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Form,
    Companion,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Form => Page::Companion,
            Page::Companion => Page::Form,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Form => "Birth & Location",
            Page::Companion => "Companion",
        }
    }
}

pub struct App {
    pub form: BirthForm,
    pub focused: usize,
    pub errors: Vec<InputValidationError>,
    pub session: Option<Session>,
    pub chat_input: String,
    pub current_page: Page,
    pub status: Option<String>,
    generator: CompanionGenerator,
    export_dir: PathBuf,
}

impl App {
    pub fn new(form: BirthForm, generator: CompanionGenerator, export_dir: PathBuf) -> Self {
        App {
            form,
            focused: 0,
            errors: Vec::new(),
            session: None,
            chat_input: "Hello, who are you?".to_string(),
            current_page: Page::Form,
            status: None,
            generator,
            export_dir,
        }
    }

    pub fn focused_field(&self) -> FormField {
        FormField::ALL[self.focused]
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % FormField::ALL.len();
    }

    pub fn focus_previous(&mut self) {
        self.focused = (self.focused + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    pub fn field_error(&self, field: FormField) -> Option<&InputValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    /// "Match me!": validate the form and start a new session
    pub fn submit(&mut self) {
        match self.generator.generate_from_form(&self.form) {
            Ok(session) => {
                self.errors.clear();
                self.status = Some(format!(
                    "Matched with {} 🔮",
                    session.reading.matched.archetype.display_name()
                ));
                self.session = Some(session);
                self.current_page = Page::Companion;
            }
            Err(errors) => {
                self.status = Some(format!("{} field(s) need attention", errors.len()));
                self.errors = errors;
            }
        }
    }

    pub fn send_message(&mut self) {
        let Some(session) = self.session.take() else {
            self.status = Some("Generate a match first so your companion is ready 🌟".to_string());
            return;
        };
        let Session { reading, chat } = session;
        let chat = simulate_turn(chat, &reading, &self.chat_input);
        self.session = Some(Session { reading, chat });
        self.chat_input.clear();
    }

    pub fn reset_chat(&mut self) {
        if let Some(session) = self.session.take() {
            let Session { reading, chat } = session;
            let chat = reset_chat(chat, &reading);
            self.session = Some(Session { reading, chat });
            self.status = Some("Chat cleared".to_string());
        }
    }

    pub fn export(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match write_export(&session.chat.log, &self.export_dir, session.reading.record.name()) {
            Ok(path) => self.status = Some(format!("📥 Saved {}", path.display())),
            Err(err) => {
                error!(error = %err, "chat export failed");
                self.status = Some(format!("Export failed: {:#}", err));
            }
        }
    }

    pub fn toggle_page(&mut self) {
        if self.session.is_some() {
            self.current_page = self.current_page.next();
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_page(),
            _ => match self.current_page {
                Page::Form => self.handle_form_key(key),
                Page::Companion => self.handle_companion_key(key, ctrl),
            },
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down => self.focus_next(),
            KeyCode::Up => self.focus_previous(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.form.field_mut(self.focused_field()).pop();
            }
            KeyCode::Char(c) => self.form.field_mut(self.focused_field()).push(c),
            _ => {}
        }
    }

    fn handle_companion_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('e') if ctrl => self.export(),
            KeyCode::Char('r') if ctrl => self.reset_chat(),
            KeyCode::Enter => self.send_message(),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(c) => self.chat_input.push(c),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("terminal UI started");
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "terminal UI failed");
    }

    Ok(res?)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match (&app.current_page, &app.session) {
        (Page::Companion, Some(session)) => render_companion(f, chunks[1], app, session),
        _ => render_form(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🧭 Mystic Companion Finder  ",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in [Page::Form, Page::Companion].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    for (i, field) in FormField::ALL.iter().enumerate() {
        let focused = i == app.focused;
        let marker = if focused { "→ " } else { "  " };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<26}", field.label()), Style::default().fg(Color::Cyan)),
            Span::styled(app.form.field(*field).to_string(), value_style),
            Span::styled(if focused { "▏" } else { "" }, value_style),
        ]));

        if let Some(err) = app.field_error(*field) {
            lines.push(Line::from(Span::styled(
                format!("    ⚠ {}", err),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Press Enter to match me! 🔮",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Birth & Location "),
    );

    f.render_widget(form, area);
}

fn render_companion(f: &mut Frame, area: Rect, app: &App, session: &Session) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Snapshot
            Constraint::Length(3),  // Harmony gauge
            Constraint::Min(0),     // Gallery
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Companion card
            Constraint::Min(0),    // Chat log
            Constraint::Length(3), // Input
        ])
        .split(columns[1]);

    render_snapshot(f, left[0], session);
    render_harmony(f, left[1], session);
    render_gallery(f, left[2], session);
    render_card(f, right[0], session);
    render_chat(f, right[1], session);
    render_input(f, right[2], app);
}

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}

fn render_snapshot(f: &mut Frame, area: Rect, session: &Session) {
    let sky = &session.reading.sky;
    let m = &session.reading.matched;

    let lines = vec![
        label_value("Sun", format!("{:.2}° → {} (house {})", sky.sun_longitude, sky.sun_sign, sky.sun_house)),
        label_value("Moon", format!("{:.2}° → {} (house {})", sky.moon_longitude, sky.moon_sign, sky.moon_house)),
        label_value("Ascendant", format!("{:.2}° → {}", sky.ascendant, sky.ascendant_sign)),
        label_value("Phase", format!("{} {} ({}% lit)", sky.moon_phase.emoji(), sky.moon_phase, sky.illumination_percent())),
        label_value("Vibration", format!("{} ({})", m.vibration.score, m.vibration.realm.as_str())),
        label_value("Bioregion", m.folklore_tag.clone()),
        label_value("Tone", m.tone.as_str().to_string()),
    ];

    let snapshot = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Astrological Snapshot ✨ "));

    f.render_widget(snapshot, area);
}

fn render_harmony(f: &mut Frame, area: Rect, session: &Session) {
    let harmony = session.reading.matched.harmony;
    let waxing = if session.reading.sky.waxing { "Waxing" } else { "Waning" };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Harmony Meter 🌕 "))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .percent(harmony as u16)
        .label(format!("{}% · {} phase", harmony, waxing));

    f.render_widget(gauge, area);
}

fn render_gallery(f: &mut Frame, area: Rect, session: &Session) {
    let mut lines = Vec::new();
    for pick in &session.reading.matched.gallery {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", pick.role.title()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(pick.archetype.display_name()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", pick.reason),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let gallery = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Gallery 🎨 "));

    f.render_widget(gallery, area);
}

fn render_card(f: &mut Frame, area: Rect, session: &Session) {
    let archetype = session.reading.matched.archetype;
    let lines = vec![
        Line::from(Span::styled(
            archetype.display_name(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(archetype.description),
        Line::from(Span::styled(
            format!("{} · match score {}", archetype.element.as_str(), session.reading.matched.match_score),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Your Companion "),
        );

    f.render_widget(card, area);
}

fn render_chat(f: &mut Frame, area: Rect, session: &Session) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines = session.chat.log.lines();
    let start = lines.len().saturating_sub(visible);

    let text: Vec<Line> = lines[start..]
        .iter()
        .map(|line| {
            if line.is_user() {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(format!("✨ {}", line), Style::default().fg(Color::Green)))
            }
        })
        .collect();

    let chat = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Chat 💬 "));

    f.render_widget(chat, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(format!("{}▏", app.chat_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" You to your companion "),
    );

    f.render_widget(input, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(format!(" {} ", status), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw("| "));
    }

    let keys: &[(&str, &str)] = match app.current_page {
        Page::Form => &[("↑/↓", " Field | "), ("Enter", " Match | ")],
        Page::Companion => &[("Enter", " Send | "), ("Ctrl+E", " Export | "), ("Ctrl+R", " Reset | ")],
    };
    for (key, action) in keys {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*action));
    }
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app(dir: PathBuf) -> App {
        App::new(BirthForm::default(), CompanionGenerator::with_seed(7), dir)
    }

    fn draw(app: &App) {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
    }

    #[test]
    fn test_submit_valid_form_opens_companion_page() {
        let mut app = app(PathBuf::from("exports"));
        assert!(!app.handle_key(key(KeyCode::Enter)));

        assert_eq!(app.current_page, Page::Companion);
        assert!(app.errors.is_empty());
        assert_eq!(app.session.as_ref().unwrap().chat.log.len(), 1);
        draw(&app);
    }

    #[test]
    fn test_invalid_year_shows_inline_error() {
        let mut app = app(PathBuf::from("exports"));
        app.handle_key(key(KeyCode::Down)); // birth date
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Backspace));
        }
        for c in "1800-01-01".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.current_page, Page::Form);
        assert!(app.session.is_none());
        assert!(matches!(
            app.field_error(FormField::BirthDate),
            Some(InputValidationError::YearOutOfRange { year: 1800, .. })
        ));
        draw(&app);
    }

    #[test]
    fn test_chat_send_reset_and_quit() {
        let mut app = app(PathBuf::from("exports"));
        app.submit();

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.as_ref().unwrap().chat.log.len(), 3);
        assert!(app.chat_input.is_empty());

        // Empty input is ignored
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.as_ref().unwrap().chat.log.len(), 3);

        app.handle_key(ctrl('r'));
        assert_eq!(app.session.as_ref().unwrap().chat.log.len(), 1);

        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    #[test]
    fn test_export_key_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path().to_path_buf());
        app.submit();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(ctrl('e'));

        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        assert!(app.status.as_deref().unwrap().starts_with("📥 Saved"));
    }

    #[test]
    fn test_tab_needs_session() {
        let mut app = app(PathBuf::from("exports"));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Form);

        app.submit();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Form);
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = app(PathBuf::from("exports"));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.focused_field(), FormField::Longitude);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.focused_field(), FormField::Name);
    }
}
