use ch_dashboard::dashboard::{CompanySnapshot, OfficerSnapshot, Update, View};
use ch_dashboard::follows::{FollowStore, Follows};
use ch_dashboard::registry::{CompanyProfile, Filing};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Followed,
    Company,
    Officer,
}

impl Page {
    pub fn title(&self) -> &str {
        match self {
            Page::Followed => "Followed Companies",
            Page::Company => "Company",
            Page::Officer => "Officer",
        }
    }

    fn for_view(view: &View) -> Self {
        match view {
            View::Followed => Page::Followed,
            View::Company(_) => Page::Company,
            View::Officer(_) => Page::Officer,
        }
    }
}

/// Which table has the cursor on the company page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Officers,
    Filings,
}

/// Side effects requested by a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    ViewChanged(View),
    FollowsChanged(Vec<String>),
    Download(Filing),
}

pub struct App<S: FollowStore> {
    pub follows: Follows<S>,
    pub view: View,
    history: Vec<View>,
    pub profiles: Vec<CompanyProfile>,
    pub company: Option<CompanySnapshot>,
    pub officer: Option<OfficerSnapshot>,
    pub error: Option<String>,
    pub status: Option<String>,
    /// Some while the "add company" prompt is open
    pub input: Option<String>,
    pub focus: Focus,
    pub followed_state: TableState,
    pub officers_state: TableState,
    pub filings_state: TableState,
    pub appointments_state: TableState,
}

impl<S: FollowStore> App<S> {
    pub fn new(follows: Follows<S>) -> Self {
        Self {
            follows,
            view: View::Followed,
            history: Vec::new(),
            profiles: Vec::new(),
            company: None,
            officer: None,
            error: None,
            status: None,
            input: None,
            focus: Focus::Officers,
            followed_state: TableState::default(),
            officers_state: TableState::default(),
            filings_state: TableState::default(),
            appointments_state: TableState::default(),
        }
    }

    pub fn page(&self) -> Page {
        Page::for_view(&self.view)
    }

    // ========================================================================
    // UPDATES FROM THE POLLER
    // ========================================================================

    /// Apply a poll result; results for a view no longer on screen are dropped.
    pub fn apply(&mut self, update: Update) {
        if let Some(view) = update.view() {
            if view != self.view {
                return;
            }
        }

        match update {
            Update::Followed(profiles) => {
                self.profiles = profiles;
                self.error = None;
                clamp(&mut self.followed_state, self.profiles.len());
            }
            Update::Company(snapshot) => {
                clamp(&mut self.officers_state, snapshot.officers.len());
                clamp(&mut self.filings_state, snapshot.filings.len());
                self.company = Some(snapshot);
                self.error = None;
            }
            Update::Officer(snapshot) => {
                clamp(&mut self.appointments_state, snapshot.appointments.len());
                self.officer = Some(snapshot);
                self.error = None;
            }
            Update::Failed { message, .. } => self.error = Some(message),
            Update::Downloaded(path) => self.status = Some(format!("Saved {path}")),
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    fn open(&mut self, view: View) -> Action {
        if view == self.view {
            return Action::None;
        }
        let previous = std::mem::replace(&mut self.view, view.clone());
        self.history.push(previous);
        self.error = None;
        match &view {
            View::Company(_) => {
                self.company = None;
                self.focus = Focus::Officers;
                self.officers_state = TableState::default();
                self.filings_state = TableState::default();
            }
            View::Officer(_) => {
                self.officer = None;
                self.appointments_state = TableState::default();
            }
            View::Followed => {}
        }
        Action::ViewChanged(view)
    }

    fn back(&mut self) -> Action {
        match self.history.pop() {
            Some(view) => {
                self.view = view.clone();
                self.error = None;
                match &view {
                    View::Company(number) => {
                        if self.company.as_ref().is_some_and(|c| &c.number != number) {
                            self.company = None;
                            self.officers_state = TableState::default();
                            self.filings_state = TableState::default();
                        }
                    }
                    View::Officer(id) => {
                        if self.officer.as_ref().is_some_and(|o| &o.officer_id != id) {
                            self.officer = None;
                            self.appointments_state = TableState::default();
                        }
                    }
                    View::Followed => {}
                }
                Action::ViewChanged(view)
            }
            None => Action::None,
        }
    }

    fn active_list(&mut self) -> Option<(&mut TableState, usize)> {
        match self.page() {
            Page::Followed => Some((&mut self.followed_state, self.profiles.len())),
            Page::Company => {
                let company = self.company.as_ref()?;
                match self.focus {
                    Focus::Officers => Some((&mut self.officers_state, company.officers.len())),
                    Focus::Filings => Some((&mut self.filings_state, company.filings.len())),
                }
            }
            Page::Officer => {
                let len = self.officer.as_ref()?.appointments.len();
                Some((&mut self.appointments_state, len))
            }
        }
    }

    pub fn next(&mut self) {
        if let Some((state, len)) = self.active_list() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if let Some((state, len)) = self.active_list() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    fn enter(&mut self) -> Action {
        match self.page() {
            Page::Followed => {
                let number = self
                    .followed_state
                    .selected()
                    .and_then(|i| self.profiles.get(i))
                    .map(|p| p.company_number.clone());
                match number {
                    Some(number) => self.open(View::Company(number)),
                    None => Action::None,
                }
            }
            Page::Company => {
                let officer_id = self.company.as_ref().and_then(|c| {
                    if self.focus != Focus::Officers {
                        return None;
                    }
                    self.officers_state
                        .selected()
                        .and_then(|i| c.officers.get(i))
                        .and_then(|g| g.officer_id.clone())
                });
                match officer_id {
                    Some(id) => self.open(View::Officer(id)),
                    None => Action::None,
                }
            }
            Page::Officer => {
                let number = self.officer.as_ref().and_then(|o| {
                    self.appointments_state
                        .selected()
                        .and_then(|i| o.appointments.get(i))
                        .map(|a| a.company_number.clone())
                });
                match number {
                    Some(number) => self.open(View::Company(number)),
                    None => Action::None,
                }
            }
        }
    }

    fn selected_filing(&self) -> Option<Filing> {
        let company = self.company.as_ref()?;
        self.filings_state
            .selected()
            .and_then(|i| company.filings.get(i))
            .cloned()
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    fn submit_input(&mut self) -> Action {
        let Some(number) = self.input.take() else {
            return Action::None;
        };
        match self.follows.add(&number) {
            Ok(true) => {
                self.status = Some(format!("Following {}", number.trim()));
                Action::FollowsChanged(self.follows.companies().to_vec())
            }
            Ok(false) => {
                self.status = Some(format!("Already following {}", number.trim()));
                Action::None
            }
            Err(e) => {
                self.status = Some(e.to_string());
                Action::None
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        if let Some(input) = self.input.as_mut() {
            match code {
                KeyCode::Enter => return self.submit_input(),
                KeyCode::Esc => self.input = None,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return Action::None;
        }

        match code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('a') if self.page() == Page::Followed => {
                self.input = Some(String::new());
                Action::None
            }
            KeyCode::Char('h') => self.open(View::Followed),
            KeyCode::Tab if self.page() == Page::Company => {
                self.focus = match self.focus {
                    Focus::Officers => Focus::Filings,
                    Focus::Filings => Focus::Officers,
                };
                Action::None
            }
            KeyCode::Char('d') if self.page() == Page::Company && self.focus == Focus::Filings => {
                match self.selected_filing() {
                    Some(filing) => {
                        self.status = Some(format!("Downloading {}...", filing.transaction_id));
                        Action::Download(filing)
                    }
                    None => Action::None,
                }
            }
            KeyCode::Enter => self.enter(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                Action::None
            }
            _ => Action::None,
        }
    }
}

fn clamp(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

/// Channels between the blocking UI loop and the async poll/download tasks.
pub struct UiChannels {
    pub view_tx: watch::Sender<View>,
    pub follows_tx: watch::Sender<Vec<String>>,
    pub download_tx: mpsc::UnboundedSender<Filing>,
    pub updates: mpsc::UnboundedReceiver<Update>,
}

pub fn run_ui<S: FollowStore>(app: &mut App<S>, channels: &mut UiChannels) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, channels);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend, S: FollowStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    channels: &mut UiChannels,
) -> Result<()> {
    loop {
        while let Ok(update) = channels.updates.try_recv() {
            app.apply(update);
        }

        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key.code) {
            Action::Quit => return Ok(()),
            Action::ViewChanged(view) => {
                let _ = channels.view_tx.send(view);
            }
            Action::FollowsChanged(list) => {
                let _ = channels.follows_tx.send(list);
            }
            Action::Download(filing) => {
                let _ = channels.download_tx.send(filing);
            }
            Action::None => {}
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<S: FollowStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if let Some(message) = app.error.clone() {
        let error = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(error, chunks[1]);
    } else {
        match app.page() {
            Page::Followed => render_followed(f, chunks[1], app),
            Page::Company => render_company(f, chunks[1], app),
            Page::Officer => render_officer(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header<S: FollowStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let pages = [Page::Followed, Page::Company, Page::Officer];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.page() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Following: {}", app.follows.companies().len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::White };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn render_followed<S: FollowStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let rows = app.profiles.iter().map(|p| {
        Row::new(vec![
            Cell::from(p.company_number.clone()),
            Cell::from(p.company_name.clone()),
            Cell::from(p.company_status.clone().unwrap_or_default()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(30),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Number", "Name", "Status"]))
    .block(block(" Followed Companies ".to_string(), true))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.followed_state);
}

fn render_company<S: FollowStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let Some(company) = app.company.as_ref() else {
        f.render_widget(
            Paragraph::new("Loading company data…").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = format!(
        " {} ({}) ",
        company.profile.company_name, company.number
    );

    let officer_rows = company.officers.iter().map(|group| {
        let roles: Vec<Span> = group
            .roles
            .iter()
            .flat_map(|r| {
                let color = if r.active { Color::Green } else { Color::Red };
                let state = if r.active { "Active" } else { "Inactive" };
                [
                    Span::raw(format!("{} ", r.label())),
                    Span::styled(format!("[{state}] "), Style::default().fg(color)),
                ]
            })
            .collect();
        Row::new(vec![
            Cell::from(group.name.clone()),
            Cell::from(Line::from(roles)),
        ])
    });

    let officers = Table::new(officer_rows, [Constraint::Percentage(45), Constraint::Percentage(55)])
        .header(header_row(&["Officer", "Roles"]))
        .block(block(format!("{title}Officers "), app.focus == Focus::Officers))
        .highlight_style(highlight())
        .highlight_symbol("→ ");

    let filing_rows = company.filings.iter().map(|filing| {
        let description = filing.description.clone().unwrap_or_default();
        let details = filing
            .details()
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        Row::new(vec![
            Cell::from(filing.date.to_string()),
            Cell::from(filing.filing_type.clone()),
            Cell::from(truncate(&description, 40)),
            Cell::from(truncate(&details, 40)),
        ])
    });

    let filings = Table::new(
        filing_rows,
        [
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Percentage(45),
            Constraint::Percentage(40),
        ],
    )
    .header(header_row(&["Date", "Type", "Description", "Details"]))
    .block(block(" Filings ".to_string(), app.focus == Focus::Filings))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(officers, chunks[0], &mut app.officers_state);
    f.render_stateful_widget(filings, chunks[1], &mut app.filings_state);
}

fn render_officer<S: FollowStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let Some(officer) = app.officer.as_ref() else {
        f.render_widget(
            Paragraph::new("Loading appointments…").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    if officer.appointments.is_empty() {
        f.render_widget(
            Paragraph::new("No appointments found for this officer.")
                .wrap(Wrap { trim: true })
                .block(block(format!(" {} ", officer.title), true)),
            area,
        );
        return;
    }

    let rows = officer.appointments.iter().map(|a| {
        Row::new(vec![
            Cell::from(a.company_number.clone()),
            Cell::from(a.company_name.clone()),
        ])
    });

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(30)])
        .header(header_row(&["Number", "Company"]))
        .block(block(
            format!(" {} · Officer ID: {} ", officer.title, officer.officer_id),
            true,
        ))
        .highlight_style(highlight())
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.appointments_state);
}

fn render_status_bar<S: FollowStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut status_spans = vec![];

    if let Some(input) = &app.input {
        status_spans.push(Span::styled(" Company number: ", Style::default().fg(Color::Cyan)));
        status_spans.push(Span::raw(format!("{input}▏")));
        status_spans.push(Span::raw("  ("));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" add, "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" cancel)"));
    } else {
        if let Some(status) = &app.status {
            status_spans.push(Span::styled(format!(" {status} "), Style::default().fg(Color::Green)));
            status_spans.push(Span::raw("|"));
        }
        let keys: &[(&str, &str)] = match app.page() {
            Page::Followed => &[("a", "Add"), ("Enter", "Open"), ("q", "Quit")],
            Page::Company => &[
                ("Tab", "Officers/Filings"),
                ("Enter", "Officer"),
                ("d", "Download PDF"),
                ("Esc", "Back"),
                ("q", "Quit"),
            ],
            Page::Officer => &[("Enter", "Company"), ("Esc", "Back"), ("h", "Home"), ("q", "Quit")],
        };
        for (key, label) in keys {
            status_spans.push(Span::raw(" "));
            status_spans.push(Span::styled(key.to_string(), Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(format!(" {label} |")));
        }
    }

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ch_dashboard::dashboard::poller::COMPANY_ERROR;
    use ch_dashboard::follows::MemoryStore;
    use ch_dashboard::officers::{AppointmentSummary, OfficerGroup, RoleStatus};
    use serde_json::json;

    fn app() -> App<MemoryStore> {
        App::new(Follows::load(MemoryStore::new()).unwrap())
    }

    fn profile(number: &str) -> CompanyProfile {
        CompanyProfile {
            company_name: format!("Company {number}"),
            company_number: number.to_string(),
            company_status: None,
            date_of_creation: None,
        }
    }

    fn snapshot(number: &str) -> CompanySnapshot {
        CompanySnapshot {
            number: number.to_string(),
            profile: profile(number),
            officers: vec![OfficerGroup {
                name: "DOE, Jane".to_string(),
                officer_id: Some("j1".to_string()),
                roles: vec![RoleStatus { role: "director".to_string(), active: true }],
            }],
            filings: vec![serde_json::from_value(json!({
                "transaction_id": "T1", "type": "AA", "date": "2024-01-01",
                "links": { "document_metadata": "/meta/T1" }
            }))
            .unwrap()],
        }
    }

    #[test]
    fn test_add_company_via_prompt() {
        let mut app = app();
        assert_eq!(app.handle_key(KeyCode::Char('a')), Action::None);
        for c in "0123".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        assert_eq!(
            app.handle_key(KeyCode::Enter),
            Action::FollowsChanged(vec!["0123".to_string()])
        );

        app.handle_key(KeyCode::Char('a'));
        for c in "0123".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        assert_eq!(app.handle_key(KeyCode::Enter), Action::None);
        assert_eq!(app.follows.companies(), &["0123"]);
    }

    #[test]
    fn test_stale_updates_dropped() {
        let mut app = app();
        app.apply(Update::Company(snapshot("1")));
        assert!(app.company.is_none());

        app.apply(Update::Followed(vec![profile("1")]));
        assert_eq!(app.profiles.len(), 1);
        assert_eq!(app.followed_state.selected(), Some(0));
    }

    #[test]
    fn test_open_company_then_download_then_back() {
        let mut app = app();
        app.apply(Update::Followed(vec![profile("1")]));

        assert_eq!(app.handle_key(KeyCode::Enter), Action::ViewChanged(View::Company("1".to_string())));
        app.apply(Update::Company(snapshot("1")));

        // officers have focus; 'd' only works on filings
        assert_eq!(app.handle_key(KeyCode::Char('d')), Action::None);
        app.handle_key(KeyCode::Tab);
        match app.handle_key(KeyCode::Char('d')) {
            Action::Download(filing) => assert_eq!(filing.transaction_id, "T1"),
            other => panic!("unexpected action: {:?}", other),
        }

        assert_eq!(app.handle_key(KeyCode::Esc), Action::ViewChanged(View::Followed));
    }

    #[test]
    fn test_enter_on_officer_opens_officer_page() {
        let mut app = app();
        app.apply(Update::Followed(vec![profile("1")]));
        app.handle_key(KeyCode::Enter);
        app.apply(Update::Company(snapshot("1")));

        assert_eq!(app.handle_key(KeyCode::Enter), Action::ViewChanged(View::Officer("j1".to_string())));
        assert_eq!(app.page(), Page::Officer);
    }

    #[test]
    fn test_back_drops_snapshot_of_other_company() {
        let mut app = app();
        app.apply(Update::Followed(vec![profile("1")]));
        app.handle_key(KeyCode::Enter);
        app.apply(Update::Company(snapshot("1")));

        // company 1 -> officer j1 -> company 2
        app.handle_key(KeyCode::Enter);
        app.apply(Update::Officer(OfficerSnapshot {
            officer_id: "j1".to_string(),
            title: "DOE, Jane".to_string(),
            appointments: vec![AppointmentSummary {
                company_number: "2".to_string(),
                company_name: "Company 2".to_string(),
            }],
        }));
        assert_eq!(app.handle_key(KeyCode::Enter), Action::ViewChanged(View::Company("2".to_string())));
        app.apply(Update::Company(snapshot("2")));

        // back to the officer: same id, snapshot kept
        assert_eq!(app.handle_key(KeyCode::Esc), Action::ViewChanged(View::Officer("j1".to_string())));
        assert!(app.officer.is_some());

        // back to company 1: company 2's data must not show
        assert_eq!(app.handle_key(KeyCode::Esc), Action::ViewChanged(View::Company("1".to_string())));
        assert!(app.company.is_none());
        app.apply(Update::Company(snapshot("1")));
        assert_eq!(app.company.as_ref().map(|c| c.number.as_str()), Some("1"));
    }

    #[test]
    fn test_failure_shows_generic_message() {
        let mut app = app();
        app.apply(Update::Followed(vec![profile("1")]));
        app.handle_key(KeyCode::Enter);
        app.apply(Update::Failed {
            view: View::Company("1".to_string()),
            message: COMPANY_ERROR.to_string(),
        });
        assert_eq!(app.error.as_deref(), Some(COMPANY_ERROR));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer string", 10), "a much ...");
    }
}
