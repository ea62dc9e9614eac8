use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use tracing::warn;

use crate::display::{format_change, relative_time, truncate};
use crate::filter;
use crate::metrics::MetricsSnapshot;
use crate::models::{ApplicationInput, ApplicationRecord, Status, StatusFilter};
use crate::store::RecordStore;
use crate::tracker::Tracker;

struct AppState<'t, S: RecordStore> {
    tracker: &'t mut Tracker<S>,
    filter: StatusFilter,
    query: String,
    searching: bool,
    visible: Vec<ApplicationRecord>,
    metrics: MetricsSnapshot,
    selected: usize,
    scroll_offset: u16,
    message: Option<String>,
}

impl<'t, S: RecordStore> AppState<'t, S> {
    fn new(tracker: &'t mut Tracker<S>, filter: StatusFilter) -> Self {
        let mut state = Self {
            tracker,
            filter,
            query: String::new(),
            searching: false,
            visible: Vec::new(),
            metrics: MetricsSnapshot::default(),
            selected: 0,
            scroll_offset: 0,
            message: None,
        };
        state.refresh();
        state
    }

    /// Recomputes the visible list and its metrics from the tracker.
    fn refresh(&mut self) {
        self.visible = self.tracker.applications(self.filter, &self.query).records;
        self.metrics = MetricsSnapshot::compute(&self.visible, &Local::now());
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    fn current(&self) -> Option<&ApplicationRecord> {
        self.visible.get(self.selected)
    }

    fn next(&mut self) {
        if !self.visible.is_empty() && self.selected < self.visible.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn set_status(&mut self, status: Status) {
        let Some(record) = self.current() else { return };
        let id = record.id.clone();
        let input = ApplicationInput::from_record(record).with_status(status);

        self.message = match self.tracker.update(&id, input, &Local::now()) {
            Ok(updated) => Some(format!("{} marked {}", updated.company, status.label())),
            Err(e) => {
                warn!(error = %e, "status change failed");
                Some(format!("Update failed: {}", e))
            }
        };
        self.refresh();
    }

    fn delete_current(&mut self) {
        let Some(record) = self.current() else { return };
        let id = record.id.clone();

        self.message = match self.tracker.remove(&id) {
            Ok(removed) => Some(format!("Deleted {} - {}", removed.company, removed.position)),
            Err(e) => {
                warn!(error = %e, "delete failed");
                Some(format!("Delete failed: {}", e))
            }
        };
        self.refresh();
    }
}

pub fn run_browse<S: RecordStore>(tracker: &mut Tracker<S>, filter: StatusFilter) -> Result<()> {
    if tracker.records().is_empty() {
        println!("No applications tracked yet. Add one with 'jobtrack add'.");
        return Ok(());
    }

    let mut state = AppState::new(tracker, filter);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<S: RecordStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState<'_, S>,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if state.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => state.searching = false,
                KeyCode::Backspace => {
                    state.query.pop();
                    state.refresh();
                }
                KeyCode::Char(c) => {
                    state.query.push(c);
                    state.selected = 0;
                    state.refresh();
                }
                _ => {}
            }
        } else {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('/') => state.searching = true,
                KeyCode::Char('f') => {
                    state.filter = state.filter.cycle();
                    state.selected = 0;
                    state.refresh();
                }
                KeyCode::Char('a') => state.set_status(Status::Applied),
                KeyCode::Char('i') => state.set_status(Status::Interviewing),
                KeyCode::Char('o') => state.set_status(Status::Offer),
                KeyCode::Char('x') => state.set_status(Status::Rejected),
                KeyCode::Char('s') => state.set_status(Status::Saved),
                KeyCode::Char('d') => state.delete_current(),
                _ => {}
            }
        }
        list_state.select(if state.visible.is_empty() { None } else { Some(state.selected) });
    }
    Ok(())
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Applied => Style::default().fg(Color::Blue),
        Status::Interviewing => Style::default().fg(Color::Cyan),
        Status::Offer => Style::default().fg(Color::Green),
        Status::Rejected => Style::default().fg(Color::Red),
        Status::Saved => Style::default().fg(Color::Yellow),
    }
}

fn draw<S: RecordStore>(frame: &mut Frame, state: &AppState<'_, S>, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_stats(frame, state, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    // Left panel: application list
    let counts = filter::status_counts(state.tracker.records());
    let items: Vec<ListItem> = state
        .visible
        .iter()
        .map(|app| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<13}", app.status.label()), status_style(app.status)),
                Span::raw(format!(
                    "{} | {}",
                    truncate(&app.position, 26),
                    truncate(&app.company, 18)
                )),
            ]))
        })
        .collect();

    let title = if state.query.is_empty() {
        format!(" {} ({}) ", state.filter.label(), counts.get(state.filter))
    } else {
        format!(
            " {} ({}) matching '{}' ",
            state.filter.label(),
            state.visible.len(),
            state.query
        )
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: application detail
    let detail_widget = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer: search prompt, last action, or key help
    let footer = if state.searching {
        Paragraph::new(format!(" search: {}_", state.query))
    } else if let Some(message) = &state.message {
        Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Yellow))
    } else {
        Paragraph::new(
            " j/k:navigate  /:search  f:filter  a:applied i:interviewing o:offer x:rejected s:saved  d:delete  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(footer, rows[2]);
}

fn draw_stats<S: RecordStore>(frame: &mut Frame, state: &AppState<'_, S>, area: Rect) {
    let current = &state.metrics.current;
    let changes = state.metrics.changes();
    let cards = [
        ("Total Applications", current.total_applications.to_string(), changes.total_applications),
        ("In Progress", current.in_progress.to_string(), changes.in_progress),
        ("Success Rate", format!("{:.1}%", current.success_rate), changes.success_rate),
        ("Rejection Rate", format!("{:.1}%", current.rejection_rate), changes.rejection_rate),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value, change), column) in cards.into_iter().zip(columns.iter()) {
        let text = Text::from(vec![
            Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(format_change(change), Style::default().fg(Color::DarkGray))),
        ]);
        let card = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
        frame.render_widget(card, *column);
    }
}

fn build_detail<'a, S: RecordStore>(state: &'a AppState<'_, S>) -> Text<'a> {
    let Some(app) = state.current() else {
        return Text::raw(if state.query.is_empty() && state.filter == StatusFilter::All {
            "No applications yet"
        } else {
            "No applications found. Try changing your search or filter."
        });
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &app.position,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status.label()),
        status_style(app.status),
    )));
    lines.push(Line::from(format!(
        "Applied: {} ({})",
        app.date_applied.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        relative_time(app.date_applied, Utc::now())
    )));
    if let Some(link) = &app.link {
        lines.push(Line::from(format!("Link: {}", link)));
    }
    if let Some(logo) = &app.logo {
        lines.push(Line::from(format!("Logo: {}", logo)));
    }
    lines.push(Line::from(Span::styled(
        format!("ID: {}", app.id),
        Style::default().fg(Color::DarkGray),
    )));

    if app.status == Status::Interviewing {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Interview Scheduled",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&format!("Interview for {} position", app.position), 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}
