use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use prepline_core::{
    journal::{FileLogSink, LogSink},
    session::{Advance, Session, SessionStatus, SessionSummary},
    snapshot::{KitchenSnapshot, StationSnapshot},
    station::STATION_COUNT,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const INPUT_POLL: Duration = Duration::from_millis(250);
const JOURNAL_TAIL: usize = 12;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

enum AppEvent {
    Input(Event),
}

/// Terminal front end driving one kitchen session.
pub struct PreplineApp<S = FileLogSink> {
    session: Session,
    sink: S,
    theme: Theme,
    status: String,
    summary: Option<SessionSummary>,
    should_quit: bool,
}

impl<S: LogSink> PreplineApp<S> {
    pub fn new(session: Session, sink: S) -> Self {
        Self {
            session,
            sink,
            theme: Theme::default(),
            status: "Press y to run the next step, n to stop".to_string(),
            summary: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = self.drive(&mut terminal, &mut event_rx).await;
        restore_terminal(&mut terminal)?;
        result?;

        if let Some(summary) = &self.summary {
            println!(
                "Session ended ({}): {} served in {} steps. Log: {}",
                summary.reason,
                summary.served,
                summary.steps,
                self.log_location()
            );
        }
        Ok(())
    }

    /// Run the event loop, then flush the journal however the loop ended.
    async fn drive<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        let result = self.event_loop(terminal, event_rx).await;
        if self.summary.is_none() {
            self.flush_log();
        }
        result
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                self.handle_key(key);
                true
            }
            Some(AppEvent::Input(_)) => true,
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.summary.is_some() {
            self.should_quit = true;
            return;
        }
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        let signal = if ctrl_c {
            Some(Advance::Stop)
        } else {
            signal_for(key.code)
        };
        let Some(signal) = signal else {
            return;
        };

        match self.session.advance(signal) {
            Ok(SessionStatus::Running) => self.status = self.describe_last_step(),
            Ok(SessionStatus::Ended(_)) => self.flush_log(),
            Err(err) => {
                error!(?err, "routing step failed");
                self.status = format!("Error: {err}");
            }
        }
    }

    fn describe_last_step(&self) -> String {
        let served = format!("{}/{} served", self.session.served(), self.session.target());
        match self.session.engine().log().events().last() {
            Some(event) => format!("{event}  ({served})"),
            None => served,
        }
    }

    fn flush_log(&mut self) {
        match self.session.finish(&mut self.sink) {
            Ok(summary) => {
                let location = self.log_location();
                info!(
                    reason = %summary.reason,
                    served = summary.served,
                    log = %location,
                    "session log written"
                );
                self.status = format!(
                    "Session ended ({}) with {} served. Log written to {location}. Press any key to exit",
                    summary.reason, summary.served
                );
                self.summary = Some(summary);
            }
            Err(err) => {
                error!(?err, "failed to write session log");
                self.status = format!("Failed to write session log: {err:#}");
                self.should_quit = true;
            }
        }
    }

    fn log_location(&self) -> String {
        self.sink
            .location()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "memory".to_string())
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.session.engine().snapshot();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(frame.size());

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);
        self.render_customer_line(frame, top[0], &snapshot);
        self.render_belt(frame, top[1], &snapshot);

        let station_columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, STATION_COUNT as u32); STATION_COUNT])
            .split(rows[1]);
        for (station, area) in snapshot.stations.iter().zip(station_columns.iter()) {
            self.render_station(frame, *area, station);
        }

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(20)])
            .split(rows[2]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(bottom[0]);
        self.render_reserve(frame, side[0], &snapshot);
        self.render_priority(frame, side[1], &snapshot);
        self.render_journal(frame, bottom[1]);

        self.render_status(frame, rows[3], &snapshot);
    }

    fn render_customer_line(&self, frame: &mut Frame, area: Rect, snapshot: &KitchenSnapshot) {
        let title = format!("Customer line ({})", snapshot.customer_line.len());
        let text = if snapshot.customer_line.is_empty() {
            Line::from(Span::styled("nobody waiting", Style::default().fg(self.theme.muted)))
        } else {
            let names: Vec<&str> = snapshot
                .customer_line
                .iter()
                .map(|order| order.id.as_str())
                .collect();
            Line::from(names.join(" < "))
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_belt(&self, frame: &mut Frame, area: Rect, snapshot: &KitchenSnapshot) {
        let title = format!("Belt ({})", snapshot.belt.len());
        let mut spans = Vec::new();
        for (index, ingredient) in snapshot.belt.iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled(" | ", Style::default().fg(self.theme.muted)));
            }
            let style = if index == 0 {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            spans.push(Span::styled(ingredient.to_string(), style));
        }
        if spans.is_empty() {
            spans.push(Span::styled("empty", Style::default().fg(self.theme.muted)));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_station(&self, frame: &mut Frame, area: Rect, station: &StationSnapshot) {
        let title = match &station.customer {
            Some(customer) => format!("{} · {customer}", station.id),
            None => format!("{} · idle", station.id),
        };
        let border_style = if station.complete {
            Style::default().fg(self.theme.success)
        } else {
            Style::default().fg(self.theme.accent_alt)
        };

        let mut lines: Vec<Line> = station
            .required
            .iter()
            .map(|ingredient| {
                if station.holds(ingredient) {
                    Line::from(Span::styled(
                        format!("[x] {ingredient}"),
                        Style::default().fg(self.theme.success),
                    ))
                } else {
                    Line::from(format!("[ ] {ingredient}"))
                }
            })
            .collect();
        let held: Vec<String> = station.held.iter().map(ToString::to_string).collect();
        lines.push(Line::from(Span::styled(
            format!("stack: {}", held.join(", ")),
            Style::default().fg(self.theme.muted),
        )));
        if station.complete {
            lines.push(Line::from(Span::styled(
                "complete",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_reserve(&self, frame: &mut Frame, area: Rect, snapshot: &KitchenSnapshot) {
        let title = format!("Reserve ({})", snapshot.reserve.len());
        let items: Vec<ListItem> = snapshot
            .reserve
            .iter()
            .rev()
            .enumerate()
            .map(|(index, ingredient)| {
                let style = if index == 0 {
                    Style::default().fg(self.theme.warning)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                ListItem::new(Line::from(Span::styled(ingredient.to_string(), style)))
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_priority(&self, frame: &mut Frame, area: Rect, snapshot: &KitchenSnapshot) {
        let order: Vec<String> = snapshot
            .priority
            .iter()
            .map(|id| id.letter().to_string())
            .collect();
        let paragraph = Paragraph::new(Line::from(Span::styled(
            order.join(" > "),
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL).title("Priority"));
        frame.render_widget(paragraph, area);
    }

    fn render_journal(&self, frame: &mut Frame, area: Rect) {
        let visible = usize::from(area.height.saturating_sub(2)).clamp(1, JOURNAL_TAIL);
        let items: Vec<ListItem> = self
            .session
            .engine()
            .log()
            .tail(visible)
            .iter()
            .map(|event| ListItem::new(Line::from(event.to_string())))
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Journal"));
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, snapshot: &KitchenSnapshot) {
        let style = match self.session.status() {
            SessionStatus::Running => Style::default().fg(self.theme.primary_fg),
            SessionStatus::Ended(_) if self.summary.is_some() => {
                Style::default().fg(self.theme.success)
            }
            SessionStatus::Ended(_) => Style::default().fg(self.theme.danger),
        };
        let secondary = format!(
            "Step {}  |  Served {}/{}  |  y/Enter/Space: next step  n/q/Esc: stop",
            snapshot.step,
            self.session.served(),
            self.session.target()
        );
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(self.status.clone(), style)),
            Line::from(Span::styled(secondary, Style::default().fg(self.theme.muted))),
        ])
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn signal_for(code: KeyCode) -> Option<Advance> {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter | KeyCode::Char(' ') => {
            Some(Advance::Continue)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
            Some(Advance::Stop)
        }
        _ => None,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

/// Forward terminal events until the app drops its receiver.
fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while !sender.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    error!(?err, "terminal input poll failed");
                    break;
                }
            }
            let forwarded = match event::read() {
                Ok(evt) => sender.blocking_send(AppEvent::Input(evt)),
                Err(err) => {
                    error!(?err, "terminal input read failed");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        }
    });
}
