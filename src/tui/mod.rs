mod charts;
mod clipboard;
mod help;
mod state;

use crate::catalog;
use crate::cli::{build_config, Cli};
use crate::model::{AlgorithmId, RunEvent, RunOutcome};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{push_wrapped_status_kv, UiState, TAB_COUNT};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<RunEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(event_rx, cmd_tx));

    let res = orchestrator::run_controller(build_config(&args), args.sort_on_launch, event_tx, cmd_rx)
        .await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    mut event_rx: UnboundedReceiver<RunEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive; unbounded channel avoids backpressure.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('s')) | (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) => {
                        state.info = "Sort requested…".into();
                        state.frames = 0;
                        let _ = cmd_tx.send(UiCommand::Start);
                    }
                    (_, KeyCode::Char('c')) | (_, KeyCode::Esc) => {
                        let _ = cmd_tx.send(UiCommand::Cancel);
                    }
                    (_, KeyCode::Char('n')) => {
                        state.last_report = None;
                        let _ = cmd_tx.send(UiCommand::Generate);
                    }
                    (_, KeyCode::Left) | (_, KeyCode::Char('h')) => {
                        if let Some(current) = state.snapshot.as_ref().map(|s| s.algorithm) {
                            select_algorithm(&mut state, &cmd_tx, current.prev());
                        }
                    }
                    (_, KeyCode::Right) | (_, KeyCode::Char('l')) => {
                        if let Some(current) = state.snapshot.as_ref().map(|s| s.algorithm) {
                            select_algorithm(&mut state, &cmd_tx, current.next());
                        }
                    }
                    (_, KeyCode::Char(d @ '1'..='6')) => {
                        let idx = (d as usize) - ('1' as usize);
                        select_algorithm(&mut state, &cmd_tx, AlgorithmId::ALL[idx]);
                    }
                    (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) => {
                        let label = state.step_speed(true);
                        let _ = cmd_tx.send(UiCommand::ChangeSpeed(label.to_string()));
                    }
                    (_, KeyCode::Char('-')) => {
                        let label = state.step_speed(false);
                        let _ = cmd_tx.send(UiCommand::ChangeSpeed(label.to_string()));
                    }
                    (_, KeyCode::Char('y')) => {
                        if let Some(snap) = state.snapshot.as_ref() {
                            let text = clipboard::format_values(&snap.values());
                            state.info = match clipboard::copy_to_clipboard(&text) {
                                Ok(_) => format!("✓ Copied to clipboard: {text}"),
                                Err(e) => format!("Clipboard copy failed: {e:#}"),
                            };
                        }
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % TAB_COUNT;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 2;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn select_algorithm(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>, id: AlgorithmId) {
    state.last_report = None;
    state.info = format!("Selected {}", catalog::info(id).name);
    let _ = cmd_tx.send(UiCommand::ChangeAlgorithm(id));
}

fn apply_event(state: &mut UiState, ev: RunEvent) {
    match ev {
        RunEvent::Snapshot(snap) => {
            if snap.is_running {
                state.frames += 1;
            }
            state.snapshot = Some(snap);
        }
        RunEvent::Info(info) => {
            state.info = info.to_message();
        }
        RunEvent::RunFinished { report } => {
            state.info = match &report.outcome {
                RunOutcome::Completed => {
                    state.runs_completed += 1;
                    format!(
                        "Sorted in {} steps ({})",
                        report.steps,
                        humantime::format_duration(Duration::from_millis(report.elapsed.as_millis() as u64))
                    )
                }
                RunOutcome::Cancelled => "Sort cancelled".into(),
                RunOutcome::Failed { reason } => format!("Sort failed: {reason}"),
            };
            state.last_report = Some(*report);
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![
        Line::from("Visualizer"),
        Line::from("Complexity"),
        Line::from("Help"),
    ])
    .select(state.tab)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("sorting-visualizer"),
    )
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_visualizer(chunks[1], f, state),
        1 => {
            let selected = state
                .snapshot
                .as_ref()
                .map(|s| s.algorithm)
                .unwrap_or(AlgorithmId::Bubble);
            charts::draw_complexity_table(chunks[1], f, selected);
        }
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_visualizer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let Some(snap) = state.snapshot.as_ref() else {
        let p = Paragraph::new("Waiting for sequence…")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(8),    // Bars
                Constraint::Length(7), // Status + algorithm description (side-by-side)
            ]
            .as_ref(),
        )
        .split(area);

    charts::draw_bars(main[0], f, snap);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(main[1]);

    let info = catalog::info(snap.algorithm);
    let mut status = vec![state.status_line()];
    status.push(Line::from(vec![
        Span::styled("Algorithm:", Style::default().fg(Color::Gray)),
        Span::raw(format!(" {} ({}/{})", info.name, snap.algorithm.index() + 1, AlgorithmId::ALL.len())),
    ]));
    status.push(Line::from(vec![
        Span::styled("Speed:", Style::default().fg(Color::Gray)),
        Span::raw(format!(" {}", state.speed_label())),
    ]));
    if snap.is_running {
        status.push(Line::from(vec![
            Span::styled("Frames:", Style::default().fg(Color::Gray)),
            Span::raw(format!(" {}", state.frames)),
        ]));
    }
    push_wrapped_status_kv(&mut status, "Info", &state.info, bottom[0].width);
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status")),
        bottom[0],
    );

    let description = vec![
        Line::from(info.description),
        Line::from(vec![
            Span::styled("best ", Style::default().fg(Color::Gray)),
            Span::styled(info.time.best, Style::default().fg(Color::Green)),
            Span::styled("  avg ", Style::default().fg(Color::Gray)),
            Span::styled(info.time.average, Style::default().fg(Color::Cyan)),
            Span::styled("  worst ", Style::default().fg(Color::Gray)),
            Span::styled(info.time.worst, Style::default().fg(Color::Red)),
            Span::styled("  space ", Style::default().fg(Color::Gray)),
            Span::styled(info.space, Style::default().fg(Color::Magenta)),
        ]),
    ];
    f.render_widget(
        Paragraph::new(description)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(info.name)),
        bottom[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, RunReport, RunSnapshot};

    fn snapshot(is_running: bool) -> RunSnapshot {
        RunSnapshot {
            sequence: vec![Element::idle(300), Element::idle(100)],
            algorithm: AlgorithmId::Merge,
            delay_ms: 250,
            is_sorted: false,
            is_running,
        }
    }

    #[test]
    fn frames_count_only_while_running() {
        let mut state = UiState::default();
        apply_event(&mut state, RunEvent::Snapshot(snapshot(false)));
        apply_event(&mut state, RunEvent::Snapshot(snapshot(true)));
        apply_event(&mut state, RunEvent::Snapshot(snapshot(true)));
        assert_eq!(state.frames, 2);
        assert_eq!(state.snapshot.as_ref().unwrap().algorithm, AlgorithmId::Merge);
    }

    #[test]
    fn finished_run_updates_info() {
        let mut state = UiState::default();
        let report = RunReport {
            timestamp_utc: String::new(),
            algorithm: AlgorithmId::Merge,
            outcome: RunOutcome::Completed,
            initial: vec![300, 100],
            final_values: vec![100, 300],
            steps: 6,
            elapsed: Duration::from_secs(3),
        };
        apply_event(
            &mut state,
            RunEvent::RunFinished {
                report: Box::new(report),
            },
        );
        assert_eq!(state.info, "Sorted in 6 steps (3s)");
        assert_eq!(state.runs_completed, 1);
    }
}
