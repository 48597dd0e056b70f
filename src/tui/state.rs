use crate::model::{RunOutcome, RunReport, RunSnapshot, Speed};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};

pub const TAB_COUNT: usize = 3;

#[derive(Default)]
pub struct UiState {
    pub tab: usize,
    pub info: String,
    /// Latest state published by the controller; `None` until the first snapshot arrives.
    pub snapshot: Option<RunSnapshot>,
    pub last_report: Option<RunReport>,
    /// Frames received since the current run started.
    pub frames: u64,
    pub runs_completed: u32,
}

impl UiState {
    pub fn speed_label(&self) -> String {
        match self.snapshot.as_ref() {
            Some(s) => match Speed::from_delay_ms(s.delay_ms) {
                Some(speed) => format!("{} ({} ms)", speed.label(), s.delay_ms),
                None => format!("{} ms", s.delay_ms),
            },
            None => "-".into(),
        }
    }

    /// Next speed label when stepping faster (`up`) or slower.
    pub fn step_speed(&self, up: bool) -> &'static str {
        let current = self
            .snapshot
            .as_ref()
            .and_then(|s| Speed::from_delay_ms(s.delay_ms))
            .unwrap_or(Speed::Normal);
        let next = match (current, up) {
            (Speed::Slow, true) => Speed::Normal,
            (Speed::Normal, true) | (Speed::Fast, true) => Speed::Fast,
            (Speed::Fast, false) => Speed::Normal,
            (Speed::Normal, false) | (Speed::Slow, false) => Speed::Slow,
        };
        next.label()
    }

    pub fn status_line(&self) -> Line<'static> {
        let Some(snap) = self.snapshot.as_ref() else {
            return Line::from("Waiting for sequence…");
        };
        let (text, color) = if snap.is_running {
            ("Sorting…".to_string(), Color::Yellow)
        } else if snap.is_sorted {
            ("✓ Sequence has been sorted".to_string(), Color::Green)
        } else {
            match self.last_report.as_ref().map(|r| &r.outcome) {
                Some(RunOutcome::Cancelled) => ("Cancelled".to_string(), Color::Gray),
                Some(RunOutcome::Failed { reason }) => (format!("Failed: {reason}"), Color::Red),
                _ => ("Ready".to_string(), Color::Gray),
            }
        };
        Line::from(vec![
            Span::styled("Status:", Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(text, Style::default().fg(color)),
        ])
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}
