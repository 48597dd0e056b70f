use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::catalog;
use crate::model::{AlgorithmId, ElementState, RunSnapshot, MAX_VALUE};

fn bar_color(state: ElementState, sorted: bool) -> Color {
    match state {
        ElementState::Selected => Color::Yellow,
        ElementState::Idle if sorted => Color::Green,
        ElementState::Idle => Color::Cyan,
    }
}

/// Width of each bar so that `count` bars with one-column gaps fill the inner width.
pub fn bar_width(area_width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let inner = area_width.saturating_sub(2) as usize;
    let gaps = count.saturating_sub(1);
    (inner.saturating_sub(gaps) / count).clamp(1, u16::MAX as usize) as u16
}

/// Render the sequence as one bar per element, highlighting selected positions.
pub fn draw_bars(area: Rect, f: &mut Frame, snap: &RunSnapshot) {
    let bars: Vec<Bar> = snap
        .sequence
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::default()
                .value(u64::from(e.value))
                .label(Line::from(format!("{}", i + 1)))
                .style(Style::default().fg(bar_color(e.state, snap.is_sorted)))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(bar_color(e.state, snap.is_sorted)),
                )
        })
        .collect();

    let max = snap
        .sequence
        .iter()
        .map(|e| u64::from(e.value))
        .max()
        .unwrap_or(0)
        .max(u64::from(MAX_VALUE));

    let title = format!(
        "{} ({} values)",
        catalog::info(snap.algorithm).name,
        snap.sequence.len()
    );
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, bars.len()))
        .bar_gap(1)
        .max(max);

    f.render_widget(chart, area);
}

/// Complexity table for every algorithm, with the selected one highlighted.
pub fn draw_complexity_table(area: Rect, f: &mut Frame, selected: AlgorithmId) {
    let header = Row::new(vec!["Algorithm", "Best", "Average", "Worst", "Space"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = AlgorithmId::ALL
        .iter()
        .map(|&id| {
            let info = catalog::info(id);
            let style = if id == selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(info.name),
                Cell::from(info.time.best).style(Style::default().fg(Color::Green)),
                Cell::from(info.time.average).style(Style::default().fg(Color::Cyan)),
                Cell::from(info.time.worst).style(Style::default().fg(Color::Red)),
                Cell::from(info.space).style(Style::default().fg(Color::Magenta)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Time & Space Complexity"),
    );
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_fill_available_width() {
        // 12 bars, 11 gaps, 80 - 2 border columns.
        assert_eq!(bar_width(80, 12), 5);
        assert_eq!(bar_width(10, 12), 1);
        assert_eq!(bar_width(80, 0), 1);
    }

    #[test]
    fn sorted_idle_bars_turn_green() {
        assert_eq!(bar_color(ElementState::Idle, true), Color::Green);
        assert_eq!(bar_color(ElementState::Selected, true), Color::Yellow);
        assert_eq!(bar_color(ElementState::Idle, false), Color::Cyan);
    }
}
