//! Text rendering for CLI output.
//!
//! This module formats published frames and the final run report for text mode.

use crate::catalog;
use crate::model::{ElementState, RunOutcome, RunReport, RunSnapshot};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// One line per frame; selected elements are bracketed.
pub(crate) fn render_frame(snap: &RunSnapshot) -> String {
    snap.sequence
        .iter()
        .map(|e| match e.state {
            ElementState::Selected => format!("[{:>4}]", e.value),
            ElementState::Idle => format!(" {:>4} ", e.value),
        })
        .collect::<Vec<_>>()
        .join("")
}

pub(crate) fn build_text_summary(report: &RunReport) -> TextSummary {
    let info = catalog::info(report.algorithm);
    let mut lines = Vec::new();

    lines.push(format!("Algorithm: {}", info.name));
    lines.push(format!(
        "Complexity: best {} avg {} worst {} (space {})",
        info.time.best, info.time.average, info.time.worst, info.space
    ));
    lines.push(format!("Initial: {:?}", report.initial));
    lines.push(format!("Final:   {:?}", report.final_values));

    let status = match &report.outcome {
        RunOutcome::Completed => "sorted".to_string(),
        RunOutcome::Cancelled => "cancelled".to_string(),
        RunOutcome::Failed { reason } => format!("failed: {reason}"),
    };
    lines.push(format!(
        "Result: {status} in {} steps ({})",
        report.steps,
        humantime::format_duration(truncate_to_millis(report.elapsed))
    ));

    TextSummary { lines }
}

fn truncate_to_millis(d: std::time::Duration) -> std::time::Duration {
    std::time::Duration::from_millis(d.as_millis() as u64)
}
