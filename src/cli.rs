use crate::model::{AlgorithmId, RunConfig, RunEvent, RunReport, Speed};
use crate::orchestrator::{run_controller, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sorting-visualizer",
    version,
    about = "Animated sorting algorithm visualizer with optional TUI"
)]
pub struct Cli {
    /// Algorithm to visualize
    #[arg(long, value_enum, default_value_t = AlgorithmId::Bubble)]
    pub algorithm: AlgorithmId,

    /// Playback speed (slow = 1000ms, normal = 500ms, fast = 250ms per step)
    #[arg(long, value_enum, default_value_t = Speed::Slow)]
    pub speed: Speed,

    /// Pause before the first step of every run
    #[arg(long, default_value = "10ms")]
    pub pre_run_delay: humantime::Duration,

    /// Seed for the random sequence generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sort these comma-separated values instead of a random sequence
    #[arg(long, value_delimiter = ',')]
    pub values: Option<Vec<u32>>,

    /// Print the final JSON run report and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print every frame as a text line and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Start sorting as soon as the TUI opens
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub sort_on_launch: bool,

    /// Write logs to this file (the TUI only logs when a file is given)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text cannot be used together"));
    }
    init_logging(&args)?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args).await;
        }
    }

    if args.json {
        return run_json(args).await;
    }

    run_text(args).await
}

/// Route `log` output. The TUI owns the terminal, so it logs only to an explicit file.
fn init_logging(args: &Cli) -> Result<()> {
    let is_tui = cfg!(feature = "tui") && !args.json && !args.text;
    if is_tui && args.log_file.is_none() {
        return Ok(());
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = args.log_file.as_deref() {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A logger may already be installed (tests); keep the first one.
    let _ = builder.try_init();
    Ok(())
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        pre_run_delay: Duration::from(args.pre_run_delay),
        speed: args.speed,
        algorithm: args.algorithm,
        seed: args.seed,
        values: args.values.clone(),
        ..Default::default()
    }
}

/// Run one sort headlessly and hand every event to `on_event` until the run finishes.
async fn run_once<F>(cfg: RunConfig, mut on_event: F) -> Result<RunReport>
where
    F: FnMut(&RunEvent),
{
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RunEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let handle = tokio::spawn(run_controller(cfg, true, event_tx, cmd_rx));

    // Ctrl-C cancels the run; the partial report is still printed.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    let mut report = None;
    loop {
        tokio::select! {
            ev = event_rx.recv() => {
                let Some(ev) = ev else { break };
                on_event(&ev);
                if let RunEvent::RunFinished { report: r } = ev {
                    report = Some(*r);
                    let _ = cmd_tx.send(UiCommand::Quit);
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                log::info!("interrupted, cancelling run");
                let _ = cmd_tx.send(UiCommand::Cancel);
            }
        }
    }

    handle.await.context("controller task failed")??;
    report.context("controller stopped before the run finished")
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    config: &'a RunConfig,
    report: &'a RunReport,
}

async fn run_json(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let report = run_once(cfg.clone(), |_| {}).await?;

    let (out_tx, out_handle) = spawn_output_writer();
    let out = serde_json::to_string_pretty(&JsonOutput {
        config: &cfg,
        report: &report,
    })?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_text(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();

    let mut last_frame = String::new();
    let report = run_once(cfg, |ev| match ev {
        RunEvent::Snapshot(snap) => {
            let frame = crate::text_summary::render_frame(snap);
            // Highlight-only changes of an unchanged frame are not worth a line.
            if frame != last_frame {
                let _ = out_tx.send(OutputLine::Stdout(frame.clone()));
                last_frame = frame;
            }
        }
        RunEvent::Info(info) => {
            let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
        }
        RunEvent::RunFinished { .. } => {}
    })
    .await?;

    let summary = crate::text_summary::build_text_summary(&report);
    for line in summary.lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_values_and_speed() {
        let args = Cli::parse_from([
            "sorting-visualizer",
            "--algorithm",
            "radix",
            "--speed",
            "fast",
            "--values",
            "5,3,8,1",
            "--pre-run-delay",
            "50ms",
            "--text",
        ]);
        let cfg = build_config(&args);
        assert_eq!(cfg.algorithm, AlgorithmId::Radix);
        assert_eq!(cfg.speed, Speed::Fast);
        assert_eq!(cfg.values, Some(vec![5, 3, 8, 1]));
        assert_eq!(cfg.pre_run_delay, Duration::from_millis(50));
        assert_eq!(cfg.sequence_len, 12);
    }

    #[test]
    fn defaults_match_session_start() {
        let args = Cli::parse_from(["sorting-visualizer"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.algorithm, AlgorithmId::Bubble);
        assert_eq!(cfg.speed, Speed::Slow);
        assert_eq!(cfg.pre_run_delay, Duration::from_millis(10));
        assert!(!args.sort_on_launch);
    }

    #[tokio::test(start_paused = true)]
    async fn headless_run_reports_sorted_values() {
        let args = Cli::parse_from([
            "sorting-visualizer",
            "--algorithm",
            "merge",
            "--values",
            "9,4,7,1",
            "--json",
        ]);
        let mut snapshots = 0;
        let report = run_once(build_config(&args), |ev| {
            if matches!(ev, RunEvent::Snapshot(_)) {
                snapshots += 1;
            }
        })
        .await
        .unwrap();
        assert_eq!(report.final_values, vec![1, 4, 7, 9]);
        assert!(snapshots > 1);
    }
}
