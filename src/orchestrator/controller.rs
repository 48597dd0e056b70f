//! Run lifecycle controller.
//!
//! Owns the session's sequence, the single in-flight sort, and the command loop that
//! publishes state snapshots for presentation layers.

use crate::engine::{CancelHandle, Interrupt, Pacer, SortEngine, StepCtx};
use crate::model::{
    delay_for_label, AlgorithmId, Element, ElementState, InfoEvent, RunConfig, RunEvent,
    RunOutcome, RunReport, RunSnapshot, StepEvent,
};
use crate::numeric::random_value;
use anyhow::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

/// Commands emitted by UI layers to drive the visualizer.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Generate,
    Start,
    Cancel,
    ChangeAlgorithm(AlgorithmId),
    ChangeSpeed(String),
    Quit,
}

struct RunState {
    sequence: Vec<Element>,
    algorithm: AlgorithmId,
    delay_ms: u64,
    is_sorted: bool,
    is_running: bool,
}

/// Internal handle for the running sort task.
struct ActiveRun {
    id: u64,
    cancel: CancelHandle,
    handle: JoinHandle<Result<(), Interrupt>>,
    algorithm: AlgorithmId,
    initial: Vec<u32>,
    started_utc: String,
    started: Instant,
    steps: u64,
}

pub(crate) struct RunController {
    cfg: RunConfig,
    state: RunState,
    pacer: Pacer,
    rng: StdRng,
    step_tx: UnboundedSender<StepEvent>,
    active: Option<ActiveRun>,
    next_run_id: u64,
}

impl RunController {
    pub(crate) fn new(cfg: RunConfig, step_tx: UnboundedSender<StepEvent>) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let delay_ms = cfg.speed.delay_ms();
        let mut ctl = Self {
            state: RunState {
                sequence: Vec::new(),
                algorithm: cfg.algorithm,
                delay_ms,
                is_sorted: false,
                is_running: false,
            },
            pacer: Pacer::new(delay_ms),
            rng,
            step_tx,
            active: None,
            next_run_id: 1,
            cfg,
        };
        match ctl.cfg.values.clone() {
            Some(values) => ctl.load_values(values),
            None => ctl.generate_sequence(),
        }
        ctl
    }

    pub(crate) fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            sequence: self.state.sequence.clone(),
            algorithm: self.state.algorithm,
            delay_ms: self.state.delay_ms,
            is_sorted: self.state.is_sorted,
            is_running: self.state.is_running,
        }
    }

    /// Cancel the active run (if any) and clear every run flag.
    fn supersede(&mut self) -> Option<ActiveRun> {
        let run = self.active.take()?;
        run.cancel.cancel();
        debug!("run #{} superseded after {} steps", run.id, run.steps);
        self.state.is_running = false;
        self.state.is_sorted = false;
        Some(run)
    }

    fn reset_highlights(&mut self) {
        for e in &mut self.state.sequence {
            e.state = ElementState::Idle;
        }
    }

    /// Replace the sequence with freshly randomized idle elements.
    pub(crate) fn generate_sequence(&mut self) {
        let (min, max) = (self.cfg.min_value, self.cfg.max_value);
        let values: Vec<u32> = (0..self.cfg.sequence_len)
            .map(|_| random_value(&mut self.rng, min, max))
            .collect();
        self.load_values(values);
    }

    pub(crate) fn load_values(&mut self, values: Vec<u32>) {
        self.supersede();
        self.state.sequence = values.into_iter().map(Element::idle).collect();
        self.state.is_sorted = false;
        self.state.is_running = false;
    }

    pub(crate) fn change_algorithm(&mut self, algorithm: AlgorithmId) {
        self.supersede();
        self.state.algorithm = algorithm;
        self.reset_highlights();
        self.state.is_sorted = false;
        self.state.is_running = false;
    }

    /// Apply a speed label; unknown labels fall back to the normal speed.
    pub(crate) fn change_speed(&mut self, label: &str) -> u64 {
        let ms = delay_for_label(label);
        self.state.delay_ms = ms;
        self.pacer.set_delay_ms(ms);
        ms
    }

    /// Start a run of the selected algorithm, superseding any run in flight.
    pub(crate) fn start_run(&mut self) -> u64 {
        if let Some(prev) = self.supersede() {
            info!("restarting: run #{} replaced", prev.id);
        }
        self.reset_highlights();

        let id = self.next_run_id;
        self.next_run_id += 1;

        let values: Vec<u32> = self.state.sequence.iter().map(|e| e.value).collect();
        let cancel = CancelHandle::new();
        let ctx = StepCtx::new(
            id,
            values.len(),
            cancel.clone(),
            self.pacer.clone(),
            self.step_tx.clone(),
        );
        let engine = SortEngine::new(self.state.algorithm, values.clone(), self.cfg.pre_run_delay);
        let handle = tokio::spawn(async move { engine.run(ctx).await });

        debug!(
            "run #{id} started: {} sort over {} values",
            self.state.algorithm.as_str(),
            values.len()
        );
        self.active = Some(ActiveRun {
            id,
            cancel,
            handle,
            algorithm: self.state.algorithm,
            initial: values,
            started_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            started: Instant::now(),
            steps: 0,
        });
        self.state.is_sorted = false;
        self.state.is_running = true;
        id
    }

    /// Explicit user cancel. Returns a report when a run was actually stopped.
    pub(crate) fn cancel_run(&mut self) -> Option<RunReport> {
        let run = self.supersede()?;
        self.reset_highlights();
        Some(self.report(run, RunOutcome::Cancelled))
    }

    /// Merge an engine update into the sequence. Updates from superseded runs are dropped.
    pub(crate) fn apply(&mut self, ev: StepEvent) -> bool {
        let Some(run) = self.active.as_mut() else {
            return false;
        };
        if run.id != ev.run_id {
            return false;
        }
        let Some(element) = self.state.sequence.get_mut(ev.index) else {
            warn!(
                "run #{} emitted index {} past sequence end",
                ev.run_id, ev.index
            );
            return false;
        };
        element.apply(ev.update);
        run.steps += 1;
        true
    }

    pub(crate) fn active_handle_mut(&mut self) -> Option<&mut JoinHandle<Result<(), Interrupt>>> {
        self.active.as_mut().map(|run| &mut run.handle)
    }

    /// Settle the active run once its task has ended.
    pub(crate) fn finish(
        &mut self,
        join_res: std::result::Result<Result<(), Interrupt>, JoinError>,
    ) -> Option<RunReport> {
        let run = self.active.take()?;
        let cancelled = run.cancel.is_cancelled();
        // Stop any engine still alive (e.g. after a fault path in tests).
        run.cancel.cancel();

        let outcome = match join_res {
            Ok(Ok(())) if !cancelled => RunOutcome::Completed,
            Ok(Ok(())) | Ok(Err(Interrupt::Cancelled)) => RunOutcome::Cancelled,
            Ok(Err(e)) => {
                warn!("run #{} failed: {e}", run.id);
                RunOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                warn!("run #{} task failed: {e}", run.id);
                RunOutcome::Failed {
                    reason: format!("engine task failed: {e}"),
                }
            }
        };

        self.state.is_running = false;
        self.state.is_sorted = outcome == RunOutcome::Completed;
        self.reset_highlights();
        info!("run #{} finished: {outcome:?} ({} steps)", run.id, run.steps);
        Some(self.report(run, outcome))
    }

    fn report(&self, run: ActiveRun, outcome: RunOutcome) -> RunReport {
        RunReport {
            timestamp_utc: run.started_utc,
            algorithm: run.algorithm,
            outcome,
            initial: run.initial,
            final_values: self.state.sequence.iter().map(|e| e.value).collect(),
            steps: run.steps,
            elapsed: run.started.elapsed(),
        }
    }
}

/// Drive the controller from UI commands and publish snapshots back to presentation layers.
pub(crate) async fn run_controller(
    cfg: RunConfig,
    sort_on_launch: bool,
    event_tx: UnboundedSender<RunEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let (step_tx, mut step_rx) = mpsc::unbounded_channel::<StepEvent>();
    let mut ctl = RunController::new(cfg, step_tx);
    let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));

    if sort_on_launch {
        start(&mut ctl, &event_tx);
    }

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Generate) => {
                        ctl.generate_sequence();
                        let _ = event_tx.send(RunEvent::Info(InfoEvent::SequenceGenerated {
                            len: ctl.state.sequence.len(),
                        }));
                    }
                    Some(UiCommand::Start) => start(&mut ctl, &event_tx),
                    Some(UiCommand::Cancel) => {
                        if let Some(report) = ctl.cancel_run() {
                            let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));
                            let _ = event_tx.send(RunEvent::RunFinished { report: Box::new(report) });
                            continue;
                        }
                    }
                    Some(UiCommand::ChangeAlgorithm(id)) => ctl.change_algorithm(id),
                    Some(UiCommand::ChangeSpeed(label)) => {
                        let delay_ms = ctl.change_speed(&label);
                        let _ = event_tx.send(RunEvent::Info(InfoEvent::SpeedChanged { delay_ms }));
                    }
                    Some(UiCommand::Quit) | None => {
                        ctl.cancel_run();
                        break Ok(());
                    }
                }
                let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));
            }
            Some(step) = step_rx.recv() => {
                if ctl.apply(step) {
                    let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(h) = ctl.active_handle_mut() {
                    return Some(h.await);
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    // Every step was sent before the task ended; apply them before settling.
                    while let Ok(step) = step_rx.try_recv() {
                        if ctl.apply(step) {
                            let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));
                        }
                    }
                    if let Some(report) = ctl.finish(join_res) {
                        let _ = event_tx.send(RunEvent::Snapshot(ctl.snapshot()));
                        let _ = event_tx.send(RunEvent::RunFinished { report: Box::new(report) });
                    }
                }
            }
        }
    };

    res
}

fn start(ctl: &mut RunController, event_tx: &UnboundedSender<RunEvent>) {
    let superseded = ctl.active.as_ref().map(|run| run.id);
    let run_id = ctl.start_run();
    if let Some(prev) = superseded {
        let _ = event_tx.send(RunEvent::Info(InfoEvent::RunSuperseded { run_id: prev }));
    }
    let _ = event_tx.send(RunEvent::Info(InfoEvent::RunStarted {
        run_id,
        algorithm: ctl.state.algorithm,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Speed, ElementUpdate};
    use std::time::Duration;

    fn config(values: Option<Vec<u32>>) -> RunConfig {
        RunConfig {
            speed: Speed::Fast,
            seed: Some(42),
            values,
            ..Default::default()
        }
    }

    fn controller(values: Option<Vec<u32>>) -> (RunController, UnboundedReceiver<StepEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RunController::new(config(values), tx), rx)
    }

    /// Wait for the active run to end, the same way the command loop does.
    async fn settle(
        ctl: &mut RunController,
        rx: &mut UnboundedReceiver<StepEvent>,
    ) -> Option<RunReport> {
        let join_res = ctl.active_handle_mut()?.await;
        while let Ok(step) = rx.try_recv() {
            ctl.apply(step);
        }
        ctl.finish(join_res)
    }

    fn assert_all_idle(snap: &RunSnapshot) {
        assert!(snap.sequence.iter().all(|e| e.state == ElementState::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn initial_sequence_is_twelve_values_in_range() {
        let (ctl, _rx) = controller(None);
        let snap = ctl.snapshot();
        assert_eq!(snap.sequence.len(), 12);
        assert!(snap.values().iter().all(|v| (60..1000).contains(v)));
        assert_all_idle(&snap);
        assert!(!snap.is_running && !snap.is_sorted);
        assert_eq!(snap.delay_ms, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_marks_sorted() {
        for algorithm in AlgorithmId::ALL {
            let (mut ctl, mut rx) = controller(None);
            ctl.change_algorithm(algorithm);
            let before = ctl.snapshot().values();
            ctl.start_run();
            assert!(ctl.snapshot().is_running);

            let report = settle(&mut ctl, &mut rx).await.unwrap();
            assert_eq!(report.outcome, RunOutcome::Completed);

            let snap = ctl.snapshot();
            let mut want = before.clone();
            want.sort_unstable();
            assert_eq!(snap.values(), want, "{algorithm:?}");
            assert!(snap.is_sorted && !snap.is_running);
            assert_all_idle(&snap);
            assert_eq!(report.initial, before);
            assert_eq!(report.final_values, want);
            assert!(report.steps > 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bubble_example_sorts() {
        let (mut ctl, mut rx) = controller(Some(vec![5, 3, 8, 1]));
        ctl.start_run();
        settle(&mut ctl, &mut rx).await.unwrap();
        assert_eq!(ctl.snapshot().values(), vec![1, 3, 5, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_and_single_sequences_complete_without_steps() {
        for values in [vec![], vec![777]] {
            for algorithm in AlgorithmId::ALL {
                let (mut ctl, mut rx) = controller(Some(values.clone()));
                ctl.change_algorithm(algorithm);
                ctl.start_run();
                let report = settle(&mut ctl, &mut rx).await.unwrap();
                assert_eq!(report.outcome, RunOutcome::Completed);
                assert_eq!(report.steps, 0);
                assert!(ctl.snapshot().is_sorted);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_run_freezes_sequence() {
        let (mut ctl, mut rx) = controller(None);
        ctl.start_run();
        tokio::time::sleep(Duration::from_millis(600)).await;
        while let Ok(step) = rx.try_recv() {
            ctl.apply(step);
        }

        let report = ctl.cancel_run().unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        let frozen = ctl.snapshot();
        assert!(!frozen.is_running && !frozen.is_sorted);
        assert_all_idle(&frozen);

        // Whatever the stale task still sends is ignored.
        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(step) = rx.try_recv() {
            assert!(!ctl.apply(step));
        }
        assert_eq!(ctl.snapshot(), frozen);
        assert!(ctl.cancel_run().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_previous_run() {
        let (mut ctl, mut rx) = controller(None);
        let first = ctl.start_run();
        tokio::time::sleep(Duration::from_millis(400)).await;
        let second = ctl.start_run();
        assert_ne!(first, second);

        let stale = StepEvent {
            run_id: first,
            index: 0,
            update: ElementUpdate::value(1),
        };
        assert!(!ctl.apply(stale));

        let report = settle(&mut ctl, &mut rx).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        let snap = ctl.snapshot();
        assert!(snap.values().windows(2).all(|w| w[0] <= w[1]));
        assert!(snap.is_sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn change_algorithm_mid_run_resets() {
        let (mut ctl, mut rx) = controller(None);
        ctl.start_run();
        tokio::time::sleep(Duration::from_millis(300)).await;
        while let Ok(step) = rx.try_recv() {
            ctl.apply(step);
        }
        assert!(ctl
            .snapshot()
            .sequence
            .iter()
            .any(|e| e.state == ElementState::Selected));

        ctl.change_algorithm(AlgorithmId::Quick);
        let snap = ctl.snapshot();
        assert_eq!(snap.algorithm, AlgorithmId::Quick);
        assert!(!snap.is_running && !snap.is_sorted);
        assert_all_idle(&snap);
        assert!(ctl.active_handle_mut().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn regenerate_mid_run_replaces_sequence() {
        let (mut ctl, _rx) = controller(None);
        ctl.start_run();
        tokio::time::sleep(Duration::from_millis(300)).await;
        ctl.generate_sequence();
        let snap = ctl.snapshot();
        assert_eq!(snap.sequence.len(), 12);
        assert!(!snap.is_running && !snap.is_sorted);
        assert_all_idle(&snap);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_applies_to_later_pauses() {
        let (mut ctl, _rx) = controller(None);
        assert_eq!(ctl.change_speed("slow"), 1000);
        assert_eq!(ctl.pacer.delay_ms(), 1000);
        assert_eq!(ctl.change_speed("warp"), 500);
        assert_eq!(ctl.snapshot().delay_ms, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_fault_is_contained() {
        let (mut ctl, _rx) = controller(None);
        ctl.start_run();
        let report = ctl
            .finish(Ok(Err(Interrupt::OutOfBounds { index: 12, len: 12 })))
            .unwrap();
        assert!(matches!(report.outcome, RunOutcome::Failed { .. }));
        let snap = ctl.snapshot();
        assert!(!snap.is_running && !snap.is_sorted);
        assert_all_idle(&snap);

        // The session stays usable.
        ctl.start_run();
        assert!(ctl.snapshot().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_is_reported_as_failure() {
        let (mut ctl, _rx) = controller(None);
        ctl.start_run();
        let join_err = tokio::spawn(async {
            if true {
                panic!("engine blew up");
            }
            Ok::<(), Interrupt>(())
        })
        .await;
        let report = ctl.finish(join_err).unwrap();
        assert!(matches!(report.outcome, RunOutcome::Failed { .. }));
        assert!(!ctl.snapshot().is_sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn command_loop_publishes_run_lifecycle() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let loop_handle = tokio::spawn(run_controller(
            config(Some(vec![5, 3, 8, 1])),
            true,
            event_tx,
            cmd_rx,
        ));

        let report = loop {
            match event_rx.recv().await {
                Some(RunEvent::RunFinished { report }) => break report,
                Some(_) => {}
                None => panic!("controller stopped early"),
            }
        };
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.final_values, vec![1, 3, 5, 8]);

        cmd_tx.send(UiCommand::Quit).unwrap();
        loop_handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn command_loop_restart_discards_stale_run() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let loop_handle = tokio::spawn(run_controller(config(None), false, event_tx, cmd_rx));

        cmd_tx.send(UiCommand::Start).unwrap();
        tokio::time::sleep(Duration::from_millis(700)).await;
        cmd_tx.send(UiCommand::Start).unwrap();

        let mut finished = Vec::new();
        while finished.is_empty() {
            if let Some(RunEvent::RunFinished { report }) = event_rx.recv().await {
                finished.push(report);
            }
        }
        // Only the second run reports; the superseded one never finishes on its own.
        assert_eq!(finished[0].outcome, RunOutcome::Completed);
        assert!(finished[0].final_values.windows(2).all(|w| w[0] <= w[1]));

        cmd_tx.send(UiCommand::Quit).unwrap();
        loop_handle.await.unwrap().unwrap();
    }
}
