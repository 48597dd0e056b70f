mod bubble;
mod insertion;
mod merge;
mod quick;
mod radix;
mod selection;
pub mod timing;

use crate::model::{AlgorithmId, ElementUpdate, StepEvent};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

pub use timing::Pacer;

/// Why an engine stopped before finishing its sort.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// The run's cancellation handle was set; not a failure.
    #[error("run cancelled")]
    Cancelled,
    #[error("index {index} out of bounds for sequence of length {len}")]
    OutOfBounds { index: usize, len: usize },
}

/// Cooperative cancellation flag shared by the controller and one engine run.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Everything an engine needs to publish steps for one run.
pub struct StepCtx {
    run_id: u64,
    len: usize,
    cancel: CancelHandle,
    pacer: Pacer,
    event_tx: mpsc::UnboundedSender<StepEvent>,
}

impl StepCtx {
    pub fn new(
        run_id: u64,
        len: usize,
        cancel: CancelHandle,
        pacer: Pacer,
        event_tx: mpsc::UnboundedSender<StepEvent>,
    ) -> Self {
        Self {
            run_id,
            len,
            cancel,
            pacer,
            event_tx,
        }
    }

    /// Bail out with [`Interrupt::Cancelled`] once the run has been cancelled.
    pub fn checkpoint(&self) -> Result<(), Interrupt> {
        if self.cancel.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        Ok(())
    }

    /// Publish a partial update for the element at `index`.
    pub fn emit(&self, index: usize, update: ElementUpdate) -> Result<(), Interrupt> {
        self.checkpoint()?;
        if index >= self.len {
            return Err(Interrupt::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let _ = self.event_tx.send(StepEvent {
            run_id: self.run_id,
            index,
            update,
        });
        Ok(())
    }

    /// Sleep for the current step delay, checking cancellation on both sides.
    pub async fn pause(&self) -> Result<(), Interrupt> {
        self.checkpoint()?;
        timing::delay(self.pacer.delay_ms()).await;
        self.checkpoint()
    }

    async fn pause_for(&self, d: Duration) -> Result<(), Interrupt> {
        self.checkpoint()?;
        tokio::time::sleep(d).await;
        self.checkpoint()
    }
}

/// Read `arr[index]`, turning an out-of-range index into an engine fault.
fn at(arr: &[u32], index: isize) -> Result<u32, Interrupt> {
    usize::try_from(index)
        .ok()
        .and_then(|i| arr.get(i).copied())
        .ok_or(Interrupt::OutOfBounds {
            index: index.max(0) as usize,
            len: arr.len(),
        })
}

pub struct SortEngine {
    algorithm: AlgorithmId,
    values: Vec<u32>,
    pre_run_delay: Duration,
}

impl SortEngine {
    pub fn new(algorithm: AlgorithmId, values: Vec<u32>, pre_run_delay: Duration) -> Self {
        Self {
            algorithm,
            values,
            pre_run_delay,
        }
    }

    pub async fn run(self, ctx: StepCtx) -> Result<(), Interrupt> {
        ctx.checkpoint()?;
        if self.values.len() <= 1 {
            return Ok(());
        }

        ctx.pause_for(self.pre_run_delay).await?;

        match self.algorithm {
            AlgorithmId::Bubble => bubble::sort(&self.values, &ctx).await,
            AlgorithmId::Insertion => insertion::sort(&self.values, &ctx).await,
            AlgorithmId::Selection => selection::sort(&self.values, &ctx).await,
            AlgorithmId::Merge => merge::sort(&self.values, &ctx).await,
            AlgorithmId::Quick => quick::sort(&self.values, &ctx).await,
            AlgorithmId::Radix => radix::sort(&self.values, &ctx).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const SAMPLE: [u32; 12] = [512, 87, 930, 61, 444, 87, 999, 250, 603, 318, 760, 145];

    #[tokio::test(start_paused = true)]
    async fn every_algorithm_sorts_the_sample() {
        for algorithm in AlgorithmId::ALL {
            let out = run_to_end(algorithm, &SAMPLE).await;
            assert_sorted_permutation(&SAMPLE, &out);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_sequences_emit_nothing() {
        for algorithm in AlgorithmId::ALL {
            for values in [&[][..], &[420][..]] {
                let (ctx, mut h) = ctx_for(values);
                SortEngine::new(algorithm, values.to_vec(), Duration::from_millis(10))
                    .run(ctx)
                    .await
                    .unwrap();
                assert!(drain(&mut h.rx).is_empty(), "{algorithm:?} emitted");
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_emits_nothing() {
        for algorithm in AlgorithmId::ALL {
            let (ctx, mut h) = ctx_for(&SAMPLE);
            h.cancel.cancel();
            let res = SortEngine::new(algorithm, SAMPLE.to_vec(), Duration::ZERO)
                .run(ctx)
                .await;
            assert!(matches!(res, Err(Interrupt::Cancelled)));
            assert!(drain(&mut h.rx).is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_emits_after_cancellation_is_observed() {
        for algorithm in AlgorithmId::ALL {
            let (ctx, mut h) = ctx_for(&SAMPLE);
            let cancel = h.cancel.clone();
            let task = tokio::spawn(
                SortEngine::new(algorithm, SAMPLE.to_vec(), Duration::ZERO).run(ctx),
            );

            // Let a few steps through, then cancel mid-run.
            tokio::time::sleep(Duration::from_millis(35)).await;
            cancel.cancel();
            let before = drain(&mut h.rx).len();
            assert!(before > 0, "{algorithm:?} made no progress");

            let res = task.await.unwrap();
            assert!(matches!(res, Err(Interrupt::Cancelled)), "{algorithm:?}");
            assert!(drain(&mut h.rx).is_empty(), "{algorithm:?} emitted after cancel");
        }
    }

    #[test]
    fn emit_rejects_out_of_range_index() {
        let (ctx, mut h) = ctx_for(&[1, 2, 3]);
        let err = ctx.emit(3, ElementUpdate::selected()).unwrap_err();
        assert!(matches!(err, Interrupt::OutOfBounds { index: 3, len: 3 }));
        assert!(drain(&mut h.rx).is_empty());
    }

    #[test]
    fn at_reports_negative_and_past_end_reads() {
        assert_eq!(at(&[4, 5], 1).unwrap(), 5);
        assert!(matches!(at(&[4, 5], 2), Err(Interrupt::OutOfBounds { .. })));
        assert!(matches!(at(&[4, 5], -1), Err(Interrupt::OutOfBounds { .. })));
    }
}

#[cfg(test)]
mod properties {
    use super::testing::*;
    use super::*;
    use crate::model::ElementState;
    use crate::numeric::{digit_at, digit_count};
    use proptest::prelude::*;

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    fn sequence_strategy() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(60u32..1000u32, 12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_engine_sorts(values in sequence_strategy()) {
            let rt = paused_runtime();
            for algorithm in AlgorithmId::ALL {
                let out = rt.block_on(run_to_end(algorithm, &values));
                let got: Vec<u32> = out.iter().map(|e| e.value).collect();
                let mut want = values.clone();
                want.sort_unstable();
                prop_assert_eq!(got, want, "{:?}", algorithm);
                prop_assert!(out.iter().all(|e| e.state == ElementState::Idle));
            }
        }

        /// Each radix pass must equal a stable sort of the previous pass by that digit.
        #[test]
        fn prop_radix_passes_are_stable(values in sequence_strategy()) {
            let rt = paused_runtime();
            let (ctx, mut h) = ctx_for(&values);
            rt.block_on(SortEngine::new(AlgorithmId::Radix, values.clone(), Duration::ZERO).run(ctx))
                .unwrap();
            let settled: Vec<u32> = drain(&mut h.rx)
                .into_iter()
                .filter(|e| e.update.state == Some(ElementState::Idle))
                .filter_map(|e| e.update.value)
                .collect();

            let passes = digit_count(&values) as usize;
            prop_assert_eq!(settled.len(), passes * values.len());

            let mut prev = values.clone();
            for (place, pass) in settled.chunks(values.len()).enumerate() {
                let mut expected = prev.clone();
                expected.sort_by_key(|&v| digit_at(v, place as u32));
                prop_assert_eq!(pass, expected.as_slice());
                prev = expected;
            }
        }
    }
}
