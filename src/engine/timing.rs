use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

/// Suspend the current task for `ms` milliseconds.
///
/// The sleep itself never aborts early; callers re-check cancellation once it resumes.
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Step delay shared between the controller and a running engine.
///
/// Speed changes land here and apply to the next pause, not to one already sleeping.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay_ms: Arc<AtomicU64>,
}

impl Pacer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: Arc::new(AtomicU64::new(delay_ms)),
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms.load(Ordering::Relaxed)
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::Relaxed);
    }
}
