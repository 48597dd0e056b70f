use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of bars in a freshly generated sequence.
pub const SEQUENCE_LEN: usize = 12;
/// Inclusive lower bound for generated values.
pub const MIN_VALUE: u32 = 60;
/// Exclusive upper bound for generated values.
pub const MAX_VALUE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub sequence_len: usize,
    pub min_value: u32,
    pub max_value: u32,
    /// Short pause before the first step so the UI can redraw the fresh run.
    #[serde(with = "humantime_serde")]
    pub pre_run_delay: Duration,
    pub speed: Speed,
    pub algorithm: AlgorithmId,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub values: Option<Vec<u32>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sequence_len: SEQUENCE_LEN,
            min_value: MIN_VALUE,
            max_value: MAX_VALUE,
            pre_run_delay: Duration::from_millis(10),
            speed: Speed::Slow,
            algorithm: AlgorithmId::Bubble,
            seed: None,
            values: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmId {
    Bubble,
    Insertion,
    Selection,
    Merge,
    Quick,
    Radix,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 6] = [
        AlgorithmId::Bubble,
        AlgorithmId::Insertion,
        AlgorithmId::Selection,
        AlgorithmId::Merge,
        AlgorithmId::Quick,
        AlgorithmId::Radix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmId::Bubble => "bubble",
            AlgorithmId::Insertion => "insertion",
            AlgorithmId::Selection => "selection",
            AlgorithmId::Merge => "merge",
            AlgorithmId::Quick => "quick",
            AlgorithmId::Radix => "radix",
        }
    }

    /// Position in [`AlgorithmId::ALL`], used for tab-style cycling in the UI.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    pub fn delay_ms(self) -> u64 {
        match self {
            Speed::Slow => 1000,
            Speed::Normal => 500,
            Speed::Fast => 250,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Slow => "slow",
            Speed::Normal => "normal",
            Speed::Fast => "fast",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "slow" => Some(Speed::Slow),
            "normal" => Some(Speed::Normal),
            "fast" => Some(Speed::Fast),
            _ => None,
        }
    }

    /// Inverse of [`Speed::delay_ms`]; custom delays have no label.
    pub fn from_delay_ms(ms: u64) -> Option<Self> {
        [Speed::Slow, Speed::Normal, Speed::Fast]
            .into_iter()
            .find(|s| s.delay_ms() == ms)
    }
}

/// Map a speed label to a step delay. Unknown labels fall back to the normal speed.
pub fn delay_for_label(label: &str) -> u64 {
    Speed::from_label(label)
        .unwrap_or(Speed::Normal)
        .delay_ms()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    #[default]
    Idle,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub value: u32,
    pub state: ElementState,
}

impl Element {
    pub fn idle(value: u32) -> Self {
        Self {
            value,
            state: ElementState::Idle,
        }
    }

    /// Merge a partial update, keeping every field the update leaves unset.
    pub fn apply(&mut self, update: ElementUpdate) {
        if let Some(value) = update.value {
            self.value = value;
        }
        if let Some(state) = update.state {
            self.state = state;
        }
    }
}

/// Partial element update published by an engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementUpdate {
    pub value: Option<u32>,
    pub state: Option<ElementState>,
}

impl ElementUpdate {
    pub fn selected() -> Self {
        Self {
            value: None,
            state: Some(ElementState::Selected),
        }
    }

    pub fn idle() -> Self {
        Self {
            value: None,
            state: Some(ElementState::Idle),
        }
    }

    pub fn value(value: u32) -> Self {
        Self {
            value: Some(value),
            state: None,
        }
    }

    pub fn with_state(mut self, state: ElementState) -> Self {
        self.state = Some(state);
        self
    }
}

/// One update emitted by an engine, tagged with the run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub run_id: u64,
    pub index: usize,
    pub update: ElementUpdate,
}

/// Read-only copy of the controller state handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub sequence: Vec<Element>,
    pub algorithm: AlgorithmId,
    pub delay_ms: u64,
    pub is_sorted: bool,
    pub is_running: bool,
}

impl RunSnapshot {
    pub fn values(&self) -> Vec<u32> {
        self.sequence.iter().map(|e| e.value).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub algorithm: AlgorithmId,
    pub outcome: RunOutcome,
    pub initial: Vec<u32>,
    pub final_values: Vec<u32>,
    /// Number of element updates applied to the sequence during the run.
    pub steps: u64,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    Snapshot(RunSnapshot),
    Info(InfoEvent),
    RunFinished {
        report: Box<RunReport>,
    },
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    RunStarted { run_id: u64, algorithm: AlgorithmId },
    RunSuperseded { run_id: u64 },
    SpeedChanged { delay_ms: u64 },
    SequenceGenerated { len: usize },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::RunStarted { run_id, algorithm } => {
                format!("Run #{run_id} started ({} sort)", algorithm.as_str())
            }
            InfoEvent::RunSuperseded { run_id } => format!("Run #{run_id} cancelled"),
            InfoEvent::SpeedChanged { delay_ms } => format!("Step delay: {delay_ms} ms"),
            InfoEvent::SequenceGenerated { len } => format!("Generated {len} new values"),
        }
    }
}
