//! Application-level orchestration.
//!
//! This module owns the run lifecycle (generate/start/cancel/restart) and the single
//! session state. UI/CLI layers talk to it only through commands and published events.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
