//! Mood engine module
//!
//! Change detection and the periodic fetch → fuse → decide → dispatch cycle

mod change;
mod orchestrator;
mod report;

pub use change::ChangeDetector;
pub use orchestrator::{MoodOrchestrator, OrchestratorSettings};
pub use report::CycleReport;
