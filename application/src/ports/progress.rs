//! Progress notification port
//!
//! Defines the interface for reporting progress while a dialogue turn runs.

use ideaforge_domain::Domain;

/// Stage of one dialogue turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Classify,
    Compose,
    Merge,
    Render,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Classify => "classify",
            Phase::Compose => "compose",
            Phase::Merge => "merge",
            Phase::Render => "render",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Classify => "Classifying idea",
            Phase::Compose => "Consulting experts",
            Phase::Merge => "Building consensus",
            Phase::Render => "Rendering diagram",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Callback for progress updates
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: Phase, total_tasks: usize);

    /// Called when one agent finishes during [`Phase::Compose`]
    fn on_agent_complete(&self, domain: Domain, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: Phase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: Phase, _total_tasks: usize) {}
    fn on_agent_complete(&self, _domain: Domain, _success: bool) {}
    fn on_phase_complete(&self, _phase: Phase) {}
}
