//! Progress reporting for dialogue turns

use colored::Colorize;
use ideaforge_application::{Phase, ProgressNotifier};
use ideaforge_domain::Domain;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress during a dialogue turn with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("static progress template")
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .expect("static progress template")
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut guard) = self.phase_bar.lock() {
            f(&mut guard);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: Phase, total_tasks: usize) {
        // Only the compose phase has countable tasks
        let pb = if phase == Phase::Compose {
            let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
            pb.set_style(Self::bar_style());
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        pb.set_prefix(phase.display_name());
        pb.set_message("Starting...");

        self.with_bar(|bar| *bar = Some(pb));
    }

    fn on_agent_complete(&self, domain: Domain, success: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.as_ref() {
                let status = if success {
                    format!("{} {}", "v".green(), domain)
                } else {
                    format!("{} {}", "x".red(), domain)
                };
                pb.set_message(status);
                pb.inc(1);
            }
        });
    }

    fn on_phase_complete(&self, phase: Phase) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(format!("{} done", phase.as_str().green()));
            }
        });
    }
}

/// Plain line-based progress for non-interactive terminals
///
/// Writes to stderr so stdout stays clean for `-o json`.
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: Phase, total_tasks: usize) {
        if total_tasks > 1 {
            eprintln!("{} {} ({} agents)", "->".cyan(), phase.display_name().bold(), total_tasks);
        } else {
            eprintln!("{} {}", "->".cyan(), phase.display_name().bold());
        }
    }

    fn on_agent_complete(&self, domain: Domain, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), domain);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), domain);
        }
    }

    fn on_phase_complete(&self, _phase: Phase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_tracks_compose_bar() {
        let reporter = ProgressReporter::new();

        reporter.on_phase_start(Phase::Compose, 2);
        reporter.on_agent_complete(Domain::Code, true);
        reporter.on_agent_complete(Domain::Business, false);
        {
            let guard = reporter.phase_bar.lock().unwrap();
            assert_eq!(guard.as_ref().unwrap().position(), 2);
        }

        reporter.on_phase_complete(Phase::Compose);
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_agent_completion_without_phase_is_ignored() {
        let reporter = ProgressReporter::new();
        reporter.on_agent_complete(Domain::Science, true);
        reporter.on_phase_complete(Phase::Merge);
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }
}
