//! Progress reporting for story turns

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lexiquest_application::ports::progress::ProgressNotifier;
use lexiquest_domain::Actor;
use std::sync::Mutex;
use std::time::Duration;

/// Shows a spinner while an actor is working
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn working_label(actor: Actor) -> &'static str {
        match actor {
            Actor::Narrator => "Telling the story",
            Actor::ChallengeSetter => "Preparing challenges",
            Actor::Assessor => "Checking answers",
            Actor::Manager => "Deciding what comes next",
            Actor::Alignment => "Checking input",
            Actor::Human | Actor::System => "Working",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_actor_start(&self, actor: Actor, detail: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(Self::working_label(actor));
        pb.set_message(detail.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_actor_complete(&self, actor: Actor, success: bool) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            if success {
                pb.finish_and_clear();
            } else {
                pb.finish_with_message(format!("{} {} fell back", "x".red(), actor.display_name()));
            }
        }
    }

    fn on_turn_complete(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_actor_start(&self, actor: Actor, detail: &str) {
        println!(
            "{} {} {}",
            "->".cyan(),
            ProgressReporter::working_label(actor).bold(),
            detail.dimmed()
        );
    }

    fn on_actor_complete(&self, actor: Actor, success: bool) {
        if !success {
            println!("  {} {} (fallback used)", "x".red(), actor.display_name());
        }
    }
}
