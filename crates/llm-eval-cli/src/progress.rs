//! Progress bar for suite runs.

use indicatif::{ProgressBar, ProgressStyle};
use llm_eval_core::{Combination, RoundReport, SuiteProgress};
use std::sync::Mutex;

/// Draws one bar per suite, advanced as combinations complete.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteProgress for BarProgress {
    fn on_suite_start(&self, total_combinations: usize) {
        let bar = ProgressBar::new(total_combinations as u64);
        bar.set_style(Self::style());
        bar.set_message("Starting...");
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_combination_start(&self, _index: usize, combination: &Combination) {
        self.with_bar(|bar| bar.set_message(combination.to_string()));
    }

    fn on_combination_complete(&self, _index: usize, _rounds: &[RoundReport]) {
        self.with_bar(|bar| bar.inc(1));
    }

    fn on_suite_finish(&self, succeeded: bool) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = guard.take() {
            if succeeded {
                bar.finish_with_message("done");
            } else {
                bar.abandon_with_message("failed");
            }
        }
    }
}
