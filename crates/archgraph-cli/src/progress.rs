//! Stage spinners for the CLI
//!
//! Spinners are drawn on stderr so stdout stays clean JSON. Nothing is drawn
//! when --quiet is set.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// One long-running step (clone, analysis) with a spinner while it runs.
pub struct Stage {
    bar: Option<ProgressBar>,
}

impl Stage {
    pub fn start(message: impl Into<String>, quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(style("{spinner:.cyan} {msg}").tick_chars(TICKS));
            pb.set_message(message.into());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self { bar }
    }

    pub fn done(self, message: impl Into<String>) {
        self.finish("{prefix:.green} {msg}", "✓", message.into());
    }

    pub fn fail(self, message: impl Into<String>) {
        self.finish("{prefix:.red} {msg}", "✗", message.into());
    }

    fn finish(self, template: &str, prefix: &'static str, message: String) {
        if let Some(pb) = self.bar {
            pb.set_style(style(template));
            pb.set_prefix(prefix);
            pb.finish_with_message(message);
        }
    }
}
