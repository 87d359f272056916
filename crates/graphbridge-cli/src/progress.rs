//! Terminal feedback for R-MAT generation, dataset I/O and verification
//!
//! Every constructor returns `None` under `--quiet`, and every helper accepts
//! that `None`, so commands never branch on the flag themselves.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner for work of unknown length (loading, writing, reconciling)
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner().with_message(message.to_string());
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_TICKS)
            .template("{spinner:.cyan} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Bar counting generated edges up to `total`
pub fn progress_bar(total: u64, message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new(total).with_message(message.to_string());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} edges ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓░"),
    );
    Some(pb)
}

pub fn set_progress(pb: &Option<ProgressBar>, position: u64) {
    if let Some(pb) = pb {
        pb.set_position(position);
    }
}

/// Replace the spinner with a green check mark
pub fn finish_spinner(pb: Option<ProgressBar>, message: &str) {
    finish_marked(pb, "{prefix:.green} {msg}", "✓", message);
}

/// Replace the spinner with a red cross
pub fn finish_spinner_error(pb: Option<ProgressBar>, message: &str) {
    finish_marked(pb, "{prefix:.red} {msg}", "✗", message);
}

fn finish_marked(pb: Option<ProgressBar>, template: &str, mark: &'static str, message: &str) {
    let Some(pb) = pb else {
        return;
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(template)
            .expect("Invalid finish template"),
    );
    pb.set_prefix(mark);
    pb.finish_with_message(message.to_string());
}

/// Remove a finished bar from the terminal
pub fn finish_progress(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}
