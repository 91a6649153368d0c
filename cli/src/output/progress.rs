//! Install spinner built on indicatif.

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];
const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Start a steadily ticking spinner showing `msg`.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .expect("valid template")
        .tick_strings(TICKS);
    let pb = ProgressBar::new_spinner().with_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}

pub fn finish_ok(pb: &ProgressBar, msg: &str) {
    finish(pb, "✓", msg);
}

pub fn finish_warn(pb: &ProgressBar, msg: &str) {
    finish(pb, "!", msg);
}

/// Freeze the spinner line as `<mark> <msg>`.
fn finish(pb: &ProgressBar, mark: &'static str, msg: &str) {
    pb.set_style(ProgressStyle::with_template("  {prefix} {msg}").expect("valid template"));
    pb.set_prefix(mark);
    pb.finish_with_message(msg.to_string());
}
