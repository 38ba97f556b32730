//! Terminal progress bar for metadata resolution

use std::io::{self, Write};

use crate::resolver::{ProgressCallback, ResolveProgress};

/// Number of cells in the bar
pub const BAR_WIDTH: usize = 50;

/// Fixed-width progress bar redrawn in place with a carriage return
pub struct ProgressBar;

impl ProgressBar {
    /// Render `[█████     ] 10%` for `current` out of `total`
    pub fn render(current: usize, total: usize) -> String {
        let fraction = if total == 0 {
            1.0
        } else {
            (current.min(total) as f64) / (total as f64)
        };

        let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        let percent = (fraction * 100.0).round() as u32;

        format!(
            "[{}{}] {}%",
            "█".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            percent
        )
    }

    /// Overwrite the current line of `out` with the bar
    pub fn draw<W: Write>(out: &mut W, current: usize, total: usize) -> io::Result<()> {
        write!(out, "\r{}", Self::render(current, total))?;
        out.flush()
    }

    /// Callback drawing the bar on stdout after each resolved beatmap set
    pub fn stdout_callback() -> ProgressCallback {
        Box::new(|progress: ResolveProgress| {
            let mut out = io::stdout().lock();
            // Progress output is best-effort
            let _ = Self::draw(&mut out, progress.current, progress.total);
        })
    }
}
