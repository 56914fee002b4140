use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Stages of a dispersion run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reference,
    Structure,
    Damping,
    Evaluation,
    Output,
}

impl Stage {
    const ALL: [Stage; 5] = [
        Stage::Reference,
        Stage::Structure,
        Stage::Damping,
        Stage::Evaluation,
        Stage::Output,
    ];

    fn label(self) -> &'static str {
        match self {
            Stage::Reference => "Loading reference data",
            Stage::Structure => "Reading structure",
            Stage::Damping => "Resolving damping parameters",
            Stage::Evaluation => "Evaluating dispersion energy",
            Stage::Output => "Writing output",
        }
    }

    fn number(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0) + 1
    }
}

/// Spinner and timing lines for the stages of a run; silent when not interactive.
pub struct Progress {
    interactive: bool,
    spinner: Option<ProgressBar>,
    start: Instant,
    stage_start: Instant,
}

impl Progress {
    pub fn new(interactive: bool) -> Self {
        let now = Instant::now();
        Self {
            interactive,
            spinner: None,
            start: now,
            stage_start: now,
        }
    }

    pub fn begin(&mut self, stage: Stage) {
        if !self.interactive {
            return;
        }
        self.clear();
        self.stage_start = Instant::now();

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_message(format!(
            "[{}/{}] {}...",
            stage.number(),
            Stage::ALL.len(),
            stage.label()
        ));
        self.spinner = Some(spinner);
    }

    /// Replaces the spinner with a timed check line and one line per detail.
    pub fn complete(&mut self, stage: Stage, details: &[String]) {
        if !self.interactive {
            return;
        }
        self.clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            stage.label(),
            self.stage_start.elapsed().as_secs_f64()
        );
        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", detail);
        }
    }

    pub fn finish(mut self, frames: usize) {
        if !self.interactive {
            return;
        }
        self.clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
        );
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m Dispersion energy for {:<6} {:>24}",
            format!("{} frame{}", frames, if frames == 1 { "" } else { "s" }),
            format!("Total: {:.2}s", self.start.elapsed().as_secs_f64())
        );
        let _ = writeln!(stderr);
    }

    fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
