use indicatif::{ProgressBar, ProgressStyle};

use crate::output;

/// A determinate progress bar sized to the number of entries a pass
/// will process.
///
/// Renders to stderr, stays hidden in quiet mode, and clears itself when
/// dropped (RAII pattern), so an aborted run does not leave a stale bar
/// on the terminal.
pub struct TranslationProgress {
    bar: ProgressBar,
}

impl TranslationProgress {
    /// Creates a progress bar expecting `total` entries.
    #[allow(clippy::unwrap_used)]
    pub fn new(total: u64) -> Self {
        let bar = if output::is_quiet() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        // unwrap is safe: template string is a compile-time constant
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len}")
                .unwrap()
                .progress_chars("=>-"),
        );

        Self { bar }
    }

    /// Advances the bar by one entry.
    pub fn tick(&self) {
        self.bar.inc(1);
    }

    /// Completes the bar and clears it from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for TranslationProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
