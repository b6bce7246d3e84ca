use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while the blocking stages run
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start the spinner, or update its message if already running
    pub fn progress(&mut self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn error(&mut self, message: &str) {
        self.finish();
        eprintln!("\x1b[31m✗\x1b[0m {message}");
    }

    pub fn warn(&mut self, message: &str) {
        self.finish();
        eprintln!("\x1b[33m!\x1b[0m {message}");
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.finish();
    }
}
