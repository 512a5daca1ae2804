//! Terminal rendering of the view model.
mod render;

use std::io::{self, Write};
use std::time::Duration;

use bdix_core::{AppViewModel, Severity};
use indicatif::{ProgressBar, ProgressStyle};

pub use render::{endpoint_listing, notice_line, progress_message};

const BAR_TEMPLATE: &str = "{spinner} Testing [{bar:40}] {pos:>3}% {msg}";

/// Progress bar plus printed notices. Lines printed through here do not
/// tear the bar.
pub struct TerminalUi {
    bar: ProgressBar,
}

impl TerminalUi {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn render(&self, view: &AppViewModel) {
        self.bar.set_position(u64::from(view.progress));
        self.bar.set_message(progress_message(view));
    }

    pub fn notify(&self, severity: Severity, message: &str) {
        self.bar.println(notice_line(severity, message));
    }

    pub fn show_endpoints(&self, endpoints: &[String]) {
        self.bar.println(endpoint_listing(endpoints));
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Stderr writer for the logger that hides the bar while a line is written.
    pub fn log_writer(&self) -> BarLogWriter {
        BarLogWriter {
            bar: self.bar.clone(),
        }
    }
}

pub struct BarLogWriter {
    bar: ProgressBar,
}

impl Write for BarLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
