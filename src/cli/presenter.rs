//! CLI presenter for output formatting

use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::session::{SessionSnapshot, SessionState};
use crate::domain::template::{TemplateCatalog, TemplateId};
use crate::domain::upload::UploadResult;

/// Status label shown for a session state
pub fn status_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "● Ready",
        SessionState::Recording => "◉ Recording...",
        SessionState::Uploading => "↑ Uploading...",
        SessionState::Done => "✓ Done!",
        SessionState::Error => "✗ Error",
    }
}

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Finish the spinner with a success line. Without a terminal the
    /// spinner is hidden, so the line is printed plainly.
    pub fn spinner_success(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) if !spinner.is_hidden() => {
                spinner.finish_with_message(format!("{} {}", "✓".green(), message));
            }
            _ => self.success(message),
        }
    }

    pub fn spinner_fail(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) if !spinner.is_hidden() => {
                spinner.finish_with_message(format!("{} {}", "✗".red(), message));
            }
            _ => self.error(message),
        }
    }

    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair to stdout
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Colored status line for a snapshot
    pub fn format_status(&self, snapshot: &SessionSnapshot) -> String {
        let label = status_label(snapshot.state);
        let label = match snapshot.state {
            SessionState::Idle => label.normal(),
            SessionState::Recording => label.red().bold(),
            SessionState::Uploading => label.yellow(),
            SessionState::Done => label.green(),
            SessionState::Error => label.red(),
        };
        format!("{}  [{}]", label, snapshot.template)
    }

    /// Print the status line and whatever outcome the snapshot carries
    pub fn session_status(&self, snapshot: &SessionSnapshot) {
        eprintln!("{}", self.format_status(snapshot));
        if let Some(message) = snapshot.error.as_deref() {
            self.error(message);
        }
        if let Some(result) = snapshot.result.as_ref() {
            self.upload_result(result);
        }
    }

    /// Print the backend acknowledgment to stdout
    pub fn upload_result(&self, result: &UploadResult) {
        self.key_value("job_id", &result.job_id);
        self.key_value("template", &result.template);
        self.key_value("file_size_kb", &format_size_kb(result.file_size_kb));
        self.output(&result.stub_response);
    }

    /// List the catalog, marking the selected template
    pub fn templates(&self, catalog: &TemplateCatalog, selected: &TemplateId) {
        for template in catalog.templates() {
            let line = format!("{:<20} {}", template.id.as_str(), template.label);
            if &template.id == selected {
                println!("{} {}", "*".green(), line.bold());
            } else {
                println!("  {}", line);
            }
        }
    }

    /// Keys accepted in interactive mode
    pub fn interactive_help(&self) {
        eprintln!(
            "{} Enter: start/stop  t <id>: template  s: status  q: quit",
            "ℹ".cyan()
        );
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Size with one decimal, as the backend rounds it
pub fn format_size_kb(kb: f64) -> String {
    format!("{:.1} KB", kb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_per_state() {
        assert_eq!(status_label(SessionState::Idle), "● Ready");
        assert_eq!(status_label(SessionState::Recording), "◉ Recording...");
        assert_eq!(status_label(SessionState::Uploading), "↑ Uploading...");
        assert_eq!(status_label(SessionState::Done), "✓ Done!");
        assert_eq!(status_label(SessionState::Error), "✗ Error");
    }

    #[test]
    fn status_line_names_template() {
        colored::control::set_override(false);
        let snapshot = SessionSnapshot {
            state: SessionState::Uploading,
            template: TemplateId::new("tagebuch"),
            result: None,
            error: None,
        };
        let line = Presenter::new().format_status(&snapshot);
        assert_eq!(line, "↑ Uploading...  [tagebuch]");
    }

    #[test]
    fn size_has_one_decimal() {
        assert_eq!(format_size_kb(12.0), "12.0 KB");
        assert_eq!(format_size_kb(7.26), "7.3 KB");
    }
}
