use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use vecset_core::models::{UploadPhase, UploadProgress};

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb.set_message(message.to_string());
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {}", message));
}

/// Terminal display for one upload: a spinner while the index is checked,
/// then a bar counting acknowledged records
pub struct UploadProgressDisplay {
    hidden: bool,
    current: Option<ProgressBar>,
}

impl UploadProgressDisplay {
    pub fn new(hidden: bool) -> Self {
        Self {
            hidden,
            current: None,
        }
    }

    pub fn update(&mut self, progress: &UploadProgress) {
        if self.hidden {
            return;
        }

        match progress.phase {
            UploadPhase::NotStarted => {}
            UploadPhase::CheckingPreconditions => {
                self.current = Some(create_spinner(&progress.message));
            }
            UploadPhase::Uploading => {
                if let Some(bar) = self.current.as_ref().filter(|bar| bar.length().is_some()) {
                    bar.set_position(progress.acknowledged as u64);
                    return;
                }
                if let Some(spinner) = self.current.take() {
                    finish_success(&spinner, "Index ready");
                }
                let bar = create_progress_bar(progress.total as u64, &progress.message);
                bar.set_position(progress.acknowledged as u64);
                self.current = Some(bar);
            }
            UploadPhase::Completed => {
                if let Some(bar) = self.current.take() {
                    bar.set_position(progress.acknowledged as u64);
                    finish_success(&bar, &progress.message);
                }
            }
            UploadPhase::Aborted => {
                if let Some(bar) = self.current.take() {
                    finish_error(&bar, &progress.message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(phase: UploadPhase, acknowledged: usize) -> UploadProgress {
        UploadProgress {
            phase,
            acknowledged,
            total: 10,
            message: String::new(),
        }
    }

    #[test]
    fn test_hidden_display_draws_nothing() {
        let mut display = UploadProgressDisplay::new(true);
        display.update(&progress(UploadPhase::CheckingPreconditions, 0));
        assert!(display.current.is_none());
    }

    #[test]
    fn test_bar_follows_acknowledged_records() {
        let mut display = UploadProgressDisplay::new(false);
        display.update(&progress(UploadPhase::CheckingPreconditions, 0));
        display.update(&progress(UploadPhase::Uploading, 0));
        display.update(&progress(UploadPhase::Uploading, 4));

        let bar = display.current.as_ref().unwrap();
        assert_eq!(bar.length(), Some(10));
        assert_eq!(bar.position(), 4);

        display.update(&progress(UploadPhase::Completed, 10));
        assert!(display.current.is_none());
    }
}
