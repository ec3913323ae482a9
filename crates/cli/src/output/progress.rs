//! Progress display
//!
//! A counter tracks batch removal chunk by chunk; a spinner ticks while a
//! streaming listing runs. Both are no-ops when progress is hidden.

use std::time::Duration;

use indicatif::ProgressStyle;

use super::OutputConfig;

const COUNTER_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const TICK: Duration = Duration::from_millis(100);

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    fn build(config: &OutputConfig, make: impl FnOnce() -> indicatif::ProgressBar) -> Self {
        Self {
            bar: config.shows_progress().then(make),
        }
    }

    /// Counted bar over `total` objects
    pub fn counter(config: &OutputConfig, total: u64) -> Self {
        Self::build(config, || {
            indicatif::ProgressBar::new(total).with_style(
                style(COUNTER_TEMPLATE, ProgressStyle::default_bar()).progress_chars("#>-"),
            )
        })
    }

    /// Ticking spinner for work of unknown length
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        Self::build(config, || {
            let bar = indicatif::ProgressBar::new_spinner()
                .with_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner()))
                .with_message(message.to_string());
            bar.enable_steady_tick(TICK);
            bar
        })
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_hidden_by_flags() {
        let hidden = [
            OutputConfig {
                quiet: true,
                ..Default::default()
            },
            OutputConfig {
                json: true,
                ..Default::default()
            },
            OutputConfig {
                no_progress: true,
                ..Default::default()
            },
        ];
        for config in &hidden {
            assert!(!config.shows_progress());
            assert!(!ProgressBar::counter(config, 100).is_visible());
        }
    }

    #[test]
    fn test_counter_visible_by_default() {
        let bar = ProgressBar::counter(&OutputConfig::default(), 2000);
        assert!(bar.is_visible());
        bar.inc(1000);
        bar.finish_and_clear();
    }

    #[test]
    fn test_spinner_suppressed_in_json_mode() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        };
        let spinner = ProgressBar::spinner(&config, "Listing");
        assert!(!spinner.is_visible());
        spinner.set_message("ignored");
        spinner.finish_and_clear();
    }

    #[test]
    fn test_templates_parse() {
        assert!(ProgressStyle::with_template(COUNTER_TEMPLATE).is_ok());
        assert!(ProgressStyle::with_template(SPINNER_TEMPLATE).is_ok());
    }
}
