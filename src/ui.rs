use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
}

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    let mut quiet_mode = QUIET_MODE.lock();
    *quiet_mode = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

/// Spinner drawn on stderr, so generated output on stdout stays pipeable
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("✦✧✶✷✸✹✺✻✼✽")
            .template("{spinner} {msg}")
            .expect("Could not set spinner style"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// Status lines go to stderr; stdout carries the rendered notes.

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            "relnotes"
                .truecolor(
                    rgb::ELECTRIC_PURPLE.0,
                    rgb::ELECTRIC_PURPLE.1,
                    rgb::ELECTRIC_PURPLE.2
                )
                .bold(),
            "version".truecolor(rgb::NEON_CYAN.0, rgb::NEON_CYAN.1, rgb::NEON_CYAN.2),
            version.green()
        );
    }
}

/// Dimmed key/value line for startup summaries
pub fn print_setting(key: &str, value: &str) {
    if !is_quiet_mode() {
        eprintln!(
            "  {} {}",
            format!("{key}:").truecolor(rgb::DIM_WHITE.0, rgb::DIM_WHITE.1, rgb::DIM_WHITE.2),
            value.bold()
        );
    }
}
