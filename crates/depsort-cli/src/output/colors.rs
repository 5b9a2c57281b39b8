//! Terminal colors, disabled by `NO_COLOR` or when not writing to a TTY.

use std::env;
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    /// Detect color support from the terminal and `NO_COLOR`
    pub fn detect() -> Self {
        if Self::should_use_colors() {
            Self::enabled()
        } else {
            Self::disabled()
        }
    }

    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn should_use_colors() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        io::stderr().is_terminal() && io::stdout().is_terminal()
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Format text in green
    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    /// Format text in yellow
    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    /// Format text in red
    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    /// Format text in cyan
    pub fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }

    /// Format text dimmed
    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}
