//! Terminal UI.
//!
//! Messages, successes and headers go to stdout; warnings and errors go to
//! stderr so that unmet requirements can be separated from the rest.

use console::Term;
use std::io::Write;

use super::{
    should_use_colors, OutputMode, PrepkitTheme, ProgressSpinner, SpinnerHandle, UserInterface,
};

/// Terminal UI implementation.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: PrepkitTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            PrepkitTheme::new()
        } else {
            PrepkitTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_details() {
            writeln!(self.out, "{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.out.is_term() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            // No animation off-terminal; still report the operation.
            writeln!(self.out, "{}", message).ok();
            Box::new(PlainSpinner {
                out: self.out.clone(),
                theme: self.theme.clone(),
            })
        }
    }
}

/// Spinner stand-in that prints only the outcome line.
struct PlainSpinner {
    out: Term,
    theme: PrepkitTheme,
}

impl SpinnerHandle for PlainSpinner {
    fn finish_success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn finish_error(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_error(msg)).ok();
    }
}

/// Create the terminal UI for the given output mode.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
