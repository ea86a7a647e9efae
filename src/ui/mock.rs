//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use prepkit::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.error("\"scipy\" is not installed");
//!
//! assert!(ui.has_error("scipy"));
//! assert!(ui.successes().is_empty());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<Rc<RefCell<MockSpinnerState>>>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Snapshot of every spinner started so far.
    pub fn spinners(&self) -> Vec<MockSpinner> {
        self.spinners
            .iter()
            .map(|state| MockSpinner {
                state: Rc::clone(state),
            })
            .collect()
    }

    /// Check if a message containing the given text was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a success message containing the given text was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a warning containing the given text was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if an error containing the given text was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let state = Rc::new(RefCell::new(MockSpinnerState {
            message: message.to_string(),
            ..Default::default()
        }));
        self.spinners.push(Rc::clone(&state));
        Box::new(MockSpinner { state })
    }
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    /// Finished successfully.
    Success,
    /// Finished with error.
    Error,
}

#[derive(Debug, Default)]
struct MockSpinnerState {
    message: String,
    finish_message: Option<String>,
    status: Option<SpinnerStatus>,
}

/// Mock spinner that captures its message and outcome.
///
/// Handles returned by [`MockUI::start_spinner`] share state with the
/// snapshots from [`MockUI::spinners`].
#[derive(Debug, Clone)]
pub struct MockSpinner {
    state: Rc<RefCell<MockSpinnerState>>,
}

impl MockSpinner {
    /// The message the spinner was started with.
    pub fn message(&self) -> String {
        self.state.borrow().message.clone()
    }

    /// The final finish message.
    pub fn finish_message(&self) -> Option<String> {
        self.state.borrow().finish_message.clone()
    }

    /// How the spinner finished, if it has.
    pub fn status(&self) -> Option<SpinnerStatus> {
        self.state.borrow().status
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        let mut state = self.state.borrow_mut();
        state.finish_message = Some(msg.to_string());
        state.status = Some(SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        let mut state = self.state.borrow_mut();
        state.finish_message = Some(msg.to_string());
        state.status = Some(SpinnerStatus::Error);
    }
}
