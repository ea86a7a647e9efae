//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Normal output, plus files `fetch` left alone.
    Verbose,
    /// Show per-item status and summaries.
    #[default]
    Normal,
    /// Show only problems, spinners and the final summary.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows per-item detail such as satisfied packages.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Check if this mode reports entries that needed no work.
    pub fn lists_skipped(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}
