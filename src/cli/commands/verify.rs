//! Verify command implementation.
//!
//! The `prepkit verify` command checks the packages installed in a Python
//! environment against the workshop's `environment.yml`.

use std::path::{Path, PathBuf};

use crate::cli::args::VerifyArgs;
use crate::error::Result;
use crate::requirements::{InstalledPackages, RequirementChecker, RequirementSet};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Environment file read when `--environment` is not given.
const DEFAULT_ENVIRONMENT_FILE: &str = "environment.yml";

/// Interpreter queried when neither `--python` nor `--site-packages` is given.
const DEFAULT_PYTHON: &str = "python3";

/// The verify command implementation.
pub struct VerifyCommand {
    project_root: PathBuf,
    args: VerifyArgs,
}

impl VerifyCommand {
    /// Create a new verify command.
    pub fn new(project_root: &Path, args: VerifyArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Get the workshop root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the command arguments.
    pub fn args(&self) -> &VerifyArgs {
        &self.args
    }

    fn environment_path(&self) -> PathBuf {
        match &self.args.environment {
            Some(path) => self.project_root.join(path),
            None => self.project_root.join(DEFAULT_ENVIRONMENT_FILE),
        }
    }

    fn installed_packages(&self) -> Result<InstalledPackages> {
        // Explicit directories win over the interpreter, even one from PREPKIT_PYTHON.
        if !self.args.site_packages.is_empty() {
            let dirs: Vec<PathBuf> = self
                .args
                .site_packages
                .iter()
                .map(|dir| self.project_root.join(dir))
                .collect();
            return InstalledPackages::scan(&dirs);
        }

        let interpreter = self.args.python.as_deref().unwrap_or(DEFAULT_PYTHON);
        InstalledPackages::discover(interpreter)
    }
}

impl Command for VerifyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let environment_path = self.environment_path();
        let requirements = RequirementSet::load(&environment_path)?;
        tracing::debug!(
            "Loaded {} requirements from {}",
            requirements.len(),
            environment_path.display()
        );

        if requirements.is_empty() {
            ui.warning(&format!(
                "No requirements found in {}",
                environment_path.display()
            ));
        }

        let installed = self.installed_packages()?;

        ui.show_header("Checking Python environment");

        let report = RequirementChecker::new(&installed).check_all(&requirements);
        let show_satisfied = ui.output_mode().shows_details();

        for result in &report.results {
            if result.status.is_satisfied() {
                if show_satisfied {
                    ui.success(&result.describe());
                }
            } else {
                ui.error(&result.describe());
            }
        }

        if report.is_satisfied() {
            ui.success(&report.summary());
            Ok(CommandResult::success())
        } else {
            ui.message(&report.summary());
            Ok(CommandResult::failure(1))
        }
    }
}
