//! Presets command implementation.
//!
//! The `prepkit presets` command lists the built-in data manifests.

use crate::data::{DataManifest, DEFAULT_PRESET};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The presets command implementation.
pub struct PresetsCommand;

impl Command for PresetsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        for name in DataManifest::preset_names() {
            let manifest = DataManifest::preset(&name)?;
            let marker = if name == DEFAULT_PRESET {
                " (default)"
            } else {
                ""
            };
            ui.message(&format!(
                "{}{}: {} files from {}",
                name,
                marker,
                manifest.resources.len(),
                manifest.base_url
            ));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn lists_every_preset() {
        let mut ui = MockUI::new();
        let result = PresetsCommand.execute(&mut ui).unwrap();
        assert!(result.success);
        assert_eq!(ui.messages().len(), DataManifest::preset_names().len());
        assert!(ui.has_message("roman-build13 (default): 12 files"));
        assert!(ui.has_message("roman-legacy: 2 files"));
    }
}
