//! Settings screen commands

use tracing::error;

use crate::models::SettingsForm;
use crate::notify::{Notice, Notifier};
use crate::settings::{SettingsError, SettingsFile, Theme};

/// Fill the settings screen from the loaded document
pub fn load_settings_form(settings: &SettingsFile) -> SettingsForm {
    SettingsForm {
        database_path: settings.raw_storage_path().display().to_string(),
        theme: settings.theme().to_string(),
    }
}

/// Write both fields back to the document and return the theme to apply.
///
/// The new storage path takes effect on the next start; the open store
/// keeps its files.
pub fn save_settings(
    settings: &mut SettingsFile,
    form: &SettingsForm,
    notifier: &dyn Notifier,
) -> Result<Theme, SettingsError> {
    settings.set_storage_path(form.database_path.trim());
    settings.set_theme(&form.theme);

    match settings.save() {
        Ok(()) => {
            notifier.notify(Notice::info("Success", "Settings saved successfully."));
            Ok(settings.resolved_theme())
        }
        Err(e) => {
            error!("Error saving settings: {e}");
            notifier.notify(Notice::error("Error", format!("Error saving settings: {e}")));
            Err(e)
        }
    }
}
