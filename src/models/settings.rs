use serde::{Deserialize, Serialize};

/// Contents of the settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub database_path: String,
    pub theme: String,
}
