use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeStore;

fn enabled() -> bool {
    true
}

/// Extension-facing toggles. Consumed by fill orchestration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "enabled")]
    pub auto_fill: bool,
    #[serde(default = "enabled")]
    pub show_notification: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_fill: true,
            show_notification: true,
        }
    }
}

/// Partial settings change; absent keys keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub auto_fill: Option<bool>,
    pub show_notification: Option<bool>,
}

impl SettingsUpdate {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(auto_fill) = self.auto_fill {
            settings.auto_fill = auto_fill;
        }
        if let Some(show_notification) = self.show_notification {
            settings.show_notification = show_notification;
        }
    }
}

/// Everything kept between sessions, laid out under the extension's storage keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub resume_data: ResumeStore,
    #[serde(flatten)]
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default_to_enabled() {
        let state: PersistedState = serde_json::from_str("{}").unwrap();
        assert!(state.settings.auto_fill);
        assert!(state.settings.show_notification);
        assert!(state.resume_data.is_empty());
    }

    #[test]
    fn test_storage_keys_are_camel_case() {
        let state = PersistedState {
            settings: Settings {
                auto_fill: false,
                show_notification: true,
            },
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["autoFill"], false);
        assert_eq!(json["showNotification"], true);
        assert!(json["resumeData"].is_object());
    }

    #[test]
    fn test_partial_update_keeps_other_toggle() {
        let mut settings = Settings::default();
        let update: SettingsUpdate = serde_json::from_str(r#"{"autoFill": false}"#).unwrap();
        update.apply(&mut settings);
        assert!(!settings.auto_fill);
        assert!(settings.show_notification);
    }
}
