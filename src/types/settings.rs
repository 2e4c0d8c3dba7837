use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Theme selection. Serialized lowercase to match the persisted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

/// Flat user settings map.
///
/// Every field carries a serde default, so loading a partial blob merges it
/// key-by-key over the defaults. Keys outside the schema are preserved in
/// `extra` and round-trip unchanged, so settings written by a newer build
/// survive a pass through this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub compact_view: bool,
    #[serde(default = "default_true")]
    pub open_in_new_tab: bool,
    #[serde(default = "default_true")]
    pub auto_fetch_meta: bool,
    #[serde(default)]
    pub enable_notifications: bool,
    #[serde(default)]
    pub auto_backup: bool,
    #[serde(default = "default_theme")]
    pub theme: ThemeMode,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
    #[serde(default)]
    pub enable_debug: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> ThemeMode {
    ThemeMode::Light
}

fn default_items_per_page() -> u32 {
    50
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            compact_view: true,
            open_in_new_tab: true,
            auto_fetch_meta: true,
            enable_notifications: false,
            auto_backup: false,
            theme: ThemeMode::Light,
            items_per_page: 50,
            enable_debug: false,
            extra: Map::new(),
        }
    }
}

impl AppSettings {
    /// Sets a single option by its camelCase key, routing through a
    /// `serde_json::Value` round-trip so typed fields are validated and
    /// unknown keys land in `extra`.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<(), serde_json::Error> {
        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(map) = &mut current {
            map.insert(key.to_string(), value);
        }
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    /// Key-by-key merge: keys present in `imported` override, everything
    /// else is retained. Returns `None` when a typed field receives an
    /// incompatible value.
    pub fn merged(&self, imported: &Value) -> Option<AppSettings> {
        let mut current = serde_json::to_value(self).ok()?;
        let incoming = imported.as_object()?;
        if let Value::Object(map) = &mut current {
            for (key, value) in incoming {
                map.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(current).ok()
    }
}
