use serde::{Deserialize, Serialize};

/// Presentation view modes. Persisted as the `preferredView` scalar,
/// outside the settings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Compact,
    Grid,
    Table,
    Containers,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Compact
    }
}

impl ViewMode {
    pub fn parse(raw: &str) -> Option<ViewMode> {
        match raw {
            "compact" => Some(ViewMode::Compact),
            "grid" => Some(ViewMode::Grid),
            "table" => Some(ViewMode::Table),
            "containers" => Some(ViewMode::Containers),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Compact => "compact",
            ViewMode::Grid => "grid",
            ViewMode::Table => "table",
            ViewMode::Containers => "containers",
        }
    }
}
