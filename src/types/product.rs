use serde::{Deserialize, Serialize};

/// Identifying metadata stamped into every export and backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl Default for ProductInfo {
    fn default() -> Self {
        Self {
            name: "BookmarkPro".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            url: "https://bookmarkpro.app".to_string(),
        }
    }
}
