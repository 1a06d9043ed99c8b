use crate::config::{default_product_name, default_title};

use serde::{Deserialize, Serialize};

/// Product naming and strip header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Prefix of every download filename.
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Strip header title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Optional line under the title.
    #[serde(default)]
    pub tagline: Option<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            title: default_title(),
            tagline: None,
        }
    }
}
