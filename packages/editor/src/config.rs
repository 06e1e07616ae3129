use crate::errors::DocumentResult;
use folio_model::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Offsets consumed by a block boundary in offset views
    #[serde(default = "default_block_offset_size")]
    pub block_offset_size: usize,

    /// Undo levels kept (0 = unlimited)
    #[serde(default = "default_history_max_levels")]
    pub history_max_levels: usize,

    /// Merge and prune text nodes on commit
    #[serde(default = "default_true")]
    pub normalize_text: bool,
}

fn default_block_offset_size() -> usize {
    1
}

fn default_history_max_levels() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> DocumentResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json_str(&content)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    pub fn from_json_str(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Settings the node store needs
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            normalize_text: self.normalize_text,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            block_offset_size: default_block_offset_size(),
            history_max_levels: default_history_max_levels(),
            normalize_text: true,
        }
    }
}
