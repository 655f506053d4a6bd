// SPDX-License-Identifier: AGPL-3.0-or-later
//! Conversion configuration

use serde::{Deserialize, Serialize};

/// Settings shared by both conversion directions
///
/// Deserializes from a TOML `[convert]` table or any other serde source;
/// missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Fail on unregistered node and mark types instead of warning
    pub strict: bool,
    /// Maximum nesting depth accepted before giving up
    pub max_depth: usize,
    /// Node type of the annotated-leaf document root
    pub root_type: String,
    /// Node type of annotated-leaf text runs
    pub text_type: String,
    /// Node type given to a synthesized nested-annotation root
    pub root_kind: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: 512,
            root_type: "doc".to_string(),
            text_type: "text".to_string(),
            root_kind: "root".to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert!(!config.strict);
        assert_eq!(config.max_depth, 512);
        assert_eq!(config.root_type, "doc");
        assert_eq!(config.text_type, "text");
    }

    #[test]
    fn test_partial_toml() {
        let config: ConvertConfig = toml::from_str("strict = true\nmax_depth = 64\n").unwrap();
        assert!(config.strict);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.root_kind, "root");
    }
}
