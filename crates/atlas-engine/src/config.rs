use serde::{Deserialize, Serialize};

/// Rules of a game.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum classifier confidence for a user's answer to count as a country.
    pub acceptance_threshold: f64,
    /// Letters with fewer catalog countries than this are never dealt.
    pub min_countries_per_letter: usize,
    /// Also reject answers the classifier accepts but the catalog does not know.
    pub require_catalog_match: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            min_countries_per_letter: 3,
            require_catalog_match: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"require_catalog_match": true}"#).unwrap();
        assert!(config.require_catalog_match);
        assert_eq!(config.acceptance_threshold, 0.6);
        assert_eq!(config.min_countries_per_letter, 3);
    }
}
