//! Configuration for the formulation engine.

use serde::{Deserialize, Serialize};

use crate::settings::RoleGroupSettings;
use rules::RequiredGroupNames;

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulationConfig {
    /// Catalog checks
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Recipe generation
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl FormulationConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Group names every color variant must contain
    #[serde(default)]
    pub required_groups: RequiredGroupNames,
}

/// Generation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Role groups; generation fails while any is unset
    #[serde(default)]
    pub role_groups: RoleGroupSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_default_config() {
        let config = FormulationConfig::default();
        assert_eq!(config.catalog.required_groups.pigments, "Pigments");
        assert_eq!(config.catalog.required_groups.fillers, "Fillers");
        assert!(config.generation.role_groups.resolve().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let group = Uuid::new_v4();
        let yaml = format!(
            "generation:\n  role_groups:\n    pigments_group_id: {group}\n"
        );

        let config = FormulationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.generation.role_groups.pigments_group_id, Some(group));
        assert_eq!(config.catalog.required_groups.fillers, "Fillers");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = FormulationConfig::default();
        config.catalog.required_groups.pigments = "Пигменты".to_string();

        let yaml = config.to_yaml().unwrap();
        let parsed = FormulationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
