//! Core types for base recipes and generated recipes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use rules::{GroupId, MaterialId, Rules};

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Saved draft
    #[default]
    Registered,
    /// Accepted; rules are fully validated
    Posted,
    /// Marked for deletion
    SetToDeletion,
}

impl DocumentStatus {
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// A base recipe document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRecipe {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub status: DocumentStatus,
    pub document_datetime: DateTime<Utc>,
    /// Bill-of-materials; may be absent on drafts
    pub rules: Option<Rules>,
}

impl BaseRecipe {
    /// Create a registered draft.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: Some(name.into()),
            commentary: String::new(),
            status: DocumentStatus::Registered,
            document_datetime: Utc::now(),
            rules: None,
        }
    }

    /// Builder: set rules.
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Builder: set status.
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }
}

/// The finished product a recipe is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProduct {
    pub nomenclature_id: Uuid,
    /// Declared color of the product
    pub color: Option<String>,
}

impl TargetProduct {
    pub fn new(nomenclature_id: Uuid, color: Option<String>) -> Self {
        Self {
            nomenclature_id,
            color,
        }
    }

    /// Read the color from a product's free-form properties.
    ///
    /// `color` is either a string or a list whose first string is used.
    /// Blank colors count as absent.
    pub fn from_properties(nomenclature_id: Uuid, properties: &serde_json::Value) -> Self {
        let color = match properties.get("color") {
            Some(serde_json::Value::String(color)) => Some(color.clone()),
            Some(serde_json::Value::Array(colors)) => colors
                .iter()
                .find_map(|c| c.as_str())
                .map(str::to_string),
            _ => None,
        }
        .filter(|color| !color.trim().is_empty());

        Self {
            nomenclature_id,
            color,
        }
    }
}

/// A request to generate a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub base_recipe_id: Uuid,
    pub nomenclature_id: Uuid,
    /// Planned batch size, strictly positive
    pub batch_size: Decimal,
}

/// A compositional role resolved during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    FilmFormers,
    Pigments,
    Fillers,
    Additive { group_id: GroupId, name: String },
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilmFormers => f.write_str("film formers"),
            Self::Pigments => f.write_str("pigments"),
            Self::Fillers => f.write_str("fillers"),
            Self::Additive { name, .. } => f.write_str(name),
        }
    }
}

/// In-stock candidates of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCandidates {
    pub role: Role,
    pub available: BTreeSet<MaterialId>,
}

/// Recipe skeleton with the availability-checked candidates per role.
///
/// Final quantities are picked by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub id: Uuid,
    pub nomenclature_id: Uuid,
    pub base_recipe_id: Uuid,
    pub batch_size: Decimal,
    /// Color of the selected pigment-part variant
    pub color: String,
    pub document_datetime: DateTime<Utc>,
    /// Roles in resolution order
    pub roles: Vec<RoleCandidates>,
}

impl GeneratedRecipe {
    /// Candidates of a role.
    pub fn candidates(&self, role: &Role) -> Option<&BTreeSet<MaterialId>> {
        self.roles
            .iter()
            .find(|candidates| &candidates.role == role)
            .map(|candidates| &candidates.available)
    }
}
