//! Error types for rules validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broad category of a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Shape or self-consistency of the document
    Structural,
    /// Catalog existence mismatch
    Reference,
    /// Operator setup missing
    Configuration,
    /// No in-stock candidates for a role
    Availability,
    /// Wrong document state or missing product attribute
    Precondition,
    /// Failure of an external lookup; the only retryable category
    Io,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}

/// Error types for the catalog collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// Catalog backend is not reachable
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Query failed
    #[error("Catalog query failed: {0}")]
    QueryFailed(String),
}

/// Why a rules document was rejected.
///
/// Structural variants carry the exact path of the offending value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Materials list must not be empty: {path}")]
    EmptyList { path: String },

    #[error("Set value of nomenclature id in {path}")]
    MissingIdentifier { path: String },

    #[error("Set value of material ratio in {path}")]
    MissingRatio { path: String },

    #[error("Material ratio must be positive in {path}")]
    NonPositiveRatio { path: String },

    #[error("Dosage must contain exactly one dosage method, got {count} in {path}")]
    AmbiguousDosage { path: String, count: usize },

    #[error("Dosage method is set without a value in {path}")]
    IncompleteDosage { path: String },

    #[error("Dosage value must be positive in {path}")]
    NonPositiveDosage { path: String },

    #[error("Length of uuids = {uuids} and ratios = {ratios} should be equal in {path}")]
    RatioCountMismatch {
        path: String,
        uuids: usize,
        ratios: usize,
    },

    #[error("If only one material is provided its ratio must be 1, got {ratio} in {path}")]
    InvalidSingletonRatio { path: String, ratio: u32 },

    #[error("Nomenclature group id must be specified in {path}")]
    MissingGroupId { path: String },

    #[error("Nomenclature group {group_id} already defined within {path}")]
    DuplicateGroup { path: String, group_id: Uuid },

    #[error("At least one pigment part with color must be specified in {path}")]
    NoPigmentVariants { path: String },

    #[error("Set value of color name in {path}")]
    MissingColor { path: String },

    #[error("Color '{color}' is duplicated in {path}")]
    DuplicateColor { path: String, color: String },

    #[error("Materials for color '{color}' must be specified in {path}")]
    MissingMaterials { path: String, color: String },

    #[error("Set value of dry residue in {path}")]
    MissingDryResidue { path: String },

    #[error("Set value of pigmentation degree in {path}")]
    MissingPigmentationDegree { path: String },

    #[error("Set value of filler ratio in {path}")]
    MissingFillerRatio { path: String },

    #[error("Value must be positive in {path}")]
    NonPositiveParameter { path: String },

    #[error("Nomenclature id(s) not found: {}", join_ids(.ids))]
    UnknownMaterials { ids: Vec<Uuid> },

    #[error("Nomenclature group id(s) not found: {}", join_ids(.ids))]
    UnknownGroups { ids: Vec<Uuid> },

    #[error("There is no group \"{group}\" in pigment part for color '{color}'")]
    MissingRequiredGroup { color: String, group: String },

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl ValidationError {
    /// Stable machine-checkable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyList { .. } => "empty_list",
            Self::MissingIdentifier { .. } => "missing_identifier",
            Self::MissingRatio { .. } => "missing_ratio",
            Self::NonPositiveRatio { .. } => "non_positive_ratio",
            Self::AmbiguousDosage { .. } => "ambiguous_dosage",
            Self::IncompleteDosage { .. } => "incomplete_dosage",
            Self::NonPositiveDosage { .. } => "non_positive_dosage",
            Self::RatioCountMismatch { .. } => "ratio_count_mismatch",
            Self::InvalidSingletonRatio { .. } => "invalid_singleton_ratio",
            Self::MissingGroupId { .. } => "missing_group_id",
            Self::DuplicateGroup { .. } => "duplicate_group",
            Self::NoPigmentVariants { .. } => "no_pigment_variants",
            Self::MissingColor { .. } => "missing_color",
            Self::DuplicateColor { .. } => "duplicate_color",
            Self::MissingMaterials { .. } => "missing_materials",
            Self::MissingDryResidue { .. } => "missing_dry_residue",
            Self::MissingPigmentationDegree { .. } => "missing_pigmentation_degree",
            Self::MissingFillerRatio { .. } => "missing_filler_ratio",
            Self::NonPositiveParameter { .. } => "non_positive_parameter",
            Self::UnknownMaterials { .. } => "unknown_materials",
            Self::UnknownGroups { .. } => "unknown_groups",
            Self::MissingRequiredGroup { .. } => "missing_required_group",
            Self::Catalog(_) => "catalog",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMaterials { .. }
            | Self::UnknownGroups { .. }
            | Self::MissingRequiredGroup { .. } => ErrorCategory::Reference,
            Self::Catalog(_) => ErrorCategory::Io,
            _ => ErrorCategory::Structural,
        }
    }

    /// Structural path of the offending value, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::EmptyList { path }
            | Self::MissingIdentifier { path }
            | Self::MissingRatio { path }
            | Self::NonPositiveRatio { path }
            | Self::AmbiguousDosage { path, .. }
            | Self::IncompleteDosage { path }
            | Self::NonPositiveDosage { path }
            | Self::RatioCountMismatch { path, .. }
            | Self::InvalidSingletonRatio { path, .. }
            | Self::MissingGroupId { path }
            | Self::DuplicateGroup { path, .. }
            | Self::NoPigmentVariants { path }
            | Self::MissingColor { path }
            | Self::DuplicateColor { path, .. }
            | Self::MissingMaterials { path, .. }
            | Self::MissingDryResidue { path }
            | Self::MissingPigmentationDegree { path }
            | Self::MissingFillerRatio { path }
            | Self::NonPositiveParameter { path } => Some(path.as_str()),
            _ => None,
        }
    }
}

impl From<CatalogError> for ValidationError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err.to_string())
    }
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata() {
        let err = ValidationError::DuplicateColor {
            path: "rules.pigment_part[1].color".to_string(),
            color: "White".to_string(),
        };
        assert_eq!(err.code(), "duplicate_color");
        assert_eq!(err.category(), ErrorCategory::Structural);
        assert_eq!(err.path(), Some("rules.pigment_part[1].color"));

        let id = Uuid::nil();
        let err = ValidationError::UnknownMaterials { ids: vec![id] };
        assert_eq!(err.category(), ErrorCategory::Reference);
        assert!(err.path().is_none());
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_catalog_failure_is_retryable() {
        let err: ValidationError = CatalogError::Unavailable("down".to_string()).into();
        assert!(err.category().is_retryable());
    }
}
