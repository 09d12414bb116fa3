//! Structural validation of posted rules documents.
//!
//! Each node of the document validates itself and delegates to its
//! children, threading the structural path down the walk. The walk is
//! depth-first, top-to-bottom, left-to-right and stops at the first error,
//! so the reported error is stable for a given document.

use std::collections::HashSet;
use tracing::debug;

use crate::error::ValidationError;
use crate::path::FieldPath;
use crate::types::*;

/// Validate the shape and self-consistency of a rules document.
///
/// Unposted documents are drafts and are accepted as-is.
pub fn validate_structure(rules: &Rules) -> Result<(), ValidationError> {
    if !rules.is_posted {
        debug!("Rules not posted, skipping structural validation");
        return Ok(());
    }

    rules.validate(&FieldPath::root())
}

impl Rules {
    /// Validate every part of the document in declaration order.
    pub fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.film_former_part
            .materials
            .validate(&path.field("film_former_part").field("materials"))?;

        validate_pigment_part(&self.pigment_part, &path.field("pigment_part"))?;

        validate_categories(
            &self.additives_part.materials,
            &path.field("additives_part").field("materials"),
        )?;

        self.solvent_part
            .materials
            .validate(&path.field("solvent_part").field("materials"))
    }
}

impl MaterialList {
    /// A posted list is non-empty and every entry is fully populated.
    pub fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyList {
                path: path.to_string(),
            });
        }

        for (i, entry) in self.entries().iter().enumerate() {
            entry.validate(&path.entry(i))?;
        }

        Ok(())
    }
}

impl MaterialEntry {
    pub fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        let uuids_path = path.field("uuids");
        if self.uuids.is_empty() {
            return Err(ValidationError::EmptyList {
                path: uuids_path.to_string(),
            });
        }
        if self.uuids.iter().any(Option::is_none) {
            return Err(ValidationError::MissingIdentifier {
                path: uuids_path.to_string(),
            });
        }

        let ratios_path = path.field("ratios");
        if self.ratios.is_empty() {
            return Err(ValidationError::EmptyList {
                path: ratios_path.to_string(),
            });
        }
        if self.ratios.iter().any(Option::is_none) {
            return Err(ValidationError::MissingRatio {
                path: ratios_path.to_string(),
            });
        }
        if self.ratios.contains(&Some(0)) {
            return Err(ValidationError::NonPositiveRatio {
                path: ratios_path.to_string(),
            });
        }

        if let Some(dosage) = &self.dosage {
            dosage.validate(&path.field("dosage"))?;
        }

        if self.uuids.len() != self.ratios.len() {
            return Err(ValidationError::RatioCountMismatch {
                path: path.to_string(),
                uuids: self.uuids.len(),
                ratios: self.ratios.len(),
            });
        }

        if let [Some(ratio)] = self.ratios.as_slice() {
            if *ratio != 1 {
                return Err(ValidationError::InvalidSingletonRatio {
                    path: ratios_path.to_string(),
                    ratio: *ratio,
                });
            }
        }

        Ok(())
    }
}

impl Dosage {
    /// An empty mapping counts as no dosage.
    pub fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Ok(());
        }
        if self.0.len() != 1 {
            return Err(ValidationError::AmbiguousDosage {
                path: path.to_string(),
                count: self.0.len(),
            });
        }

        for (method, value) in &self.0 {
            let value_path = path.field(method.as_str());
            match value {
                None => {
                    return Err(ValidationError::IncompleteDosage {
                        path: value_path.to_string(),
                    })
                }
                Some(v) if !is_positive(*v) => {
                    return Err(ValidationError::NonPositiveDosage {
                        path: value_path.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl ColoredMaterials {
    /// Validate one color variant; `seen_colors` tracks earlier variants.
    pub fn validate(
        &self,
        path: &FieldPath,
        seen_colors: &mut HashSet<String>,
    ) -> Result<(), ValidationError> {
        let color_path = path.field("color");
        let color = match self.color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ => {
                return Err(ValidationError::MissingColor {
                    path: color_path.to_string(),
                })
            }
        };
        if !seen_colors.insert(color.to_string()) {
            return Err(ValidationError::DuplicateColor {
                path: color_path.to_string(),
                color: color.to_string(),
            });
        }

        if self.materials.is_empty() {
            return Err(ValidationError::MissingMaterials {
                path: path.field("materials").to_string(),
                color: color.to_string(),
            });
        }

        check_parameter(self.dry_residue, &path.field("dry_residue"), |path| {
            ValidationError::MissingDryResidue { path }
        })?;
        check_parameter(
            self.pigmentation_degree,
            &path.field("pigmentation_degree"),
            |path| ValidationError::MissingPigmentationDegree { path },
        )?;
        check_parameter(self.filler_ratio, &path.field("filler_ratio"), |path| {
            ValidationError::MissingFillerRatio { path }
        })?;

        validate_categories(&self.materials, &path.field("materials"))
    }
}

/// Validate the pigment part: at least one variant, colors unique.
///
/// Color uniqueness is case-sensitive; the first definition wins.
pub fn validate_pigment_part(
    variants: &[ColoredMaterials],
    path: &FieldPath,
) -> Result<(), ValidationError> {
    if variants.is_empty() {
        return Err(ValidationError::NoPigmentVariants {
            path: path.to_string(),
        });
    }

    let mut seen_colors = HashSet::new();
    for (i, variant) in variants.iter().enumerate() {
        variant.validate(&path.index(i), &mut seen_colors)?;
    }

    Ok(())
}

/// Validate a list of groups: ids set and unique, items fully populated.
pub fn validate_categories(
    categories: &[CategorisedMaterials],
    path: &FieldPath,
) -> Result<(), ValidationError> {
    let mut seen_groups = HashSet::new();

    for (i, category) in categories.iter().enumerate() {
        let item_path = path.index(i);
        let group_path = item_path.field("nomenclature_group_id");

        let group_id = category
            .nomenclature_group_id
            .ok_or_else(|| ValidationError::MissingGroupId {
                path: group_path.to_string(),
            })?;
        if !seen_groups.insert(group_id) {
            return Err(ValidationError::DuplicateGroup {
                path: group_path.to_string(),
                group_id,
            });
        }

        category.items.validate(&item_path.field("items"))?;
    }

    Ok(())
}

fn check_parameter(
    value: Option<f64>,
    path: &FieldPath,
    missing: impl FnOnce(String) -> ValidationError,
) -> Result<(), ValidationError> {
    match value {
        None => Err(missing(path.to_string())),
        Some(v) if !is_positive(v) => Err(ValidationError::NonPositiveParameter {
            path: path.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
