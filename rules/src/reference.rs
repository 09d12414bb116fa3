//! Cross-reference validation against the nomenclature catalog.
//!
//! Checks that every material and group a posted document references
//! exists, then re-checks by name that each color variant still contains
//! the mandatory pigments and fillers groups. Group ids can stay valid while
//! the group behind them is renamed, so the name check runs against the
//! live catalog rather than relying on the structural pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::catalog::NomenclatureLookup;
use crate::error::ValidationError;
use crate::types::{GroupId, MaterialId, Rules};

/// Catalog names of the groups every color variant must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredGroupNames {
    /// Name of the pigments group
    pub pigments: String,
    /// Name of the fillers group
    pub fillers: String,
}

impl Default for RequiredGroupNames {
    fn default() -> Self {
        Self {
            pigments: "Pigments".to_string(),
            fillers: "Fillers".to_string(),
        }
    }
}

impl RequiredGroupNames {
    /// Names in the order they are checked.
    pub fn names(&self) -> [&str; 2] {
        [&self.pigments, &self.fillers]
    }
}

/// Everything a rules document references in the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesReferences {
    /// Union of all material ids
    pub material_ids: BTreeSet<MaterialId>,
    /// Union of all group ids
    pub group_ids: BTreeSet<GroupId>,
    /// Group ids of each color variant, in declaration order
    pub color_groups: Vec<(String, BTreeSet<GroupId>)>,
}

impl RulesReferences {
    /// Collect the references of a document. Null ids are skipped.
    pub fn collect(rules: &Rules) -> Self {
        let mut refs = Self::default();

        refs.material_ids
            .extend(rules.film_former_part.materials.material_ids());

        for variant in &rules.pigment_part {
            let groups = variant.group_ids();
            refs.group_ids.extend(groups.iter().copied());
            for category in &variant.materials {
                refs.material_ids.extend(category.items.material_ids());
            }
            refs.color_groups
                .push((variant.color.clone().unwrap_or_default(), groups));
        }

        for category in &rules.additives_part.materials {
            refs.group_ids.extend(category.nomenclature_group_id);
            refs.material_ids.extend(category.items.material_ids());
        }

        refs.material_ids
            .extend(rules.solvent_part.materials.material_ids());

        refs
    }
}

/// Validates rules documents against a catalog.
#[derive(Debug, Clone, Default)]
pub struct ReferenceValidator {
    required: RequiredGroupNames,
}

impl ReferenceValidator {
    pub fn new(required: RequiredGroupNames) -> Self {
        Self { required }
    }

    /// Check every reference of a posted document.
    ///
    /// Missing materials and groups are reported all at once; the named
    /// group check stops at the first variant lacking a group.
    pub async fn validate(
        &self,
        rules: &Rules,
        catalog: &dyn NomenclatureLookup,
    ) -> Result<(), ValidationError> {
        if !rules.is_posted {
            debug!("Rules not posted, skipping reference validation");
            return Ok(());
        }

        let refs = RulesReferences::collect(rules);
        debug!(
            materials = refs.material_ids.len(),
            groups = refs.group_ids.len(),
            colors = refs.color_groups.len(),
            "Validating catalog references"
        );

        let found_materials = if refs.material_ids.is_empty() {
            BTreeSet::new()
        } else {
            catalog.existing_material_ids(&refs.material_ids).await?
        };
        let found_groups = if refs.group_ids.is_empty() {
            BTreeSet::new()
        } else {
            catalog.existing_group_ids(&refs.group_ids).await?
        };

        let missing: Vec<MaterialId> = refs
            .material_ids
            .difference(&found_materials)
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::UnknownMaterials { ids: missing });
        }

        let missing: Vec<GroupId> = refs.group_ids.difference(&found_groups).copied().collect();
        if !missing.is_empty() {
            return Err(ValidationError::UnknownGroups { ids: missing });
        }

        let mut names: HashMap<GroupId, Option<String>> = HashMap::new();
        for (color, groups) in &refs.color_groups {
            for required in self.required.names() {
                if !self
                    .contains_named_group(groups, required, catalog, &mut names)
                    .await?
                {
                    return Err(ValidationError::MissingRequiredGroup {
                        color: color.clone(),
                        group: required.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    async fn contains_named_group(
        &self,
        groups: &BTreeSet<GroupId>,
        required: &str,
        catalog: &dyn NomenclatureLookup,
        names: &mut HashMap<GroupId, Option<String>>,
    ) -> Result<bool, ValidationError> {
        for id in groups {
            let name = match names.get(id) {
                Some(name) => name.clone(),
                None => {
                    let name = catalog.group_name(*id).await?;
                    names.insert(*id, name.clone());
                    name
                }
            };
            if name.as_deref() == Some(required) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Validate references with the default required group names.
pub async fn validate_references(
    rules: &Rules,
    catalog: &dyn NomenclatureLookup,
) -> Result<(), ValidationError> {
    ReferenceValidator::default().validate(rules, catalog).await
}
