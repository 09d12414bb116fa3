//! Recipe generation from a posted base recipe.
//!
//! Generation walks the roles of the selected color variant in a fixed
//! order and stops at the first role without in-stock candidates:
//!
//! ```text
//! film formers ─► pigments ─► fillers ─► additive groups (declaration order)
//! ```
//!
//! The result is a recipe skeleton; quantities are chosen by the caller.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::availability::resolve_available;
use crate::base_recipe::{BaseRecipeStore, StoreError};
use crate::settings::{RoleGroupSettings, RoleGroups};
use crate::stock::{StockError, StockLookup};
use crate::types::{
    BaseRecipe, GeneratedRecipe, GenerationRequest, Role, RoleCandidates, TargetProduct,
};
use rules::{CatalogError, ColoredMaterials, ErrorCategory, GroupId, MaterialId, NomenclatureLookup, Rules};

/// Why a recipe could not be generated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Target product declares no color
    #[error("Target product has no color property")]
    NoColorProperty,

    /// Base recipe has no variant for the product color
    #[error("Base recipe does not support color '{0}'")]
    UnsupportedColor(String),

    #[error("Base recipe is not posted")]
    BaseRecipeNotPosted,

    #[error("Base recipe not found: {0}")]
    BaseRecipeNotFound(Uuid),

    /// Posted base recipe without a rules document
    #[error("Base recipe has no rules")]
    MissingRules,

    /// Role-group settings are incomplete
    #[error("Recipe generation settings are not configured")]
    GenerationSettingsMissing,

    /// No candidate of the role is in stock
    #[error("No available materials for {0}")]
    RoleUnavailable(String),

    #[error("Batch size must be positive, got {0}")]
    NonPositiveBatchSize(Decimal),

    #[error("Stock error: {0}")]
    Stock(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Base recipe store error: {0}")]
    Store(String),
}

impl GenerationError {
    /// Stable machine-checkable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoColorProperty => "no_color_property",
            Self::UnsupportedColor(_) => "unsupported_color",
            Self::BaseRecipeNotPosted => "base_recipe_not_posted",
            Self::BaseRecipeNotFound(_) => "base_recipe_not_found",
            Self::MissingRules => "missing_rules",
            Self::GenerationSettingsMissing => "generation_settings_missing",
            Self::RoleUnavailable(_) => "role_unavailable",
            Self::NonPositiveBatchSize(_) => "non_positive_batch_size",
            Self::Stock(_) => "stock",
            Self::Catalog(_) => "catalog",
            Self::Store(_) => "store",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GenerationSettingsMissing => ErrorCategory::Configuration,
            Self::RoleUnavailable(_) => ErrorCategory::Availability,
            Self::NonPositiveBatchSize(_) => ErrorCategory::Structural,
            Self::Stock(_) | Self::Catalog(_) | Self::Store(_) => ErrorCategory::Io,
            _ => ErrorCategory::Precondition,
        }
    }
}

impl From<StockError> for GenerationError {
    fn from(err: StockError) -> Self {
        Self::Stock(err.to_string())
    }
}

impl From<CatalogError> for GenerationError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err.to_string())
    }
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Generates recipe skeletons against live stock.
pub struct RecipeGenerator {
    stock: Arc<dyn StockLookup>,
    catalog: Arc<dyn NomenclatureLookup>,
}

impl RecipeGenerator {
    pub fn new(stock: Arc<dyn StockLookup>, catalog: Arc<dyn NomenclatureLookup>) -> Self {
        Self { stock, catalog }
    }

    /// Generate a recipe for a request, loading its base recipe from `recipes`.
    ///
    /// `properties` are the target product's free-form properties.
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
        recipes: &dyn BaseRecipeStore,
        properties: &serde_json::Value,
        settings: &RoleGroupSettings,
    ) -> Result<GeneratedRecipe, GenerationError> {
        check_batch_size(request.batch_size)?;

        let base_recipe = recipes
            .get(request.base_recipe_id)
            .await?
            .ok_or(GenerationError::BaseRecipeNotFound(request.base_recipe_id))?;
        let product = TargetProduct::from_properties(request.nomenclature_id, properties);

        self.generate(&base_recipe, &product, settings, request.batch_size)
            .await
    }

    /// Generate a recipe of `product` from `base_recipe`.
    pub async fn generate(
        &self,
        base_recipe: &BaseRecipe,
        product: &TargetProduct,
        settings: &RoleGroupSettings,
        batch_size: Decimal,
    ) -> Result<GeneratedRecipe, GenerationError> {
        check_batch_size(batch_size)?;

        let color = product
            .color
            .as_deref()
            .ok_or(GenerationError::NoColorProperty)?;

        let rules = match (&base_recipe.rules, base_recipe.status.is_posted()) {
            (Some(rules), _) => rules,
            (None, false) => return Err(GenerationError::BaseRecipeNotPosted),
            (None, true) => return Err(GenerationError::MissingRules),
        };

        let variant = rules
            .variant_for_color(color)
            .ok_or_else(|| GenerationError::UnsupportedColor(color.to_string()))?;

        if !base_recipe.status.is_posted() {
            return Err(GenerationError::BaseRecipeNotPosted);
        }

        let groups = settings
            .resolve()
            .ok_or(GenerationError::GenerationSettingsMissing)?;

        debug!(
            base_recipe_id = %base_recipe.id,
            nomenclature_id = %product.nomenclature_id,
            color = %color,
            "Generating recipe"
        );

        let roles = match self.resolve_roles(rules, variant, groups).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(
                    base_recipe_id = %base_recipe.id,
                    code = e.code(),
                    error = %e,
                    "Recipe generation rejected"
                );
                return Err(e);
            }
        };

        let recipe = GeneratedRecipe {
            id: Uuid::new_v4(),
            nomenclature_id: product.nomenclature_id,
            base_recipe_id: base_recipe.id,
            batch_size,
            color: variant.color.clone().unwrap_or_else(|| color.to_string()),
            document_datetime: Utc::now(),
            roles,
        };

        info!(
            recipe_id = %recipe.id,
            base_recipe_id = %base_recipe.id,
            roles = recipe.roles.len(),
            "Recipe generated"
        );

        Ok(recipe)
    }

    async fn resolve_roles(
        &self,
        rules: &Rules,
        variant: &ColoredMaterials,
        groups: RoleGroups,
    ) -> Result<Vec<RoleCandidates>, GenerationError> {
        let mut roles = Vec::new();

        let film_formers: BTreeSet<MaterialId> = rules
            .film_former_part
            .materials
            .material_ids()
            .chain(variant.material_ids_in_group(groups.film_formers))
            .collect();
        roles.push(self.resolve_role(Role::FilmFormers, &film_formers).await?);

        let pigments: BTreeSet<MaterialId> = variant.material_ids_in_group(groups.pigments).collect();
        roles.push(self.resolve_role(Role::Pigments, &pigments).await?);

        let fillers: BTreeSet<MaterialId> = variant.material_ids_in_group(groups.fillers).collect();
        roles.push(self.resolve_role(Role::Fillers, &fillers).await?);

        for category in &rules.additives_part.materials {
            let Some(group_id) = category.nomenclature_group_id else {
                continue;
            };

            let candidates: BTreeSet<MaterialId> = category
                .items
                .material_ids()
                .chain(variant.material_ids_in_group(group_id))
                .collect();
            let available = resolve_available(&candidates, self.stock.as_ref()).await?;
            let name = self.group_label(group_id).await?;
            roles.push(role_candidates(Role::Additive { group_id, name }, available)?);
        }

        Ok(roles)
    }

    async fn resolve_role(
        &self,
        role: Role,
        candidates: &BTreeSet<MaterialId>,
    ) -> Result<RoleCandidates, GenerationError> {
        let available = resolve_available(candidates, self.stock.as_ref()).await?;
        role_candidates(role, available)
    }

    async fn group_label(&self, group_id: GroupId) -> Result<String, GenerationError> {
        Ok(self
            .catalog
            .group_name(group_id)
            .await?
            .unwrap_or_else(|| group_id.to_string()))
    }
}

fn check_batch_size(batch_size: Decimal) -> Result<(), GenerationError> {
    if batch_size <= Decimal::ZERO {
        return Err(GenerationError::NonPositiveBatchSize(batch_size));
    }
    Ok(())
}

/// A resolved role, or the role's failure when nothing is in stock.
fn role_candidates(
    role: Role,
    available: BTreeSet<MaterialId>,
) -> Result<RoleCandidates, GenerationError> {
    if available.is_empty() {
        return Err(GenerationError::RoleUnavailable(role.to_string()));
    }

    debug!(role = %role, available = available.len(), "Role resolved");
    Ok(RoleCandidates { role, available })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::InMemoryStock;
    use crate::types::DocumentStatus;
    use rules::{CategorisedMaterials, CategoryWithMaterials, InMemoryCatalog, MaterialEntry, Materials};

    fn generator(stock: &InMemoryStock) -> RecipeGenerator {
        RecipeGenerator::new(Arc::new(stock.clone()), Arc::new(InMemoryCatalog::new()))
    }

    fn posted(rules: Rules) -> BaseRecipe {
        BaseRecipe::new("Enamel")
            .with_rules(rules)
            .with_status(DocumentStatus::Posted)
    }

    #[tokio::test]
    async fn test_batch_size_checked_first() {
        let stock = InMemoryStock::new();
        let product = TargetProduct::new(Uuid::new_v4(), None);

        let err = generator(&stock)
            .generate(
                &BaseRecipe::new("Draft"),
                &product,
                &RoleGroupSettings::default(),
                Decimal::ZERO,
            )
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::NonPositiveBatchSize(Decimal::ZERO));
        assert_eq!(err.category(), ErrorCategory::Structural);
    }

    #[tokio::test]
    async fn test_missing_rules_depends_on_status() {
        let stock = InMemoryStock::new();
        let product = TargetProduct::new(Uuid::new_v4(), Some("White".to_string()));
        let settings = RoleGroupSettings::default();

        let draft = BaseRecipe::new("Draft");
        let err = generator(&stock)
            .generate(&draft, &product, &settings, Decimal::ONE)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::BaseRecipeNotPosted);

        let posted_without_rules = draft.with_status(DocumentStatus::Posted);
        let err = generator(&stock)
            .generate(&posted_without_rules, &product, &settings, Decimal::ONE)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::MissingRules);
    }

    #[tokio::test]
    async fn test_additive_name_falls_back_to_group_id() {
        let stock = InMemoryStock::new();
        let [binder, pigment, filler, additive] = [(); 4].map(|_| Uuid::new_v4());
        let [film_group, pigment_group, filler_group, additive_group] = [(); 4].map(|_| Uuid::new_v4());
        for id in [binder, pigment, filler] {
            stock.record_qty(id, Decimal::ONE).await;
        }

        let rules = Rules {
            film_former_part: Materials::new(vec![MaterialEntry::single(binder)]),
            pigment_part: vec![ColoredMaterials {
                color: Some("White".to_string()),
                materials: vec![
                    CategorisedMaterials::new(pigment_group, vec![MaterialEntry::single(pigment)]),
                    CategorisedMaterials::new(filler_group, vec![MaterialEntry::single(filler)]),
                ],
                ..Default::default()
            }],
            additives_part: CategoryWithMaterials {
                materials: vec![CategorisedMaterials::new(
                    additive_group,
                    vec![MaterialEntry::single(additive)],
                )],
            },
            is_posted: true,
            ..Default::default()
        };
        let settings = RoleGroupSettings::new(film_group, pigment_group, filler_group);
        let product = TargetProduct::new(Uuid::new_v4(), Some("white".to_string()));

        let err = generator(&stock)
            .generate(&posted(rules), &product, &settings, Decimal::TEN)
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::RoleUnavailable(additive_group.to_string()));
        assert_eq!(err.category(), ErrorCategory::Availability);
    }
}
