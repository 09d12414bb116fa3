//! Base recipe lifecycle: create, update and post with validation.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{BaseRecipe, DocumentStatus};
use rules::{validate_rules, NomenclatureSource, RequiredGroupNames, Rules, ValidationError};

/// Error types for base recipe persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Write was rejected
    #[error("Store write failed: {0}")]
    WriteFailed(String),
}

/// Why a base recipe could not be saved.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// Posting without a rules document
    #[error("Rules must be set to post a base recipe")]
    RulesRequired,

    #[error("Base recipe not found: {0}")]
    NotFound(Uuid),

    /// Update without any field set
    #[error("Update has no fields to change")]
    EmptyUpdate,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence of base recipes.
#[async_trait]
pub trait BaseRecipeStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<BaseRecipe>, StoreError>;

    /// Insert or replace by id.
    async fn save(&self, recipe: BaseRecipe) -> Result<(), StoreError>;
}

/// In-memory base recipe store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBaseRecipeStore {
    recipes: Arc<RwLock<HashMap<Uuid, BaseRecipe>>>,
}

impl InMemoryBaseRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.recipes.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRecipeStore for InMemoryBaseRecipeStore {
    async fn get(&self, id: Uuid) -> Result<Option<BaseRecipe>, StoreError> {
        Ok(self.recipes.read().await.get(&id).cloned())
    }

    async fn save(&self, recipe: BaseRecipe) -> Result<(), StoreError> {
        self.recipes.write().await.insert(recipe.id, recipe);
        Ok(())
    }
}

/// Fields of a new base recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseRecipeDraft {
    pub name: Option<String>,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub status: DocumentStatus,
    pub rules: Option<Rules>,
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseRecipeUpdate {
    pub name: Option<String>,
    pub commentary: Option<String>,
    pub status: Option<DocumentStatus>,
    /// Replaces the stored rules wholesale
    pub rules: Option<Rules>,
}

impl BaseRecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.commentary.is_none()
            && self.status.is_none()
            && self.rules.is_none()
    }
}

/// Creates and updates base recipes, validating rules on posting.
pub struct BaseRecipeService {
    catalog: Arc<dyn NomenclatureSource>,
    store: Arc<dyn BaseRecipeStore>,
    required: RequiredGroupNames,
}

impl BaseRecipeService {
    pub fn new(catalog: Arc<dyn NomenclatureSource>, store: Arc<dyn BaseRecipeStore>) -> Self {
        Self {
            catalog,
            store,
            required: RequiredGroupNames::default(),
        }
    }

    /// Builder: set the group names every color variant must contain.
    pub fn with_required_groups(mut self, required: RequiredGroupNames) -> Self {
        self.required = required;
        self
    }

    /// Create a base recipe. Posted drafts are validated before saving.
    pub async fn create(&self, draft: BaseRecipeDraft) -> Result<BaseRecipe, PostingError> {
        let posted = draft.status.is_posted();
        let rules = match draft.rules {
            Some(rules) if posted => Some(self.prepare(rules, posted).await?),
            Some(mut rules) => {
                rules.is_posted = false;
                Some(rules)
            }
            None if posted => return Err(self.reject(PostingError::RulesRequired)),
            None => None,
        };

        let recipe = BaseRecipe {
            id: Uuid::new_v4(),
            name: draft.name,
            commentary: draft.commentary,
            status: draft.status,
            document_datetime: Utc::now(),
            rules,
        };
        self.store.save(recipe.clone()).await?;

        info!(
            base_recipe_id = %recipe.id,
            status = ?recipe.status,
            "Base recipe created"
        );
        Ok(recipe)
    }

    /// Apply a partial update.
    ///
    /// Rules are validated when the stored document is posted or the update
    /// posts it, falling back to the stored rules when the update has none.
    pub async fn update(&self, id: Uuid, update: BaseRecipeUpdate) -> Result<BaseRecipe, PostingError> {
        let mut recipe = self
            .store
            .get(id)
            .await?
            .ok_or(PostingError::NotFound(id))?;

        if update.is_empty() {
            return Err(self.reject(PostingError::EmptyUpdate));
        }

        let status = update.status.unwrap_or(recipe.status);
        let posted = status.is_posted();
        let must_validate = posted || recipe.status.is_posted();

        let rules = match update.rules.or_else(|| recipe.rules.take()) {
            Some(rules) if must_validate => Some(self.prepare(rules, posted).await?),
            Some(mut rules) => {
                rules.is_posted = false;
                Some(rules)
            }
            None if must_validate => return Err(self.reject(PostingError::RulesRequired)),
            None => None,
        };

        if let Some(name) = update.name {
            recipe.name = Some(name);
        }
        if let Some(commentary) = update.commentary {
            recipe.commentary = commentary;
        }
        recipe.status = status;
        recipe.rules = rules;
        self.store.save(recipe.clone()).await?;

        info!(
            base_recipe_id = %recipe.id,
            status = ?recipe.status,
            "Base recipe updated"
        );
        Ok(recipe)
    }

    /// Validate rules as posted, then mark them with the document status.
    ///
    /// All catalog lookups of one validation use a single read view.
    async fn prepare(&self, mut rules: Rules, posted: bool) -> Result<Rules, PostingError> {
        rules.is_posted = true;
        let view = match self.catalog.begin_read().await {
            Ok(view) => view,
            Err(e) => return Err(self.reject(ValidationError::from(e).into())),
        };
        if let Err(e) = validate_rules(&rules, view.as_ref(), &self.required).await {
            return Err(self.reject(e.into()));
        }
        rules.is_posted = posted;
        Ok(rules)
    }

    fn reject(&self, err: PostingError) -> PostingError {
        match &err {
            PostingError::Validation(e) => warn!(
                code = e.code(),
                path = e.path().unwrap_or_default(),
                error = %e,
                "Base recipe rejected"
            ),
            _ => warn!(error = %err, "Base recipe rejected"),
        }
        err
    }
}
