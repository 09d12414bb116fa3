//! Paint formulation engine
//!
//! Turns posted base recipes into stock-checked recipe skeletons.
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  BaseRecipeService   │────►│   BaseRecipeStore    │
//! │ create / update/post │     └──────────────────────┘
//! └──────────┬───────────┘
//!            │ validate_rules (rules crate)
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │   RecipeGenerator    │────►│     StockLookup      │
//! │ role-by-role resolve │     │  NomenclatureLookup  │
//! └──────────────────────┘     └──────────────────────┘
//! ```
//!
//! Collaborators are injected as trait objects; in-memory implementations
//! ([`InMemoryStock`], [`InMemoryBaseRecipeStore`],
//! [`rules::InMemoryCatalog`]) back tests and tooling.

pub mod availability;
pub mod base_recipe;
pub mod config;
pub mod generator;
pub mod settings;
pub mod stock;
pub mod types;

pub use availability::resolve_available;
pub use base_recipe::{
    BaseRecipeDraft, BaseRecipeService, BaseRecipeStore, BaseRecipeUpdate, InMemoryBaseRecipeStore,
    PostingError, StoreError,
};
pub use config::{CatalogConfig, FormulationConfig, GenerationConfig};
pub use generator::{GenerationError, RecipeGenerator};
pub use settings::{RoleGroupSettings, RoleGroups};
pub use stock::{InMemoryStock, StockError, StockLookup, StockMove};
pub use types::*;
