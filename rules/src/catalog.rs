//! Nomenclature catalog lookups.
//!
//! The reference validator only reads the catalog. Implementations backed
//! by a database are expected to answer every call of one validation from
//! the same read transaction; [`InMemoryCatalog::snapshot`] gives the same
//! guarantee for the in-memory catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CatalogError;
use crate::types::{GroupId, MaterialId};

/// Read-only view of the nomenclature catalog.
#[async_trait]
pub trait NomenclatureLookup: Send + Sync {
    /// The subset of `candidates` that exist as nomenclature items.
    async fn existing_material_ids(
        &self,
        candidates: &BTreeSet<MaterialId>,
    ) -> Result<BTreeSet<MaterialId>, CatalogError>;

    /// The subset of `candidates` that exist as nomenclature groups.
    async fn existing_group_ids(
        &self,
        candidates: &BTreeSet<GroupId>,
    ) -> Result<BTreeSet<GroupId>, CatalogError>;

    /// Current name of a group.
    async fn group_name(&self, id: GroupId) -> Result<Option<String>, CatalogError>;
}

/// A catalog that hands out consistent read views.
///
/// Every lookup of one validation call goes through the view returned by a
/// single [`begin_read`](Self::begin_read), so writers cannot interleave
/// with the call.
#[async_trait]
pub trait NomenclatureSource: Send + Sync {
    async fn begin_read(&self) -> Result<Arc<dyn NomenclatureLookup>, CatalogError>;
}

/// A nomenclature group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
}

/// Catalog contents, also the fixture format read by tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogContents {
    #[serde(default)]
    pub materials: Vec<MaterialId>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// Immutable catalog state, answering lookups from one consistent view.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    materials: HashSet<MaterialId>,
    groups: HashMap<GroupId, String>,
}

impl CatalogSnapshot {
    pub fn from_contents(contents: CatalogContents) -> Self {
        Self {
            materials: contents.materials.into_iter().collect(),
            groups: contents
                .groups
                .into_iter()
                .map(|group| (group.id, group.name))
                .collect(),
        }
    }
}

#[async_trait]
impl NomenclatureLookup for CatalogSnapshot {
    async fn existing_material_ids(
        &self,
        candidates: &BTreeSet<MaterialId>,
    ) -> Result<BTreeSet<MaterialId>, CatalogError> {
        Ok(candidates
            .iter()
            .filter(|id| self.materials.contains(*id))
            .copied()
            .collect())
    }

    async fn existing_group_ids(
        &self,
        candidates: &BTreeSet<GroupId>,
    ) -> Result<BTreeSet<GroupId>, CatalogError> {
        Ok(candidates
            .iter()
            .filter(|id| self.groups.contains_key(*id))
            .copied()
            .collect())
    }

    async fn group_name(&self, id: GroupId) -> Result<Option<String>, CatalogError> {
        Ok(self.groups.get(&id).cloned())
    }
}

#[async_trait]
impl NomenclatureSource for CatalogSnapshot {
    async fn begin_read(&self) -> Result<Arc<dyn NomenclatureLookup>, CatalogError> {
        Ok(Arc::new(self.clone()))
    }
}

/// Mutable in-memory catalog.
///
/// Writers and readers share the state; validation should run against a
/// [`snapshot`](Self::snapshot) so concurrent edits cannot interleave with
/// one validation call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogSnapshot>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with initial contents.
    pub fn with_contents(contents: CatalogContents) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogSnapshot::from_contents(contents))),
        }
    }

    /// Register a nomenclature item.
    pub async fn add_material(&self, id: MaterialId) {
        self.state.write().await.materials.insert(id);
    }

    /// Register or rename a nomenclature group.
    pub async fn add_group(&self, id: GroupId, name: impl Into<String>) {
        self.state.write().await.groups.insert(id, name.into());
    }

    /// Remove a nomenclature item.
    pub async fn remove_material(&self, id: MaterialId) -> bool {
        self.state.write().await.materials.remove(&id)
    }

    /// Consistent read view of the current state.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl NomenclatureLookup for InMemoryCatalog {
    async fn existing_material_ids(
        &self,
        candidates: &BTreeSet<MaterialId>,
    ) -> Result<BTreeSet<MaterialId>, CatalogError> {
        self.state.read().await.existing_material_ids(candidates).await
    }

    async fn existing_group_ids(
        &self,
        candidates: &BTreeSet<GroupId>,
    ) -> Result<BTreeSet<GroupId>, CatalogError> {
        self.state.read().await.existing_group_ids(candidates).await
    }

    async fn group_name(&self, id: GroupId) -> Result<Option<String>, CatalogError> {
        self.state.read().await.group_name(id).await
    }
}

#[async_trait]
impl NomenclatureSource for InMemoryCatalog {
    async fn begin_read(&self) -> Result<Arc<dyn NomenclatureLookup>, CatalogError> {
        Ok(Arc::new(self.snapshot().await))
    }
}
