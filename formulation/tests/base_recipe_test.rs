//! Base recipe lifecycle integration tests

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use formulation::*;
use rules::{
    CatalogError, CategorisedMaterials, ColoredMaterials, GroupId, InMemoryCatalog, MaterialEntry,
    MaterialId, Materials, NomenclatureLookup, NomenclatureSource, RequiredGroupNames, Rules,
    ValidationError,
};

/// Lookup that renames a group in the live catalog right after the group
/// existence query, before any name is read.
struct RenameDuringRead {
    view: Arc<dyn NomenclatureLookup>,
    live: InMemoryCatalog,
    group: GroupId,
}

#[async_trait]
impl NomenclatureLookup for RenameDuringRead {
    async fn existing_material_ids(
        &self,
        candidates: &BTreeSet<MaterialId>,
    ) -> Result<BTreeSet<MaterialId>, CatalogError> {
        self.view.existing_material_ids(candidates).await
    }

    async fn existing_group_ids(
        &self,
        candidates: &BTreeSet<GroupId>,
    ) -> Result<BTreeSet<GroupId>, CatalogError> {
        let found = self.view.existing_group_ids(candidates).await?;
        self.live.add_group(self.group, "Extenders").await;
        Ok(found)
    }

    async fn group_name(&self, id: GroupId) -> Result<Option<String>, CatalogError> {
        self.view.group_name(id).await
    }
}

/// Source whose read views rename a group while a validation is running.
struct ConcurrentRename {
    live: InMemoryCatalog,
    group: GroupId,
    use_live_catalog: bool,
}

#[async_trait]
impl NomenclatureSource for ConcurrentRename {
    async fn begin_read(&self) -> Result<Arc<dyn NomenclatureLookup>, CatalogError> {
        let view: Arc<dyn NomenclatureLookup> = if self.use_live_catalog {
            Arc::new(self.live.clone())
        } else {
            self.live.begin_read().await?
        };
        Ok(Arc::new(RenameDuringRead {
            view,
            live: self.live.clone(),
            group: self.group,
        }))
    }
}

struct Fixture {
    catalog: InMemoryCatalog,
    store: InMemoryBaseRecipeStore,
    rules: Rules,
    binder: Uuid,
    fillers: Uuid,
}

async fn fixture(pigments_name: &str, fillers_name: &str) -> Fixture {
    let [pigments, fillers] = [(); 2].map(|_| Uuid::new_v4());
    let [binder, tio2, chalk] = [(); 3].map(|_| Uuid::new_v4());

    let catalog = InMemoryCatalog::new();
    for id in [binder, tio2, chalk] {
        catalog.add_material(id).await;
    }
    catalog.add_group(pigments, pigments_name).await;
    catalog.add_group(fillers, fillers_name).await;

    let rules = Rules {
        film_former_part: Materials::new(vec![MaterialEntry::single(binder)]),
        pigment_part: vec![ColoredMaterials {
            color: Some("White".to_string()),
            materials: vec![
                CategorisedMaterials::new(pigments, vec![MaterialEntry::single(tio2)]),
                CategorisedMaterials::new(fillers, vec![MaterialEntry::single(chalk)]),
            ],
            dry_residue: Some(0.6),
            pigmentation_degree: Some(1.5),
            filler_ratio: Some(2.0),
        }],
        ..Default::default()
    };

    Fixture {
        catalog,
        store: InMemoryBaseRecipeStore::new(),
        rules,
        binder,
        fillers,
    }
}

impl Fixture {
    fn service(&self) -> BaseRecipeService {
        BaseRecipeService::new(Arc::new(self.catalog.clone()), Arc::new(self.store.clone()))
    }

    fn posted_draft(&self) -> BaseRecipeDraft {
        BaseRecipeDraft {
            name: Some("White enamel".to_string()),
            status: DocumentStatus::Posted,
            rules: Some(self.rules.clone()),
            ..Default::default()
        }
    }
}

#[tokio::test]
async fn test_create_posted_validates_and_saves() {
    let fx = fixture("Pigments", "Fillers").await;

    let recipe = fx.service().create(fx.posted_draft()).await.unwrap();

    assert_eq!(recipe.status, DocumentStatus::Posted);
    assert!(recipe.rules.as_ref().unwrap().is_posted);
    assert_eq!(fx.store.get(recipe.id).await.unwrap(), Some(recipe));
}

#[tokio::test]
async fn test_invalid_posting_saves_nothing() {
    let mut fx = fixture("Pigments", "Fillers").await;
    fx.rules.film_former_part.materials.0[0].ratios = vec![Some(3)];

    let err = fx.service().create(fx.posted_draft()).await.unwrap_err();

    match err {
        PostingError::Validation(ValidationError::InvalidSingletonRatio { path, ratio }) => {
            assert_eq!(path, "rules.film_former_part.materials.root[0].ratios");
            assert_eq!(ratio, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.store.is_empty().await);
}

#[tokio::test]
async fn test_posting_draft_uses_stored_rules() {
    let fx = fixture("Pigments", "Fillers").await;
    let service = fx.service();

    let draft = BaseRecipeDraft {
        name: Some("White enamel".to_string()),
        rules: Some(fx.rules.clone()),
        ..Default::default()
    };
    let recipe = service.create(draft).await.unwrap();
    assert!(!recipe.rules.as_ref().unwrap().is_posted);

    let posted = service
        .update(
            recipe.id,
            BaseRecipeUpdate {
                status: Some(DocumentStatus::Posted),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(posted.status, DocumentStatus::Posted);
    assert!(posted.rules.as_ref().unwrap().is_posted);
    assert_eq!(posted.name.as_deref(), Some("White enamel"));
}

#[tokio::test]
async fn test_posted_recipe_revalidated_against_live_catalog() {
    let fx = fixture("Pigments", "Fillers").await;
    let service = fx.service();
    let recipe = service.create(fx.posted_draft()).await.unwrap();

    assert!(fx.catalog.remove_material(fx.binder).await);

    let err = service
        .update(
            recipe.id,
            BaseRecipeUpdate {
                commentary: Some("binder discontinued".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PostingError::Validation(ValidationError::UnknownMaterials { ref ids }) if ids == &vec![fx.binder]
    ));
    let stored = fx.store.get(recipe.id).await.unwrap().unwrap();
    assert!(stored.commentary.is_empty());
}

#[tokio::test]
async fn test_configured_group_names() {
    let fx = fixture("Пигменты", "Наполнители").await;

    let err = fx.service().create(fx.posted_draft()).await.unwrap_err();
    assert!(matches!(
        err,
        PostingError::Validation(ValidationError::MissingRequiredGroup { ref group, .. }) if group == "Pigments"
    ));

    let service = fx.service().with_required_groups(RequiredGroupNames {
        pigments: "Пигменты".to_string(),
        fillers: "Наполнители".to_string(),
    });
    assert!(service.create(fx.posted_draft()).await.is_ok());
}

#[tokio::test]
async fn test_leaving_posted_state_revalidates() {
    let fx = fixture("Pigments", "Fillers").await;
    let service = fx.service();
    let recipe = service.create(fx.posted_draft()).await.unwrap();

    let updated = service
        .update(
            recipe.id,
            BaseRecipeUpdate {
                status: Some(DocumentStatus::SetToDeletion),
                rules: Some(Rules::default()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(
        updated,
        Err(PostingError::Validation(ValidationError::EmptyList { .. }))
    ));
}

#[tokio::test]
async fn test_rename_during_validation_not_observed() {
    let fx = fixture("Pigments", "Fillers").await;
    let source = ConcurrentRename {
        live: fx.catalog.clone(),
        group: fx.fillers,
        use_live_catalog: false,
    };
    let service = BaseRecipeService::new(Arc::new(source), Arc::new(fx.store.clone()));

    let recipe = service.create(fx.posted_draft()).await.unwrap();

    assert_eq!(recipe.status, DocumentStatus::Posted);
    assert_eq!(
        fx.catalog.group_name(fx.fillers).await.unwrap().as_deref(),
        Some("Extenders")
    );
}

#[tokio::test]
async fn test_rename_visible_without_read_view() {
    let fx = fixture("Pigments", "Fillers").await;
    let source = ConcurrentRename {
        live: fx.catalog.clone(),
        group: fx.fillers,
        use_live_catalog: true,
    };
    let service = BaseRecipeService::new(Arc::new(source), Arc::new(fx.store.clone()));

    let err = service.create(fx.posted_draft()).await.unwrap_err();

    assert!(matches!(
        err,
        PostingError::Validation(ValidationError::MissingRequiredGroup { ref group, .. }) if group == "Fillers"
    ));
}
