//! Core types for base recipe rules.
//!
//! A [`Rules`] document is the bill-of-materials of one base recipe. Every
//! role (film former, pigment, filler, additive group, solvent) is described
//! by substitution entries: sets of interchangeable materials with relative
//! ratios. Fields are nullable so that unposted drafts can be stored as-is;
//! the validators decide what a posted document must contain.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Identifier of a nomenclature item (a raw material).
pub type MaterialId = Uuid;

/// Identifier of a nomenclature group (a role category).
pub type GroupId = Uuid;

/// How the dosage of a substitution entry is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageMethod {
    /// Percent of the film former (binder) mass
    #[serde(alias = "percent_binder")]
    PercentOfBinder,
    /// Percent of the total batch mass
    #[serde(alias = "percent_amount")]
    PercentOfTotal,
    /// Absolute amount
    Absolute,
}

impl DosageMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PercentOfBinder => "percent_of_binder",
            Self::PercentOfTotal => "percent_of_total",
            Self::Absolute => "absolute",
        }
    }
}

/// Dosage of a substitution entry.
///
/// A posted document carries exactly one method with a positive value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dosage(pub BTreeMap<DosageMethod, Option<f64>>);

impl Dosage {
    /// Dosage with a single method.
    pub fn new(method: DosageMethod, value: f64) -> Self {
        Self(BTreeMap::from([(method, Some(value))]))
    }

    /// The single method and its value, if the dosage is fully set.
    pub fn single(&self) -> Option<(DosageMethod, f64)> {
        if self.0.len() != 1 {
            return None;
        }
        self.0
            .iter()
            .next()
            .and_then(|(method, value)| value.map(|v| (*method, v)))
    }
}

/// One substitution slot: interchangeable materials with relative ratios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Interchangeable materials, positionally paired with `ratios`
    #[serde(default)]
    pub uuids: Vec<Option<MaterialId>>,
    /// Relative substitution weights
    #[serde(default)]
    pub ratios: Vec<Option<u32>>,
    /// Optional dosage
    #[serde(default)]
    pub dosage: Option<Dosage>,
}

impl MaterialEntry {
    /// Entry with a single material at ratio 1.
    pub fn single(id: MaterialId) -> Self {
        Self {
            uuids: vec![Some(id)],
            ratios: vec![Some(1)],
            dosage: None,
        }
    }

    /// Entry with several interchangeable materials.
    pub fn substitutes(items: impl IntoIterator<Item = (MaterialId, u32)>) -> Self {
        let (uuids, ratios) = items
            .into_iter()
            .map(|(id, ratio)| (Some(id), Some(ratio)))
            .unzip();
        Self {
            uuids,
            ratios,
            dosage: None,
        }
    }

    /// Builder: set dosage.
    pub fn with_dosage(mut self, dosage: Dosage) -> Self {
        self.dosage = Some(dosage);
        self
    }

    /// Material ids that are set.
    pub fn material_ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.uuids.iter().flatten().copied()
    }
}

/// Ordered substitution slots of one role.
///
/// Serialized as a plain array. Input may also wrap the array as
/// `{"root": [...]}`, and `null` reads as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaterialList(pub Vec<MaterialEntry>);

impl<'de> Deserialize<'de> for MaterialList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(Vec<MaterialEntry>),
            Wrapped { root: Vec<MaterialEntry> },
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Plain(entries)) | Some(Repr::Wrapped { root: entries }) => Self(entries),
            None => Self::default(),
        })
    }
}

impl MaterialList {
    pub fn new(entries: Vec<MaterialEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[MaterialEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All material ids referenced by the list's entries.
    pub fn material_ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.0.iter().flat_map(MaterialEntry::material_ids)
    }
}

impl From<Vec<MaterialEntry>> for MaterialList {
    fn from(entries: Vec<MaterialEntry>) -> Self {
        Self(entries)
    }
}

/// A material list not bound to a group (film formers, solvents).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    #[serde(default)]
    pub materials: MaterialList,
}

impl Materials {
    pub fn new(entries: Vec<MaterialEntry>) -> Self {
        Self {
            materials: MaterialList(entries),
        }
    }
}

/// A nomenclature group with its material list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorisedMaterials {
    /// Group (role category) id
    #[serde(default)]
    pub nomenclature_group_id: Option<GroupId>,
    /// Substitution slots of the group
    #[serde(default)]
    pub items: MaterialList,
}

impl CategorisedMaterials {
    pub fn new(group_id: GroupId, entries: Vec<MaterialEntry>) -> Self {
        Self {
            nomenclature_group_id: Some(group_id),
            items: MaterialList(entries),
        }
    }
}

/// Additive groups, independent of color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithMaterials {
    #[serde(default)]
    pub materials: Vec<CategorisedMaterials>,
}

/// Pigment-part variant for one supported color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColoredMaterials {
    /// Color name
    #[serde(default)]
    pub color: Option<String>,
    /// Color-specific groups
    #[serde(default)]
    pub materials: Vec<CategorisedMaterials>,
    /// Dry residue fraction
    #[serde(default)]
    pub dry_residue: Option<f64>,
    /// Pigmentation degree
    #[serde(default)]
    pub pigmentation_degree: Option<f64>,
    /// Filler ratio
    #[serde(default)]
    pub filler_ratio: Option<f64>,
}

impl ColoredMaterials {
    /// Whether this variant is for `color`, ignoring case.
    pub fn matches_color(&self, color: &str) -> bool {
        self.color
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == color.to_lowercase())
    }

    /// Group ids declared by this variant.
    pub fn group_ids(&self) -> BTreeSet<GroupId> {
        self.materials
            .iter()
            .filter_map(|category| category.nomenclature_group_id)
            .collect()
    }

    /// Material ids of every entry in the groups equal to `group_id`.
    pub fn material_ids_in_group(&self, group_id: GroupId) -> impl Iterator<Item = MaterialId> + '_ {
        self.materials
            .iter()
            .filter(move |category| category.nomenclature_group_id == Some(group_id))
            .flat_map(|category| category.items.material_ids())
    }
}

/// Full bill-of-materials of a base recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Film formers common to all colors
    #[serde(default)]
    pub film_former_part: Materials,
    /// One variant per supported color
    #[serde(default)]
    pub pigment_part: Vec<ColoredMaterials>,
    /// Additive groups
    #[serde(default)]
    pub additives_part: CategoryWithMaterials,
    /// Solvents
    #[serde(default)]
    pub solvent_part: Materials,
    /// Strict validation applies when set
    #[serde(default)]
    pub is_posted: bool,
}

impl Rules {
    /// Parse a rules document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// First pigment-part variant whose color matches, ignoring case.
    pub fn variant_for_color(&self, color: &str) -> Option<&ColoredMaterials> {
        self.pigment_part
            .iter()
            .find(|variant| variant.matches_color(color))
    }
}
