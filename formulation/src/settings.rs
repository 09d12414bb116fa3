//! Role-group settings for recipe generation.

use serde::{Deserialize, Serialize};

use rules::GroupId;

/// Catalog groups marking the film former, pigment and filler roles.
///
/// A singleton record maintained by an operator. Generation refuses to run
/// until every field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroupSettings {
    #[serde(default)]
    pub film_formers_group_id: Option<GroupId>,
    #[serde(default)]
    pub pigments_group_id: Option<GroupId>,
    #[serde(default)]
    pub fillers_group_id: Option<GroupId>,
}

impl RoleGroupSettings {
    /// Settings with every role configured.
    pub fn new(film_formers: GroupId, pigments: GroupId, fillers: GroupId) -> Self {
        Self {
            film_formers_group_id: Some(film_formers),
            pigments_group_id: Some(pigments),
            fillers_group_id: Some(fillers),
        }
    }

    /// The configured groups, if all of them are set.
    pub fn resolve(&self) -> Option<RoleGroups> {
        Some(RoleGroups {
            film_formers: self.film_formers_group_id?,
            pigments: self.pigments_group_id?,
            fillers: self.fillers_group_id?,
        })
    }
}

/// Fully configured role groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGroups {
    pub film_formers: GroupId,
    pub pigments: GroupId,
    pub fillers: GroupId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_resolve_requires_every_field() {
        let [a, b, c] = [(); 3].map(|_| Uuid::new_v4());
        let settings = RoleGroupSettings::new(a, b, c);
        assert_eq!(
            settings.resolve(),
            Some(RoleGroups {
                film_formers: a,
                pigments: b,
                fillers: c,
            })
        );

        let partial = RoleGroupSettings {
            fillers_group_id: None,
            ..settings
        };
        assert!(partial.resolve().is_none());
        assert!(RoleGroupSettings::default().resolve().is_none());
    }
}
