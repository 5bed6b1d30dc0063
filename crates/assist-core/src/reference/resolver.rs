//! Deep-link and style lookup for references.
//!
//! Both lookups go through one fixed table keyed by [`EntityType`], so every
//! known kind has exactly one path, one query parameter and one style.

use super::model::{EntityType, Reference};

/// Presentation tokens for a reference badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityStyle {
    pub background: &'static str,
    pub text: &'static str,
}

impl EntityStyle {
    /// Style used by front ends for references that have no table entry.
    pub const NEUTRAL: EntityStyle = EntityStyle {
        background: "#f5f5f5",
        text: "#595959",
    };
}

/// Query parameter of a deep link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

/// Navigable location of a referenced entity inside the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    /// Path segment without leading slash (e.g. `activities`).
    pub path: String,
    pub param: QueryParam,
}

impl DeepLink {
    /// Relative link: `/{path}?{name}={value}`.
    pub fn href(&self) -> String {
        format!("/{}?{}={}", self.path, self.param.name, self.param.value)
    }

    /// Link joined onto the portal base URL, for opening outside the
    /// current conversation view.
    pub fn absolute(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.href())
    }
}

struct EntityRoute {
    path: &'static str,
    param: &'static str,
    style: EntityStyle,
}

fn route(entity_type: &EntityType) -> Option<EntityRoute> {
    let route = match entity_type {
        EntityType::Activity => EntityRoute {
            path: "activities",
            param: "activityId",
            style: EntityStyle {
                background: "#fff7e6",
                text: "#d46b08",
            },
        },
        EntityType::News => EntityRoute {
            path: "news",
            param: "newsId",
            style: EntityStyle {
                background: "#e6f4ff",
                text: "#0958d9",
            },
        },
        EntityType::Project => EntityRoute {
            path: "projects",
            param: "projectId",
            style: EntityStyle {
                background: "#f6ffed",
                text: "#389e0d",
            },
        },
        EntityType::Expert => EntityRoute {
            path: "experts",
            param: "expertId",
            style: EntityStyle {
                background: "#f9f0ff",
                text: "#531dab",
            },
        },
        EntityType::Product => EntityRoute {
            path: "products",
            param: "productId",
            style: EntityStyle {
                background: "#fff0f6",
                text: "#c41d7f",
            },
        },
        EntityType::Unknown(_) => return None,
    };
    Some(route)
}

/// Resolves a reference to its deep link.
///
/// Returns `None` for entity kinds without a table entry; callers must not
/// navigate in that case.
pub fn resolve(reference: &Reference) -> Option<DeepLink> {
    let route = route(&reference.entity_type)?;
    Some(DeepLink {
        path: route.path.to_string(),
        param: QueryParam {
            name: route.param.to_string(),
            value: reference.entity_id.to_string(),
        },
    })
}

/// Looks up the badge style of an entity kind.
pub fn style(entity_type: &EntityType) -> Option<EntityStyle> {
    route(entity_type).map(|route| route.style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all_known_types() {
        let expected = [
            (EntityType::Activity, "activities", "activityId"),
            (EntityType::News, "news", "newsId"),
            (EntityType::Project, "projects", "projectId"),
            (EntityType::Expert, "experts", "expertId"),
            (EntityType::Product, "products", "productId"),
        ];

        for (entity_type, path, param) in &expected {
            let reference = Reference::new(entity_type.clone(), 42, "t", "n");
            let link = resolve(&reference)
                .unwrap_or_else(|| panic!("{entity_type} should resolve"));
            assert_eq!(link.path, *path);
            assert_eq!(link.param.name, *param);
            assert_eq!(link.param.value, "42");
        }

        assert_eq!(expected.len(), EntityType::KNOWN.len());
    }

    #[test]
    fn test_resolve_unknown_type_returns_none() {
        let reference = Reference::new("course", 1, "Rust 入门", "课程");
        assert!(resolve(&reference).is_none());
        assert!(style(&reference.entity_type).is_none());
    }

    #[test]
    fn test_href_and_absolute() {
        let reference = Reference::new(EntityType::Activity, 3, "年度论坛", "活动");
        let link = resolve(&reference).unwrap();

        assert_eq!(link.href(), "/activities?activityId=3");
        assert_eq!(
            link.absolute("https://portal.example.org/"),
            "https://portal.example.org/activities?activityId=3"
        );
    }

    #[test]
    fn test_every_known_type_has_style() {
        for entity_type in EntityType::KNOWN {
            let style = style(&entity_type).expect("known types carry a style");
            assert_ne!(style, EntityStyle::NEUTRAL);
        }
    }
}
