//! Endpoint tables for backend resources.
//!
//! Paths are data so alternate list endpoints and update addressing can differ
//! per resource without code changes.

use handset_api_models::EntityId;

/// Which logical set of a resource a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Live records.
    Active,
    /// Soft-deleted records.
    Deleted,
}

impl ViewKind {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

/// How the update endpoint carries the record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAddressing {
    /// `PUT /{resource}/update/{id}`
    PathSegment,
    /// `PUT /{resource}/update?id={id}`
    QueryParam,
}

/// Paths for one backend resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoints {
    /// Resource segment, e.g. `categories`.
    pub name: String,
    /// Primary active list path.
    pub list_path: String,
    /// Path queried once when the primary active list path fails.
    pub list_alternate: Option<String>,
    /// Deleted list path.
    pub deleted_path: String,
    /// Path queried once when the deleted list path fails.
    pub deleted_alternate: Option<String>,
    /// Update addressing style.
    pub update: UpdateAddressing,
}

impl ResourceEndpoints {
    /// Standard layout: `/all-page` with `/list` as alternate, `/deleted` without one.
    #[must_use]
    pub fn standard(name: &str, update: UpdateAddressing) -> Self {
        Self {
            name: name.to_string(),
            list_path: format!("/{name}/all-page"),
            list_alternate: Some(format!("/{name}/list")),
            deleted_path: format!("/{name}/deleted"),
            deleted_alternate: None,
            update,
        }
    }

    /// Category endpoints.
    #[must_use]
    pub fn categories() -> Self {
        Self::standard("categories", UpdateAddressing::PathSegment)
    }

    /// Phone endpoints.
    #[must_use]
    pub fn phones() -> Self {
        Self::standard("phones", UpdateAddressing::QueryParam)
    }

    /// Primary and alternate list path for a view.
    #[must_use]
    pub fn list(&self, view: ViewKind) -> (&str, Option<&str>) {
        match view {
            ViewKind::Active => (&self.list_path, self.list_alternate.as_deref()),
            ViewKind::Deleted => (&self.deleted_path, self.deleted_alternate.as_deref()),
        }
    }

    /// `GET /{resource}/{id}`
    #[must_use]
    pub fn by_id(&self, id: EntityId) -> String {
        format!("/{}/{id}", self.name)
    }

    /// `POST /{resource}/create`
    #[must_use]
    pub fn create(&self) -> String {
        format!("/{}/create", self.name)
    }

    /// Update path plus query parameters.
    #[must_use]
    pub fn update(&self, id: EntityId) -> (String, Vec<(String, String)>) {
        match self.update {
            UpdateAddressing::PathSegment => (format!("/{}/update/{id}", self.name), Vec::new()),
            UpdateAddressing::QueryParam => (
                format!("/{}/update", self.name),
                vec![("id".to_string(), id.to_string())],
            ),
        }
    }

    /// `DELETE /{resource}/delete/{id}`
    #[must_use]
    pub fn delete(&self, id: EntityId) -> String {
        format!("/{}/delete/{id}", self.name)
    }

    /// `PUT /{resource}/restore/{id}`
    #[must_use]
    pub fn restore(&self, id: EntityId) -> String {
        format!("/{}/restore/{id}", self.name)
    }

    /// Log label for a view of this resource, e.g. `phones/deleted`.
    #[must_use]
    pub fn view_label(&self, view: ViewKind) -> String {
        format!("{}/{}", self.name, view.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_matches_backend_paths() {
        let categories = ResourceEndpoints::categories();
        assert_eq!(
            categories.list(ViewKind::Active),
            ("/categories/all-page", Some("/categories/list"))
        );
        assert_eq!(categories.list(ViewKind::Deleted), ("/categories/deleted", None));
        assert_eq!(categories.by_id(4), "/categories/4");
        assert_eq!(categories.create(), "/categories/create");
        assert_eq!(categories.delete(4), "/categories/delete/4");
        assert_eq!(categories.restore(4), "/categories/restore/4");
    }

    #[test]
    fn update_addressing_differs_per_resource() {
        assert_eq!(
            ResourceEndpoints::categories().update(7),
            ("/categories/update/7".to_string(), Vec::new())
        );
        assert_eq!(
            ResourceEndpoints::phones().update(7),
            (
                "/phones/update".to_string(),
                vec![("id".to_string(), "7".to_string())]
            )
        );
    }

    #[test]
    fn view_labels_name_resource_and_view() {
        assert_eq!(
            ResourceEndpoints::phones().view_label(ViewKind::Deleted),
            "phones/deleted"
        );
    }
}
