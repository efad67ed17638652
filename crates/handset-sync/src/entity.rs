//! Entity contract and stored-asset URL resolution.

use handset_api_models::{Category, EntityId, Phone};
use serde::de::DeserializeOwned;

/// Record type a paged view can hold.
pub trait SyncEntity: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backend identifier.
    fn entity_id(&self) -> EntityId;

    /// Rewrite stored asset paths into absolute URLs.
    fn resolve_assets(&mut self, assets: &AssetBase) {
        let _ = assets;
    }
}

impl SyncEntity for Category {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl SyncEntity for Phone {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn resolve_assets(&mut self, assets: &AssetBase) {
        self.avatar_url = self
            .avatar_url
            .as_deref()
            .and_then(|path| assets.resolve(path));
        self.image_urls = self
            .image_urls
            .iter()
            .filter_map(|path| assets.resolve(path))
            .collect();
    }
}

/// Base URL of upload storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase {
    base: String,
}

impl AssetBase {
    /// Wrap an upload base URL; a trailing slash is ignored.
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a stored path; absolute URLs pass through, blanks vanish.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            None
        } else if path.starts_with("http://") || path.starts_with("https://") {
            Some(path.to_string())
        } else {
            Some(format!("{}/{}", self.base, path.trim_start_matches('/')))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_upload_base() {
        let assets = AssetBase::new("http://localhost:9999/uploads/");
        assert_eq!(
            assets.resolve("abc_photo.png").as_deref(),
            Some("http://localhost:9999/uploads/abc_photo.png")
        );
        assert_eq!(
            assets.resolve("https://cdn.example.com/x.png").as_deref(),
            Some("https://cdn.example.com/x.png")
        );
        assert_eq!(assets.resolve("  "), None);
    }

    #[test]
    fn phone_assets_become_absolute() {
        let mut phone = Phone {
            id: 1,
            name: "Pixel".into(),
            avatar_url: Some("front.png".into()),
            image_urls: vec!["side.png".into(), String::new()],
            ..Phone::default()
        };
        phone.resolve_assets(&AssetBase::new("http://files"));
        assert_eq!(phone.avatar_url.as_deref(), Some("http://files/front.png"));
        assert_eq!(phone.image_urls, vec!["http://files/side.png".to_string()]);
    }
}
