#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions)]
//! Wire DTOs for the phone-inventory backend.
//!
//! Every endpoint wraps its payload in the same `{ code, result }` envelope.
//! The types here describe the JSON exactly as it travels; interpretation of
//! codes and payload shapes lives in `handset-sync`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope code for a successful request.
pub const CODE_SUCCESS: i32 = 1000;
/// Envelope code the backend uses when a query produced no rows.
pub const CODE_EMPTY_RESULT: i32 = 1005;

/// Numeric identifier assigned by the backend.
pub type EntityId = i64;

/// Uniform response wrapper returned by every endpoint.
///
/// `result` stays untyped until the caller knows which payload it expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T = Value> {
    /// Backend status code (`1000` success, `1005` empty result, other values are errors).
    pub code: i32,
    /// Payload; `null` or absent for most mutations.
    #[serde(default)]
    pub result: Option<T>,
    /// Human-readable message attached to error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Build a success envelope around `result`.
    #[must_use]
    pub const fn success(result: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            result: Some(result),
            message: None,
        }
    }
}

/// Paged list payload in the backend's Spring-style shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload<T> {
    /// Rows on the requested page.
    pub content: Vec<T>,
    /// Row count across the whole filtered collection.
    #[serde(default)]
    pub total_elements: u64,
}

/// List payload as it may appear inside a success envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListPayload<T> {
    /// `{ content, totalElements }` page object.
    Paged(PagePayload<T>),
    /// Plain JSON array without pagination metadata.
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    /// Split into rows and the total count; bare arrays count themselves.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, u64) {
        match self {
            Self::Paged(page) => (page.content, page.total_elements),
            Self::Bare(items) => {
                let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
                (items, total)
            }
        }
    }
}

/// Product category record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Backend identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp as rendered by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp as rendered by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Number of phones filed under this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones_count: Option<u64>,
}

/// Phone record, including stored asset references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    /// Backend identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Owning category identifier (only returned by the detail endpoint).
    pub category_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Owning category name as rendered in list rows.
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Model designation.
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Operating system.
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Colour name.
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// RAM in gigabytes.
    pub ram: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Storage in gigabytes.
    pub rom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Screen description.
    pub screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Camera description.
    pub camera: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Purchase price.
    pub price_import: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Sale price.
    pub price_sale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Units currently in stock.
    pub quantity_in_stock: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-form description.
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Whether the phone is listed for sale.
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Stored avatar image path or URL.
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Stored gallery image paths or URLs.
    pub image_urls: Vec<String>,
}

/// JSON body for category create/update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Scalar fields submitted with a phone create/update form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhoneInput {
    /// Display name.
    pub name: String,
    /// Owning category.
    pub category_id: EntityId,
    /// Model designation.
    pub model: Option<String>,
    /// Operating system.
    pub os: Option<String>,
    /// Colour name.
    pub color: Option<String>,
    /// RAM in gigabytes.
    pub ram: u32,
    /// Storage in gigabytes.
    pub rom: u32,
    /// Screen description.
    pub screen: Option<String>,
    /// Camera description.
    pub camera: Option<String>,
    /// Purchase price.
    pub price_import: f64,
    /// Sale price.
    pub price_sale: f64,
    /// Units in stock.
    pub quantity_in_stock: u64,
    /// Free-form description.
    pub description: Option<String>,
    /// Listed for sale.
    pub status: bool,
}

impl PhoneInput {
    /// Render the scalar multipart fields in the order the backend expects.
    ///
    /// Optional text fields are sent as empty strings rather than omitted.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        vec![
            ("name".to_string(), self.name.clone()),
            ("categoryId".to_string(), self.category_id.to_string()),
            ("model".to_string(), text(&self.model)),
            ("os".to_string(), text(&self.os)),
            ("color".to_string(), text(&self.color)),
            ("ram".to_string(), self.ram.to_string()),
            ("rom".to_string(), self.rom.to_string()),
            ("screen".to_string(), text(&self.screen)),
            ("camera".to_string(), text(&self.camera)),
            ("priceImport".to_string(), self.price_import.to_string()),
            ("priceSale".to_string(), self.price_sale.to_string()),
            (
                "quantityInStock".to_string(),
                self.quantity_in_stock.to_string(),
            ),
            ("description".to_string(), text(&self.description)),
            ("status".to_string(), self.status.to_string()),
        ]
    }
}
