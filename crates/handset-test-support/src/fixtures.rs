//! Records and response envelopes for tests.

use handset_api_models::{CODE_EMPTY_RESULT, CODE_SUCCESS, Category, EntityId, Phone};
use serde::Serialize;
use serde_json::{Value, json};

/// Stored asset name with a canonical UUID prefix.
pub const STORED_AVATAR: &str = "a1b2c3d4-e5f6-47a8-b9c0-d1e2f3a4b5c6_front.png";

/// Category with only id and name set.
#[must_use]
pub fn category(id: EntityId, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        description: None,
        created_at: None,
        updated_at: None,
        phones_count: None,
    }
}

/// Phone with id, name, price and stock set.
#[must_use]
pub fn phone(id: EntityId, name: &str, price_sale: f64, quantity: u64) -> Phone {
    Phone {
        id,
        name: name.to_string(),
        price_sale: Some(price_sale),
        quantity_in_stock: Some(quantity),
        ..Phone::default()
    }
}

/// `{code: 1000, result: {content, totalElements}}`.
#[must_use]
pub fn page_envelope<T: Serialize>(items: &[T], total: u64) -> Value {
    json!({
        "code": CODE_SUCCESS,
        "result": { "content": items, "totalElements": total }
    })
}

/// `{code: 1000, result: [...]}`.
#[must_use]
pub fn bare_list_envelope<T: Serialize>(items: &[T]) -> Value {
    json!({ "code": CODE_SUCCESS, "result": items })
}

/// `{code: 1000, result}`.
#[must_use]
pub fn success_envelope(result: Value) -> Value {
    json!({ "code": CODE_SUCCESS, "result": result })
}

/// `{code: 1005}`.
#[must_use]
pub fn empty_envelope() -> Value {
    json!({ "code": CODE_EMPTY_RESULT, "message": "No data" })
}

/// `{code, message}`.
#[must_use]
pub fn error_envelope(code: i32, message: &str) -> Value {
    json!({ "code": code, "message": message })
}
