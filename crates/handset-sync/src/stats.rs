//! Inventory totals for the dashboard summary.

use std::sync::Arc;

use handset_api_models::{Category, Phone};
use serde::Serialize;

use crate::collection::PagedCollection;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::page::{PageRequest, SCAN_PAGE_SIZE};
use crate::resource::{ResourceEndpoints, ViewKind};
use crate::transport::Transport;

/// Totals over a set of phones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    /// Phones counted.
    pub total_phones: usize,
    /// Categories counted.
    pub total_categories: usize,
    /// Sum of sale prices.
    pub total_sale_value: f64,
    /// Sum of sale price times units in stock.
    pub stock_value: f64,
    /// Mean sale price; zero without phones.
    pub average_sale_price: f64,
}

impl InventoryStats {
    /// Compute totals; missing prices and quantities count as zero.
    #[must_use]
    pub fn from_phones(phones: &[Phone], total_categories: usize) -> Self {
        let total_sale_value: f64 = phones
            .iter()
            .map(|phone| phone.price_sale.unwrap_or_default())
            .sum();
        let stock_value = phones
            .iter()
            .map(|phone| {
                #[allow(clippy::cast_precision_loss)]
                let quantity = phone.quantity_in_stock.unwrap_or_default() as f64;
                phone.price_sale.unwrap_or_default() * quantity
            })
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let average_sale_price = if phones.is_empty() {
            0.0
        } else {
            total_sale_value / phones.len() as f64
        };
        Self {
            total_phones: phones.len(),
            total_categories,
            total_sale_value,
            stock_value,
            average_sale_price,
        }
    }
}

/// Load the first page of categories and phones and total them.
///
/// # Errors
///
/// Returns the first [`SyncError`] from either load.
pub async fn collect_stats(
    transport: Arc<dyn Transport>,
    config: &SyncConfig,
) -> Result<InventoryStats, SyncError> {
    let categories = PagedCollection::<Category>::new(
        Arc::clone(&transport),
        Arc::new(ResourceEndpoints::categories()),
        ViewKind::Active,
        config,
    )?;
    let phones = PagedCollection::<Phone>::new(
        transport,
        Arc::new(ResourceEndpoints::phones()),
        ViewKind::Active,
        config,
    )?;
    let first = PageRequest::first(SCAN_PAGE_SIZE);
    let (category_load, phone_load) = tokio::join!(categories.load(first), phones.load(first));
    category_load?;
    phone_load?;

    let stats = InventoryStats::from_phones(
        &phones.snapshot().result.items,
        categories.snapshot().result.items.len(),
    );
    tracing::debug!(
        phones = stats.total_phones,
        categories = stats.total_categories,
        "inventory totals computed"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(price: Option<f64>, quantity: Option<u64>) -> Phone {
        Phone {
            price_sale: price,
            quantity_in_stock: quantity,
            ..Phone::default()
        }
    }

    #[test]
    fn totals_treat_missing_values_as_zero() {
        let stats = InventoryStats::from_phones(
            &[
                phone(Some(100.0), Some(3)),
                phone(Some(50.0), None),
                phone(None, Some(9)),
            ],
            2,
        );
        assert_eq!(stats.total_phones, 3);
        assert_eq!(stats.total_categories, 2);
        assert!((stats.total_sale_value - 150.0).abs() < f64::EPSILON);
        assert!((stats.stock_value - 300.0).abs() < f64::EPSILON);
        assert!((stats.average_sale_price - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_is_zero_without_phones() {
        let stats = InventoryStats::from_phones(&[], 4);
        assert_eq!(stats.total_phones, 0);
        assert!(stats.average_sale_price.abs() < f64::EPSILON);
    }
}
