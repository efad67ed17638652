//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use handset_api_models::{Category, EntityId, Phone};
use handset_sync::{InventoryStats, MutationKind, PageRequest, ProbeReport, Warning};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Records that can be listed as fixed-width table rows.
pub(crate) trait TableRow: Serialize {
    fn header() -> String;
    fn row(&self) -> String;
    /// `field: value` lines for the detail view.
    fn details(&self) -> Vec<(&'static str, String)>;
}

impl TableRow for Category {
    fn header() -> String {
        format!("{:<8} {:<28} {:>7} DESCRIPTION", "ID", "NAME", "PHONES")
    }

    fn row(&self) -> String {
        format!(
            "{:<8} {:<28} {:>7} {}",
            self.id,
            self.name,
            self.phones_count.map_or_else(|| "-".to_string(), |n| n.to_string()),
            self.description.as_deref().unwrap_or("")
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("description", optional(self.description.as_deref())),
            (
                "phones",
                self.phones_count.map_or_else(|| "-".to_string(), |n| n.to_string()),
            ),
            ("created", optional(self.created_at.as_deref())),
            ("updated", optional(self.updated_at.as_deref())),
        ]
    }
}

impl TableRow for Phone {
    fn header() -> String {
        format!(
            "{:<8} {:<24} {:<16} {:>12} {:>6} STATUS",
            "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:<8} {:<24} {:<16} {:>12} {:>6} {}",
            self.id,
            self.name,
            self.category_name.as_deref().unwrap_or("-"),
            self.price_sale
                .map_or_else(|| "-".to_string(), |price| format!("{price:.2}")),
            self.quantity_in_stock
                .map_or_else(|| "-".to_string(), |qty| qty.to_string()),
            listing_label(self.status)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let number = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |n| n.to_string());
        let price = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
        vec![
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            (
                "category",
                self.category_name.clone().unwrap_or_else(|| {
                    self.category_id
                        .map_or_else(|| "-".to_string(), |id| id.to_string())
                }),
            ),
            ("model", optional(self.model.as_deref())),
            ("os", optional(self.os.as_deref())),
            ("color", optional(self.color.as_deref())),
            ("ram", number(self.ram)),
            ("rom", number(self.rom)),
            ("screen", optional(self.screen.as_deref())),
            ("camera", optional(self.camera.as_deref())),
            ("price import", price(self.price_import)),
            ("price sale", price(self.price_sale)),
            (
                "stock",
                self.quantity_in_stock
                    .map_or_else(|| "-".to_string(), |qty| qty.to_string()),
            ),
            ("status", listing_label(self.status).to_string()),
            ("avatar", optional(self.avatar_url.as_deref())),
            ("gallery", self.image_urls.join(", ")),
        ]
    }
}

pub(crate) fn render_page<E: TableRow>(
    items: &[E],
    page: PageRequest,
    total_count: u64,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "page": page.index(),
            "size": page.size(),
            "totalCount": total_count,
            "items": items,
        }))?,
        OutputFormat::Table => {
            println!("{}", E::header());
            for item in items {
                println!("{}", item.row());
            }
            println!(
                "page {} (size {}), {} record(s) in total",
                page.index(),
                page.size(),
                total_count
            );
        }
    }
    Ok(())
}

pub(crate) fn render_record<E: TableRow>(record: &E, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(record)?,
        OutputFormat::Table => {
            for (field, value) in record.details() {
                println!("{field:<14} {value}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_mutation(
    resource: &str,
    kind: MutationKind,
    id: Option<EntityId>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "resource": resource,
            "mutation": kind.as_str(),
            "id": id,
        }))?,
        OutputFormat::Table => match id {
            Some(id) => println!("{resource} {id}: {} applied", kind.as_str()),
            None => println!("{resource}: {} applied", kind.as_str()),
        },
    }
    Ok(())
}

pub(crate) fn render_stats(stats: &InventoryStats, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(stats)?,
        OutputFormat::Table => {
            println!("{:<20} {}", "phones", stats.total_phones);
            println!("{:<20} {}", "categories", stats.total_categories);
            println!("{:<20} {:.2}", "total sale value", stats.total_sale_value);
            println!("{:<20} {:.2}", "stock value", stats.stock_value);
            println!("{:<20} {:.2}", "average sale price", stats.average_sale_price);
        }
    }
    Ok(())
}

pub(crate) fn render_probe(report: &ProbeReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => {
            println!("{:<28} {:>6} {:<20} DETAIL", "PATH", "STATUS", "OUTCOME");
            for attempt in &report.attempts {
                println!(
                    "{:<28} {:>6} {:<20} {}",
                    attempt.path,
                    attempt
                        .status
                        .map_or_else(|| "-".to_string(), |status| status.to_string()),
                    attempt.outcome,
                    attempt.detail.as_deref().unwrap_or("")
                );
            }
            match &report.working {
                Some(path) => println!("working endpoint: {path}"),
                None => println!("no working endpoint found"),
            }
        }
    }
    Ok(())
}

/// Warnings go to stderr so JSON on stdout stays parseable.
pub(crate) fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

const fn listing_label(status: Option<bool>) -> &'static str {
    match status {
        Some(true) => "listed",
        Some(false) => "hidden",
        None => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_row_fills_missing_counts() {
        let category = Category {
            id: 4,
            name: "Rugged".into(),
            description: None,
            created_at: None,
            updated_at: None,
            phones_count: None,
        };
        let row = category.row();
        assert!(row.starts_with("4 "));
        assert!(row.contains("Rugged"));
        assert!(row.contains(" - "));
    }

    #[test]
    fn phone_details_fall_back_to_category_id() {
        let phone = Phone {
            id: 9,
            name: "Pixel".into(),
            category_id: Some(3),
            price_sale: Some(499.5),
            status: Some(false),
            ..Phone::default()
        };
        let details = phone.details();
        assert!(details.contains(&("category", "3".to_string())));
        assert!(details.contains(&("price sale", "499.50".to_string())));
        assert!(details.contains(&("status", "hidden".to_string())));
    }

    #[test]
    fn listing_labels_cover_unknown_status() {
        assert_eq!(listing_label(Some(true)), "listed");
        assert_eq!(listing_label(None), "-");
    }
}
