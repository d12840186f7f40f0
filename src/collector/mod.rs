//! Collection of live shop stock
//!
//! Fetches a category from the stock API, validates the payload, stores it as
//! a snapshot and raises alerts for important items.

pub mod client;

pub use client::*;

use serde_json::Value;
use thiserror::Error;

use crate::domain::{Category, StockItem};
use crate::notify::Notification;

/// Errors that can occur while collecting stock
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error for {category}: {message}")]
    Api { category: Category, message: String },

    #[error("Invalid {category} response: {message}")]
    Validation { category: Category, message: String },
}

fn invalid(category: Category, message: impl Into<String>) -> CollectorError {
    CollectorError::Validation {
        category,
        message: message.into(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a raw API response and convert it into stock items
///
/// The whole payload is rejected on the first malformed element.
pub fn validate_response(category: Category, data: &Value) -> Result<Vec<StockItem>, CollectorError> {
    if let Some(message) = data.get("error") {
        let message = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if message.contains("Rate limit exceeded") {
            return Err(CollectorError::RateLimited(message));
        }
        return Err(CollectorError::Api { category, message });
    }

    let Value::Array(entries) = data else {
        return Err(invalid(
            category,
            format!("Expected list, got {}", json_type(data)),
        ));
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(fields) = entry else {
            return Err(invalid(
                category,
                format!("Expected object item, got {}", json_type(entry)),
            ));
        };
        let (Some(name), Some(quantity)) = (fields.get("name"), fields.get("quantity")) else {
            return Err(invalid(category, "Missing 'name' or 'quantity' field"));
        };
        let Some(name) = name.as_str() else {
            return Err(invalid(category, "'name' must be a string"));
        };
        let Some(quantity) = quantity.as_u64() else {
            return Err(invalid(
                category,
                format!("'quantity' of {name} must be a non-negative integer"),
            ));
        };
        items.push(StockItem::new(name, quantity));
    }

    Ok(items)
}

/// Items in `items` whose name is listed in `important`, in listing order
pub fn important_items<'a>(items: &'a [StockItem], important: &[String]) -> Vec<&'a StockItem> {
    items
        .iter()
        .filter(|item| important.iter().any(|name| name == &item.name))
        .collect()
}

/// Alert sent for one important item
pub fn important_alert(category: Category, item: &StockItem) -> Notification {
    let label = category.item_label();
    Notification::new(format!("🔔 Important {} in Stock: {}", label, item.name))
        .with_title(format!("Important {} Alert", label))
        .with_priority(3)
        .with_tags("important,stock")
}

/// Listing written to the stock log after a successful fetch
pub fn format_listing(items: &[StockItem]) -> String {
    items
        .iter()
        .map(|item| format!("{:<20} x{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join("\n")
}
