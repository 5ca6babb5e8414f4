//! # Settings Serialization Boundary
//!
//! The remote protocol carries settings as flattened key/value string pairs;
//! locally they live as one structured [`AppSettings`] document. This module
//! owns the translation in both directions.
//!
//! ## Merge Semantics
//! Merging is additive: only keys present in the incoming list with a
//! non-empty value overwrite the corresponding field. Unknown keys are
//! ignored, unparseable values are logged and keep the previous field, so a
//! partially populated remote sheet can never blank out local settings.

use serde::{Deserialize, Serialize};
use tracing::warn;

use souk_core::{AppSettings, Language, ReceiptSize, TaxRate};

// =============================================================================
// Wire Keys
// =============================================================================

/// Flattened settings keys as they appear on the wire.
pub mod wire {
    pub const LANGUAGE: &str = "language";
    pub const CURRENCY: &str = "currency";
    pub const RECEIPT_SIZE: &str = "receipt_size";
    pub const STORE_NAME: &str = "store_name";
    pub const STORE_LOGO: &str = "store_logo";
    pub const TAX_RATE: &str = "tax_rate";
    pub const CATEGORIES: &str = "categories";
}

// =============================================================================
// Wire Form
// =============================================================================

/// One flattened setting as exchanged with the remote backend. Values are
/// always strings; `categories` is a JSON array encoded as a string and
/// `tax_rate` is a decimal percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
}

impl SettingEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        SettingEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Merge (wire → structured)
// =============================================================================

/// Merges flattened entries into the structured settings in place.
///
/// Entries with an empty value are skipped; absent keys leave the current
/// field untouched.
pub fn merge_entries(settings: &mut AppSettings, entries: &[SettingEntry]) {
    for entry in entries {
        let value = entry.value.trim();
        if value.is_empty() {
            continue;
        }

        match entry.key.as_str() {
            wire::LANGUAGE => match value {
                "ar" => settings.language = Language::Ar,
                "en" => settings.language = Language::En,
                other => warn!(value = other, "unknown language setting, keeping previous"),
            },
            wire::CURRENCY => settings.currency = value.to_string(),
            wire::RECEIPT_SIZE => match value {
                "thermal" => settings.receipt_size = ReceiptSize::Thermal,
                "a4" => settings.receipt_size = ReceiptSize::A4,
                other => warn!(value = other, "unknown receipt size, keeping previous"),
            },
            wire::STORE_NAME => settings.store_name = value.to_string(),
            wire::STORE_LOGO => settings.store_logo = value.to_string(),
            wire::TAX_RATE => {
                // Unparseable rate falls back to zero, matching the sheet
                // convention that a blank or garbled cell means no tax.
                let pct = value.parse::<f64>().unwrap_or(0.0);
                settings.tax_rate = TaxRate::from_percentage(pct);
            }
            wire::CATEGORIES => match serde_json::from_str::<Vec<String>>(value) {
                Ok(categories) => settings.categories = categories,
                Err(e) => {
                    warn!(error = %e, "malformed categories setting, keeping previous")
                }
            },
            other => warn!(key = other, "ignoring unknown setting key"),
        }
    }
}

// =============================================================================
// Flatten (structured → wire)
// =============================================================================

/// Flattens the structured settings into the wire form for a remote save.
pub fn flatten(settings: &AppSettings) -> Vec<SettingEntry> {
    let language = match settings.language {
        Language::Ar => "ar",
        Language::En => "en",
    };
    let receipt_size = match settings.receipt_size {
        ReceiptSize::Thermal => "thermal",
        ReceiptSize::A4 => "a4",
    };
    let categories =
        serde_json::to_string(&settings.categories).unwrap_or_else(|_| "[]".to_string());

    vec![
        SettingEntry::new(wire::LANGUAGE, language),
        SettingEntry::new(wire::CURRENCY, &settings.currency),
        SettingEntry::new(wire::RECEIPT_SIZE, receipt_size),
        SettingEntry::new(wire::STORE_NAME, &settings.store_name),
        SettingEntry::new(wire::STORE_LOGO, &settings.store_logo),
        SettingEntry::new(wire::TAX_RATE, settings.tax_rate.percentage().to_string()),
        SettingEntry::new(wire::CATEGORIES, categories),
    ]
}

// =============================================================================
// Unit Tests
// =============================================================================
