//! Rental properties and their canonical slugs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEFAULT_PROPERTIES;

/// Normalize a property reference into the slug used to key all
/// per-property data: lower-cased, diacritics transliterated, and every run
/// of whitespace, hyphens or punctuation collapsed into a single hyphen.
///
/// `"Savoie 53"`, `"SAVOIE-53"` and `"savoie--53"` all become `savoie-53`.
pub fn canonical_slug(reference: &str) -> String {
    slug::slugify(reference)
}

/// Lot reference used by a property's calendar when none is configured.
pub fn default_lot_ref(slug: &str) -> String {
    slug.to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_ref: Option<String>,
}

impl Property {
    pub fn new(slug: &str, name: &str) -> Self {
        Property {
            slug: canonical_slug(slug),
            name: name.to_string(),
            lot_ref: None,
        }
    }

    /// The lot reference that records from this property's feed carry.
    pub fn lot_ref(&self) -> String {
        self.lot_ref
            .clone()
            .unwrap_or_else(|| default_lot_ref(&self.slug))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.slug
        } else {
            &self.name
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

pub fn default_properties() -> Vec<Property> {
    DEFAULT_PROPERTIES
        .iter()
        .map(|(slug, name)| Property::new(slug, name))
        .collect()
}
