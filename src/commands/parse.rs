use std::path::Path;

use anyhow::{Context, Result};
use availability_core::interpret::parse_calendar;
use availability_core::projection::project;
use availability_core::property::{canonical_slug, default_lot_ref};
use availability_core::{AvailabilityConfig, Property};
use chrono::Utc;

use crate::render::{Render, render_bookings};

pub async fn run(
    config: &AvailabilityConfig,
    file: &Path,
    slug: Option<&str>,
    json: bool,
) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let slug = match slug {
        Some(s) => canonical_slug(s),
        None => file
            .file_stem()
            .map(|stem| canonical_slug(&stem.to_string_lossy()))
            .unwrap_or_default(),
    };
    if slug.is_empty() {
        anyhow::bail!("Could not derive a property slug from {}; pass --slug", file.display());
    }

    let property = config
        .properties
        .iter()
        .find(|p| p.slug == slug)
        .cloned()
        .unwrap_or_else(|| Property {
            slug: slug.clone(),
            name: String::new(),
            lot_ref: Some(default_lot_ref(&slug)),
        });

    let tz = config.tz_resolver()?;
    let records = parse_calendar(&content, &property.lot_ref(), tz.as_ref(), Utc::now());
    let collection = project(&records, Some(std::slice::from_ref(&property)));
    let bookings = collection.get(&property.slug);

    if json {
        println!("{}", serde_json::to_string_pretty(bookings)?);
        return Ok(());
    }

    println!("{}", property.render());
    println!("{}", render_bookings(bookings));

    Ok(())
}
