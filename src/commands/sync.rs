use anyhow::Result;
use availability_core::property::canonical_slug;
use availability_core::{AvailabilityConfig, Property, SyncStatus, SyncTracker, pipeline};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::render::{Render, render_bookings, render_summary};
use crate::utils::tui;

pub async fn run(
    config: &AvailabilityConfig,
    property: Option<&str>,
    on: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let properties = select_properties(config, property)?;

    let mut tracker = SyncTracker::new();
    let ticket = tracker.begin();

    let spinner = tui::create_spinner(loading_message(config));
    let result = pipeline::run(config).await;
    spinner.finish_and_clear();

    let summary = result.as_ref().ok().map(|outcome| {
        (render_summary(outcome), outcome.failed_sources.clone())
    });
    tracker.complete(ticket, result);

    if tracker.status() == SyncStatus::Error {
        let message = tracker.error().unwrap_or("Unknown error");
        anyhow::bail!("{}", message);
    }

    let collection = tracker.collection();

    if json {
        println!("{}", serde_json::to_string_pretty(collection)?);
        return Ok(());
    }

    if let Some(date) = on {
        for p in &properties {
            match collection.occupied_on(&p.slug, date) {
                Some(booking) => println!("{} {}", p.render(), booking.status.render()),
                None => println!("{} {}", p.render(), "free".green()),
            }
        }
    } else {
        for (i, p) in properties.iter().enumerate() {
            println!("{}", p.render());
            println!("{}", render_bookings(collection.get(&p.slug)));

            if i < properties.len() - 1 {
                println!();
            }
        }
    }

    if let Some((line, failures)) = summary {
        println!("\n{} {}", tracker.status().render(), line);
        for failure in &failures {
            println!("   {} {}", "!".yellow(), failure.render());
        }
    }

    Ok(())
}

fn loading_message(config: &AvailabilityConfig) -> String {
    if config.use_ics {
        let count = config.properties.len();
        format!("Loading {} {}", count, tui::pluralize("calendar", count))
    } else {
        "Loading snapshot".to_string()
    }
}

fn select_properties(config: &AvailabilityConfig, filter: Option<&str>) -> Result<Vec<Property>> {
    let Some(filter) = filter else {
        return Ok(config.properties.clone());
    };

    let slug = canonical_slug(filter);
    match config.properties.iter().find(|p| p.slug == slug) {
        Some(p) => Ok(vec![p.clone()]),
        None => {
            let available: Vec<_> = config.properties.iter().map(|p| p.slug.clone()).collect();
            anyhow::bail!(
                "Property '{}' not found. Available: {}",
                filter,
                available.join(", ")
            );
        }
    }
}
