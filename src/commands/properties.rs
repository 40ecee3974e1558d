use anyhow::Result;
use availability_core::AvailabilityConfig;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(config: &AvailabilityConfig) -> Result<()> {
    let sources = config.sources();

    for (property, source) in config.properties.iter().zip(&sources) {
        println!(
            "{} {} {}",
            property.render(),
            format!("[{}]", source.lot_ref).dimmed(),
            source.location.dimmed()
        );
    }

    let fallback = if config.use_ics {
        "Snapshot fallback:"
    } else {
        "Calendars disabled, snapshot:"
    };
    println!("\n{} {}", fallback, config.snapshot.dimmed());

    Ok(())
}
