//! Availability configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config.toml`, then `AVAILABILITY_*` environment variables.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_ICS_BASE, DEFAULT_SNAPSHOT};
use crate::error::{AvailabilityError, AvailabilityResult};
use crate::property::{Property, canonical_slug, default_properties};
use crate::source::CalendarSource;
use crate::timezone::{FixedOffsetTable, IanaTz, TzResolver, UtcOnly};

fn default_ics_base() -> String {
    DEFAULT_ICS_BASE.to_string()
}

fn default_snapshot() -> String {
    DEFAULT_SNAPSHOT.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_use_ics() -> bool {
    true
}

/// How `TZID`-qualified times are converted when no offset table is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneMode {
    /// Full IANA database
    #[default]
    Iana,
    /// Ignore `TZID` and read wall-clock times as UTC
    Utc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Base URL or directory holding one `<slug>.ics` per property
    #[serde(default = "default_ics_base")]
    pub ics_base: String,

    /// Try calendar feeds before the snapshot
    #[serde(default = "default_use_ics")]
    pub use_ics: bool,

    /// URL or path of the JSON snapshot used when no feed loads
    #[serde(default = "default_snapshot")]
    pub snapshot: String,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub timezone: TimezoneMode,

    /// Zone name → `+HH:MM`. When set, replaces `timezone`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub timezone_offsets: HashMap<String, String>,

    #[serde(default = "default_properties")]
    pub properties: Vec<Property>,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        AvailabilityConfig {
            ics_base: default_ics_base(),
            use_ics: default_use_ics(),
            snapshot: default_snapshot(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            timezone: TimezoneMode::default(),
            timezone_offsets: HashMap::new(),
            properties: default_properties(),
        }
    }
}

impl AvailabilityConfig {
    /// `<config_dir>/availability/config.toml`
    pub fn config_path() -> AvailabilityResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AvailabilityError::Config("Could not determine config directory".into()))?
            .join("availability");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> AvailabilityResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        let config: AvailabilityConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(Environment::with_prefix("AVAILABILITY").try_parsing(true))
            .build()
            .map_err(|e| AvailabilityError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AvailabilityError::Config(e.to_string()))?;

        config.normalized()
    }

    /// Parse a TOML document on its own, without file or environment layers.
    pub fn from_toml(content: &str) -> AvailabilityResult<Self> {
        let config: AvailabilityConfig =
            toml::from_str(content).map_err(|e| AvailabilityError::Config(e.to_string()))?;
        config.normalized()
    }

    /// Canonicalize property slugs and reject unusable values.
    fn normalized(mut self) -> AvailabilityResult<Self> {
        if self.fetch_timeout_secs == 0 {
            return Err(AvailabilityError::Config(
                "fetch_timeout_secs must be greater than zero".into(),
            ));
        }

        for property in &mut self.properties {
            let slug = canonical_slug(&property.slug);
            if slug.is_empty() {
                return Err(AvailabilityError::Config(format!(
                    "Property '{}' has an empty slug",
                    property.name
                )));
            }
            property.slug = slug;
        }

        // Every slug and lot reference must lead back to exactly one property.
        let mut owners: HashMap<String, &str> = HashMap::new();
        for property in &self.properties {
            let lot_ref = canonical_slug(&property.lot_ref());
            for key in [property.slug.clone(), lot_ref] {
                match owners.get(key.as_str()) {
                    Some(owner) if *owner != property.slug => {
                        return Err(AvailabilityError::Config(format!(
                            "Properties '{}' and '{}' both answer to '{}'",
                            owner, property.slug, key
                        )));
                    }
                    _ => {
                        owners.insert(key, &property.slug);
                    }
                }
            }
        }

        Ok(self)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// One calendar source per configured property.
    pub fn sources(&self) -> Vec<CalendarSource> {
        self.properties
            .iter()
            .map(|property| CalendarSource::for_property(&self.ics_base, property))
            .collect()
    }

    pub fn tz_resolver(&self) -> AvailabilityResult<Box<dyn TzResolver>> {
        if !self.timezone_offsets.is_empty() {
            let table = FixedOffsetTable::from_strings(&self.timezone_offsets)
                .map_err(AvailabilityError::Config)?;
            return Ok(Box::new(table));
        }

        Ok(match self.timezone {
            TimezoneMode::Iana => Box::new(IanaTz),
            TimezoneMode::Utc => Box::new(UtcOnly),
        })
    }
}
