//! Where raw occupancy data comes from and how it is retrieved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::property::Property;

/// One calendar feed: the property it belongs to, where to fetch it, and
/// the lot reference its records carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub slug: String,
    pub location: String,
    pub lot_ref: String,
}

impl CalendarSource {
    /// The conventional feed for `property` under `base`: `<base>/<slug>.ics`.
    pub fn for_property(base: &str, property: &Property) -> Self {
        CalendarSource {
            slug: property.slug.clone(),
            location: join_location(base, &format!("{}.ics", property.slug)),
            lot_ref: property.lot_ref(),
        }
    }
}

/// Join a file name onto a base URL or directory, tolerating trailing
/// slashes on the base and leading slashes on the name.
pub fn join_location(base: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    let base = base.trim();
    if base.is_empty() || base == "/" {
        return format!("/{}", name);
    }
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Retrieves the text behind a location.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, location: &str) -> AvailabilityResult<String>;
}

/// Fetches `http(s)://` locations over the network and reads everything
/// else from the local filesystem.
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> AvailabilityResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("availability/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AvailabilityError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch_http(&self, location: &str) -> AvailabilityResult<String> {
        let url = url::Url::parse(location).map_err(|e| AvailabilityError::Fetch {
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| AvailabilityError::Fetch {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AvailabilityError::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response.text().await.map_err(|e| AvailabilityError::Fetch {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_file(&self, location: &str) -> AvailabilityResult<String> {
        let path = local_path(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AvailabilityError::Fetch {
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch_text(&self, location: &str) -> AvailabilityResult<String> {
        debug!(location, "Fetching");
        if is_remote(location) {
            self.fetch_http(location).await
        } else {
            self.fetch_file(location).await
        }
    }
}

/// The `error` field of a JSON error body such as `{"error": "Not published yet"}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strip a `file://` scheme and expand `~`.
fn local_path(location: &str) -> PathBuf {
    let location = location.trim();
    let location = location.strip_prefix("file://").unwrap_or(location);
    PathBuf::from(shellexpand::tilde(location).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_location() {
        assert_eq!(join_location("/availability", "alice.ics"), "/availability/alice.ics");
        assert_eq!(join_location("/availability/", "/alice.ics"), "/availability/alice.ics");
        assert_eq!(join_location("https://cal.example.com/feeds//", "alice.ics"), "https://cal.example.com/feeds/alice.ics");
        assert_eq!(join_location("", "alice.ics"), "/alice.ics");
        assert_eq!(join_location("/", "alice.ics"), "/alice.ics");
    }

    #[test]
    fn test_source_for_property() {
        let property = Property::new("Savoie 53", "Savoie");
        let source = CalendarSource::for_property("https://cal.example.com", &property);
        assert_eq!(source.slug, "savoie-53");
        assert_eq!(source.location, "https://cal.example.com/savoie-53.ics");
        assert_eq!(source.lot_ref, "SAVOIE-53");
    }

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/a.ics"));
        assert!(is_remote("HTTP://example.com/a.ics"));
        assert!(!is_remote("/srv/availability/a.ics"));
        assert!(!is_remote("file:///srv/a.ics"));
    }

    #[test]
    fn test_error_message_from_json_body() {
        assert_eq!(
            error_message(r#"{"error": "Snapshot not published yet"}"#).as_deref(),
            Some("Snapshot not published yet")
        );
        assert_eq!(error_message(r#"{"error": "  "}"#), None);
        assert_eq!(error_message(r#"{"error": 42}"#), None);
        assert_eq!(error_message("<html>Not Found</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_local_path_strips_file_scheme() {
        assert_eq!(local_path("file:///srv/a.ics"), PathBuf::from("/srv/a.ics"));
        assert_eq!(local_path(" /srv/a.ics "), PathBuf::from("/srv/a.ics"));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.ics");
        std::fs::write(&path, "BEGIN:VCALENDAR\nEND:VCALENDAR\n").unwrap();

        let fetcher = SourceFetcher::new(Duration::from_secs(1)).unwrap();
        let text = fetcher.fetch_text(path.to_str().unwrap()).await.unwrap();
        assert!(text.starts_with("BEGIN:VCALENDAR"));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ics");

        let fetcher = SourceFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch_text(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, AvailabilityError::Fetch { .. }));
    }
}
