//! Listing page parser
//!
//! Every server entry on a listing page carries a host label and a status
//! block such as `онлайн1.20.1версия`: a status marker (online or offline),
//! the advertised version, then a version marker.

use std::collections::HashMap;

use scraper::{ElementRef, Selector};
use semver::Version;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::scrape::error::{PageError, ParseError};
use crate::scrape::fetcher::{Document, PageFetcher};
use crate::scrape::semver::parse_listed_version;

const SERVER_ENTRY: &str = ".servers-list .server";
const HOST_LABEL: &str = ".info .ip .back-tooltip span";
const STATUS_BLOCK: &str = ".info .block";

/// Versions found on one page, keyed by host label
pub type HostVersions = HashMap<String, Version>;

/// Locale-specific tokens delimiting the version inside a status block
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusMarkers {
    pub online: String,
    pub offline: String,
    pub version: String,
}

impl Default for StatusMarkers {
    fn default() -> Self {
        Self {
            online: "онлайн".to_string(),
            offline: "оффлайн".to_string(),
            version: "версия".to_string(),
        }
    }
}

impl StatusMarkers {
    /// Returns the text between the status marker and the version marker,
    /// or `None` if the status block contains neither status marker.
    ///
    /// The online marker takes precedence over the offline marker.
    pub fn version_candidate<'a>(&self, status: &'a str) -> Option<&'a str> {
        let after_status = [&self.online, &self.offline]
            .into_iter()
            .filter(|marker| !marker.is_empty())
            .find_map(|marker| status.split(marker.as_str()).nth(1))?;

        if self.version.is_empty() {
            return Some(after_status);
        }
        after_status.split(self.version.as_str()).next()
    }
}

/// Parses listing pages into host/version pairs
#[derive(Debug, Clone, Default)]
pub struct ListingParser {
    markers: StatusMarkers,
}

impl ListingParser {
    pub fn new(markers: StatusMarkers) -> Self {
        Self { markers }
    }

    /// Extracts every host/version pair from a listing page.
    ///
    /// Entries without a host label are skipped. Any other malformed entry
    /// fails the whole page and nothing from it is returned.
    pub fn parse(&self, document: &Document) -> Result<HostVersions, ParseError> {
        let server_selector = selector(SERVER_ENTRY);
        let host_selector = selector(HOST_LABEL);
        let status_selector = selector(STATUS_BLOCK);

        let html = document.html();
        let mut versions = HostVersions::new();

        for server in html.select(&server_selector) {
            let host = text_of(server, &host_selector);
            let host = host.trim();
            if host.is_empty() {
                debug!("Skipping entry without host label on {}", document.url());
                continue;
            }

            let status = text_of(server, &status_selector);
            let Some(candidate) = self.markers.version_candidate(&status) else {
                warn!("No status marker for {} on {}", host, document.url());
                return Err(ParseError::VersionFieldNotFound {
                    host: host.to_string(),
                });
            };

            let version = parse_listed_version(candidate.trim())?;
            versions.insert(host.to_string(), version);
        }

        debug!("Parsed {} entries from {}", versions.len(), document.url());
        Ok(versions)
    }

    /// Fetches `url` and parses it as a listing page.
    pub async fn fetch(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
    ) -> Result<HostVersions, PageError> {
        let document = fetcher.fetch(url).await?;
        Ok(self.parse(&document)?)
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Concatenated text of every element under `root` matching `selector`
fn text_of(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector)
        .flat_map(|element| element.text())
        .collect()
}
