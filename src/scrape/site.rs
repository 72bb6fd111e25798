//! URL layout of the listing site

use reqwest::Url;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        Ok(Self { base })
    }

    /// `<base>/servers`
    pub fn root(&self) -> String {
        self.with_segments(&["servers"])
    }

    /// `<base>/servers/page/<page>`
    pub fn page(&self, page: u32) -> String {
        self.with_segments(&["servers", "page", &page.to_string()])
    }

    /// `<base>/servers/search/<host>`, with `host` encoded as one segment
    pub fn search(&self, host: &str) -> String {
        self.with_segments(&["servers", "search", host])
    }

    fn with_segments(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }
}
