//! Point lookups against the version cache

use semver::Version;
use tracing::{debug, info};

use crate::watcher::Watcher;
use crate::watcher::error::LookupError;

impl Watcher {
    /// Returns the advertised version of `host`.
    ///
    /// A cached host is answered without touching the network. On a miss the
    /// site's search page for `host` is scraped and every entry it lists is
    /// merged into the cache. The exact host is then re-checked, and as a last
    /// resort the first cached host containing `host` is used.
    pub async fn version_by_server(&self, host: &str) -> Result<Version, LookupError> {
        if let Some(version) = self.inner.cache.get(host) {
            debug!("Cache hit for {}: {}", host, version);
            return Ok(version);
        }

        let url = self.inner.urls.search(host);
        info!("Cache miss for {}, searching {}", host, url);
        let found = self
            .inner
            .parser
            .fetch(self.inner.fetcher.as_ref(), &url)
            .await?;

        if found.is_empty() {
            return Err(LookupError::HostNotFound(host.to_string()));
        }
        self.inner.cache.merge(found);

        if let Some(version) = self.inner.cache.get(host) {
            return Ok(version);
        }

        self.inner
            .cache
            .find_containing(host)
            .inspect(|version| debug!("Substring match for {}: {}", host, version))
            .ok_or_else(|| LookupError::ServerNotFound(host.to_string()))
    }
}
