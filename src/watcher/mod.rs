//! Server version watcher
//!
//! Keeps a [`VersionCache`] fresh by periodically scraping every listing
//! page, and answers point lookups for a single host.
//!
//! # Modules
//!
//! - [`cache`]: Mutex-guarded host → version mapping with merge semantics
//! - [`refresh`]: One full refresh pass over the listing
//! - [`lookup`]: Cache read with on-miss search and substring fallback
//! - [`error`]: Lookup and lifecycle error types

pub mod cache;
pub mod error;
pub mod lookup;
pub mod refresh;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{ConfigError, WatcherConfig};
use crate::scrape::error::FetchError;
use crate::scrape::fetcher::{HttpFetcher, PageFetcher};
use crate::scrape::listing::ListingParser;
use crate::scrape::site::SiteUrls;
use crate::watcher::cache::VersionCache;
use crate::watcher::error::WatcherError;
use crate::watcher::refresh::{RefreshSummary, refresh_once};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Created,
    Running,
    Stopped,
}

/// Handle to the watcher. Clones share the same cache and lifecycle.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn PageFetcher>,
    parser: ListingParser,
    cache: VersionCache,
    urls: SiteUrls,
    state: Mutex<WatcherState>,
}

impl Watcher {
    /// Creates a watcher that scrapes over HTTP.
    pub fn new(config: &WatcherConfig) -> Result<Self, ConfigError> {
        Self::build(Arc::new(HttpFetcher::new(&config.fetch)), config)
    }

    /// Build a watcher with a custom fetcher
    pub fn build(
        fetcher: Arc<dyn PageFetcher>,
        config: &WatcherConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Inner {
                fetcher,
                parser: ListingParser::new(config.markers.clone()),
                cache: VersionCache::new(config.eviction),
                urls: SiteUrls::new(&config.base_url)?,
                state: Mutex::new(WatcherState::Created),
            }),
        })
    }

    pub fn state(&self) -> WatcherState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: WatcherState) {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn cache(&self) -> &VersionCache {
        &self.inner.cache
    }

    /// Spawns the background refresh task.
    ///
    /// The task refreshes once immediately, then every `interval`, until
    /// `cancel` fires. A watcher can only be started once.
    pub fn start(
        &self,
        cancel: CancellationToken,
        interval: Duration,
    ) -> Result<JoinHandle<()>, WatcherError> {
        if interval.is_zero() {
            return Err(WatcherError::ZeroInterval);
        }

        {
            let mut state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *state != WatcherState::Created {
                return Err(WatcherError::AlreadyStarted);
            }
            *state = WatcherState::Running;
        }

        info!("Starting version watcher with interval {:?}", interval);
        let watcher = self.clone();
        Ok(tokio::spawn(async move {
            watcher.run(cancel, interval).await;
        }))
    }

    async fn run(&self, cancel: CancellationToken, interval: Duration) {
        if !cancel.is_cancelled() {
            self.refresh(&cancel).await;
        }

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.refresh(&cancel).await,
            }
        }

        self.set_state(WatcherState::Stopped);
        info!("Version watcher stopped");
    }

    async fn refresh(&self, cancel: &CancellationToken) {
        match self.refresh_once(cancel).await {
            Ok(summary) => info!(
                "Refreshed {} pages ({} failed), merged {} entries, evicted {}, cache holds {}",
                summary.pages_total,
                summary.pages_failed,
                summary.entries_merged,
                summary.evicted,
                self.inner.cache.len()
            ),
            Err(e) => error!("update versions servers failed {}", e),
        }
    }

    /// Runs a single refresh pass over every listing page.
    pub async fn refresh_once(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RefreshSummary, FetchError> {
        let inner = &self.inner;
        refresh_once(
            inner.fetcher.as_ref(),
            &inner.parser,
            &inner.cache,
            &inner.urls,
            cancel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::fetcher::Document;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "http://listing.test";

    /// Serves fixed pages and counts every fetch
    struct StaticFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn single_page(host: &str, version: &str) -> Self {
            let page = format!(
                r#"<ul class="pagination"><li><a>1</a></li></ul>
                   <div class="servers-list"><div class="server"><div class="info">
                     <div class="ip"><div class="back-tooltip"><span>{}</span></div></div>
                     <div class="block">онлайн{}версия</div>
                   </div></div></div>"#,
                host, version
            );
            Self {
                pages: HashMap::from([
                    (format!("{}/servers", BASE), page.clone()),
                    (format!("{}/servers/page/1", BASE), page),
                ]),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Document::new(
                url,
                self.pages.get(url).cloned().unwrap_or_default(),
            ))
        }
    }

    fn config() -> WatcherConfig {
        WatcherConfig {
            base_url: BASE.to_string(),
            ..WatcherConfig::default()
        }
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition was not met in time");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let config = WatcherConfig {
            base_url: "::not a url".to_string(),
            ..WatcherConfig::default()
        };

        assert!(Watcher::new(&config).is_err());
    }

    #[tokio::test]
    async fn start_refreshes_immediately_and_stops_on_cancel() {
        let fetcher = Arc::new(StaticFetcher::single_page("play.example.com", "1.20.1"));
        let watcher = Watcher::build(fetcher.clone(), &config()).unwrap();
        assert_eq!(watcher.state(), WatcherState::Created);

        let cancel = CancellationToken::new();
        let handle = watcher
            .start(cancel.clone(), Duration::from_secs(3600))
            .unwrap();
        assert_eq!(watcher.state(), WatcherState::Running);

        wait_until(|| watcher.cache().get("play.example.com").is_some()).await;
        assert_eq!(
            watcher.cache().get("play.example.com"),
            Some(semver::Version::new(1, 20, 1))
        );

        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(watcher.state(), WatcherState::Stopped);
        // Root page + page 1, no tick before cancellation
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn start_refreshes_again_on_every_tick() {
        let fetcher = Arc::new(StaticFetcher::single_page("play.example.com", "1.20.1"));
        let watcher = Watcher::build(fetcher.clone(), &config()).unwrap();

        let cancel = CancellationToken::new();
        let handle = watcher
            .start(cancel.clone(), Duration::from_millis(10))
            .unwrap();

        wait_until(|| fetcher.calls() >= 6).await;
        cancel.cancel();
        handle.await.unwrap();

        let calls_after_stop = fetcher.calls();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.calls(), calls_after_stop);
    }

    #[tokio::test]
    async fn start_does_not_fetch_when_already_cancelled() {
        let fetcher = Arc::new(StaticFetcher::single_page("play.example.com", "1.20.1"));
        let watcher = Watcher::build(fetcher.clone(), &config()).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        watcher
            .start(cancel, Duration::from_secs(3600))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 0);
        assert_eq!(watcher.state(), WatcherState::Stopped);
    }

    #[tokio::test]
    async fn start_fails_when_called_twice() {
        let fetcher = Arc::new(StaticFetcher::single_page("play.example.com", "1.20.1"));
        let watcher = Watcher::build(fetcher, &config()).unwrap();
        let cancel = CancellationToken::new();

        let handle = watcher
            .start(cancel.clone(), Duration::from_secs(3600))
            .unwrap();
        let second = watcher.clone().start(cancel.clone(), Duration::from_secs(3600));

        assert!(matches!(second, Err(WatcherError::AlreadyStarted)));

        cancel.cancel();
        handle.await.unwrap();

        // Stopped watchers cannot be restarted either
        let restart = watcher.start(CancellationToken::new(), Duration::from_secs(3600));
        assert!(matches!(restart, Err(WatcherError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn start_rejects_zero_interval() {
        let fetcher = Arc::new(StaticFetcher::single_page("play.example.com", "1.20.1"));
        let watcher = Watcher::build(fetcher, &config()).unwrap();

        let result = watcher.start(CancellationToken::new(), Duration::ZERO);

        assert!(matches!(result, Err(WatcherError::ZeroInterval)));
        assert_eq!(watcher.state(), WatcherState::Created);
    }
}
