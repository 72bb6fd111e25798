//! Background refresh of the version cache

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scrape::error::FetchError;
use crate::scrape::fetcher::PageFetcher;
use crate::scrape::listing::ListingParser;
use crate::scrape::pagination::resolve_last_page;
use crate::scrape::site::SiteUrls;
use crate::watcher::cache::VersionCache;

/// Outcome of one refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub pages_total: u32,
    pub pages_failed: u32,
    pub entries_merged: usize,
    pub evicted: usize,
    /// The pass stopped early because cancellation was requested
    pub cancelled: bool,
}

/// Walks every listing page and merges the results into `cache`.
///
/// Pages are fetched one at a time. A page that fails to fetch or parse is
/// logged and skipped; only a failure to load the listing root aborts the
/// pass. Cancellation is checked before each page, so at most the page
/// already in flight completes after `cancel` fires.
pub async fn refresh_once(
    fetcher: &dyn PageFetcher,
    parser: &ListingParser,
    cache: &VersionCache,
    urls: &SiteUrls,
    cancel: &CancellationToken,
) -> Result<RefreshSummary, FetchError> {
    let root = urls.root();
    let last = resolve_last_page(fetcher, &root).await?;
    if last.is_none() {
        debug!("No pagination found on {}, scanning root only", root);
    }

    let cycle = cache.begin_cycle();
    let mut summary = RefreshSummary {
        pages_total: last.unwrap_or(1),
        ..RefreshSummary::default()
    };

    // Page URLs are built one at a time; `last` comes from the remote site.
    for page in 1..=summary.pages_total {
        if cancel.is_cancelled() {
            info!(
                "Refresh cycle {} cancelled after {} of {} pages",
                cycle,
                page - 1,
                summary.pages_total
            );
            summary.cancelled = true;
            return Ok(summary);
        }

        let url = match last {
            Some(_) => urls.page(page),
            None => root.clone(),
        };
        match parser.fetch(fetcher, &url).await {
            Ok(versions) => summary.entries_merged += cache.merge(versions),
            Err(e) => {
                warn!("failed server versions for page {} err {}", page, e);
                summary.pages_failed += 1;
            }
        }
    }

    if summary.pages_failed == 0 {
        summary.evicted = cache.evict_stale(cycle);
    }

    Ok(summary)
}
