//! Pagination discovery for the server listing

use scraper::Selector;
use tracing::debug;

use crate::scrape::error::FetchError;
use crate::scrape::fetcher::{Document, PageFetcher};

const PAGINATION_LINK: &str = ".pagination li a";

/// Returns the highest numeric label in the pagination control.
///
/// Labels like "next" are ignored. `None` means the listing shows no page
/// numbers at all, which callers treat as a single-page listing.
pub fn last_page(document: &Document) -> Option<u32> {
    let selector = Selector::parse(PAGINATION_LINK).ok()?;
    let html = document.html();
    html.select(&selector)
        .filter_map(|link| link.text().collect::<String>().trim().parse::<u32>().ok())
        .filter(|page| *page > 0)
        .max()
}

/// Fetches the listing root and resolves its last page number.
pub async fn resolve_last_page(
    fetcher: &dyn PageFetcher,
    root_url: &str,
) -> Result<Option<u32>, FetchError> {
    let document = fetcher.fetch(root_url).await?;
    let last = last_page(&document);
    debug!("Resolved last page of {} as {:?}", root_url, last);
    Ok(last)
}
