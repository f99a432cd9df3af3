//! Book index resolution: one landing-page fetch, then extraction.

use crate::model::BookIndex;
use crate::spider::{PageFetcher, Spider, SpiderError};
use tracing::{debug, info};

/// Fetch the landing page of `book_id` and extract its title and chapter list.
///
/// Any failure to obtain or parse the page (transport error, non-200 after the retry, no
/// chapter list in the markup) is a [SpiderError::BookIndex]: without an index nothing can be
/// downloaded. An empty chapter
/// list is returned as-is; the download loop decides that it is fatal.
pub fn resolve_book_index(
    spider: &dyn Spider,
    fetcher: &mut PageFetcher<'_>,
    book_id: u64,
) -> Result<BookIndex, SpiderError> {
    let url = spider.profile().index_url_for(book_id);
    let result = fetcher
        .fetch(&url)
        .map_err(|e| SpiderError::BookIndex {
            book_id,
            reason: e.to_string(),
        })?;
    let html = match result.body {
        Some(body) if result.status_code == 200 => body,
        _ => {
            return Err(SpiderError::BookIndex {
                book_id,
                reason: format!("HTTP {} when fetching: {}", result.status_code, url),
            })
        }
    };

    let index = spider
        .extract_book_index(&html)
        .map_err(|e| SpiderError::BookIndex {
            book_id,
            reason: e.to_string(),
        })?;
    debug!(book_id, chapters = index.chapters.len(), "index extracted");
    info!("{}: {} chapters listed", index.title, index.chapters.len());
    Ok(index)
}
