//! Shared error type for spiders.

use thiserror::Error;

/// Errors from fetching, extraction, index resolution, and the download loop.
#[derive(Debug, Error)]
pub enum SpiderError {
    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-200 status for a single page. Recovered locally; never ends a download.
    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    // Parsing
    #[error("Could not extract {field} from {context} (selector or page structure may have changed).")]
    Extraction { field: String, context: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    // Book level
    #[error("Could not resolve book {book_id}: {reason}")]
    BookIndex { book_id: u64, reason: String },

    #[error("Book {book_id} has no chapters (possibly removed or access restricted).")]
    EmptyChapterList { book_id: u64 },

    #[error("Book {book_id}: chapter range {from}-{to} selects none of its {listed} chapters.")]
    EmptyChapterRange {
        book_id: u64,
        from: u32,
        to: u32,
        listed: usize,
    },

    #[error("Download cancelled.")]
    Cancelled,

    // Hand-off to the writer
    #[error(transparent)]
    Output(#[from] crate::formats::FormatError),
}
