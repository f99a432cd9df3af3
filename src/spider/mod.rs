//! Source spiders and the download engine: source selection, spider trait, shared client, and the
//! index / pagination / orchestration steps.

mod client;
mod error;

pub mod download;
pub mod extract;
pub mod filter;
pub mod index;
pub mod paginator;
pub mod profile;
pub mod qq;
pub mod shuhaige;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpClient, HttpClientBuilder, PageFetcher, Transport};
pub use download::{download_book, download_to};
pub use error::SpiderError;
pub use extract::ChapterPage;
pub use profile::SourceProfile;

use crate::model::BookIndex;

/// Supported book source. Used for dispatch and for the --source option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// QQ Reading, book.qq.com.
    Qq,
    /// Shuhaige, www.shuhaige.net.
    Shuhaige,
}

impl Source {
    /// Parse a source name (case-insensitive). Accepts short aliases.
    pub fn from_name(s: &str) -> Option<Source> {
        match s.trim().to_lowercase().as_str() {
            "qq" | "book.qq.com" => Some(Source::Qq),
            "shuhaige" | "shg" | "shuhaige.net" => Some(Source::Shuhaige),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Source::Qq => "qq",
            Source::Shuhaige => "shuhaige",
        }
    }

    /// The spider implementing this source.
    pub fn spider(self) -> Box<dyn Spider> {
        match self {
            Source::Qq => Box::new(qq::QqSpider),
            Source::Shuhaige => Box::new(shuhaige::ShuhaigeSpider),
        }
    }
}

/// Options for a download run: progress callback, cancellation, chapter range, page bound.
#[derive(Default)]
pub struct DownloadOptions<'a> {
    /// Called after each chapter with (done, total).
    pub progress: Option<&'a dyn Fn(u32, u32)>,
    /// Checked before every page fetch; returning true aborts the download.
    pub cancel_check: Option<&'a dyn Fn() -> bool>,
    /// 1-based inclusive positions in ascending chapter id order.
    pub chapter_range: Option<(u32, u32)>,
    /// Upper bound on pages per chapter. None follows the continuation marker indefinitely.
    pub max_pages: Option<u32>,
}

/// Trait implemented by per-source spiders (QQ Reading, Shuhaige).
///
/// A spider supplies its [SourceProfile]; the default extraction drives the generic extractor
/// with it. Sources with markup quirks override the extraction methods.
pub trait Spider {
    fn profile(&self) -> &SourceProfile;

    fn extract_book_index(&self, html: &str) -> Result<BookIndex, SpiderError> {
        extract::book_index(html, self.profile())
    }

    fn extract_chapter_page(&self, html: &str) -> Result<ChapterPage, SpiderError> {
        extract::chapter_page(html, self.profile())
    }
}
