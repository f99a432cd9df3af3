//! Whole-book download: index, ordered chapters, document assembly, hand-off to the writer.

use crate::formats::OutputSink;
use crate::model::{ChapterId, OutputDocument, RenderedChapter};
use crate::spider::index::resolve_book_index;
use crate::spider::paginator::fetch_chapter;
use crate::spider::{DownloadOptions, PageFetcher, Spider, SpiderError, Transport};
use std::path::PathBuf;
use tracing::{info, warn};

/// Keep the ids at 1-based positions `from..=to` of the sorted list.
fn select_range(ids: Vec<ChapterId>, range: Option<(u32, u32)>) -> Vec<ChapterId> {
    match range {
        None => ids,
        Some((from, to)) => ids
            .into_iter()
            .enumerate()
            .filter(|(i, _)| {
                let pos = *i as u32 + 1;
                pos >= from && pos <= to
            })
            .map(|(_, id)| id)
            .collect(),
    }
}

/// Download `book_id` into an in-memory document, chapters in ascending id order.
///
/// Fails before any chapter is fetched when the index cannot be resolved or lists no
/// chapters. After that, a chapter that cannot be retrieved is rendered as an empty section
/// under its chapter-list title; only cancellation aborts the book.
pub fn download_book(
    spider: &dyn Spider,
    transport: &mut dyn Transport,
    book_id: u64,
    options: &DownloadOptions<'_>,
) -> Result<OutputDocument, SpiderError> {
    let mut fetcher = PageFetcher::new(transport, spider.profile().retry_status);

    let index = resolve_book_index(spider, &mut fetcher, book_id)?;
    if index.chapters.is_empty() {
        return Err(SpiderError::EmptyChapterList { book_id });
    }

    let sorted = index.sorted_ids();
    let listed = sorted.len();
    let ids = select_range(sorted, options.chapter_range);
    if ids.is_empty() {
        if let Some((from, to)) = options.chapter_range {
            return Err(SpiderError::EmptyChapterRange {
                book_id,
                from,
                to,
                listed,
            });
        }
    }
    let total = ids.len() as u32;
    info!("{}: downloading {} chapter(s)", index.title, total);

    let mut doc = OutputDocument::new(book_id, index.title.clone());
    for (n, id) in ids.into_iter().enumerate() {
        let content = fetch_chapter(spider, &mut fetcher, book_id, id, options)?;
        let title = content
            .title
            .filter(|t| !t.is_empty())
            .or_else(|| index.title_for(id).map(String::from))
            .unwrap_or_else(|| format!("Chapter {}", id));
        if content.blocks.is_empty() {
            warn!("Chapter {} ({}): no content retrieved. Rendered empty.", id, title);
        }
        info!("{} downloaded", title);
        doc.push(RenderedChapter {
            id,
            title,
            blocks: content.blocks,
        });
        if let Some(p) = options.progress {
            p(n as u32 + 1, total);
        }
    }

    Ok(doc)
}

/// [download_book], then write the finished document to `sink`. Returns the written path.
///
/// Nothing reaches the sink unless every chapter has been processed.
pub fn download_to(
    spider: &dyn Spider,
    transport: &mut dyn Transport,
    book_id: u64,
    options: &DownloadOptions<'_>,
    sink: &mut dyn OutputSink,
) -> Result<PathBuf, SpiderError> {
    let doc = download_book(spider, transport, book_id, options)?;
    let path = sink.write(&doc)?;
    info!("Wrote {}", path.display());
    Ok(path)
}
