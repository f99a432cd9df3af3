//! Data model shared by the spiders, the download loop, and the output writers.
//!
//! Everything here lives for a single download: nothing is cached across runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source-assigned chapter identifier. Monotonic in release order, not necessarily sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub u64);

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a book's chapter list, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub id: ChapterId,
}

/// Book title plus chapter list, as read from the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookIndex {
    pub title: String,
    pub chapters: Vec<IndexEntry>,
}

impl BookIndex {
    /// Chapter ids in download order: ascending, each id once.
    pub fn sorted_ids(&self) -> Vec<ChapterId> {
        let mut ids: Vec<ChapterId> = self.chapters.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Title shown in the chapter list for `id`, if listed.
    pub fn title_for(&self, id: ChapterId) -> Option<&str> {
        self.chapters
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.as_str())
    }
}

/// Outcome of one GET. `body` is only kept for HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status_code: u16,
    pub body: Option<String>,
}

impl FetchResult {
    pub fn new(status_code: u16, body: Option<String>) -> Self {
        let body = if status_code == 200 { body } else { None };
        Self { status_code, body }
    }

    /// A 200 response with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, Some(body.into()))
    }

    /// A bodiless response with the given status.
    pub fn status(status_code: u16) -> Self {
        Self::new(status_code, None)
    }
}

/// Text of one chapter accumulated across all of its pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterContent {
    pub title: Option<String>,
    pub blocks: Vec<String>,
}

/// One chapter as it appears in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedChapter {
    pub id: ChapterId,
    pub title: String,
    pub blocks: Vec<String>,
}

impl RenderedChapter {
    /// `# {title}`, the blocks joined by newlines, then a blank-line separator.
    pub fn to_markdown(&self) -> String {
        format!("# {}\n{}\n\n", self.title, self.blocks.join("\n"))
    }
}

/// The whole book, in ascending chapter id order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub book_id: u64,
    pub title: String,
    pub chapters: Vec<RenderedChapter>,
}

impl OutputDocument {
    pub fn new(book_id: u64, title: impl Into<String>) -> Self {
        Self {
            book_id,
            title: title.into(),
            chapters: Vec::new(),
        }
    }

    pub fn push(&mut self, chapter: RenderedChapter) {
        self.chapters.push(chapter);
    }

    pub fn to_markdown(&self) -> String {
        self.chapters.iter().map(RenderedChapter::to_markdown).collect()
    }
}
