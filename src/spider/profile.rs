//! Per-source URL templates, selectors, and filter rules.
//!
//! Templates use `{book_id}`, `{chapter_id}` and `{page}` placeholders.

use crate::model::ChapterId;

/// Where the book title lives on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// `content` attribute of the first element matching the selector (e.g. an og: meta tag).
    MetaContent(&'static str),
    /// Text of the first element matching the selector.
    Text(&'static str),
}

/// How a chapter-list anchor yields its chapter title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTitle {
    /// The named attribute, falling back to the anchor text when absent.
    Attr(&'static str),
    Text,
}

/// Static configuration for one book source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub name: &'static str,
    pub index_url: &'static str,
    pub chapter_url: &'static str,
    /// URL of page 2 and later. `None` when the source never paginates chapters.
    pub chapter_page_url: Option<&'static str>,
    pub book_title: TitleRule,
    /// Chapter-list groups (some may be hidden).
    pub chapter_groups: &'static str,
    /// Anchors inside one group.
    pub chapter_entry: &'static str,
    pub entry_title: EntryTitle,
    /// Tried in order; first match wins.
    pub chapter_headings: &'static [&'static str],
    /// Epigraph shown above the chapter text, kept as its first block when present.
    pub subtitle: Option<&'static str>,
    pub content_container: &'static str,
    /// Paragraph blocks, relative to the container.
    pub paragraph: &'static str,
    /// Block text announcing that the chapter continues on another page.
    pub next_page_marker: Option<&'static str>,
    /// Blocks containing any of these are dropped.
    pub boilerplate: &'static [&'static str],
    pub retry_status: Option<u16>,
}

impl SourceProfile {
    pub fn index_url_for(&self, book_id: u64) -> String {
        self.index_url.replace("{book_id}", &book_id.to_string())
    }

    /// URL of `page` (1-based) of a chapter. `None` past page 1 when the source has no page template.
    pub fn page_url_for(&self, book_id: u64, chapter_id: ChapterId, page: u32) -> Option<String> {
        let template = if page <= 1 {
            self.chapter_url
        } else {
            self.chapter_page_url?
        };
        Some(
            template
                .replace("{book_id}", &book_id.to_string())
                .replace("{chapter_id}", &chapter_id.to_string())
                .replace("{page}", &page.to_string()),
        )
    }
}

pub const QQ: SourceProfile = SourceProfile {
    name: "qq",
    index_url: "https://book.qq.com/book-chapter/{book_id}/",
    chapter_url: "https://book.qq.com/book-read/{book_id}/{chapter_id}",
    chapter_page_url: None,
    book_title: TitleRule::Text("h1.book-title"),
    chapter_groups: "ul.book-dir",
    chapter_entry: "li a",
    entry_title: EntryTitle::Attr("title"),
    chapter_headings: &["div#article h1", "div#article h2"],
    subtitle: Some("div#article subhead span"),
    content_container: "div#article",
    paragraph: "p",
    next_page_marker: None,
    boilerplate: &[],
    retry_status: Some(403),
};

pub const SHUHAIGE: SourceProfile = SourceProfile {
    name: "shuhaige",
    index_url: "https://www.shuhaige.net/{book_id}/",
    chapter_url: "https://www.shuhaige.net/{book_id}/{chapter_id}.html",
    chapter_page_url: Some("https://www.shuhaige.net/{book_id}/{chapter_id}_{page}.html"),
    book_title: TitleRule::MetaContent("meta[property=\"og:novel:book_name\"]"),
    chapter_groups: "div#list",
    chapter_entry: "dd a",
    entry_title: EntryTitle::Text,
    chapter_headings: &["div.bookname h1"],
    subtitle: None,
    content_container: "div#content",
    paragraph: "p",
    next_page_marker: Some("请点击下一页继续阅读"),
    boilerplate: &["请大家收藏："],
    retry_status: Some(403),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuhaige_page_urls() {
        assert_eq!(
            SHUHAIGE.page_url_for(123, ChapterId(456), 1).as_deref(),
            Some("https://www.shuhaige.net/123/456.html")
        );
        assert_eq!(
            SHUHAIGE.page_url_for(123, ChapterId(456), 3).as_deref(),
            Some("https://www.shuhaige.net/123/456_3.html")
        );
    }

    #[test]
    fn qq_has_no_continuation_pages() {
        assert_eq!(
            QQ.page_url_for(9, ChapterId(2), 1).as_deref(),
            Some("https://book.qq.com/book-read/9/2")
        );
        assert_eq!(QQ.page_url_for(9, ChapterId(2), 2), None);
    }

    #[test]
    fn only_qq_has_subtitle() {
        assert_eq!(QQ.subtitle, Some("div#article subhead span"));
        assert_eq!(SHUHAIGE.subtitle, None);
    }

    #[test]
    fn index_urls() {
        assert_eq!(
            QQ.index_url_for(42),
            "https://book.qq.com/book-chapter/42/"
        );
        assert_eq!(SHUHAIGE.index_url_for(42), "https://www.shuhaige.net/42/");
    }
}
