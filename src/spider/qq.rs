//! QQ Reading (book.qq.com) spider.
//!
//! Chapter list: `ul.book-dir` groups, some suppressed with `display: none`. Chapter pages are
//! never split. Some chapters open with an epigraph in a `subHead` element, kept as the first block.

use crate::spider::extract::{self, ChapterPage};
use crate::spider::profile::{SourceProfile, QQ};
use crate::spider::{Spider, SpiderError};
use scraper::Html;

#[derive(Debug, Clone, Copy, Default)]
pub struct QqSpider;

impl Spider for QqSpider {
    fn profile(&self) -> &SourceProfile {
        &QQ
    }

    fn extract_chapter_page(&self, html: &str) -> Result<ChapterPage, SpiderError> {
        let doc = Html::parse_document(html);
        let mut page = extract::chapter_page_doc(&doc, self.profile())?;
        if let Some(sel) = self.profile().subtitle {
            if let Some(subtitle) = extract::first_text(&doc, sel)? {
                page.blocks.insert(0, subtitle);
            }
        }
        Ok(page)
    }
}
