//! Shuhaige (www.shuhaige.net) spider.
//!
//! Chapters are split across `{chapter_id}_{page}.html` pages; every page but the last ends with a
//! "click next page" paragraph. Pages carry a "please bookmark us" line that is filtered out.

use crate::spider::profile::{SourceProfile, SHUHAIGE};
use crate::spider::Spider;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShuhaigeSpider;

impl Spider for ShuhaigeSpider {
    fn profile(&self) -> &SourceProfile {
        &SHUHAIGE
    }
}
