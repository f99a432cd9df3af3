//! Page-by-page retrieval of one chapter.

use crate::model::{ChapterContent, ChapterId};
use crate::spider::filter::filter_blocks;
use crate::spider::{DownloadOptions, PageFetcher, Spider, SpiderError};
use tracing::{debug, warn};

/// Fetch every page of one chapter and accumulate its filtered blocks.
///
/// Page 1 is the bare chapter URL; later pages use the source's page template. The loop follows
/// the continuation marker and stops at the first page without it. A failed page (transport error
/// or non-200 after the retry) ends the chapter with whatever was accumulated so far. The first
/// page that has a title sets the chapter title.
///
/// Only cancellation is returned as an error.
pub fn fetch_chapter(
    spider: &dyn Spider,
    fetcher: &mut PageFetcher<'_>,
    book_id: u64,
    chapter_id: ChapterId,
    options: &DownloadOptions<'_>,
) -> Result<ChapterContent, SpiderError> {
    let profile = spider.profile();
    let mut content = ChapterContent::default();
    let mut page: u32 = 1;

    loop {
        if options.cancel_check.map(|c| c()).unwrap_or(false) {
            return Err(SpiderError::Cancelled);
        }

        let url = match profile.page_url_for(book_id, chapter_id, page) {
            Some(u) => u,
            None => {
                warn!(
                    "Chapter {}: page {} signalled but {} has no continuation pages.",
                    chapter_id, page, profile.name
                );
                break;
            }
        };

        let result = match fetcher.fetch(&url) {
            Ok(r) => r,
            Err(e) => {
                warn!("Chapter {}: {}. Stopped at page {}.", chapter_id, e, page);
                break;
            }
        };
        let html = match result.body {
            Some(body) if result.status_code == 200 => body,
            _ => {
                let e = SpiderError::HttpStatus {
                    status: result.status_code,
                    url,
                };
                warn!("Chapter {}: {}. Stopped at page {}.", chapter_id, e, page);
                break;
            }
        };

        let extracted = match spider.extract_chapter_page(&html) {
            Ok(p) => p,
            Err(e) => {
                warn!("Chapter {}: {}. Stopped at page {}.", chapter_id, e, page);
                break;
            }
        };
        debug!(
            chapter = %chapter_id,
            page,
            blocks = extracted.blocks.len(),
            has_more = extracted.has_more,
            "page extracted"
        );

        if content.title.is_none() {
            content.title = extracted.title;
        }
        content
            .blocks
            .extend(filter_blocks(extracted.blocks, profile));

        if !extracted.has_more {
            break;
        }
        if options.max_pages.is_some_and(|max| page >= max) {
            warn!(
                "Chapter {}: still signalling more pages after {} pages. Stopped.",
                chapter_id, page
            );
            break;
        }
        page += 1;
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchResult;
    use crate::spider::qq::QqSpider;
    use crate::spider::shuhaige::ShuhaigeSpider;
    use crate::spider::testing::ScriptedTransport;

    const P1: &str = "https://www.shuhaige.net/1/10.html";
    const P2: &str = "https://www.shuhaige.net/1/10_2.html";
    const P3: &str = "https://www.shuhaige.net/1/10_3.html";

    fn shuhaige_page(title: &str, paragraphs: &[&str], more: bool) -> String {
        let mut body = String::new();
        for p in paragraphs {
            body.push_str(&format!("<p>{}</p>", p));
        }
        if more {
            body.push_str("<p>本章未完，请点击下一页继续阅读</p>");
        }
        format!(
            r#"<html><body><div class="bookname"><h1>{}</h1></div><div id="content">{}</div></body></html>"#,
            title, body
        )
    }

    fn run(
        transport: &mut ScriptedTransport,
        spider: &dyn Spider,
        book_id: u64,
        chapter: u64,
        options: &DownloadOptions<'_>,
    ) -> Result<ChapterContent, SpiderError> {
        let mut fetcher = PageFetcher::new(transport, spider.profile().retry_status);
        fetch_chapter(spider, &mut fetcher, book_id, ChapterId(chapter), options)
    }

    #[test]
    fn two_pages_concatenate_filtered_blocks() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new()
            .respond(
                P1,
                FetchResult::ok(shuhaige_page("第十章", &["一", "请大家收藏：书海阁", "二"], true)),
            )
            .respond(
                P2,
                FetchResult::ok(shuhaige_page("第十章", &["三", "请大家收藏：书海阁"], false)),
            );
        let content = run(&mut transport, &ShuhaigeSpider, 1, 10, &DownloadOptions::default())?;
        assert_eq!(content.title.as_deref(), Some("第十章"));
        assert_eq!(content.blocks, vec!["一", "二", "三"]);
        assert_eq!(transport.calls(), [P1, P2]);
        Ok(())
    }

    #[test]
    fn first_page_title_wins() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new()
            .respond(P1, FetchResult::ok(shuhaige_page("第十章 (1/2)", &["a"], true)))
            .respond(P2, FetchResult::ok(shuhaige_page("第十章 (2/2)", &["b"], false)));
        let content = run(&mut transport, &ShuhaigeSpider, 1, 10, &DownloadOptions::default())?;
        assert_eq!(content.title.as_deref(), Some("第十章 (1/2)"));
        Ok(())
    }

    #[test]
    fn failed_later_page_keeps_accumulated_content() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new()
            .respond(P1, FetchResult::ok(shuhaige_page("第十章", &["一"], true)))
            .respond(P2, FetchResult::status(403))
            .respond(P2, FetchResult::status(403));
        let content = run(&mut transport, &ShuhaigeSpider, 1, 10, &DownloadOptions::default())?;
        assert_eq!(content.title.as_deref(), Some("第十章"));
        assert_eq!(content.blocks, vec!["一"]);
        assert_eq!(transport.calls(), [P1, P2, P2]);
        Ok(())
    }

    #[test]
    fn failed_first_page_yields_empty_chapter() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new().respond(P1, FetchResult::status(404));
        let content = run(&mut transport, &ShuhaigeSpider, 1, 10, &DownloadOptions::default())?;
        assert_eq!(content, ChapterContent::default());
        Ok(())
    }

    #[test]
    fn page_without_container_yields_empty_chapter() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new().respond(
            "https://book.qq.com/book-read/3/4",
            FetchResult::ok("<html><body><p>rate limited</p></body></html>"),
        );
        let content = run(&mut transport, &QqSpider, 3, 4, &DownloadOptions::default())?;
        assert_eq!(content.title, None);
        assert!(content.blocks.is_empty());
        assert_eq!(transport.calls().len(), 1);
        Ok(())
    }

    #[test]
    fn max_pages_bounds_runaway_continuation() -> Result<(), SpiderError> {
        let mut transport = ScriptedTransport::new()
            .respond(P1, FetchResult::ok(shuhaige_page("t", &["1"], true)))
            .respond(P2, FetchResult::ok(shuhaige_page("t", &["2"], true)))
            .respond(P3, FetchResult::ok(shuhaige_page("t", &["3"], true)));
        let options = DownloadOptions {
            max_pages: Some(2),
            ..Default::default()
        };
        let content = run(&mut transport, &ShuhaigeSpider, 1, 10, &options)?;
        assert_eq!(content.blocks, vec!["1", "2"]);
        assert_eq!(transport.calls(), [P1, P2]);
        Ok(())
    }

    #[test]
    fn cancellation_stops_before_fetching() {
        let mut transport = ScriptedTransport::new();
        let cancel = || true;
        let options = DownloadOptions {
            cancel_check: Some(&cancel),
            ..Default::default()
        };
        let result = run(&mut transport, &ShuhaigeSpider, 1, 10, &options);
        assert!(matches!(result, Err(SpiderError::Cancelled)));
        assert!(transport.calls().is_empty());
    }
}
