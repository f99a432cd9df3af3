//! Markup extraction: book index (title + chapter list) and chapter pages (title, blocks, continuation).

use crate::model::{BookIndex, ChapterId, IndexEntry};
use crate::spider::profile::{EntryTitle, SourceProfile, TitleRule};
use crate::spider::SpiderError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn digit_run() -> &'static Regex {
    DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").expect("compile DIGIT_RUN"))
}

/// Parse a CSS selector or return a selector error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, SpiderError> {
    Selector::parse(sel).map_err(|e| SpiderError::Selector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Fields read from one chapter page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterPage {
    pub title: Option<String>,
    pub blocks: Vec<String>,
    /// The page carried the source's "continue on next page" marker.
    pub has_more: bool,
}

/// Chapter id from a chapter link: the second run of digits in the href.
///
/// Source links look like `/{book_id}/{chapter_id}.html` or `//host/book-read/{book_id}/{chapter_id}`,
/// so the first run is the book id. Returns None when the href has fewer than two runs.
pub fn chapter_id_from_href(href: &str) -> Option<ChapterId> {
    digit_run()
        .find_iter(href)
        .nth(1)?
        .as_str()
        .parse()
        .ok()
        .map(ChapterId)
}

/// True for display-suppressed elements: `style` containing `display:none` (any spacing/case) or a `hidden` attribute.
fn is_hidden(el: ElementRef<'_>) -> bool {
    let v = el.value();
    if v.attr("hidden").is_some() {
        return true;
    }
    v.attr("style")
        .map(|style| {
            style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
                .contains("display:none")
        })
        .unwrap_or(false)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn book_title(doc: &Html, rule: TitleRule) -> Result<Option<String>, SpiderError> {
    let title = match rule {
        TitleRule::MetaContent(sel) => doc
            .select(&parse_selector(sel)?)
            .next()
            .and_then(|e| e.value().attr("content"))
            .map(|s| s.trim().to_string()),
        TitleRule::Text(sel) => doc.select(&parse_selector(sel)?).next().map(element_text),
    };
    Ok(title.filter(|s| !s.is_empty()))
}

fn entry_title(a: ElementRef<'_>, rule: EntryTitle) -> String {
    match rule {
        EntryTitle::Attr(name) => a
            .value()
            .attr(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| element_text(a)),
        EntryTitle::Text => element_text(a),
    }
}

/// Book title and chapter list from a landing page. Hidden chapter-list groups are skipped.
///
/// A page with no chapter-list group at all is an extraction error. A missing title is not:
/// the index carries an empty title and the caller decides.
pub fn book_index(html: &str, profile: &SourceProfile) -> Result<BookIndex, SpiderError> {
    let doc = Html::parse_document(html);

    let title = book_title(&doc, profile.book_title)?.unwrap_or_else(|| {
        warn!(source = profile.name, "book title not found on index page");
        String::new()
    });

    let group_sel = parse_selector(profile.chapter_groups)?;
    let entry_sel = parse_selector(profile.chapter_entry)?;
    let groups: Vec<ElementRef<'_>> = doc.select(&group_sel).collect();
    if groups.is_empty() {
        return Err(SpiderError::Extraction {
            field: format!("chapter list ({})", profile.chapter_groups),
            context: format!("{} index page", profile.name),
        });
    }

    let mut chapters = Vec::new();
    for group in groups {
        if is_hidden(group) {
            debug!(source = profile.name, "skipping hidden chapter group");
            continue;
        }
        for a in group.select(&entry_sel) {
            let href = match a.value().attr("href") {
                Some(h) => h,
                None => continue,
            };
            let id = match chapter_id_from_href(href) {
                Some(id) => id,
                None => {
                    warn!(href, "chapter link carries no chapter id. Skipped.");
                    continue;
                }
            };
            chapters.push(IndexEntry {
                title: entry_title(a, profile.entry_title),
                id,
            });
        }
    }

    Ok(BookIndex { title, chapters })
}

/// Text of the first element under `selector`, if any (used for subtitles / epigraphs).
pub fn first_text(doc: &Html, selector: &str) -> Result<Option<String>, SpiderError> {
    Ok(doc
        .select(&parse_selector(selector)?)
        .next()
        .map(|e| e.text().collect::<String>()))
}

/// Chapter page fields from an already-parsed document. See [chapter_page].
pub fn chapter_page_doc(doc: &Html, profile: &SourceProfile) -> Result<ChapterPage, SpiderError> {
    let mut title = None;
    for sel in profile.chapter_headings {
        if let Some(h) = doc.select(&parse_selector(sel)?).next() {
            title = Some(element_text(h));
            break;
        }
    }

    let container_sel = parse_selector(profile.content_container)?;
    let paragraph_sel = parse_selector(profile.paragraph)?;
    let Some(container) = doc.select(&container_sel).next() else {
        debug!(
            source = profile.name,
            container = profile.content_container,
            "content container missing"
        );
        return Ok(ChapterPage {
            title,
            blocks: Vec::new(),
            has_more: false,
        });
    };

    let mut blocks = Vec::new();
    let mut has_more = false;
    for p in container.select(&paragraph_sel) {
        let text = p.text().collect::<String>();
        if profile
            .next_page_marker
            .is_some_and(|marker| text.contains(marker))
        {
            has_more = true;
            continue;
        }
        blocks.push(text);
    }

    Ok(ChapterPage {
        title,
        blocks,
        has_more,
    })
}

/// Chapter title, paragraph blocks and continuation signal from one chapter page.
///
/// Headings are tried in profile order. A missing content container is not an error: it yields
/// no blocks. Paragraph text is kept untrimmed (sources indent with full-width spaces).
/// A block carrying the next-page marker sets `has_more` and is not returned as content.
pub fn chapter_page(html: &str, profile: &SourceProfile) -> Result<ChapterPage, SpiderError> {
    chapter_page_doc(&Html::parse_document(html), profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spider::profile::{QQ, SHUHAIGE};

    const QQ_INDEX: &str = r#"<html><body>
<h1 class="book-title"> 测试之书 </h1>
<ul class="book-dir" style="display: none;">
  <li><a href="//book.qq.com/book-read/100/900" title="隐藏章节">隐藏章节</a></li>
</ul>
<ul class="book-dir">
  <li><a href="//book.qq.com/book-read/100/3" title="第三章 风起">三</a></li>
  <li><a href="//book.qq.com/book-read/100/1" title="第一章 开端">一</a></li>
</ul>
</body></html>"#;

    const SHUHAIGE_INDEX: &str = r#"<html><head>
<meta property="og:novel:book_name" content="书海之书"/>
</head><body>
<div id="list"><dl>
<dt>最新章节</dt>
<dd><a href="/777/5002.html">第二章</a></dd>
<dd><a href="/777/5001.html">第一章</a></dd>
</dl></div>
</body></html>"#;

    #[test]
    fn chapter_id_is_second_digit_run() {
        assert_eq!(chapter_id_from_href("/777/5001.html"), Some(ChapterId(5001)));
        assert_eq!(
            chapter_id_from_href("//book.qq.com/book-read/100/3"),
            Some(ChapterId(3))
        );
        assert_eq!(
            chapter_id_from_href("/book/12/chapter/34/page/56"),
            Some(ChapterId(34))
        );
    }

    #[test]
    fn chapter_id_requires_two_digit_runs() {
        assert_eq!(chapter_id_from_href("/777/index.html"), None);
        assert_eq!(chapter_id_from_href("javascript:void(0)"), None);
    }

    #[test]
    fn qq_index_skips_hidden_group() -> Result<(), SpiderError> {
        let index = book_index(QQ_INDEX, &QQ)?;
        assert_eq!(index.title, "测试之书");
        let ids: Vec<u64> = index.chapters.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(index.chapters[0].title, "第三章 风起");
        assert!(index.chapters.iter().all(|c| c.title != "隐藏章节"));
        Ok(())
    }

    #[test]
    fn hidden_attribute_and_compact_style_are_hidden() -> Result<(), SpiderError> {
        let html = r#"<h1 class="book-title">B</h1>
<ul class="book-dir" hidden><li><a href="/1/10" title="a">a</a></li></ul>
<ul class="book-dir" style="DISPLAY:NONE"><li><a href="/1/11" title="b">b</a></li></ul>
<ul class="book-dir" style="color: red"><li><a href="/1/12" title="c">c</a></li></ul>"#;
        let index = book_index(html, &QQ)?;
        assert_eq!(index.chapters.len(), 1);
        assert_eq!(index.chapters[0].id, ChapterId(12));
        Ok(())
    }

    #[test]
    fn shuhaige_index_title_from_meta_and_text_titles() -> Result<(), SpiderError> {
        let index = book_index(SHUHAIGE_INDEX, &SHUHAIGE)?;
        assert_eq!(index.title, "书海之书");
        assert_eq!(
            index.chapters,
            vec![
                IndexEntry {
                    title: "第二章".to_string(),
                    id: ChapterId(5002)
                },
                IndexEntry {
                    title: "第一章".to_string(),
                    id: ChapterId(5001)
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_chapter_list_is_extraction_error() {
        let result = book_index("<html><body><p>gone</p></body></html>", &SHUHAIGE);
        assert!(matches!(result, Err(SpiderError::Extraction { .. })));
    }

    #[test]
    fn missing_title_yields_empty_title() -> Result<(), SpiderError> {
        let html = r#"<div id="list"><dd><a href="/1/2.html">c</a></dd></div>"#;
        let index = book_index(html, &SHUHAIGE)?;
        assert_eq!(index.title, "");
        assert_eq!(index.chapters.len(), 1);
        Ok(())
    }

    #[test]
    fn entries_without_id_are_skipped() -> Result<(), SpiderError> {
        let html = r#"<div id="list">
<dd><a href="/1/2.html">ok</a></dd>
<dd><a href="/about.html">no id</a></dd>
<dd><a>no href</a></dd>
</div>"#;
        let index = book_index(html, &SHUHAIGE)?;
        assert_eq!(index.chapters.len(), 1);
        assert_eq!(index.chapters[0].title, "ok");
        Ok(())
    }

    #[test]
    fn shuhaige_page_consumes_continuation_marker() -> Result<(), SpiderError> {
        let html = r#"<div class="bookname"><h1>第一章 开端</h1></div>
<div id="content">
<p>　　第一段</p>
<p>请大家收藏：www.shuhaige.net</p>
<p>本章未完，请点击下一页继续阅读</p>
</div>"#;
        let page = chapter_page(html, &SHUHAIGE)?;
        assert_eq!(page.title.as_deref(), Some("第一章 开端"));
        assert_eq!(
            page.blocks,
            vec!["　　第一段".to_string(), "请大家收藏：www.shuhaige.net".to_string()]
        );
        assert!(page.has_more);
        Ok(())
    }

    #[test]
    fn last_page_has_no_continuation() -> Result<(), SpiderError> {
        let html = r#"<div class="bookname"><h1>第一章 开端</h1></div>
<div id="content"><p>结尾</p></div>"#;
        let page = chapter_page(html, &SHUHAIGE)?;
        assert!(!page.has_more);
        assert_eq!(page.blocks, vec!["结尾".to_string()]);
        Ok(())
    }

    #[test]
    fn heading_falls_back_to_second_selector() -> Result<(), SpiderError> {
        let html = r#"<div id="article"><h2>序章</h2><p>text</p></div>"#;
        let page = chapter_page(html, &QQ)?;
        assert_eq!(page.title.as_deref(), Some("序章"));

        let both = r#"<div id="article"><h2>second</h2><h1>first</h1></div>"#;
        assert_eq!(chapter_page(both, &QQ)?.title.as_deref(), Some("first"));
        Ok(())
    }

    #[test]
    fn missing_container_yields_empty_page() -> Result<(), SpiderError> {
        let page = chapter_page("<html><body><p>stray</p></body></html>", &QQ)?;
        assert_eq!(page, ChapterPage::default());
        Ok(())
    }

    #[test]
    fn first_text_reads_nested_span() -> Result<(), SpiderError> {
        let doc = Html::parse_document(
            r#"<div id="article"><subHead><span>题记</span></subHead></div>"#,
        );
        assert_eq!(
            first_text(&doc, "div#article subhead span")?.as_deref(),
            Some("题记")
        );
        assert_eq!(first_text(&doc, "div#article em")?, None);
        Ok(())
    }

    #[test]
    fn invalid_selector_is_reported() {
        assert!(matches!(
            parse_selector("div[["),
            Err(SpiderError::Selector { .. })
        ));
    }
}
