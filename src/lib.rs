//! novelspider: CLI spider for serialized novels on book.qq.com and shuhaige.net, outputting Markdown.

pub mod cli;
pub mod config;
pub mod formats;
pub mod logging;
pub mod model;
pub mod spider;

// Re-exports for CLI and consumers.
pub use formats::{write_json, write_markdown, FileSink, FormatError, OutputFormat, OutputSink};
pub use model::{BookIndex, ChapterContent, ChapterId, OutputDocument, RenderedChapter};
pub use spider::{
    download_book, download_to, DownloadOptions, HttpClient, HttpClientBuilder, Source, Spider,
    SpiderError,
};
