//! Output writers: Markdown (one `# heading` per chapter) and JSON.
//! Consumes the finished OutputDocument and writes one UTF-8 file.

use crate::model::OutputDocument;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

/// Errors from the format writers.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for a finished document. Returns where it was written.
pub trait OutputSink {
    fn write(&mut self, doc: &OutputDocument) -> Result<PathBuf, FormatError>;
}

/// Writes into `output_dir` as `{sanitized title}.{ext}`, or to an explicit path when set.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    path: Option<PathBuf>,
    format: OutputFormat,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            path: None,
            format,
        }
    }

    /// Write to exactly `path` instead of deriving a name from the book title.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Path the document for `book_id` / `title` would be written to.
    pub fn path_for(&self, book_id: u64, title: &str) -> PathBuf {
        match &self.path {
            Some(p) => p.clone(),
            None => self.output_dir.join(format!(
                "{}.{}",
                sanitize_file_stem(title, book_id),
                self.format.extension()
            )),
        }
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, doc: &OutputDocument) -> Result<PathBuf, FormatError> {
        let path = self.path_for(doc.book_id, &doc.title);
        match self.format {
            OutputFormat::Markdown => write_markdown(doc, &path)?,
            OutputFormat::Json => write_json(doc, &path)?,
        }
        Ok(path)
    }
}

/// File stem from a book title: path separators, reserved and control characters become `-`.
/// Non-ASCII titles are kept as-is. Falls back to `book-{id}` when nothing usable is left.
pub fn sanitize_file_stem(title: &str, book_id: u64) -> String {
    let mapped: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let stem = mapped.trim().trim_matches(|c| c == '.' || c == '-').trim();
    if stem.is_empty() {
        format!("book-{}", book_id)
    } else {
        stem.to_string()
    }
}

fn create(path: &Path) -> Result<File, FormatError> {
    File::create(path).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write every chapter as `# {title}`, its blocks one per line, then a blank line.
pub fn write_markdown(doc: &OutputDocument, path: &Path) -> Result<(), FormatError> {
    let mut f = BufWriter::new(create(path)?);
    f.write_all(doc.to_markdown().as_bytes())
        .and_then(|_| f.flush())
        .map_err(|e| FormatError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write the document (book id, title, chapters with id/title/blocks) as pretty JSON.
pub fn write_json(doc: &OutputDocument, path: &Path) -> Result<(), FormatError> {
    let mut f = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut f, doc)?;
    f.flush().map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
