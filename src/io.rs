//! Text extraction and reader dispatch
//!
//! A [`TextReader`] turns a document on disk into raw text. The layout core
//! never sees readers or their failures; [`crate::corpus`] uses them to build
//! keyword profiles and drops documents that cannot be read.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while reading a document
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Two documents resolve to the same identifier
    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),
}

/// Result type for reader operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader extracts raw text from one document format
pub trait TextReader: Send + Sync {
    /// Read the whole document as text
    fn read_text(&self, input: &Path) -> IoResult<String>;

    /// File extensions this reader can handle (e.g., ["txt", "md"])
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Reader for plain-text and Markdown documents
pub struct PlainTextReader;

impl PlainTextReader {
    /// Create a new plain-text reader
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReader for PlainTextReader {
    fn read_text(&self, input: &Path) -> IoResult<String> {
        let bytes = fs::read(input)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md", "markdown"]
    }
}

/// Registry of available text readers
pub struct ReaderRegistry {
    readers: Vec<Box<dyn TextReader>>,
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Create a registry with all default readers registered
    ///
    /// Currently registers `PlainTextReader` (txt, text, md, markdown).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PlainTextReader::new()));
        registry
    }

    /// Register a reader
    pub fn register(&mut self, reader: Box<dyn TextReader>) {
        self.readers.push(reader);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn TextReader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn TextReader> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Whether any registered reader handles this path
    pub fn supports_path(&self, path: &Path) -> bool {
        self.reader_for_path(path).is_ok()
    }

    /// Read a document with whichever reader matches its extension
    pub fn read_text(&self, path: &Path) -> IoResult<String> {
        self.reader_for_path(path)?.read_text(path)
    }

    /// All extensions handled by registered readers
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions().iter().copied())
            .collect()
    }
}
