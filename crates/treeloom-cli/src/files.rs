// SPDX-License-Identifier: AGPL-3.0-or-later
//! File operations for document loading and saving
//!
//! Provides:
//! - Path-based format detection from extensions
//! - Content-based format detection heuristics
//! - Loading documents and conversion settings
//! - Writing conversion results

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use treeloom_core::{ConversionError, ConvertConfig, FlatNode, NestedNode};

/// Formats the command line understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// CommonMark text
    Markdown,
    /// Annotated-leaf tree as JSON (`type`/`content`/`marks`)
    FlatJson,
    /// Nested-annotation tree as JSON (`type`/`children`/`value`)
    NestedJson,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::FlatJson => "annotated-leaf JSON",
            DocumentFormat::NestedJson => "nested-annotation JSON",
        };
        f.write_str(name)
    }
}

/// File operation errors
#[derive(Debug, Error)]
pub enum FileError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Format detection failed
    #[error("Could not detect format for file: {path}")]
    UnknownFormat { path: String },

    /// The input format cannot feed the requested conversion
    #[error("Cannot convert {format} to {target}")]
    UnsupportedFormat {
        format: DocumentFormat,
        target: &'static str,
    },

    /// Malformed input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Output could not be produced
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid settings file
    #[error("Config error: {0}")]
    Config(String),

    /// The conversion itself failed
    #[error(transparent)]
    Conversion(ConversionError),
}

impl From<ConversionError> for FileError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::ParseError { message } => FileError::Parse(message),
            ConversionError::IoError(e) => FileError::Io(e),
            ConversionError::SerializationError(msg) => FileError::Render(msg),
            other => FileError::Conversion(other),
        }
    }
}

impl From<serde_json::Error> for FileError {
    fn from(err: serde_json::Error) -> Self {
        FileError::Parse(err.to_string())
    }
}

/// Result type for file operations
pub type FileResult<T> = std::result::Result<T, FileError>;

/// A loaded input document
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Markdown(String),
    Flat(FlatNode),
    Nested(NestedNode),
}

impl Document {
    pub fn format(&self) -> DocumentFormat {
        match self {
            Document::Markdown(_) => DocumentFormat::Markdown,
            Document::Flat(_) => DocumentFormat::FlatJson,
            Document::Nested(_) => DocumentFormat::NestedJson,
        }
    }
}

/// Metadata about an opened file
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Full path to the file
    pub path: String,
    /// Detected format
    pub format: DocumentFormat,
    /// File size in bytes
    pub size: u64,
}

/// Opened document with file metadata
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub document: Document,
    pub file_info: FileInfo,
}

/// Detect format from file extension
///
/// Plain `.json` is ambiguous between the two tree models and yields `None`.
pub fn format_from_extension(path: &Path) -> Option<DocumentFormat> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    if name.ends_with(".pm.json") || name.ends_with(".flat.json") {
        return Some(DocumentFormat::FlatJson);
    }
    if name.ends_with(".mdast.json") || name.ends_with(".nested.json") {
        return Some(DocumentFormat::NestedJson);
    }

    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "md" | "markdown" | "mdown" | "mkd" => Some(DocumentFormat::Markdown),
        _ => None,
    }
}

/// Detect format from content using heuristics
pub fn format_from_content(content: &str) -> Option<DocumentFormat> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with('{') {
        return Some(DocumentFormat::Markdown);
    }

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let object = value.as_object()?;

    // Key names differ between the two models
    if object.contains_key("content") || object.contains_key("marks") || object.contains_key("text") {
        return Some(DocumentFormat::FlatJson);
    }
    if object.contains_key("children") || object.contains_key("value") {
        return Some(DocumentFormat::NestedJson);
    }

    match object.get("type").and_then(|t| t.as_str()) {
        Some("doc") => Some(DocumentFormat::FlatJson),
        Some("root") => Some(DocumentFormat::NestedJson),
        _ => None,
    }
}

/// Open a file and parse it
///
/// Format is detected from file extension first, then from content if needed.
pub fn open_file(path: impl AsRef<Path>) -> FileResult<OpenedDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let size = fs::metadata(path)?.len();

    let format = format_from_extension(path)
        .or_else(|| format_from_content(&content))
        .ok_or_else(|| FileError::UnknownFormat {
            path: path.to_string_lossy().to_string(),
        })?;

    let document = parse_content(content, format)?;
    tracing::debug!(path = %path.display(), %format, size, "opened document");

    Ok(OpenedDocument {
        document,
        file_info: FileInfo {
            path: path.to_string_lossy().to_string(),
            format,
            size,
        },
    })
}

fn parse_content(content: String, format: DocumentFormat) -> FileResult<Document> {
    let doc = match format {
        DocumentFormat::Markdown => Document::Markdown(content),
        DocumentFormat::FlatJson => Document::Flat(serde_json::from_str(&content)?),
        DocumentFormat::NestedJson => Document::Nested(serde_json::from_str(&content)?),
    };
    Ok(doc)
}

/// Write a conversion result to a file
pub fn save_file(content: &str, path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "saved output");
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    convert: ConvertConfig,
}

/// Load conversion settings from the `[convert]` table of a TOML file
pub fn load_config(path: impl AsRef<Path>) -> FileResult<ConvertConfig> {
    let content = fs::read_to_string(path)?;
    let settings: SettingsFile =
        toml::from_str(&content).map_err(|e| FileError::Config(e.to_string()))?;
    Ok(settings.convert)
}
