// SPDX-License-Identifier: AGPL-3.0-or-later
//! Treeloom CLI - file handling and conversions behind the `treeloom` binary

pub mod convert;
pub mod files;

pub use convert::{into_flat, into_markdown, into_nested};
pub use files::{
    load_config, open_file, save_file, Document, DocumentFormat, FileError, FileInfo, FileResult,
    OpenedDocument,
};
