// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Converting log files on disk.
//!
//! The output of `channel.log` is written next to it as `channel.log.tex`.
//! The document is first written to a temporary file in the same directory
//! and only moved into place once conversion has succeeded, so a failed run
//! never leaves a partial document behind.

use crate::document::{Config, render_document};
use crate::renderer::ConvertError;
use snafu::prelude::*;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Error type for file conversion.
#[derive(Debug, Snafu)]
pub enum FileError {
    /// The log could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadLog {
        /// The log path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The log could not be converted.
    #[snafu(display("failed to convert {}: {source}", path.display()))]
    Convert {
        /// The log path.
        path: PathBuf,
        /// What went wrong.
        source: ConvertError,
    },

    /// The log path has no file name to derive an output name from.
    #[snafu(display("invalid input path: {}", path.display()))]
    InvalidInputPath {
        /// The log path.
        path: PathBuf,
    },

    /// The temporary output file could not be created or written.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteOutput {
        /// The intended output path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The finished output could not be moved into place.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    PersistOutput {
        /// The intended output path.
        path: PathBuf,
        /// The underlying persist error.
        source: tempfile::PersistError,
    },
}

/// Returns where the document for `input` is written.
///
/// # Errors
///
/// Returns [`FileError::InvalidInputPath`] if `input` has no file name.
///
/// # Example
///
/// ```
/// use log2tex::files::output_path;
/// use std::path::Path;
///
/// let out = output_path(Path::new("logs/uweng.log")).unwrap();
/// assert_eq!(out, Path::new("logs/uweng.log.tex"));
/// ```
pub fn output_path(input: &Path) -> Result<PathBuf, FileError> {
    let name = input
        .file_name()
        .context(InvalidInputPathSnafu { path: input })?;
    let mut out_name = OsString::from(name);
    out_name.push(".tex");
    Ok(input.with_file_name(out_name))
}

/// Converts the log at `input`, writing the document to [`output_path`].
///
/// Returns the path that was written.
///
/// # Errors
///
/// Returns an error if the log cannot be read or converted, or the output
/// cannot be written. No output file is created in that case.
pub fn convert_file(input: &Path, config: &Config) -> Result<PathBuf, FileError> {
    let out_path = output_path(input)?;
    let log = std::fs::read_to_string(input).context(ReadLogSnafu { path: input })?;
    let document = render_document(&log, config).context(ConvertSnafu { path: input })?;
    write_atomically(&out_path, document.as_bytes())?;
    Ok(out_path)
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), FileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).context(WriteOutputSnafu { path })?;
    tmp.write_all(contents).context(WriteOutputSnafu { path })?;
    tmp.persist(path).context(PersistOutputSnafu { path })?;
    Ok(())
}
