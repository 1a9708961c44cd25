// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Typeset IRC chat logs as a LaTeX book.
//!
//! This crate turns a timestamped IRC log into the source of a two-column
//! LaTeX book: one chapter per day, speaker names hanging in the left margin,
//! clock times hanging in the right, and server notices folded into short
//! summaries.
//!
//! # Overview
//!
//! Conversion is a single forward pass:
//!
//! 1. Each line is split into a timestamp and a body, and the body is
//!    classified as a notice, an action or a chat message
//! 2. Messages are decorated: special shapes (quotes, URLs, relay bot
//!    output) are recognized, and the rest is rewritten and escaped
//! 3. Consecutive notices are collapsed into one block
//! 4. Blocks are laid out with chapter headings and time labels wherever the
//!    day, hour or minute changes
//! 5. The blocks are wrapped in a fixed preamble and footer
//!
//! # Example
//!
//! ```
//! use log2tex::document::{render_document, Config};
//!
//! let log = "\
//! 2024-01-01T09:05:00  *** alice has joined #rust
//! 2024-01-01T09:05:12  <alice> i'm here... finally
//! 2024-01-01T09:06:40  * bob waves
//! ";
//!
//! let tex = render_document(log, &Config::default()).unwrap();
//! assert!(tex.contains(r"\chapter*{Monday, January 1}"));
//! assert!(tex.contains(r"I'm here\ldots{} finally"));
//! ```
//!
//! # Modules
//!
//! - [`escape`]: character escaping
//! - [`rewrite`]: layered pattern substitution
//! - [`parser`]: line splitting, timestamps and classification
//! - [`decorate`]: message and action decoration
//! - [`meta`]: collapsing of server notices
//! - [`renderer`]: time-aware layout of blocks
//! - [`document`]: configuration and document assembly
//! - [`files`]: converting files on disk

#![deny(missing_docs)]

pub mod decorate;
pub mod document;
pub mod escape;
pub mod files;
pub mod meta;
pub mod parser;
pub mod renderer;
pub mod rewrite;
