// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Streaming layout of a parsed log into LaTeX blocks.
//!
//! The renderer walks a log in order, tracking the time of the last block it
//! emitted. Whenever the day changes it starts a new chapter; whenever the
//! hour or minute changes it hangs a grey clock label in the right margin of
//! the next block. Server notices are held back in a queue and emitted as a
//! single block once something else is said.
//!
//! # Output Format
//!
//! Each block is one paragraph:
//!
//! ```text
//! \sides{<left marker>}{<time label>}{<content>}
//! ```
//!
//! where the left marker is the speaker's name, `\actstar` for actions, or
//! `\metabullet{}` for notices. Chapter headings are blocks of their own.
//!
//! # Example
//!
//! ```
//! use log2tex::parser::RenderOptions;
//! use log2tex::renderer::convert;
//!
//! let log = "2024-01-01T09:05:00  <alice> hi\n2024-01-01T09:06:00  <bob> hello\n";
//! let blocks = convert(log, &RenderOptions::default()).unwrap();
//!
//! assert_eq!(blocks[0], r"\chapter*{Monday, January 1}");
//! assert!(blocks[2].contains(":06"));
//! ```

use crate::decorate::{Decorated, SpeakerState, Wrap, decorate_action, decorate_chat};
use crate::meta::render_block;
use crate::parser::{LineError, LogRecord, MetaEvent, ParsedEvent, RenderOptions, Timestamp};
use chrono::NaiveDate;
use snafu::prelude::*;

/// Error type for a failed conversion.
#[derive(Debug, Snafu)]
pub enum ConvertError {
    /// A line of the log could not be parsed.
    #[snafu(display("line {line}: {source}"))]
    Line {
        /// The 1-based line number.
        line: usize,
        /// What was wrong with the line.
        source: LineError,
    },
}

/// Everything a conversion run remembers between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Time of the last emitted block, reset at each new chapter.
    pub last_time: Option<Timestamp>,
    /// Blocks emitted so far, in order.
    pub blocks: Vec<String>,
    /// Speaker and quote-list memory used by decoration.
    pub speakers: SpeakerState,
}

impl RenderState {
    /// Lays out one decorated line, preceded by any time markers it needs.
    pub fn emit(&mut self, line: &Decorated, time: Timestamp) {
        if self.last_time.is_none_or(|last| last.date != time.date) {
            self.blocks.push(chapter_heading(time.date));
            self.last_time = None;
        }

        let right = match self.last_time {
            Some(last) if last.hour == time.hour && last.minute == time.minute => String::new(),
            Some(last) if last.hour == time.hour => {
                format!(r"\grey{{\hspace{{2em}}:{:02}}}", time.minute)
            }
            _ => format!(r"\grey{{{}}}", hour_label(time)),
        };
        self.last_time = Some(time);

        let body = format!("{{{}}}", line.wrap.apply(&line.content));
        let block = if line.left.is_empty() && right.is_empty() {
            body
        } else {
            format!(r"\sides{{{}}}{{{right}}}{body}", line.left)
        };
        self.blocks.push(block);
    }
}

/// Formats the chapter heading for a day, e.g. `Tuesday, January 2`.
#[must_use]
pub fn chapter_heading(date: NaiveDate) -> String {
    format!(r"\chapter*{{{}}}", date.format("%A, %B %-d"))
}

/// Converts a 24-hour clock hour to a 12-hour one with its suffix.
#[must_use]
pub const fn twelve_hour(hour: u32) -> (u32, &'static str) {
    match hour {
        0 => (12, "a.m."),
        1..=11 => (hour, "a.m."),
        12 => (12, "p.m."),
        _ => (hour - 12, "p.m."),
    }
}

fn hour_label(time: Timestamp) -> String {
    let (hour, suffix) = twelve_hour(time.hour);
    format!(r"\makebox[2em][r]{{{hour}}}:{:02} {suffix}", time.minute)
}

/// Server notices waiting to be emitted as one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaQueue {
    events: Vec<MetaEvent>,
    time: Option<Timestamp>,
}

impl MetaQueue {
    /// Queues a notice. The block takes the time of the first notice.
    pub fn push(&mut self, event: MetaEvent, time: Timestamp) {
        self.time.get_or_insert(time);
        self.events.push(event);
    }

    /// Returns `true` if no notices are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn take(&mut self) -> Option<(Vec<MetaEvent>, Timestamp)> {
        let time = self.time.take()?;
        Some((std::mem::take(&mut self.events), time))
    }
}

/// Incremental converter for one log.
///
/// Feed lines in order with [`Converter::feed`], then call
/// [`Converter::finish`] to flush pending notices and collect the blocks.
#[derive(Debug)]
pub struct Converter<'a> {
    opts: &'a RenderOptions,
    state: RenderState,
    queue: MetaQueue,
}

impl<'a> Converter<'a> {
    /// Starts a fresh conversion run.
    #[must_use]
    pub fn new(opts: &'a RenderOptions) -> Self {
        Self {
            opts,
            state: RenderState::default(),
            queue: MetaQueue::default(),
        }
    }

    /// Parses and lays out one raw line. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Line`] if the line cannot be parsed.
    pub fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), ConvertError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let record =
            crate::parser::parse_line(raw, self.opts).context(LineSnafu { line: line_no })?;
        self.push(record);
        Ok(())
    }

    /// Lays out an already parsed line.
    pub fn push(&mut self, record: LogRecord) {
        let LogRecord { timestamp, event } = record;
        let decorated = match event {
            ParsedEvent::Meta(event) => {
                self.state.speakers.interrupt();
                self.queue.push(event, timestamp);
                return;
            }
            ParsedEvent::Action { actor, text } => {
                self.flush_meta();
                decorate_action(&actor, &text, &mut self.state.speakers)
            }
            ParsedEvent::Chat { speaker, text } => {
                self.flush_meta();
                decorate_chat(&speaker, &text, &mut self.state.speakers, self.opts)
            }
        };
        self.state.emit(&decorated, timestamp);
    }

    fn flush_meta(&mut self) {
        if let Some((events, time)) = self.queue.take() {
            let block = Decorated {
                content: render_block(&events),
                wrap: Wrap::Plain,
                left: r"\metabullet{}".to_owned(),
            };
            self.state.emit(&block, time);
        }
    }

    /// Flushes pending notices and returns the emitted blocks.
    #[must_use]
    pub fn finish(mut self) -> Vec<String> {
        self.flush_meta();
        self.state.blocks
    }
}

/// Converts a whole log into LaTeX blocks.
///
/// # Errors
///
/// Returns [`ConvertError::Line`] for the first line that cannot be parsed.
pub fn convert(log: &str, opts: &RenderOptions) -> Result<Vec<String>, ConvertError> {
    let mut converter = Converter::new(opts);
    for (i, line) in log.lines().enumerate() {
        converter.feed(i + 1, line)?;
    }
    Ok(converter.finish())
}
