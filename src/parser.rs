// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Parsing of raw IRC log lines.
//!
//! Each record in a log is a timestamp, two spaces, and a body. The body is
//! one of three forms:
//!
//! - `*** actor message` — a server notice (join, part, quit, mode change)
//! - `* actor does something` — an action
//! - `<nick> message` — a chat message
//!
//! Anything else is rejected. Logs are treated as trusted data, so a line
//! that cannot be parsed is an error to fix upstream rather than something
//! to skip.
//!
//! # Example
//!
//! ```
//! use log2tex::parser::{parse_line, ParsedEvent, RenderOptions};
//!
//! let opts = RenderOptions::default();
//! let record = parse_line("2024-01-01T09:05:00  <alice> hello", &opts).unwrap();
//! assert_eq!(record.timestamp.minute, 5);
//! assert_eq!(
//!     record.event,
//!     ParsedEvent::Chat { speaker: "alice".into(), text: "hello".into() }
//! );
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use snafu::prelude::*;

/// Error type for a single unusable log line.
#[derive(Debug, Snafu)]
pub enum LineError {
    /// The body is not a notice, action or chat message.
    #[snafu(display("unparseable chat line: {text:?}"))]
    UnparseableLine {
        /// The offending line body.
        text: String,
    },

    /// There is no two-space separator between timestamp and body.
    #[snafu(display("missing timestamp separator: {text:?}"))]
    MissingSeparator {
        /// The offending line.
        text: String,
    },

    /// The timestamp matches none of the accepted formats.
    #[snafu(display("unparseable timestamp: {text:?}"))]
    InvalidTimestamp {
        /// The timestamp text.
        text: String,
    },

    /// A `sets mode` notice whose flag string cannot be read.
    #[snafu(display("unparseable mode change: {text:?}"))]
    UnparseableMode {
        /// The mode change text, after `sets mode`.
        text: String,
    },
}

/// Settings that change how individual lines are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name prefixes (lowercase) identifying relay bots.
    pub bot_prefixes: Vec<String>,

    /// Accounts (lowercase) whose mode changes are not attributed.
    pub trusted_accounts: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bot_prefixes: vec!["cantide".into()],
            trusted_accounts: vec!["chanserv".into()],
        }
    }
}

impl RenderOptions {
    /// Returns `true` if `name` belongs to a relay bot.
    #[must_use]
    pub fn is_bot(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.bot_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    fn is_trusted(&self, account: &str) -> bool {
        self.trusted_accounts.iter().any(|a| a == account)
    }
}

/// A log timestamp, truncated to the minute.
///
/// Fields are ordered so that the derived ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Calendar date.
    pub date: NaiveDate,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Minute of hour, 0-59.
    pub minute: u32,
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            date: dt.date(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }
}

/// Accepted layouts carrying a UTC offset, besides RFC 3339.
///
/// `%z` takes the offset with or without a colon.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y%m%dT%H%M%S%z",
];

/// Accepted layouts without an offset.
///
/// `%.f` also accepts a missing fraction.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// Parses a log timestamp.
///
/// Offsets are ignored: the wall-clock time written in the log is the time
/// that gets typeset.
///
/// # Errors
///
/// Returns [`LineError::InvalidTimestamp`] if no accepted format matches.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, LineError> {
    let text = text.trim();
    let with_offset = DateTime::parse_from_rfc3339(text).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    });
    if let Some(dt) = with_offset {
        return Ok(dt.naive_local().into());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(Timestamp::from)
        .context(InvalidTimestampSnafu { text })
}

/// A server notice about a single actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEvent {
    /// The (lowercased) nick the notice is about.
    pub actor: String,
    /// The normalized notice text, e.g. `joined` or `was opped`.
    pub message: String,
}

/// The classified body of a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    /// A server notice.
    Meta(MetaEvent),

    /// A third-person action.
    Action {
        /// The acting nick.
        actor: String,
        /// What the actor did, without the nick.
        text: String,
    },

    /// A spoken message.
    Chat {
        /// The speaking nick.
        speaker: String,
        /// The message text.
        text: String,
    },
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the line was logged.
    pub timestamp: Timestamp,
    /// What the line says.
    pub event: ParsedEvent,
}

/// Splits a raw line into its timestamp text and trimmed body.
///
/// # Errors
///
/// Returns [`LineError::MissingSeparator`] if the line has no two-space
/// separator.
pub fn split_line(line: &str) -> Result<(&str, &str), LineError> {
    let (timestamp, body) = line
        .split_once("  ")
        .context(MissingSeparatorSnafu { text: line })?;
    Ok((timestamp, body.trim()))
}

/// Parses one raw log line.
///
/// # Errors
///
/// Returns an error if the separator, the timestamp, or the body cannot be
/// parsed.
pub fn parse_line(line: &str, opts: &RenderOptions) -> Result<LogRecord, LineError> {
    let (timestamp, body) = split_line(line)?;
    let timestamp = parse_timestamp(timestamp)?;
    let event = classify(body, opts)?;
    Ok(LogRecord { timestamp, event })
}

/// Classifies a line body that has had its timestamp removed.
///
/// # Errors
///
/// Returns [`LineError::UnparseableLine`] for bodies in none of the three
/// forms, and [`LineError::UnparseableMode`] for malformed mode changes.
pub fn classify(body: &str, opts: &RenderOptions) -> Result<ParsedEvent, LineError> {
    if let Some(rest) = body.strip_prefix("***") {
        return parse_meta(rest, opts).map(ParsedEvent::Meta);
    }

    if let Some(rest) = body.strip_prefix("* ") {
        let rest = rest.trim();
        let (actor, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        return Ok(ParsedEvent::Action {
            actor: actor.to_owned(),
            text: text.trim_start().to_owned(),
        });
    }

    let (speaker, text) = body
        .strip_prefix('<')
        .and_then(|rest| rest.split_once('>'))
        .context(UnparseableLineSnafu { text: body })?;
    Ok(ParsedEvent::Chat {
        speaker: speaker.to_owned(),
        text: text.trim().to_owned(),
    })
}

fn parse_meta(rest: &str, opts: &RenderOptions) -> Result<MetaEvent, LineError> {
    let lowered = rest.trim().to_lowercase();
    let (actor, message) = lowered
        .split_once(char::is_whitespace)
        .context(UnparseableLineSnafu { text: rest })?;
    let message = message.trim_start();

    if message.starts_with("has quit") || message.starts_with("has left") {
        return Ok(meta(actor, "left"));
    }
    if message.starts_with("has joined") {
        return Ok(meta(actor, "joined"));
    }
    if let Some(change) = message.strip_prefix("sets mode")
        && change
            .chars()
            .next()
            .is_none_or(|c| c == ':' || c.is_whitespace())
    {
        let change = change.strip_prefix(':').unwrap_or(change).trim();
        if let Some(event) = resolve_mode(actor, change, opts)? {
            return Ok(event);
        }
    }
    Ok(meta(actor, message))
}

fn meta(actor: &str, message: &str) -> MetaEvent {
    MetaEvent {
        actor: actor.to_owned(),
        message: message.to_owned(),
    }
}

static MODE_FLAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[+-][a-z]+)+$").unwrap());

/// Rewrites a single-target op/voice change as a notice about the target.
///
/// Returns `Ok(None)` when the change is readable but not one of the
/// recognized forms, in which case the notice is kept verbatim.
fn resolve_mode(
    actor: &str,
    change: &str,
    opts: &RenderOptions,
) -> Result<Option<MetaEvent>, LineError> {
    let mut tokens = change.split_whitespace();
    let flags = tokens
        .next()
        .filter(|flags| MODE_FLAGS_RE.is_match(flags))
        .context(UnparseableModeSnafu { text: change })?;

    let mut targets: Vec<&str> = tokens.collect();
    targets.dedup();
    let [target] = targets[..] else {
        return Ok(None);
    };

    let mut transitions = Vec::new();
    let mut adding = true;
    for c in flags.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            flag => transitions.push((adding, flag)),
        }
    }
    transitions.dedup();

    let verb = match transitions[..] {
        [(true, 'o')] => "opped",
        [(false, 'o')] => "deopped",
        [(true, 'v')] => "voiced",
        [(false, 'v')] => "devoiced",
        _ => return Ok(None),
    };

    let message = if opts.is_trusted(actor) {
        format!("was {verb}")
    } else {
        format!("was {verb} by {actor}")
    };
    Ok(Some(MetaEvent {
        actor: target.to_owned(),
        message,
    }))
}
