// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Decoration of chat messages and actions.
//!
//! Decoration turns a parsed line into the pieces the renderer lays out: the
//! typeset content, how that content is wrapped, and the marker that hangs
//! in the left margin (the speaker's name, or a star for actions).
//!
//! Most messages simply go through [`rewrite`], but a few shapes get special
//! treatment:
//!
//! - fully quoted messages are set in curly quotes
//! - a lone `^` ("what they said") becomes an up arrow
//! - a bare URL is typeset inline instead of as a footnote
//! - relay bots replay quotes from other people, which are split into one
//!   paragraph per quoted speaker
//! - relay bot vote results are compressed to `yes --- no`
//! - a trailing `(N more messages)` is set in italics
//!
//! After a bot's quote list is requested with `!lst`, the next long message
//! from a bot is replaced with an ellipsis, since it is the list itself.

use crate::escape::escape;
use crate::parser::RenderOptions;
use crate::rewrite::{URL_PATTERN, rewrite};
use once_cell::sync::Lazy;
use regex::Regex;

/// The command that makes a relay bot dump its quote list.
pub const LIST_TRIGGER: &str = "!lst";

/// Bot messages longer than this (in characters) are suppressed after
/// [`LIST_TRIGGER`].
pub const SUPPRESS_THRESHOLD: usize = 300;

const NICK: &str = r"[A-Za-z\[\]\\`_^{|}][A-Za-z0-9\[\]\\`_^{|}-]*";

static FULL_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^(?:{URL_PATTERN})$")).unwrap());

/// A candidate quoted line. Only the leading whitespace is consumed, so
/// back-to-back segments can each claim their separator.
static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:^|\s)(?:\*\s+(?P<actor>{NICK})|(?P<speaker>{NICK}):)"
    ))
    .unwrap()
});

static VOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:the\s+)?vote\b.*?\byes\W+(\d+)\W+no\W+(\d+)\W*$").unwrap()
});

static MORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\d+ more messages?\)$").unwrap());

/// How decorated content is wrapped before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// No wrapping.
    Plain,
    /// Italics, used for actions.
    Emphasis,
    /// Curly double quotes.
    Quoted,
    /// Curly double quotes with an opening single quote inside.
    NestedQuoted,
}

impl Wrap {
    /// Wraps already-typeset `content`.
    #[must_use]
    pub fn apply(self, content: &str) -> String {
        match self {
            Self::Plain => content.to_owned(),
            Self::Emphasis => format!(r"\textit{{{content}}}"),
            Self::Quoted => format!("``{{}}{content}{{}}''"),
            Self::NestedQuoted => format!("``{{}}`{content}{{}}''"),
        }
    }
}

/// A line ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorated {
    /// The typeset message.
    pub content: String,
    /// Wrapping to apply to `content`.
    pub wrap: Wrap,
    /// The marker that hangs in the left margin.
    pub left: String,
}

/// Per-run memory about recent speakers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerState {
    /// The speaker of the previous chat line, unless something interrupted.
    pub last_speaker: Option<String>,
    /// Set by [`LIST_TRIGGER`]; cleared when a long bot message is suppressed.
    pub list_latch: bool,
}

impl SpeakerState {
    /// Forgets the last speaker, so their next line gets a full label.
    pub fn interrupt(&mut self) {
        self.last_speaker = None;
    }
}

/// Decorates an action line.
pub fn decorate_action(actor: &str, text: &str, state: &mut SpeakerState) -> Decorated {
    state.interrupt();
    let line = if text.is_empty() {
        actor.to_owned()
    } else {
        format!("{actor} {text}")
    };
    Decorated {
        content: rewrite(&line),
        wrap: Wrap::Emphasis,
        left: r"\actstar".to_owned(),
    }
}

/// Decorates a chat message.
pub fn decorate_chat(
    speaker: &str,
    text: &str,
    state: &mut SpeakerState,
    opts: &RenderOptions,
) -> Decorated {
    let bot = opts.is_bot(speaker);
    let (content, wrap) =
        if bot && state.list_latch && text.chars().count() > SUPPRESS_THRESHOLD {
            state.list_latch = false;
            (r"\ldots".to_owned(), Wrap::Plain)
        } else {
            if text == LIST_TRIGGER {
                state.list_latch = true;
            }
            prettify(text, bot)
        };

    let mut left = format!(r"\name{{{}}}", escape(speaker));
    if state.last_speaker.as_deref() == Some(speaker) {
        left = format!(r"\grey{{{left}}}");
    } else {
        state.last_speaker = Some(speaker.to_owned());
    }

    Decorated {
        content,
        wrap,
        left,
    }
}

/// Typesets a chat message, choosing a special form where one applies.
fn prettify(text: &str, bot: bool) -> (String, Wrap) {
    let (text, more) = match MORE_RE.find(text) {
        Some(m) => (&text[..m.start()], Some(m.as_str().trim())),
        None => (text, None),
    };

    let mut wrap = Wrap::Plain;
    let mut text = text;
    if text.len() > 1 && text.starts_with('"') && text.ends_with('"') {
        text = &text[1..text.len() - 1];
        wrap = Wrap::Quoted;
        if let Some(inner) = text.strip_prefix('\'') {
            text = inner;
            wrap = Wrap::NestedQuoted;
        }
    }

    let mut content = if let Some(rest) = text.strip_prefix('^')
        && !rest.contains('^')
    {
        format!(r"$\uparrow${}", rewrite(rest))
    } else if FULL_URL_RE.is_match(text)
        && let Some((scheme, rest)) = text.split_once("://")
    {
        format!(r"\small{{\textsc{{{scheme}}}://{}}}", escape(rest))
    } else if let Some(tally) = bot.then(|| vote_tally(text)).flatten() {
        tally
    } else if let Some(quotes) = bot.then(|| bot_quotes(text)).flatten() {
        quotes
    } else {
        rewrite(text)
    };

    if let Some(more) = more {
        // The suffix sits outside any quotes.
        content = wrap.apply(&content);
        wrap = Wrap::Plain;
        if !content.is_empty() {
            content.push(' ');
        }
        content.push_str(&format!(r"\emph{{{}}}", escape(more)));
    }
    (content, wrap)
}

/// A quoted line inside a relay bot message.
struct Segment<'a> {
    start: usize,
    end: usize,
    nick: &'a str,
    action: bool,
}

/// Splits a bot message into free text and one paragraph per quoted line.
///
/// A quote list opens with a header ending in a colon (`Quote 3 of 9:`), so
/// the first `nick:` segment only counts after such a header. Actions
/// (`* nick ...`) count anywhere. Returns `None` if the message quotes
/// nobody.
fn bot_quotes(text: &str) -> Option<String> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    for caps in SEGMENT_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (nick, action) = match (caps.name("actor"), caps.name("speaker")) {
            (Some(actor), _) => (actor.as_str(), true),
            (None, Some(speaker)) => (speaker.as_str(), false),
            (None, None) => continue,
        };
        if !text[whole.end()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
        {
            continue;
        }
        if segments.is_empty() && !action && !text[..whole.start()].trim_end().ends_with(':') {
            continue;
        }
        segments.push(Segment {
            start: whole.start(),
            end: whole.end(),
            nick,
            action,
        });
    }
    let first = segments.first()?;

    let mut parts = Vec::with_capacity(segments.len() + 1);
    let lead = text[..first.start].trim();
    if !lead.is_empty() {
        parts.push(rewrite(lead));
    }

    for (i, seg) in segments.iter().enumerate() {
        let stop = segments.get(i + 1).map_or(text.len(), |next| next.start);
        let body = text[seg.end..stop].trim();
        let nick = escape(seg.nick);
        let mut part = if seg.action {
            format!(r"\textit{{\actstar{{}} {nick}")
        } else {
            format!(r"\name{{\textless{{}}{nick}\textgreater{{}}}}")
        };
        if !body.is_empty() {
            part.push(' ');
            part.push_str(&rewrite(body));
        }
        if seg.action {
            part.push('}');
        }
        parts.push(part);
    }

    Some(parts.join("\n\n"))
}

/// Compresses a vote result announcement to `yes --- no`.
fn vote_tally(text: &str) -> Option<String> {
    let caps = VOTE_RE.captures(text)?;
    Some(format!("{} --- {}", &caps[1], &caps[2]))
}
