// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Layered pattern substitution for chat text.
//!
//! A line is rewritten by an ordered list of [`Rule`]s. The first rule
//! partitions the text into matches and the gaps between them; each piece is
//! then rewritten by the *remaining* rules, and matches are finally handed to
//! the rule's [`Replacement`]. When no rules remain, the text is escaped. The
//! effect is that later rules (and escaping) see the inside of earlier
//! matches, while earlier rules never see the output of later ones.
//!
//! # Example
//!
//! ```
//! use log2tex::rewrite::rewrite;
//!
//! assert_eq!(rewrite("i'm cold.... -5*C"), r"I'm cold\ldots{} -{}5\degrees{}C");
//! ```

use crate::escape::{ESCAPED_CARET, escape};
use once_cell::sync::Lazy;
use regex::{Match, Regex};

/// Matches a bare URL. The last character may not be trailing punctuation.
pub(crate) const URL_PATTERN: &str = r#"https?://\S*[^\s,.;:\]*!'"<>]"#;

static PRONOUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bi'(m|d|ve|ll)\b").unwrap());

static DEGREE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[1-4]?\d(?:\.\d)?\*[cC]?$").unwrap());

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(URL_PATTERN, Replacement::Wrap(r"\urlind\footnote{", "}")),
        Rule::new("<3", Replacement::Fixed(r"$\heartsuit$")),
        Rule::new(r"\.+", Replacement::Fixed(r"\ldots{}"))
            .guarded(|m| (3..=5).contains(&m.len())),
        Rule::new(r"\S+", Replacement::Computed(degrees))
            .guarded(|m| DEGREE_TOKEN_RE.is_match(m)),
        Rule::new(r"\^-?\d+(?:\.\d+)?", Replacement::Computed(superscript)),
    ]
});

/// What a rule puts in place of a match.
///
/// Each variant receives the match *after* it has been rewritten by the
/// remaining rules and escaped.
#[derive(Debug, Clone, Copy)]
pub enum Replacement {
    /// Surround the processed match with a prefix and suffix.
    Wrap(&'static str, &'static str),
    /// Discard the match and emit a fixed string.
    Fixed(&'static str),
    /// Compute the replacement from the processed match.
    Computed(fn(&str) -> String),
}

impl Replacement {
    fn apply(self, processed: &str) -> String {
        match self {
            Self::Wrap(before, after) => format!("{before}{processed}{after}"),
            Self::Fixed(text) => text.to_owned(),
            Self::Computed(f) => f(processed),
        }
    }
}

/// A single substitution layer.
#[derive(Debug)]
pub struct Rule {
    pattern: Regex,
    guard: Option<fn(&str) -> bool>,
    replacement: Replacement,
}

impl Rule {
    /// Creates a rule from a pattern known to be valid.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use]
    pub fn new(pattern: &str, replacement: Replacement) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            guard: None,
            replacement,
        }
    }

    /// Only accepts matches for which `guard` returns `true`.
    ///
    /// Rejected matches stay part of the surrounding text. This stands in
    /// for lookaround assertions, which `regex` does not support.
    #[must_use]
    pub fn guarded(mut self, guard: fn(&str) -> bool) -> Self {
        self.guard = Some(guard);
        self
    }

    fn matches<'t>(&self, text: &'t str) -> impl Iterator<Item = Match<'t>> {
        self.pattern
            .find_iter(text)
            .filter(|m| self.guard.is_none_or(|accept| accept(m.as_str())))
    }
}

/// Rewrites and escapes a line of chat text with the standard rules.
///
/// Standalone lowercase `i'm`, `i'd`, `i've` and `i'll` are capitalized
/// before any rule runs.
#[must_use]
pub fn rewrite(line: &str) -> String {
    let line = PRONOUN_RE.replace_all(line, "I'${1}");
    apply(&line, &RULES)
}

/// Applies `rules` to `text`, escaping whatever the rules leave behind.
#[must_use]
pub fn apply(text: &str, rules: &[Rule]) -> String {
    let Some((rule, rest)) = rules.split_first() else {
        return escape(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in rule.matches(text) {
        out.push_str(&apply(&text[last..m.start()], rest));
        out.push_str(&rule.replacement.apply(&apply(m.as_str(), rest)));
        last = m.end();
    }
    out.push_str(&apply(&text[last..], rest));
    out
}

fn degrees(token: &str) -> String {
    token.replace('*', r"\degrees{}")
}

fn superscript(exponent: &str) -> String {
    format!("$^{{{}}}$", exponent.replace(ESCAPED_CARET, ""))
}
