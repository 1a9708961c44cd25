// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Character-level escaping for LaTeX output.
//!
//! Every character that LaTeX would interpret is mapped to a form that
//! typesets literally. The mapping relies on a few macros defined in the
//! document header (`\mytilde`), so output from this module is only valid
//! inside documents produced by [`crate::document`].
//!
//! # Example
//!
//! ```
//! use log2tex::escape::escape;
//!
//! assert_eq!(escape("50% off_now"), r"50\% off\_now");
//! assert_eq!(escape("plain words"), "plain words");
//! ```

/// The IRC control byte that toggles bold text.
const BOLD: char = '\x02';

/// Returns the LaTeX replacement for a single character, if it needs one.
const fn replacement(c: char) -> Option<&'static str> {
    Some(match c {
        '$' => r"\$",
        '_' => r"\_",
        '#' => r"\#",
        '%' => r"\%",
        '^' => r"\symbol{94}",
        '&' => r"\&",
        '{' => r"\{",
        '}' => r"\}",
        '[' => "{[}",
        ']' => "{]}",
        '<' => r"\textless{}",
        '>' => r"\textgreater{}",
        '\\' => r"\symbol{92}",
        '~' => r"$\mytilde$",
        '-' => "-{}",
        '/' => r"/\linebreak[3]",
        '`' => r"\`{}",
        BOLD => r"\bf{}",
        _ => return None,
    })
}

/// Escapes a fragment of raw text for literal typesetting.
///
/// Characters without a special meaning are copied through unchanged, so
/// text that contains none of them is returned as-is.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match replacement(c) {
            Some(rep) => out.push_str(rep),
            None => out.push(c),
        }
    }
    out
}

/// The escaped form of `^`, which later passes need to recognize and strip.
pub(crate) const ESCAPED_CARET: &str = r"\symbol{94}";

/// Escapes `text` for use inside `\textsc{}`, shrinking digit runs.
///
/// Digits in small capitals look oversized, so each run is set as
/// `{\scriptsize{}N}`. Runs are split off before escaping so the numbers
/// inside escape sequences such as `\symbol{94}` are never rewritten.
#[must_use]
pub fn escape_small_caps(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.starts_with(|c: char| c.is_ascii_digit());
        let split = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(split);
        if digits {
            out.push_str(r"{\scriptsize{}");
            out.push_str(run);
            out.push('}');
        } else {
            out.push_str(&escape(run));
        }
        rest = tail;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("$_#&{}"), r"\$\_\#\&\{\}");
        assert_eq!(escape("[x]"), "{[}x{]}");
        assert_eq!(escape("<b>"), r"\textless{}b\textgreater{}");
        assert_eq!(escape(r"a\b"), r"a\symbol{92}b");
        assert_eq!(escape("~"), r"$\mytilde$");
        assert_eq!(escape("x^2"), r"x\symbol{94}2");
    }

    #[test]
    fn escapes_hyphen_slash_and_backtick() {
        assert_eq!(escape("a-b"), "a-{}b");
        assert_eq!(escape("a/b"), r"a/\linebreak[3]b");
        assert_eq!(escape("`x"), r"\`{}x");
    }

    #[test]
    fn maps_bold_control_byte() {
        assert_eq!(escape("\x02loud"), r"\bf{}loud");
    }

    #[test]
    fn leaves_safe_text_unchanged() {
        let safe = "Hello, world! It's 5 o'clock (really).";
        assert_eq!(escape(safe), safe);
        assert_eq!(escape(&escape(safe)), safe);
    }

    #[test]
    fn preserves_non_ascii() {
        assert_eq!(escape("naïve café ☃"), "naïve café ☃");
    }

    #[test]
    fn handles_empty_string() {
        assert_eq!(escape(""), "");
        assert_eq!(escape_small_caps(""), "");
    }

    #[test]
    fn small_caps_shrinks_digits() {
        assert_eq!(
            escape_small_caps("bob joined 2 times"),
            r"bob joined {\scriptsize{}2} times"
        );
        assert_eq!(escape_small_caps("42"), r"{\scriptsize{}42}");
    }

    #[test]
    fn small_caps_does_not_touch_escape_digits() {
        assert_eq!(escape_small_caps("a^b"), r"a\symbol{94}b");
        assert_eq!(
            escape_small_caps("x/1"),
            r"x/\linebreak[3]{\scriptsize{}1}"
        );
    }
}
