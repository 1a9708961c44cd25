// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Collapsing of consecutive server notices.
//!
//! Joins, parts and mode changes tend to arrive in bursts. Rather than give
//! each its own line, consecutive notices about the same nick are merged
//! into one sentence (`bob joined, left, and joined`), and all runs in a
//! burst share a single block.
//!
//! # Example
//!
//! ```
//! use log2tex::meta::comma_join;
//!
//! assert_eq!(comma_join(&["joined", "left", "joined"]), "joined, left, and joined");
//! ```

use crate::escape::escape_small_caps;
use crate::parser::MetaEvent;

/// Joins items as an English list, with a serial comma for three or more.
#[must_use]
pub fn comma_join<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_owned(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let init: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", init.join(", "), last.as_ref())
        }
    }
}

/// Merges runs of same-actor notices, in order of first appearance.
///
/// Each returned string is the escaped `actor message` sentence for one run,
/// with digits set in a smaller size to sit well in small capitals.
#[must_use]
pub fn collapse(events: &[MetaEvent]) -> Vec<String> {
    events
        .chunk_by(|a, b| a.actor == b.actor)
        .map(|run| {
            let messages: Vec<&str> = run.iter().map(|e| e.message.as_str()).collect();
            format!(
                "{} {}",
                escape_small_caps(&run[0].actor),
                escape_small_caps(&comma_join(messages.as_slice()))
            )
        })
        .collect()
}

/// Renders a burst of notices as the content of a single block.
#[must_use]
pub fn render_block(events: &[MetaEvent]) -> String {
    format!(r"\textsc{{{}}}", collapse(events).join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(actor: &str, message: &str) -> MetaEvent {
        MetaEvent {
            actor: actor.into(),
            message: message.into(),
        }
    }

    #[test]
    fn comma_join_follows_list_conventions() {
        let empty: [&str; 0] = [];
        assert_eq!(comma_join(&empty), "");
        assert_eq!(comma_join(&["a"]), "a");
        assert_eq!(comma_join(&["a", "b"]), "a and b");
        assert_eq!(comma_join(&["a", "b", "c"]), "a, b, and c");
        assert_eq!(comma_join(&["a", "b", "c", "d"]), "a, b, c, and d");
    }

    #[test]
    fn merges_same_actor_run() {
        let events = [
            event("bob", "joined"),
            event("bob", "x"),
            event("bob", "y"),
        ];
        assert_eq!(collapse(&events), vec!["bob joined, x, and y"]);
    }

    #[test]
    fn keeps_runs_in_first_occurrence_order() {
        let events = [
            event("bob", "joined"),
            event("amy", "joined"),
            event("amy", "left"),
            event("bob", "left"),
        ];
        assert_eq!(
            collapse(&events),
            vec!["bob joined", "amy joined and left", "bob left"]
        );
    }

    #[test]
    fn escapes_and_shrinks_digits() {
        let events = [event("bob_2", "was opped")];
        assert_eq!(
            render_block(&events),
            r"\textsc{bob\_{\scriptsize{}2} was opped}"
        );
    }

    #[test]
    fn block_joins_runs_with_semicolons() {
        let events = [event("bob", "joined"), event("amy", "left")];
        assert_eq!(render_block(&events), r"\textsc{bob joined; amy left}");
    }

    #[test]
    fn empty_queue_collapses_to_nothing() {
        assert!(collapse(&[]).is_empty());
    }
}
