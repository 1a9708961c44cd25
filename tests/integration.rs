// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for log2tex conversion.

use log2tex::document::{self, Config};
use log2tex::files::{self, FileError};
use log2tex::parser::LineError;
use log2tex::renderer::ConvertError;
use std::fs;

const SAMPLE_LOG: &str = "\
2024-01-01T09:05:00  *** Alice has joined #uweng
2024-01-01T09:05:02  *** ChanServ sets mode: +o alice
2024-01-01T09:05:30  <alice> morning... i'm back
2024-01-01T09:05:45  <alice> it's -5*C out, see http://weather.example/today
2024-01-01T09:06:10  <bob> \"brr\"
2024-01-01T09:06:20  * bob shivers
2024-01-01T10:15:00  <bob> !lst
2024-01-01T10:15:01  <cantide> Quote 3 of 3: alice: <3 winter * bob shivers
2024-01-02T00:00:00  <alice> ^
2024-01-02T00:00:05  *** bob has quit IRC (Quit: sleep)
";

/// Renders the sample log and checks every kind of block appears.
#[test]
fn renders_sample_log() {
    let tex = document::render_document(SAMPLE_LOG, &Config::default()).unwrap();

    assert!(tex.starts_with(r"\documentclass[twocolumn]{book}"));
    assert!(tex.ends_with("\\end{document}\n"));

    assert!(tex.contains(r"\chapter*{Monday, January 1}"));
    assert!(tex.contains(r"\chapter*{Tuesday, January 2}"));
    assert!(tex.contains(r"{\textsc{alice joined and was opped}}"));
    assert!(tex.contains(r"morning\ldots{} I'm back"));
    assert!(tex.contains(r"\grey{\name{alice}}"));
    assert!(tex.contains(r"-{}5\degrees{}C"));
    assert!(tex.contains(r"\urlind\footnote{http:/\linebreak[3]/\linebreak[3]weather.example"));
    assert!(tex.contains("{``{}brr{}''}"));
    assert!(tex.contains(r"\sides{\name{bob}}{\grey{\hspace{2em}:06}}{``{}brr{}''}"));
    assert!(tex.contains(r"\sides{\actstar}{}{\textit{bob shivers}}"));
    assert!(tex.contains(r"\makebox[2em][r]{10}:15 a.m."));
    assert!(tex.contains(r"\name{\textless{}alice\textgreater{}} $\heartsuit$ winter"));
    assert!(tex.contains(r"\textit{\actstar{} bob shivers}"));
    assert!(tex.contains(r"{$\uparrow$}"));
    assert!(tex.contains(r"\makebox[2em][r]{12}:00 a.m."));
    assert!(tex.contains(r"{\textsc{bob left}}"));
}

/// Blocks are separated by exactly one blank line.
#[test]
fn blocks_are_separated_by_blank_lines() {
    let log = "\
2024-01-01T09:05:00  <a> one
2024-01-01T09:05:00  <b> two
";
    let tex = document::render_document(log, &Config::default()).unwrap();
    assert!(tex.contains("\\sides{\\name{a}}{\\grey{\\makebox[2em][r]{9}:05 a.m.}}{one}\n\n\\sides{\\name{b}}{}{two}"));
}

/// Configured bots get relay formatting; others do not.
#[test]
fn configured_bot_prefixes_apply() {
    let log = "2024-01-01T09:05:00  <Relay42> Quote 1 of 1: alice: hi\n";

    let default = document::render_document(log, &Config::default()).unwrap();
    assert!(default.contains("{Quote 1 of 1: alice: hi}"));

    let config = Config::from_json(r#"{"bots": ["relay"]}"#).unwrap();
    let relayed = document::render_document(log, &config).unwrap();
    assert!(relayed.contains(r"\name{\textless{}alice\textgreater{}} hi"));
}

/// A relayed vote result is compressed even when the wording has a colon.
#[test]
fn relayed_vote_with_colon_is_compressed() {
    let log = "2024-01-01T09:05:00  <cantide> The vote passed: yes 3, no 2\n";
    let tex = document::render_document(log, &Config::default()).unwrap();
    assert!(tex.contains("{3 --- 2}"));
}

/// Timestamps with colon-less offsets convert like any other.
#[test]
fn offset_timestamps_convert() {
    let log = "2024-01-01 09:05:00 +0000  <alice> hi\n20240101T090600  <alice> again\n";
    let tex = document::render_document(log, &Config::default()).unwrap();
    assert!(tex.contains(r"\makebox[2em][r]{9}:05 a.m."));
    assert!(tex.contains(r"\hspace{2em}:06"));
}

/// Untrusted accounts are credited for mode changes.
#[test]
fn trusted_accounts_are_configurable() {
    let log = "2024-01-01T09:05:00  *** ChanServ sets mode: +v bob\n";
    let config = Config::from_json(r#"{"trustedAccounts": []}"#).unwrap();
    let tex = document::render_document(log, &config).unwrap();
    assert!(tex.contains(r"{\textsc{bob was voiced by chanserv}}"));
}

/// Long relay output following a list request collapses to an ellipsis once.
#[test]
fn list_dump_is_suppressed_once() {
    let dump = "q ".repeat(200);
    let log = format!(
        "2024-01-01T09:05:00  <cantide> !lst\n\
         2024-01-01T09:05:01  <cantide> {dump}\n\
         2024-01-01T09:05:02  <cantide> {dump}\n"
    );
    let blocks = log2tex::renderer::convert(&log, &Config::default().render_options()).unwrap();
    assert_eq!(blocks.len(), 4);
    assert!(blocks[2].ends_with(r"{\ldots}"));
    assert!(blocks[3].contains("q q q"));
}

/// A file converts to `<name>.tex` alongside it.
#[test]
fn converts_file_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("chan.log");
    fs::write(&input, SAMPLE_LOG).unwrap();

    let out = files::convert_file(&input, &Config::default()).unwrap();

    assert_eq!(out, dir.path().join("chan.log.tex"));
    let tex = fs::read_to_string(&out).unwrap();
    assert!(tex.contains(r"\chapter*{Monday, January 1}"));
}

/// A malformed line fails the run and leaves no output behind.
#[test]
fn malformed_line_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.log");
    fs::write(
        &input,
        "2024-01-01T09:05:00  <alice> fine\n2024-01-01T09:05:01  -!- netsplit\n",
    )
    .unwrap();

    let err = files::convert_file(&input, &Config::default()).unwrap_err();

    match err {
        FileError::Convert {
            source:
                ConvertError::Line {
                    line: 2,
                    source: LineError::UnparseableLine { .. },
                },
            ..
        } => {}
        other => panic!("Expected unparseable line 2, got {other:?}"),
    }
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the input should remain");
}

/// A bad timestamp is fatal.
#[test]
fn malformed_timestamp_is_fatal() {
    let err = document::render_document("last tuesday  <bob> hi\n", &Config::default())
        .unwrap_err();
    let ConvertError::Line { line, source } = err;
    assert_eq!(line, 1);
    assert!(matches!(source, LineError::InvalidTimestamp { .. }));
}

/// A missing input file is reported as a read error.
#[test]
fn missing_input_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = files::convert_file(&dir.path().join("nope.log"), &Config::default()).unwrap_err();
    assert!(matches!(err, FileError::ReadLog { .. }));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
