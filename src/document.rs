// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Assembly of the final LaTeX document.
//!
//! The document is a fixed preamble (with a title page filled in from the
//! configuration), the rendered blocks separated by blank lines, and a fixed
//! footer. The preamble defines every macro the other modules emit.
//!
//! # Configuration
//!
//! Configuration is a JSON object; every field is optional:
//!
//! ```json
//! {
//!     "header": {
//!         "CHANNEL": "#uweng",
//!         "TIMEFRAME": "Fall 2008",
//!         "YEAR": "2009",
//!         "DEDICATION": "For everyone who idled.",
//!         "URL": "http://example.com/uweng"
//!     },
//!     "bots": ["cantide"],
//!     "trustedAccounts": ["chanserv"]
//! }
//! ```
//!
//! Each `header` entry replaces `@KEY@` in the header template. Values are
//! escaped, so they are typeset literally.
//!
//! # Example
//!
//! ```
//! use log2tex::document::{render_document, Config};
//!
//! let config = Config::from_json(r##"{"header": {"CHANNEL": "#rust"}}"##).unwrap();
//! let tex = render_document("2024-01-01T09:05:00  <alice> hi\n", &config).unwrap();
//!
//! assert!(tex.starts_with(r"\documentclass"));
//! assert!(tex.contains(r"\#rust"));
//! assert!(tex.trim_end().ends_with(r"\end{document}"));
//! ```

use crate::escape::escape;
use crate::parser::RenderOptions;
use crate::renderer::{ConvertError, convert};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use snafu::prelude::*;
use std::collections::BTreeMap;

/// The document preamble and title page.
pub const HEADER: &str = r"\documentclass[twocolumn]{book}

\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[bitstream-charter]{mathdesign}
\usepackage{color}

\setlength{\columnsep}{1in}
\flushbottom
\newcommand{\onleft}[1]{\makebox[0em][r]{{#1}\hspace*{0.1in}}}
\newcommand{\onright}[1]{\makebox[0em][l]{\hspace*{\columnwidth}\hspace*{0.1in}{#1}}}
\newcommand{\sides}[2]{\onleft{#1}\onright{#2}}
\setlength{\oddsidemargin}{2em}
\setlength{\parindent}{0em}

\usepackage[hang, splitrule]{footmisc}
\addtolength{\footskip}{0.5cm}
\setlength{\footnotemargin}{0.3cm}
\setlength{\footnotesep}{0.4cm}
\makeatletter
\let\splitfootnoterule=\pagefootnoterule
\makeatother

\newcommand{\mytilde}{{\raise.17ex\hbox{$\scriptstyle\mathtt{\sim}$}}}

\definecolor{grey}{gray}{0.75}
\newcommand{\grey}[1]{\textcolor{grey}{#1}}
\newcommand{\name}[1]{\textsf{\small{#1}}}
\newcommand{\actstar}{*\hspace*{-0.15em}}
\newcommand{\metabullet}{\grey{$\triangleright$}}
\newcommand{\degrees}{$^\circ$}
\newcommand{\urlind}{\textsc{{\scriptsize[}url{\scriptsize]}}}

\begin{document}

\begin{titlepage}
\centering
\vspace*{\fill}
{\Huge @CHANNEL@\par}
\vspace{1em}
{\Large @TIMEFRAME@\par}
\vspace*{\fill}
{\itshape @DEDICATION@\par}
\vspace*{\fill}
{\small @URL@\par}
{\small @YEAR@\par}
\end{titlepage}

";

/// Closes the document.
pub const FOOTER: &str = r"

\end{document}
";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Z_]+)@").unwrap());

/// Error type for configuration loading.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// The configuration is not valid JSON for [`Config`].
    #[snafu(display("failed to parse configuration: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// Settings for one book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Header placeholder values, keyed by placeholder name.
    pub header: BTreeMap<String, String>,

    /// Name prefixes identifying relay bots.
    pub bots: Vec<String>,

    /// Accounts whose mode changes are not attributed.
    pub trusted_accounts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let opts = RenderOptions::default();
        Self {
            header: BTreeMap::new(),
            bots: opts.bot_prefixes,
            trusted_accounts: opts.trusted_accounts,
        }
    }
}

impl Config {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has fields of the wrong
    /// type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).context(JsonSnafu)
    }

    /// The line interpretation settings implied by this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            bot_prefixes: self.bots.iter().map(|b| b.to_lowercase()).collect(),
            trusted_accounts: self
                .trusted_accounts
                .iter()
                .map(|a| a.to_lowercase())
                .collect(),
        }
    }
}

/// Fills the header template's `@KEY@` placeholders.
///
/// Placeholders without a configured value are removed.
#[must_use]
pub fn render_header(config: &Config) -> String {
    PLACEHOLDER_RE
        .replace_all(HEADER, |caps: &Captures<'_>| {
            config
                .header
                .get(&caps[1])
                .map(|value| escape(value))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Joins a rendered header and blocks into a complete document.
#[must_use]
pub fn assemble(header: &str, blocks: &[String]) -> String {
    let mut out = String::with_capacity(
        header.len() + FOOTER.len() + blocks.iter().map(|b| b.len() + 2).sum::<usize>(),
    );
    out.push_str(header);
    out.push_str(&blocks.join("\n\n"));
    out.push_str(FOOTER);
    out
}

/// Converts a whole log into a complete LaTeX document.
///
/// # Errors
///
/// Returns an error for the first line of `log` that cannot be parsed.
pub fn render_document(log: &str, config: &Config) -> Result<String, ConvertError> {
    let blocks = convert(log, &config.render_options())?;
    Ok(assemble(&render_header(config), &blocks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_default_options() {
        assert_eq!(Config::default().render_options(), RenderOptions::default());
    }

    #[test]
    fn parses_partial_config() {
        let config = Config::from_json(r#"{"bots": ["Relay"]}"#).unwrap();
        assert_eq!(config.bots, vec!["Relay"]);
        assert_eq!(config.trusted_accounts, vec!["chanserv"]);
        assert!(config.header.is_empty());
        assert_eq!(config.render_options().bot_prefixes, vec!["relay"]);
    }

    #[test]
    fn rejects_malformed_config() {
        let err = Config::from_json(r#"{"bots": "cantide"}"#).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse configuration"));
    }

    #[test]
    fn substitutes_and_escapes_placeholders() {
        let mut config = Config::default();
        config.header.insert("CHANNEL".into(), "#uweng".into());
        config.header.insert("YEAR".into(), "2009".into());
        let header = render_header(&config);

        assert!(header.contains(r"{\Huge \#uweng\par}"));
        assert!(header.contains(r"{\small 2009\par}"));
        assert!(header.contains(r"{\Large \par}"));
        assert!(!header.contains('@'));
    }

    #[test]
    fn assembles_blocks_between_header_and_footer() {
        let blocks = vec!["{a}".to_owned(), "{b}".to_owned()];
        assert_eq!(assemble("H\n", &blocks), "H\n{a}\n\n{b}\n\n\\end{document}\n");
    }

    #[test]
    fn header_defines_emitted_macros() {
        for name in [
            r"\onleft", r"\onright", r"\sides", r"\mytilde", r"\grey", r"\name",
            r"\actstar", r"\metabullet", r"\degrees", r"\urlind",
        ] {
            assert!(
                HEADER.contains(&format!(r"\newcommand{{{name}}}")),
                "missing {name}"
            );
        }
    }

    #[test]
    fn render_document_propagates_errors() {
        let err = render_document("garbage\n", &Config::default()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
