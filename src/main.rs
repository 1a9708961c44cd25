// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for log2tex.
//!
//! This binary provides the `log2tex` command, which converts an IRC log (or
//! every `.log` file in a directory) into LaTeX written next to the input.

use log2tex::document::{self, Config};
use log2tex::files;
use lexopt::prelude::*;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

struct Cli {
    input: PathBuf,
    config: Option<PathBuf>,
    quiet: bool,
    dry_run: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("invalid configuration {}: {source}", path.display()))]
    ParseConfig {
        path: PathBuf,
        source: document::ConfigError,
    },

    #[snafu(display("{source}"))]
    Convert { source: files::FileError },
}

fn help_text() -> String {
    format!(
        "\
{name} {version}
Typeset IRC chat logs as a LaTeX book

Usage: {name} [OPTIONS] <LOG>

Arguments:
  <LOG>  Log file, or directory of .log files; writes <LOG>.tex

Options:
  -c, --config <FILE>  JSON configuration (title page, bots, trusted accounts)
  -q, --quiet          Suppress progress messages
  -n, --dry-run        Show what would be written without converting
  -h, --help           Print help
  -V, --version        Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Prints usage to stderr and exits without converting anything.
fn usage_exit() -> ! {
    eprintln!("{}", help_text());
    std::process::exit(2);
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut config = None;
    let mut quiet = false;
    let mut dry_run = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('c') | Long("config") => config = Some(parser.value()?.parse()?),
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('h') | Long("help") => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => inputs.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    // Exactly one log or directory
    let [input] = <[PathBuf; 1]>::try_from(inputs).unwrap_or_else(|_| usage_exit());

    Ok(Cli {
        input,
        config,
        quiet,
        dry_run,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    let config = load_config(cli.config.as_deref())?;

    for file in collect_logs(&cli.input) {
        if cli.dry_run {
            let out = files::output_path(&file).context(ConvertSnafu)?;
            eprintln!("Would write {}", out.display());
            continue;
        }
        let out = files::convert_file(&file, &config).context(ConvertSnafu)?;
        if !cli.quiet {
            eprintln!("Wrote {}", out.display());
        }
    }

    Ok(())
}

/// Reads the configuration file, or returns the defaults if none was given.
fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let json = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
    Config::from_json(&json).context(ParseConfigSnafu { path })
}

/// Expands a directory into the `.log` files beneath it, in path order.
fn collect_logs(input: &Path) -> Vec<PathBuf> {
    if !input.is_dir() {
        return vec![input.to_path_buf()];
    }
    WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "log"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
