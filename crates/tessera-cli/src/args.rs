//! Command-line argument definitions for the Tessera CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Each [`Command`] works on one design document; the
//! configuration file and logging verbosity apply to all of them.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Tessera designer tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a design document and report every issue found
    Validate {
        #[arg(help = "Path to the design document")]
        input: String,
    },

    /// Rewrite a design document in canonical form
    Normalize {
        #[arg(help = "Path to the design document")]
        input: String,

        /// Where to write the result (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the element tree of a design document
    Tree {
        #[arg(help = "Path to the design document")]
        input: String,
    },
}

impl Command {
    pub fn input(&self) -> &str {
        match self {
            Command::Validate { input } | Command::Normalize { input, .. } | Command::Tree { input } => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "tessera",
            "normalize",
            "shop.tdm",
            "-o",
            "out.tdm",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.log_level, "debug");
        assert!(args.config.is_none());
        match args.command {
            Command::Normalize { input, output } => {
                assert_eq!(input, "shop.tdm");
                assert_eq!(output.as_deref(), Some("out.tdm"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["tessera", "validate"]).is_err());
    }

    #[test]
    fn test_command_input() {
        let args = Args::try_parse_from(["tessera", "--config", "c.toml", "tree", "a.tdm"]).unwrap();
        assert_eq!(args.command.input(), "a.tdm");
        assert_eq!(args.config.as_deref(), Some("c.toml"));
        assert_eq!(args.log_level, "warn");
    }
}
