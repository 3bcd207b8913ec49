//! CLI argument definitions

use clap::{Parser, Subcommand};
use seltrace_common::DEFAULT_OUTPUT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "seltrace",
    version,
    about = "Selectively trace memory accesses inside watched address ranges",
    after_help = "\
EXAMPLES:
    seltrace run demo.json                   Replay a simulated target, log to seltrace.out
    seltrace run demo.json -o demo.out       Choose the trace log path
    seltrace summary demo.out                Count records in a finished trace log"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a JSON simulation script through the tracer
    Run {
        /// Simulation script (control calls, executions, exit)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Trace log to create (truncated if it exists)
        #[arg(short, long, value_name = "FILE", env = "SELTRACE_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Suppress non-essential output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Summarise a finished trace log
    Summary {
        /// Trace log to read
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Fail if the log lacks the #eof sentinel
        #[arg(long)]
        strict: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_run_defaults_output() {
        let args = Args::try_parse_from(["seltrace", "run", "script.json"]).unwrap();
        match args.command {
            Command::Run { script, output, quiet } => {
                assert_eq!(script, PathBuf::from("script.json"));
                // SELTRACE_OUTPUT may be set in the environment running the tests
                if std::env::var_os("SELTRACE_OUTPUT").is_none() {
                    assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT));
                }
                assert!(!quiet);
            }
            Command::Summary { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_summary_strict_flag() {
        let args = Args::try_parse_from(["seltrace", "summary", "trace.out", "--strict"]).unwrap();
        assert!(matches!(args.command, Command::Summary { strict: true, .. }));
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["seltrace"]).is_err());
    }
}
