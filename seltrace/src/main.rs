//! # seltrace - Main Entry Point
//!
//! Two subcommands:
//! - **run** (`seltrace run script.json`): replay a simulated target through
//!   the tracer, writing the trace log
//! - **summary** (`seltrace summary seltrace.out`): count what a finished log
//!   contains

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use seltrace::cli::{Args, Command};
use seltrace::domain::TraceError;
use seltrace::engine::{Script, SimulatedEngine};
use seltrace::output::TraceSummary;
use seltrace::session::EXIT_IO;
use seltrace::{Session, SessionConfig};
use std::path::{Path, PathBuf};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(code) => code,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<TraceError>() {
        Some(trace_err) if trace_err.is_resource_error() => EXIT_IO,
        Some(
            TraceError::UnknownEntryPoint(_)
            | TraceError::ArgumentCount { .. }
            | TraceError::InvalidScript(_)
            | TraceError::Json(_),
        ) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<i32> {
    let args = Args::parse();
    match args.command {
        Command::Run { script, output, quiet } => run_script(&script, output, quiet),
        Command::Summary { log, strict } => {
            summarize(&log, strict)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Replay `script_path` and return the simulated target's exit code
fn run_script(script_path: &Path, output: PathBuf, quiet: bool) -> Result<i32> {
    let script = Script::from_file(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;
    info!("Loaded {} step(s) from {}", script.steps().len(), script_path.display());

    let config = SessionConfig { output };
    let session = Session::create(&config)?;

    let mut engine = SimulatedEngine::new();
    session.attach(&mut engine);
    let code = script.run(&mut engine);

    if !quiet {
        let stats = session.stats();
        println!("Target exited with code {code}");
        println!("  Control calls:     {}", stats.control_calls);
        println!("  Accesses recorded: {}", stats.recorded);
        println!("  Accesses filtered: {}", stats.filtered);
        println!("  Trace log:         {}", config.output.display());
    }
    Ok(code)
}

fn summarize(log: &Path, strict: bool) -> Result<()> {
    let summary = TraceSummary::from_file(log)
        .with_context(|| format!("Failed to read trace log {}", log.display()))?;

    println!("{}", log.display());
    println!("  watch:                 {}", summary.watch_calls);
    println!("  unwatch:               {}", summary.unwatch_calls);
    println!("  toggleTracing:         {}", summary.toggle_calls);
    println!("  Reads:                 {}", summary.reads);
    println!("  Writes:                {}", summary.writes);
    println!("  Distinct instructions: {}", summary.instructions.len());
    println!("  Distinct addresses:    {}", summary.data_addresses.len());
    println!("  Complete:              {}", if summary.complete { "yes" } else { "no (truncated)" });

    if strict && !summary.complete {
        anyhow::bail!("{} is truncated: target did not exit normally", log.display());
    }
    Ok(())
}
