//! Stacker CLI: incremental builds of small C and C++ projects.
//!
//! `stacker build` resolves the selected blueprint configuration, scans every
//! source for its header dependencies, recompiles only what changed since the
//! previous build and links the executable. `stacker clean` empties the build
//! and binary directories.

#![warn(missing_docs)]

mod build;
mod clean;
mod console;
mod pipeline;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stacker_common::StackerError;
use stacker_config::DEFAULT_MAX_DEPTH;

use crate::console::Console;

/// Stacker, a small incremental C/C++ builder.
#[derive(Parser, Debug)]
#[command(name = "stacker", version, about = "Incremental C/C++ builder", arg_required_else_help = true)]
pub struct Cli {
    /// Path to the blueprint file.
    #[arg(short = 'f', long = "file", global = true, default_value = "blueprint.toml")]
    pub blueprint: PathBuf,

    /// Name of the configuration to use.
    #[arg(short = 'c', long = "config", global = true, default_value = "default")]
    pub profile: String,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Longest chain of `${name}` references accepted in the blueprint.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Ignore the build cache and compare against existing object files.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Compile what changed and link the executable.
    Build,
    /// Remove everything in the build and binary directories.
    Clean,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when writing to a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    /// Blueprint file path.
    pub blueprint: PathBuf,
    /// Selected configuration.
    pub profile: String,
    /// Depth bound of the variable graph.
    pub max_depth: usize,
    /// Whether the build cache is bypassed.
    pub no_cache: bool,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stdout().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    init_tracing(cli.verbose, cli.quiet, color);

    let console = Console::new(color, cli.quiet);
    let global = GlobalArgs {
        blueprint: cli.blueprint,
        profile: cli.profile,
        max_depth: cli.max_depth,
        no_cache: cli.no_cache,
    };

    let result = match cli.command {
        Command::Build => build::run(&global, &console).map(drop),
        Command::Clean => clean::run(&global, &console).map(drop),
    };

    if let Err(e) = result {
        report(&console, &e);
        process::exit(1);
    }
}

fn report(console: &Console, error: &StackerError) {
    console.error(&error.to_string());
    if let Some(diagnostics) = error.diagnostics() {
        console.diagnostics(diagnostics);
    }
    console.error("Aborting");
}

fn init_tracing(verbose: bool, quiet: bool, color: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();
}
