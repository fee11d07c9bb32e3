#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use cmin_core::config::ScopePolicySetting;
use cmin_core::Config;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cmin")]
#[command(author, version, about = "Shorten identifiers in C sources", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Rename the identifiers of a C source file
    Minify {
        /// Source file to rewrite
        source: PathBuf,

        /// Event trace produced by the frontend for SOURCE
        #[arg(long, short = 't', value_name = "TRACE")]
        trace: PathBuf,

        /// Output file (default: out.c, or `output` from the config)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Config file (default: cmin.json in the working directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Function that keeps its name (default: main)
        #[arg(long, value_name = "NAME")]
        entry: Option<String>,

        /// Extra names never handed out (e.g., --reserve DEBUG,NDEBUG)
        #[arg(long, value_delimiter = ',')]
        reserve: Vec<String>,

        /// Where nested scopes start counting: inherit or restart
        #[arg(long, value_name = "POLICY")]
        scope_policy: Option<ScopePolicySetting>,

        /// Print the rewritten source to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Print the short names handed out in order
    Symbols {
        /// Number of names to print
        #[arg(long, short = 'n', default_value_t = 64)]
        count: usize,

        /// Allocator index to start from
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Extra names to skip
        #[arg(long, value_delimiter = ',')]
        reserve: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Minify {
            source,
            trace,
            output,
            config: config_file,
            entry,
            reserve,
            scope_policy,
            stdout,
        }) => {
            let action = commands::minify::MinifyAction {
                source,
                trace,
                cwd: config.cwd,
                output,
                config: config_file,
                entry,
                reserve,
                scope_policy,
                stdout,
            };
            commands::minify::run(action, cli.json)
        }
        Some(Commands::Symbols {
            count,
            start,
            reserve,
        }) => commands::symbols::run(start, count, &reserve, cli.json),
    }
}
