//! origami CLI
//!
//! Rewrites `$if`/`$else-if`/`$else`, `$for` and `$let` control tags in
//! markup-in-expression documents into plain-expression form.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use origami_core::Config;

#[derive(Parser)]
#[command(name = "origami")]
#[command(version = origami_core::VERSION)]
#[command(about = "Rewrites control-flow tags into plain expressions")]
#[command(
    long_about = "origami folds the reserved control-flow tags ($if/$else-if/$else, $for, $let)\n\
of markup-in-expression documents into equivalent plain expressions: ternaries,\n\
array mapping and immediately-invoked lambdas. Output is byte-for-byte\n\
substitutable for the input in the surrounding build pipeline.\n\
\n\
Examples:\n  \
origami transform --out-dir dist        # transform everything the config includes\n  \
origami transform --stdout page.mdx     # rewrite one file to stdout\n  \
origami check docs/                     # validate without writing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to origami.toml")]
    config: Option<PathBuf>,

    /// Verbose output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite documents and write the results
    Transform {
        /// Files or directories to transform (default: discover from the
        /// working directory)
        paths: Vec<PathBuf>,

        /// Output directory; input paths are mirrored below it
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print a single file's output to stdout instead of writing
        #[arg(long, conflicts_with = "out_dir")]
        stdout: bool,

        /// Emit .map position files next to rewritten output
        #[arg(long)]
        sourcemap: bool,
    },
    /// Validate documents without writing anything
    Check {
        /// Files or directories to check (default: discover from the
        /// working directory)
        paths: Vec<PathBuf>,

        /// Output format for diagnostics
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "origami=warn",
        1 => "origami=info",
        2 => "origami=debug",
        _ => "origami=trace",
    };
    origami_core::init_tracing_with_filter(default_filter);

    if let Some(threads) = cli.threads {
        // a second invocation in-process would fail; the pool is global
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global();
    }

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("origami: cannot determine working directory: {err}");
            return ExitCode::from(2);
        }
    };
    let config = match Config::resolve(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("origami: {err}");
            return ExitCode::from(2);
        }
    };

    let color = !cli.no_color;
    let result = match cli.command {
        Commands::Transform {
            paths,
            out_dir,
            stdout,
            sourcemap,
        } => commands::transform(&config, &paths, out_dir.as_deref(), stdout, sourcemap, color),
        Commands::Check { paths, format } => {
            commands::check(&config, &paths, format == OutputFormat::Json, color)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("origami: {err:#}");
            ExitCode::from(2)
        }
    }
}
