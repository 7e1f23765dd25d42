use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use triage::commands::{analyze, batch, context, lint, test, GlobalOptions};
use triage::logging::init_logging;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Run Xcode tests and lint, and diagnose what failed", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: triage.toml next to the project)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the structured report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging to stderr (TRIAGE_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and test a scheme, retrying while tests fail
    Test {
        /// .xcodeproj, .xcworkspace, or a directory holding one
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Scheme to test
        #[arg(short, long)]
        scheme: String,

        /// xcodebuild destination (default from config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Restrict to these tests (Target/Class/method); repeatable
        #[arg(long = "only-testing")]
        only_testing: Vec<String>,

        /// Maximum attempts (default from config)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Report the first failing attempt without retrying
        #[arg(long)]
        no_retry: bool,
    },

    /// Run SwiftLint and report violations
    Lint {
        /// Directory or file to lint
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Explicit swiftlint binary
        #[arg(long)]
        swiftlint: Option<PathBuf>,
    },

    /// Diagnose an existing result bundle (or exported result tree directory)
    Analyze {
        /// Path to the .xcresult bundle
        bundle: PathBuf,

        /// Root for resolving relative source paths
        #[arg(short, long)]
        project_root: Option<PathBuf>,
    },

    /// Show the source context extracted for a file and line
    Context {
        /// Source file, relative to --root or absolute
        file: String,

        /// 1-based line number of the failure
        #[arg(short, long)]
        line: Option<u32>,

        /// Project root for relative paths
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Run a JSON array of task requests on the worker pool
    Batch {
        /// File holding the requests
        requests: PathBuf,

        /// Worker count (default from config)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Report the first failing attempt of each test task without retrying
        #[arg(long)]
        no_retry: bool,
    },
}

fn run(cli: Cli) -> Result<bool> {
    let mut options = GlobalOptions {
        config: cli.config,
        json: cli.json,
        no_retry: false,
    };

    match cli.command {
        Commands::Test {
            project,
            scheme,
            destination,
            only_testing,
            max_attempts,
            no_retry,
        } => {
            options.no_retry = no_retry;
            let args = test::TestArgs {
                project,
                scheme,
                destination,
                only_testing,
                max_attempts,
            };
            test::execute(args, &options)
        }
        Commands::Lint { path, swiftlint } => lint::execute(path, swiftlint, &options),
        Commands::Analyze {
            bundle,
            project_root,
        } => analyze::execute(bundle, project_root, &options),
        Commands::Context { file, line, root } => context::execute(&file, line, &root, options.json),
        Commands::Batch {
            requests,
            concurrency,
            no_retry,
        } => {
            options.no_retry = no_retry;
            batch::execute(&requests, concurrency, &options)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
