//! CLI for operator-flip mutation testing

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use opflip::{list_mutations, Config, MutationReport, MutationRunner, ShellExecutor};

#[derive(Parser)]
#[command(name = "opflip")]
#[command(author, version, about = "Operator-flip mutation testing for Rust", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run mutation tests
    Run {
        /// Path to the mutations config file
        #[arg(short, long, default_value = "mutations.yaml")]
        config: PathBuf,

        /// Project directory (defaults to current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the mutations that would be tested, without running tests
    List {
        /// Path to the mutations config file
        #[arg(short, long, default_value = "mutations.yaml")]
        config: PathBuf,

        /// Project directory (defaults to current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Show example configuration
    Example,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    init_logging(verbose);

    let outcome = match cli.command {
        Commands::Run {
            config, project, ..
        } => run_tests(&config, project),
        Commands::List { config, project } => list(&config, project),
        Commands::Example => {
            print_example();
            Ok(ExitCode::SUCCESS)
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config_path: &Path) -> Result<Config> {
    println!("{}", "Loading configuration...".dimmed());
    let config = Config::load(config_path)?;

    if let Err(errors) = config.validate() {
        eprintln!("{}", "Configuration errors found:".red().bold());
        for error in &errors {
            eprintln!("  • {}", error);
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path.display());
    }

    Ok(config)
}

fn run_tests(config_path: &Path, project: Option<PathBuf>) -> Result<ExitCode> {
    let project_dir = project.unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(config_path)?;

    println!(
        "Running `{}` against each mutant in {}",
        config.test_command,
        project_dir.display()
    );
    println!();

    let executor = ShellExecutor::new(&project_dir).with_timeout(config.settings.timeout());
    let verdicts = MutationRunner::new(&config, &project_dir, executor)
        .on_verdict(MutationReport::print_progress)
        .run()
        .context("mutation run aborted; results so far cannot be trusted")?;

    let report = MutationReport::new(verdicts);
    report.print();

    if report.survived() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn list(config_path: &Path, project: Option<PathBuf>) -> Result<ExitCode> {
    let project_dir = project.unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(config_path)?;

    let mutations = list_mutations(&config, &project_dir)?;
    for mutation in &mutations {
        println!(
            "{} {} -> {}",
            format!("{}:{}:{}", mutation.file_path, mutation.line_number, mutation.column).dimmed(),
            mutation.original_code,
            mutation.mutated_code
        );
    }

    println!();
    println!("{} mutation(s) found", mutations.len());
    Ok(ExitCode::SUCCESS)
}

fn print_example() {
    let example = r#"# Example mutations.yaml configuration file
version: "1.0"

settings:
  timeout: 120  # seconds per test run; omit for no timeout

# Files to mutate
include:
  - src/**/*.rs

# Files never mutated, even when included above
exclude:
  - src/generated/**/*.rs

# Run once per mutant; a failing run kills the mutant
test_command: cargo test --quiet
"#;

    println!("{}", example);
}
