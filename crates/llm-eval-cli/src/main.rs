//! # llm-eval-cli
//!
//! Binary entry point for LLM Eval.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Logging initialization
//! - `llm-eval run`: every experiment suite of a suite file
//! - `llm-eval session`: a single session from one instruction directory

mod progress;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use llm_eval_adapters::{CommandEngine, EngineCommand};
use llm_eval_core::{RoundReport, SuiteController, SuiteReport, load_suites, plan_suite};
use llm_eval_proto::{ConsoleSink, LineSink, QuietSink};
use progress::BarProgress;
use std::io::{IsTerminal, stderr, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
}

/// LLM Eval - run experiment suites of multi-party chat sessions
#[derive(Parser, Debug)]
#[command(name = "llm-eval", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (streams engine output and enables debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every experiment suite listed in a suite file
    Run(RunArgs),

    /// Run a single session from one instruction directory
    Session(SessionArgs),
}

/// How to launch the conversation engine.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Conversation engine program
    #[arg(long)]
    engine: Option<String>,

    /// Argument passed to the engine program (repeatable)
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Terminate an engine session after this many seconds
    #[arg(long)]
    engine_timeout: Option<u64>,
}

impl EngineArgs {
    fn build(&self) -> Result<CommandEngine> {
        let program = self
            .engine
            .clone()
            .context("No conversation engine given; pass --engine <PROGRAM>")?;
        let command = EngineCommand::new(program).args(self.engine_args.iter().cloned());
        Ok(CommandEngine::new(command).with_timeout(self.engine_timeout.map(Duration::from_secs)))
    }
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug)]
struct RunArgs {
    /// Configuration file for the experiment suites
    #[arg(short = 'c', long)]
    exp_suites_conf: PathBuf,

    /// Directory to save output files
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Validate the suites and list their combinations without running them
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Arguments for the session subcommand.
#[derive(Parser, Debug)]
struct SessionArgs {
    /// Party configuration template
    #[arg(short, long)]
    party_conf: PathBuf,

    /// Experiment configuration
    #[arg(short = 't', long)]
    exp_conf: PathBuf,

    /// Directory containing the initial instructions, one file per attendee
    #[arg(short, long)]
    init_instr_dir: PathBuf,

    /// Directory to save output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(stderr)
        .init();

    let use_colors = cli.color.should_use_colors();
    match cli.command {
        Commands::Run(args) => run_command(args, cli.verbose, use_colors).await,
        Commands::Session(args) => session_command(args, cli.verbose, use_colors).await,
    }
}

fn make_sink(verbose: bool) -> Box<dyn LineSink> {
    if verbose {
        Box::new(ConsoleSink::new())
    } else {
        Box::new(QuietSink)
    }
}

async fn run_command(args: RunArgs, verbose: bool, use_colors: bool) -> Result<()> {
    let suites = load_suites(&args.exp_suites_conf)
        .with_context(|| format!("Failed to load suites from {:?}", args.exp_suites_conf))?;
    info!(
        suites = suites.len(),
        path = %args.exp_suites_conf.display(),
        "Loaded experiment suites"
    );

    if args.dry_run {
        return print_plan(&suites, use_colors);
    }

    let engine = args.engine.build()?;
    let mut controller = SuiteController::new(&engine, &args.output_dir);
    if !verbose && stderr().is_terminal() {
        controller = controller.with_progress(Arc::new(BarProgress::new()));
    }

    let mut sink = make_sink(verbose);
    let reports = controller
        .run_exp_suites(&suites, sink.as_mut())
        .await
        .context("Experiment suite failed")?;

    print_suite_summary(&reports, controller.output_dir(), use_colors);
    Ok(())
}

async fn session_command(args: SessionArgs, verbose: bool, use_colors: bool) -> Result<()> {
    let engine = args.engine.build()?;
    let controller = SuiteController::new(&engine, &args.output_dir);

    let mut sink = make_sink(verbose);
    let rounds = controller
        .run_single_session(&args.init_instr_dir, &args.party_conf, &args.exp_conf, sink.as_mut())
        .await
        .context("Chat session failed")?;

    print_rounds(&rounds, use_colors);
    Ok(())
}

fn print_plan(suites: &[serde_yaml::Value], use_colors: bool) -> Result<()> {
    use colors::*;

    println!("Dry run mode - experiment suites:");
    let mut total = 0;
    for (i, raw) in suites.iter().enumerate() {
        let (suite, combinations) =
            plan_suite(raw).with_context(|| format!("Suite {} is invalid", i + 1))?;
        total += combinations.len();

        if use_colors {
            println!("{BOLD}Suite {}{RESET}", i + 1);
        } else {
            println!("Suite {}", i + 1);
        }
        println!("  Party conf: {}", suite.party_conf.display());
        println!("  Exp conf: {}", suite.exp_conf.display());
        println!("  Instruction dirs: {}", suite.init_instr_dirs.len());
        println!("  Combinations: {}", combinations.len());
        for (n, combination) in combinations.iter().enumerate() {
            if use_colors {
                println!("    {DIM}{:>3}.{RESET} {combination}", n + 1);
            } else {
                println!("    {:>3}. {combination}", n + 1);
            }
        }
    }
    println!("Total combinations: {total}");
    Ok(())
}

fn print_suite_summary(reports: &[SuiteReport], output_dir: &Path, use_colors: bool) {
    use colors::*;

    let output_dir = output_dir.display();
    let combinations: usize = reports.iter().map(|r| r.combinations.len()).sum();
    let rounds: usize = reports.iter().map(SuiteReport::rounds).sum();
    let artifacts: usize = reports.iter().map(SuiteReport::artifacts).sum();
    let elapsed: f64 = reports.iter().map(|r| r.elapsed_secs).sum();
    let separator = "─".repeat(58);

    if use_colors {
        println!("\n{BOLD}┌{separator}┐{RESET}");
        println!("{BOLD}│{RESET} {GREEN}{BOLD}✓{RESET} Experiment suites complete");
        println!("{BOLD}├{separator}┤{RESET}");
        println!("{BOLD}│{RESET}   Suites:       {CYAN}{}{RESET}", reports.len());
        println!("{BOLD}│{RESET}   Combinations: {CYAN}{combinations}{RESET}");
        println!("{BOLD}│{RESET}   Rounds:       {CYAN}{rounds}{RESET}");
        println!("{BOLD}│{RESET}   Artifacts:    {CYAN}{artifacts}{RESET} in {output_dir}");
        println!("{BOLD}│{RESET}   Elapsed:      {CYAN}{elapsed:.1}s{RESET}");
        println!("{BOLD}└{separator}┘{RESET}");
    } else {
        println!("\n+{}+", "-".repeat(58));
        println!("| ✓ Experiment suites complete");
        println!("+{}+", "-".repeat(58));
        println!("|   Suites:       {}", reports.len());
        println!("|   Combinations: {combinations}");
        println!("|   Rounds:       {rounds}");
        println!("|   Artifacts:    {artifacts} in {output_dir}");
        println!("|   Elapsed:      {elapsed:.1}s");
        println!("+{}+", "-".repeat(58));
    }
}

fn print_rounds(rounds: &[RoundReport], use_colors: bool) {
    use colors::*;

    for report in rounds {
        if use_colors {
            println!(
                "{GREEN}✓{RESET} Round {} {DIM}({} messages, {}ms){RESET} → {}",
                report.round,
                report.messages,
                report.elapsed_ms,
                report.artifacts.chat_history.display()
            );
        } else {
            println!(
                "Round {} ({} messages, {}ms) -> {}",
                report.round,
                report.messages,
                report.elapsed_ms,
                report.artifacts.chat_history.display()
            );
        }
    }
}
