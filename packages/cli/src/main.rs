mod commands;
mod config;
mod render;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{outline, pdf, OutlineArgs, PdfArgs};
use tracing_subscriber::EnvFilter;

/// Scriptform CLI - screenplay pagination and export
#[derive(Parser, Debug)]
#[command(name = "scriptform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log pagination progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paginate a screenplay and write it as PDF
    Pdf(PdfArgs),

    /// Print the scene outline with scene lengths
    Outline(OutlineArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Pdf(args) => pdf(args, &cwd),
        Command::Outline(args) => outline(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
