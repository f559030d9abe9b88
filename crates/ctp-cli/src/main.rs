//! ctp - Create projects from GitHub template repositories

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctp_core::config::Settings;
use ctp_core::tui::CreateArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ctp")]
#[command(about = "Create projects from GitHub template repositories")]
#[command(version)]
pub struct Args {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project from a template
    Create(CliCreateArgs),
    /// List downloaded templates
    List,
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Template repository (owner/repo)
    pub template: String,

    /// Project name
    pub name: Option<String>,

    /// Project directory to create (defaults to ./<name>)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Download the template even if the cached copy is up to date
    #[arg(long)]
    pub refresh: bool,

    /// Answer every question with its default (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            template: args.template,
            name: args.name,
            directory: args.directory,
            refresh: args.refresh,
            yes: args.yes,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::from_env()?;
    tracing::debug!(cache_root = %settings.cache_root.display(), api_url = %settings.api_url, "settings loaded");

    match args.command {
        Command::Create(create_args) => ctp_core::tui::run(&settings, create_args.into()).await,
        Command::List => ctp_core::tui::list(&settings).await,
    }
}
