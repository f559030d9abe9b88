//! Charm-style CLI flow using cliclack

use super::prompter::ClackPrompter;
use crate::config::Settings;
use crate::hooks::HookOutcome;
use crate::project::{CreateRequest, Scaffolder};
use crate::questions::{DefaultAnswers, Prompter};
use crate::repository::{GithubFetcher, RepositoryIdentity};
use crate::templates::{CacheStatus, TemplateCache};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Template repository as `owner/repo`
    pub template: String,

    /// Project name; skips the name question
    pub name: Option<String>,

    /// Project directory to create (defaults to `./<name>`)
    pub directory: Option<PathBuf>,

    /// Download the template even if the cached copy is current
    pub refresh: bool,

    /// Answer every question with its default (non-interactive mode)
    pub yes: bool,
}

/// Run the create command with interactive prompts
pub async fn run(settings: &Settings, args: CreateArgs) -> Result<()> {
    cliclack::intro(format!("ctp {}", args.template))?;

    let identity = RepositoryIdentity::parse(&args.template)?;
    let fetcher = GithubFetcher::from_settings(settings);
    let scaffolder = Scaffolder::from_settings(settings, &fetcher);

    let mut request = CreateRequest::new(identity).with_refresh(args.refresh);
    request.name = args.name.clone();
    request.directory = args.directory.clone();

    // Step 1: Make sure the template is cached
    let spinner = cliclack::spinner();
    spinner.start("Fetching template...");
    let prepared = match scaffolder.prepare(request).await {
        Ok(prepared) => prepared,
        Err(e) => {
            spinner.stop("Failed to load template");
            return Err(e.into());
        }
    };

    match &prepared.status {
        CacheStatus::Hit => spinner.stop("Template is up to date"),
        CacheStatus::Refreshed => spinner.stop("Downloaded template"),
        CacheStatus::Stale { reason } => {
            spinner.stop("Using cached template");
            cliclack::log::warning(format!("Could not update the template: {}", reason))?;
        }
    }

    // Step 2: Ask the manifest's questions
    let answers = if args.yes {
        DefaultAnswers::new().prompt(&prepared.questions)?
    } else {
        ClackPrompter::new().prompt(&prepared.questions)?
    };

    // Step 3: Copy and substitute
    let cwd = std::env::current_dir()?;
    let spinner = cliclack::spinner();
    spinner.start("Creating project...");
    let project = match scaffolder.materialize(&prepared, answers, &cwd).await {
        Ok(project) => project,
        Err(e) => {
            spinner.stop("Failed to create project");
            return Err(e.into());
        }
    };
    spinner.stop(format!(
        "Created {} files in {}",
        project.files.len(),
        project.path.display()
    ));

    for skipped in &project.substitution.skipped {
        cliclack::log::remark(format!("Not a text file, left as is: {}", skipped.display()))?;
    }

    // Step 4: Run hooks
    if !project.hooks().is_empty() {
        cliclack::log::step("Running hooks")?;
    }
    let report = scaffolder.run_hooks(&project).await;
    for failure in report.failures() {
        let detail = match &failure.outcome {
            HookOutcome::Exited(code) => format!("exited with status {}", code),
            HookOutcome::SpawnFailed(error) => format!("could not be started: {}", error),
        };
        cliclack::log::warning(format!("Hook `{}` {}", failure.command, detail))?;
    }

    cliclack::outro(format!("Project created at {}", project.path.display()))?;

    Ok(())
}

/// Print the cached templates
pub async fn list(settings: &Settings) -> Result<()> {
    let cache = TemplateCache::new(&settings.cache_root);
    let keys = cache.list().await?;

    println!(
        "  {} Templates {}",
        "◇".blue(),
        format!("({})", cache.root().display()).dimmed()
    );

    if keys.is_empty() {
        println!("    {}", "No templates downloaded yet.".dimmed());
        return Ok(());
    }

    for key in keys {
        println!("    {} {}", "└".dimmed(), key.bold());
    }

    Ok(())
}
