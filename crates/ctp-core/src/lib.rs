//! ctp Core - Create projects from GitHub template repositories
//!
//! A template is a repository with a `ctp.json` manifest at its root. The
//! manifest lists the values to ask for, the files in which to substitute
//! them, and commands to run once the project exists.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Reference parsing, the template cache, question planning,
//!   case conversion, placeholder substitution and hook execution
//! - **Layer 2: Workflow Orchestration** - [`Scaffolder`] runs the pipeline step by step for custom UIs
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use ctp_core::{CreateRequest, DefaultAnswers, GithubFetcher, RepositoryIdentity, Scaffolder, Settings};
//!
//! let settings = Settings::from_env()?;
//! let fetcher = GithubFetcher::from_settings(&settings);
//! let scaffolder = Scaffolder::from_settings(&settings, &fetcher);
//!
//! let request = CreateRequest::new(RepositoryIdentity::parse("owner/template")?).with_name("my-app");
//! let cwd = std::env::current_dir()?;
//! let summary = scaffolder.create(request, &mut DefaultAnswers::new(), &cwd).await?;
//! ```

pub mod cases;
pub mod config;
pub mod error;
pub mod hooks;
pub mod project;
pub mod questions;
pub mod repository;
pub mod substitution;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use cases::{Case, CaseVariants};
pub use config::Settings;
pub use error::{CtpError, Result};
pub use hooks::{HookReport, LifecycleRunner, ProcessExecutor, SystemExecutor};
pub use project::{CreateRequest, ProjectSummary, Scaffolder};
pub use questions::{AnswerSet, DefaultAnswers, Prompter, Question};
pub use repository::{CacheKey, GithubFetcher, RepositoryFetcher, RepositoryIdentity, RepositoryMetadata};
pub use substitution::SubstitutionEngine;
pub use templates::{CacheStatus, CtpManifest, TemplateCache};

#[cfg(feature = "tui")]
pub use tui::run;
