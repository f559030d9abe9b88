//! Project creation pipeline
//!
//! Creating a project runs these steps in order, each finishing before the
//! next starts:
//!
//! 1. [`Scaffolder::prepare`] makes sure the template is cached, loads its
//!    manifest and plans the questions.
//! 2. The caller asks the questions with a [`Prompter`].
//! 3. [`Scaffolder::materialize`] copies the template into the destination
//!    and substitutes the answers.
//! 4. [`Scaffolder::run_hooks`] runs the manifest's `hooks.created` commands.
//!
//! [`Scaffolder::create`] runs all four for front ends that need no control
//! in between.

use crate::config::Settings;
use crate::error::Result;
use crate::hooks::{HookReport, LifecycleRunner, ProcessExecutor, SystemExecutor};
use crate::questions::{self, AnswerSet, Prompter, Question};
use crate::repository::{RepositoryFetcher, RepositoryIdentity};
use crate::substitution::{SubstitutionEngine, SubstitutionReport};
use crate::templates::{copy_template, CacheStatus, CtpManifest, TemplateCache};
use std::path::{Component, Path, PathBuf};

/// What to create
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub template: RepositoryIdentity,
    /// Project name given up front; the `name` question is then not asked
    pub name: Option<String>,
    /// Destination; defaults to `<cwd>/<name>`
    pub directory: Option<PathBuf>,
    /// Download the template even if the cached copy is current
    pub refresh: bool,
}

impl CreateRequest {
    pub fn new(template: RepositoryIdentity) -> Self {
        Self {
            template,
            name: None,
            directory: None,
            refresh: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// A cached template with its manifest and planned questions
#[derive(Debug, Clone)]
pub struct PreparedTemplate {
    pub request: CreateRequest,
    pub path: PathBuf,
    pub status: CacheStatus,
    pub manifest: CtpManifest,
    pub questions: Vec<Question>,
}

/// A project copied and substituted, hooks not yet run
#[derive(Debug, Clone)]
pub struct MaterializedProject {
    pub path: PathBuf,
    pub answers: AnswerSet,
    pub files: Vec<PathBuf>,
    pub substitution: SubstitutionReport,
    hooks: Vec<String>,
}

impl MaterializedProject {
    /// Hook commands still to run
    pub fn hooks(&self) -> &[String] {
        &self.hooks
    }
}

/// Everything a finished run did
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub path: PathBuf,
    pub cache_status: CacheStatus,
    pub answers: AnswerSet,
    pub files: Vec<PathBuf>,
    pub substitution: SubstitutionReport,
    pub hooks: HookReport,
}

/// Creates projects from cached templates
pub struct Scaffolder<'a, E = SystemExecutor> {
    cache: TemplateCache,
    fetcher: &'a dyn RepositoryFetcher,
    engine: SubstitutionEngine,
    runner: LifecycleRunner<E>,
}

impl<'a> Scaffolder<'a, SystemExecutor> {
    /// Scaffolder using the cache root and script extensions from `settings`
    pub fn from_settings(settings: &Settings, fetcher: &'a dyn RepositoryFetcher) -> Self {
        Self::new(
            TemplateCache::new(&settings.cache_root),
            fetcher,
            SubstitutionEngine::new(settings.script_extensions.clone()),
            LifecycleRunner::system(),
        )
    }
}

impl<'a, E: ProcessExecutor> Scaffolder<'a, E> {
    pub fn new(
        cache: TemplateCache,
        fetcher: &'a dyn RepositoryFetcher,
        engine: SubstitutionEngine,
        runner: LifecycleRunner<E>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            engine,
            runner,
        }
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub fn runner(&self) -> &LifecycleRunner<E> {
        &self.runner
    }

    /// Fetch or reuse the template, then load its manifest and plan questions
    pub async fn prepare(&self, request: CreateRequest) -> Result<PreparedTemplate> {
        let cached = self
            .cache
            .ensure_fresh(&request.template, self.fetcher, request.refresh)
            .await?;

        let manifest = CtpManifest::load(&cached.path)?;
        let questions = questions::plan(&manifest.inputs, request.name.as_deref());
        tracing::debug!(
            template = %request.template,
            questions = questions.len(),
            replaces = manifest.replaces.len(),
            "template prepared"
        );

        Ok(PreparedTemplate {
            request,
            path: cached.path,
            status: cached.status,
            manifest,
            questions,
        })
    }

    /// Where the project for `answers` goes, relative paths resolved against `cwd`
    pub fn destination(&self, request: &CreateRequest, answers: &AnswerSet, cwd: &Path) -> PathBuf {
        let path = match &request.directory {
            Some(dir) => cwd.join(dir),
            None => cwd.join(answers.name().unwrap_or_default()),
        };
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// Copy the template into place and substitute `answers`
    pub async fn materialize(
        &self,
        prepared: &PreparedTemplate,
        answers: AnswerSet,
        cwd: &Path,
    ) -> Result<MaterializedProject> {
        let answers = questions::finish(answers, prepared.request.name.as_deref())?;
        let path = self.destination(&prepared.request, &answers, cwd);

        let files = copy_template(&prepared.path, &path).await?;
        let substitution = self
            .engine
            .apply(&path, &prepared.manifest.replaces, &answers)
            .await?;
        tracing::info!(
            path = %path.display(),
            files = files.len(),
            rewritten = substitution.rewritten.len(),
            "project created"
        );

        let hooks = prepared
            .manifest
            .hooks
            .created
            .as_ref()
            .map(|list| list.commands().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(MaterializedProject {
            path,
            answers,
            files,
            substitution,
            hooks,
        })
    }

    /// Run the `hooks.created` commands inside the project
    pub async fn run_hooks(&self, project: &MaterializedProject) -> HookReport {
        let commands: Vec<&str> = project.hooks.iter().map(String::as_str).collect();
        self.runner.run_created_hooks(&commands, &project.path).await
    }

    /// Run the whole pipeline
    pub async fn create(
        &self,
        request: CreateRequest,
        prompter: &mut dyn Prompter,
        cwd: &Path,
    ) -> Result<ProjectSummary> {
        let prepared = self.prepare(request).await?;
        let answers = prompter.prompt(&prepared.questions)?;
        let project = self.materialize(&prepared, answers, cwd).await?;
        let hooks = self.run_hooks(&project).await;

        Ok(ProjectSummary {
            path: project.path,
            cache_status: prepared.status,
            answers: project.answers,
            files: project.files,
            substitution: project.substitution,
            hooks,
        })
    }
}
