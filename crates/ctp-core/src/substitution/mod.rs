//! Placeholder substitution across project files
//!
//! Files are selected with the manifest's `replaces` globs. Each selected
//! file is read whole, every answer is substituted in a single pass, and the
//! result is written back whole. Hidden files and directories are only
//! matched by patterns that name the leading dot.

pub mod syntax;

use crate::cases::CaseVariants;
use crate::config::DEFAULT_SCRIPT_EXTENSIONS;
use crate::error::{CtpError, Result};
use crate::questions::AnswerSet;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::fs;

pub use syntax::{classify, BareSyntax, Boundary, BracedSyntax, PlaceholderSyntax, Rules, Token};

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// What a substitution pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Files whose content changed
    pub rewritten: Vec<PathBuf>,
    /// Matched files left as they were
    pub unchanged: Vec<PathBuf>,
    /// Matched files that are not UTF-8 text
    pub skipped: Vec<PathBuf>,
}

/// Rewrites placeholders in files selected by glob patterns
#[derive(Debug, Clone)]
pub struct SubstitutionEngine {
    script_extensions: Vec<String>,
}

impl Default for SubstitutionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect())
    }
}

impl SubstitutionEngine {
    /// Create an engine treating files with `script_extensions` as scripts
    pub fn new(script_extensions: Vec<String>) -> Self {
        Self { script_extensions }
    }

    /// Syntax used for `path`
    pub fn syntax_for(&self, path: &Path) -> &'static dyn PlaceholderSyntax {
        classify(path, &self.script_extensions)
    }

    /// Files under `root` matched by `patterns`, in pattern order then glob order
    pub fn resolve(&self, root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let mut files = Vec::new();

        for pattern in patterns {
            let full = format!(
                "{}/{}",
                escaped_root.trim_end_matches('/'),
                pattern.trim_start_matches("./")
            );
            let matches = glob::glob_with(&full, MATCH_OPTIONS).map_err(|source| CtpError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

            for entry in matches {
                let path = entry.context("Failed to read a matched path")?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    /// Substitute every answer into `content` using the syntax for `path`
    pub fn render(&self, path: &Path, content: &str, answers: &[(&str, &str, CaseVariants)]) -> String {
        self.syntax_for(path).render(content, answers)
    }

    /// Rewrite every file under `root` matched by `patterns`
    pub async fn apply(
        &self,
        root: &Path,
        patterns: &[String],
        answers: &AnswerSet,
    ) -> Result<SubstitutionReport> {
        let files = self.resolve(root, patterns)?;
        let prepared: Vec<(&str, &str, CaseVariants)> = answers
            .iter()
            .map(|(key, value)| (key, value, CaseVariants::new(value)))
            .collect();

        let mut report = SubstitutionReport::default();

        for path in files {
            let bytes = fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    tracing::warn!(path = %path.display(), "skipping non-text file");
                    report.skipped.push(path);
                    continue;
                }
            };

            let rendered = self.render(&path, &content, &prepared);
            if rendered == content {
                report.unchanged.push(path);
                continue;
            }

            fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "substituted placeholders");
            report.rewritten.push(path);
        }

        Ok(report)
    }
}
