//! Unified error types for ctp.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while creating a project from a template.
#[derive(Error, Debug)]
pub enum CtpError {
    // --- Template reference ---

    /// The template reference is not of the form `owner/repo`.
    #[error("\"{0}\" is not a repository path (expected owner/repo)")]
    InvalidReference(String),

    // --- Remote ---

    /// The request to the repository host could not be completed.
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The repository host answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The template could not be fetched and there is no cached copy to fall back on.
    #[error("template {reference} is unavailable: it could not be fetched and has not been downloaded before")]
    TemplateUnavailable {
        reference: String,
        #[source]
        source: Box<CtpError>,
    },

    // --- Archive ---

    /// The downloaded archive could not be read.
    #[error("failed to read template archive")]
    Archive(#[from] zip::result::ZipError),

    /// The archive did not unpack into exactly one top-level directory.
    #[error("template archive must contain exactly one top-level directory, found {entries} entries in {}", path.display())]
    ArchiveLayout { path: PathBuf, entries: usize },

    // --- Manifest ---

    /// The template has no `ctp.json`.
    #[error("ctp.json not found at {}", path.display())]
    ManifestNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `ctp.json` exists but is not valid.
    #[error("failed to parse {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `replaces` entry is not a valid glob pattern.
    #[error("invalid replace pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    // --- Answers ---

    /// A required question received no answer in non-interactive mode.
    #[error("no answer for required input '{0}'")]
    MissingAnswer(String),

    /// Neither a preset name nor a `name` input produced a project name.
    #[error("no project name was given and the template does not ask for one")]
    MissingProjectName,

    // --- Project ---

    /// The destination directory exists and is not empty.
    #[error("project directory already exists: {}", .0.display())]
    ProjectExists(PathBuf),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, CtpError>`.
pub type Result<T> = std::result::Result<T, CtpError>;
