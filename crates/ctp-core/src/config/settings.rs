use crate::error::Result;
use anyhow::{anyhow, Context};
use std::path::PathBuf;
use url::Url;

/// GitHub REST API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Extensions whose files use the `__ctp__key` placeholder spelling
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const CACHE_DIR_ENV: &str = "CTP_CACHE_DIR";
const API_URL_ENV: &str = "CTP_GITHUB_API_URL";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Settings shared by the template cache, the fetcher and the substitution engine
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding one subdirectory per cached template
    pub cache_root: PathBuf,

    /// Base URL of the GitHub API
    pub api_url: Url,

    /// Token sent as a bearer credential, for private templates and rate limits
    pub token: Option<String>,

    /// User agent string for HTTP requests
    pub user_agent: String,

    /// File extensions (without the dot) treated as script files
    pub script_extensions: Vec<String>,
}

impl Settings {
    /// Settings with every value at its default
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            token: None,
            user_agent: format!("ctp/{}", env!("CARGO_PKG_VERSION")),
            script_extensions: DEFAULT_SCRIPT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Build settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an environment lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cache_root = match non_empty(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => Self::default_cache_root()?,
        };

        let mut settings = Self::new(cache_root);

        if let Some(url) = non_empty(API_URL_ENV) {
            settings.api_url = Url::parse(&url)
                .with_context(|| format!("Invalid {} value: {}", API_URL_ENV, url))?;
        }
        settings.token = non_empty(TOKEN_ENV);

        Ok(settings)
    }

    /// `<config dir>/ctp/templates`
    pub fn default_cache_root() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine the config directory"))?;
        Ok(config_dir.join("ctp").join("templates"))
    }
}
