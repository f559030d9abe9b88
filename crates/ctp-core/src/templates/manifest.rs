//! Template manifest (`ctp.json`) types and parsing

use crate::error::{CtpError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the manifest at the template root
pub const MANIFEST_FILE: &str = "ctp.json";

/// Per-template manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtpManifest {
    /// Values asked from the user, in prompt order
    #[serde(default)]
    pub inputs: Vec<Input>,

    /// Glob patterns (relative to the project root) of files to substitute
    #[serde(default)]
    pub replaces: Vec<String>,

    /// Lifecycle commands
    #[serde(default)]
    pub hooks: Hooks,
}

impl CtpManifest {
    /// Read `ctp.json` from a template directory
    pub fn load(template_dir: &Path) -> Result<Self> {
        let path = template_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| CtpError::ManifestNotFound {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CtpError::ManifestParse { path, source })
    }
}

/// One entry of `inputs`: a bare field name or a full question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Field(String),
    Question(QuestionSpec),
}

impl Input {
    /// Answer key this input produces
    pub fn key(&self) -> &str {
        match self {
            Input::Field(name) => name,
            Input::Question(spec) => &spec.name,
        }
    }
}

/// Question object in the style of interactive prompt libraries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Answer key
    pub name: String,

    /// Prompt type (`input`, `confirm`, `list`, ...); `input` when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Prompt text; the key is shown when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Choices for list-style prompts: strings or `{ "name", "value" }` objects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,

    #[serde(default)]
    pub required: bool,

    /// Fields ctp does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `hooks` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hooks {
    /// Commands run in the new project after it has been created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<CommandList>,
}

/// A single command or a list of commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandList {
    One(String),
    Many(Vec<String>),
}

impl CommandList {
    pub fn commands(&self) -> Vec<&str> {
        match self {
            CommandList::One(command) => vec![command.as_str()],
            CommandList::Many(commands) => commands.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_manifest() {
        let manifest: CtpManifest = serde_json::from_str(
            r#"{
                "inputs": [
                    "name",
                    { "name": "license", "type": "list", "choices": ["MIT", "ISC"], "required": true, "pageSize": 4 }
                ],
                "replaces": ["package.json", "src/**/*.ts"],
                "hooks": { "created": ["git init", "npm install"] }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.inputs.len(), 2);
        assert_eq!(manifest.inputs[0], Input::Field("name".to_string()));
        match &manifest.inputs[1] {
            Input::Question(spec) => {
                assert_eq!(spec.name, "license");
                assert_eq!(spec.kind.as_deref(), Some("list"));
                assert!(spec.required);
                assert_eq!(spec.choices.len(), 2);
                assert_eq!(spec.extra.get("pageSize"), Some(&Value::from(4)));
            }
            other => panic!("unexpected input {:?}", other),
        }
        assert_eq!(manifest.replaces, vec!["package.json", "src/**/*.ts"]);
        assert_eq!(
            manifest.hooks.created.unwrap().commands(),
            vec!["git init", "npm install"]
        );
    }

    #[test]
    fn test_all_sections_optional() {
        let manifest: CtpManifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.inputs.is_empty());
        assert!(manifest.replaces.is_empty());
        assert!(manifest.hooks.created.is_none());
    }

    #[test]
    fn test_single_hook_command() {
        let manifest: CtpManifest =
            serde_json::from_str(r#"{ "hooks": { "created": "yarn" } }"#).unwrap();
        assert_eq!(manifest.hooks.created.unwrap().commands(), vec!["yarn"]);
    }

    #[test]
    fn test_input_key() {
        let manifest: CtpManifest =
            serde_json::from_str(r#"{ "inputs": ["title", { "name": "author" }] }"#).unwrap();
        let keys: Vec<&str> = manifest.inputs.iter().map(Input::key).collect();
        assert_eq!(keys, vec!["title", "author"]);
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let result = CtpManifest::load(dir.path());
        assert!(matches!(result, Err(CtpError::ManifestNotFound { .. })));
    }

    #[test]
    fn test_load_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ inputs: ").unwrap();
        let result = CtpManifest::load(dir.path());
        assert!(matches!(result, Err(CtpError::ManifestParse { .. })));
    }
}
