//! Turning manifest inputs into prompts and answers
//!
//! Keys with special treatment are listed in [`RESERVED_KEYS`]; the planner
//! consults that table instead of special-casing names inline.

use crate::error::{CtpError, Result};
use crate::templates::manifest::{Input, QuestionSpec};
use serde_json::Value;
use std::collections::BTreeMap;

/// Answer key holding the project name
pub const NAME_KEY: &str = "name";

/// Treatment of an input key that has meaning to ctp itself
#[derive(Debug, Clone, Copy)]
pub struct ReservedKey {
    pub key: &'static str,
    /// Not asked when the value was supplied on the command line
    pub skip_when_preset: bool,
    /// Always validated as required, whatever the manifest says
    pub always_required: bool,
}

pub const RESERVED_KEYS: &[ReservedKey] = &[ReservedKey {
    key: NAME_KEY,
    skip_when_preset: true,
    always_required: true,
}];

fn reserved(key: &str) -> Option<&'static ReservedKey> {
    RESERVED_KEYS.iter().find(|r| r.key == key)
}

/// Kind of prompt to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Input,
    Password,
    Number,
    Confirm,
    Select,
    MultiSelect,
}

impl QuestionKind {
    /// Map a manifest `type`; unknown types fall back to free text
    pub fn from_manifest(kind: Option<&str>) -> Self {
        match kind {
            Some("password") => QuestionKind::Password,
            Some("number") => QuestionKind::Number,
            Some("confirm") => QuestionKind::Confirm,
            Some("list" | "rawlist" | "expand") => QuestionKind::Select,
            Some("checkbox") => QuestionKind::MultiSelect,
            _ => QuestionKind::Input,
        }
    }
}

/// Validation attached to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Required,
}

impl Validation {
    pub fn check(&self, answer: &str) -> std::result::Result<(), &'static str> {
        match self {
            Validation::Required if answer.is_empty() => Err("required"),
            Validation::Required => Ok(()),
        }
    }
}

/// One entry of a select prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

/// A planned prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub key: String,
    pub kind: QuestionKind,
    pub message: String,
    pub default: Option<String>,
    pub choices: Vec<Choice>,
    pub validation: Option<Validation>,
}

impl Question {
    fn field(key: &str) -> Self {
        Self {
            key: key.to_string(),
            kind: QuestionKind::Input,
            message: key.to_string(),
            default: None,
            choices: Vec::new(),
            validation: None,
        }
    }

    fn from_spec(spec: &QuestionSpec) -> Self {
        Self {
            key: spec.name.clone(),
            kind: QuestionKind::from_manifest(spec.kind.as_deref()),
            message: spec.message.clone().unwrap_or_else(|| spec.name.clone()),
            default: spec.default.as_ref().and_then(value_to_answer),
            choices: spec.choices.iter().filter_map(choice).collect(),
            validation: spec.required.then_some(Validation::Required),
        }
    }

    pub fn is_required(&self) -> bool {
        self.validation == Some(Validation::Required)
    }

    /// Run the attached validation, if any
    pub fn validate(&self, answer: &str) -> std::result::Result<(), &'static str> {
        match &self.validation {
            Some(validation) => validation.check(answer),
            None => Ok(()),
        }
    }
}

/// Render a JSON manifest value as an answer string
fn value_to_answer(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_answer)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn choice(value: &Value) -> Option<Choice> {
    match value {
        Value::Object(map) => {
            let label = map.get("name").and_then(value_to_answer);
            let value = map.get("value").and_then(value_to_answer);
            match (label, value) {
                (Some(label), Some(value)) => Some(Choice { label, value }),
                (Some(label), None) => Some(Choice {
                    value: label.clone(),
                    label,
                }),
                (None, Some(value)) => Some(Choice {
                    label: value.clone(),
                    value,
                }),
                (None, None) => None,
            }
        }
        other => value_to_answer(other).map(|value| Choice {
            label: value.clone(),
            value,
        }),
    }
}

/// Build the prompt list for `inputs`.
///
/// `preset_name` is a project name given outside the manifest (for example
/// on the command line).
pub fn plan(inputs: &[Input], preset_name: Option<&str>) -> Vec<Question> {
    let preset_name = preset_name.filter(|name| !name.is_empty());

    inputs
        .iter()
        .filter_map(|input| {
            let rule = reserved(input.key());

            if preset_name.is_some() && rule.is_some_and(|r| r.skip_when_preset) {
                return None;
            }

            let mut question = match input {
                Input::Field(key) => Question::field(key),
                Input::Question(spec) => Question::from_spec(spec),
            };
            if rule.is_some_and(|r| r.always_required) {
                question.validation = Some(Validation::Required);
            }

            Some(question)
        })
        .collect()
}

/// Answers keyed by input name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: BTreeMap<String, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    /// Project name; present on every set returned by [`finish`]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Merge the preset name into prompted answers and check a name is present
pub fn finish(mut answers: AnswerSet, preset_name: Option<&str>) -> Result<AnswerSet> {
    if let Some(name) = preset_name.filter(|name| !name.is_empty()) {
        answers.insert(NAME_KEY, name);
    }

    match answers.name() {
        Some(name) if !name.is_empty() => Ok(answers),
        _ => Err(CtpError::MissingProjectName),
    }
}

/// Something that can ask planned questions
pub trait Prompter {
    fn prompt(&mut self, questions: &[Question]) -> Result<AnswerSet>;
}

/// Answers every question with its default, for non-interactive runs
#[derive(Debug, Clone, Default)]
pub struct DefaultAnswers {
    overrides: AnswerSet,
}

impl DefaultAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `key` with `value` instead of the question's default
    pub fn with_answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key, value);
        self
    }
}

impl Prompter for DefaultAnswers {
    fn prompt(&mut self, questions: &[Question]) -> Result<AnswerSet> {
        let mut answers = AnswerSet::new();

        for question in questions {
            let answer = self
                .overrides
                .get(&question.key)
                .map(str::to_string)
                .or_else(|| question.default.clone())
                .or_else(|| question.choices.first().map(|c| c.value.clone()))
                .unwrap_or_default();

            if question.validate(&answer).is_err() {
                return Err(CtpError::MissingAnswer(question.key.clone()));
            }
            answers.insert(question.key.clone(), answer);
        }

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(json: &str) -> Vec<Input> {
        serde_json::from_str(json).unwrap()
    }

    fn keys(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.key.as_str()).collect()
    }

    #[test]
    fn test_preset_name_drops_name_question() {
        let inputs = inputs(r#"["name", {"name": "license", "required": true}]"#);

        let questions = plan(&inputs, Some("foo"));
        assert_eq!(keys(&questions), vec!["license"]);
        assert!(questions[0].is_required());

        let answers = finish(
            AnswerSet::from_iter([("license", "MIT")]),
            Some("foo"),
        )
        .unwrap();
        assert_eq!(answers.name(), Some("foo"));
        assert_eq!(answers.get("license"), Some("MIT"));
    }

    #[test]
    fn test_name_question_is_required() {
        let questions = plan(&inputs(r#"["name"]"#), None);
        assert_eq!(keys(&questions), vec!["name"]);
        assert_eq!(questions[0].validation, Some(Validation::Required));
    }

    #[test]
    fn test_name_spec_required_even_if_manifest_says_not() {
        let questions = plan(
            &inputs(r#"[{"name": "name", "message": "Project name", "required": false}]"#),
            None,
        );
        assert!(questions[0].is_required());
        assert_eq!(questions[0].message, "Project name");
    }

    #[test]
    fn test_name_spec_dropped_with_preset() {
        let questions = plan(&inputs(r#"[{"name": "name"}, "title"]"#), Some("app"));
        assert_eq!(keys(&questions), vec!["title"]);
    }

    #[test]
    fn test_other_inputs_validation() {
        let questions = plan(
            &inputs(r#"["title", {"name": "author"}, {"name": "license", "required": true}]"#),
            None,
        );
        assert_eq!(questions[0].validation, None);
        assert_eq!(questions[1].validation, None);
        assert_eq!(questions[2].validation, Some(Validation::Required));
    }

    #[test]
    fn test_empty_preset_is_ignored() {
        let questions = plan(&inputs(r#"["name"]"#), Some(""));
        assert_eq!(keys(&questions), vec!["name"]);
    }

    #[test]
    fn test_question_fields_from_spec() {
        let questions = plan(
            &inputs(
                r#"[{
                    "name": "license",
                    "type": "list",
                    "message": "License",
                    "default": "MIT",
                    "choices": ["MIT", {"name": "Apache 2.0", "value": "Apache-2.0"}]
                }, {"name": "private", "type": "confirm", "default": false}]"#,
            ),
            None,
        );

        let license = &questions[0];
        assert_eq!(license.kind, QuestionKind::Select);
        assert_eq!(license.message, "License");
        assert_eq!(license.default.as_deref(), Some("MIT"));
        assert_eq!(
            license.choices,
            vec![
                Choice { label: "MIT".into(), value: "MIT".into() },
                Choice { label: "Apache 2.0".into(), value: "Apache-2.0".into() },
            ]
        );

        assert_eq!(questions[1].kind, QuestionKind::Confirm);
        assert_eq!(questions[1].default.as_deref(), Some("false"));
        assert_eq!(questions[1].message, "private");
    }

    #[test]
    fn test_finish_requires_name() {
        let result = finish(AnswerSet::from_iter([("title", "x")]), None);
        assert!(matches!(result, Err(CtpError::MissingProjectName)));

        let result = finish(AnswerSet::from_iter([("name", "")]), None);
        assert!(matches!(result, Err(CtpError::MissingProjectName)));
    }

    #[test]
    fn test_finish_keeps_prompted_name() {
        let answers = finish(AnswerSet::from_iter([("name", "prompted")]), None).unwrap();
        assert_eq!(answers.name(), Some("prompted"));
    }

    #[test]
    fn test_default_answers() {
        let questions = plan(
            &inputs(r#"["title", {"name": "license", "default": "MIT"}, {"name": "kind", "type": "list", "choices": ["lib", "bin"]}]"#),
            Some("app"),
        );

        let answers = DefaultAnswers::new()
            .with_answer("title", "My App")
            .prompt(&questions)
            .unwrap();

        assert_eq!(answers.get("title"), Some("My App"));
        assert_eq!(answers.get("license"), Some("MIT"));
        assert_eq!(answers.get("kind"), Some("lib"));
    }

    #[test]
    fn test_default_answers_missing_required() {
        let questions = plan(&inputs(r#"["name"]"#), None);
        let result = DefaultAnswers::new().prompt(&questions);
        assert!(matches!(result, Err(CtpError::MissingAnswer(key)) if key == "name"));
    }
}
