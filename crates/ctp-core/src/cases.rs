//! Naming-convention variants of answer values
//!
//! A value is first split into words, then re-joined under each convention.
//! Word boundaries are runs of non-alphanumeric characters, lower-to-upper
//! transitions (`myApp`), the last capital of an acronym followed by a
//! lowercase letter (`XMLParser` -> `XML`, `Parser`) and letter/digit
//! transitions (`app2` -> `app`, `2`).

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase, ToTrainCase,
    ToUpperCamelCase,
};
use std::fmt;

/// Supported naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// `myApp`
    Camel,
    /// `My App`
    Capital,
    /// `MY_APP`
    Constant,
    /// `my.app`
    Dot,
    /// `My-App`
    Header,
    /// `my app`
    No,
    /// `my-app`
    Param,
    /// `MyApp`
    Pascal,
    /// `my/app`
    Path,
    /// `My app`
    Sentence,
    /// `my_app`
    Snake,
}

impl Case {
    pub const ALL: [Case; 11] = [
        Case::Camel,
        Case::Capital,
        Case::Constant,
        Case::Dot,
        Case::Header,
        Case::No,
        Case::Param,
        Case::Pascal,
        Case::Path,
        Case::Sentence,
        Case::Snake,
    ];

    /// Name used for this case inside placeholders
    pub fn token(&self) -> &'static str {
        match self {
            Case::Camel => "camel",
            Case::Capital => "capital",
            Case::Constant => "constant",
            Case::Dot => "dot",
            Case::Header => "header",
            Case::No => "no",
            Case::Param => "param",
            Case::Pascal => "pascal",
            Case::Path => "pathCase",
            Case::Sentence => "sentence",
            Case::Snake => "snake",
        }
    }

    pub fn from_token(token: &str) -> Option<Case> {
        Case::ALL.into_iter().find(|case| case.token() == token)
    }

    /// Render `value` in this case
    pub fn apply(&self, value: &str) -> String {
        self.join(&words(value))
    }

    fn join(&self, words: &[String]) -> String {
        let spaced = words.join(" ");
        match self {
            Case::Camel => spaced.to_lower_camel_case(),
            Case::Capital => spaced.to_title_case(),
            Case::Constant => spaced.to_shouty_snake_case(),
            Case::Dot => words.join("."),
            Case::Header => spaced.to_train_case(),
            Case::No => spaced,
            Case::Param => spaced.to_kebab_case(),
            Case::Pascal => spaced.to_upper_camel_case(),
            Case::Path => words.join("/"),
            Case::Sentence => capitalize(&spaced),
            Case::Snake => spaced.to_snake_case(),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Every case variant of one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseVariants {
    variants: Vec<(Case, String)>,
}

impl CaseVariants {
    pub fn new(value: &str) -> Self {
        let words = words(value);
        Self {
            variants: Case::ALL
                .into_iter()
                .map(|case| (case, case.join(&words)))
                .collect(),
        }
    }

    pub fn get(&self, case: Case) -> &str {
        self.variants
            .iter()
            .find(|(c, _)| *c == case)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Case, &str)> {
        self.variants.iter().map(|(case, value)| (*case, value.as_str()))
    }
}

/// Split a value into lowercase words
pub fn words(value: &str) -> Vec<String> {
    let mut words = Vec::new();

    for segment in value.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = segment.chars().collect();
        let mut start = 0;

        for i in 1..chars.len() {
            let (prev, cur) = (chars[i - 1], chars[i]);
            let next = chars.get(i + 1).copied();

            let boundary = (prev.is_lowercase() && cur.is_uppercase())
                || (prev.is_uppercase()
                    && cur.is_uppercase()
                    && next.is_some_and(char::is_lowercase))
                || (prev.is_numeric() != cur.is_numeric());

            if boundary {
                words.push(chars[start..i].iter().collect::<String>());
                start = i;
            }
        }

        if start < chars.len() {
            words.push(chars[start..].iter().collect::<String>());
        }
    }

    words.into_iter().map(|w| w.to_lowercase()).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
