//! Placeholder spellings
//!
//! Script files cannot hold `{` `}` in identifiers, so they use
//! `__ctp__key` / `__ctp__key_case`. Every other file uses `{key}` /
//! `{key.case}` or the equivalent `--ctp--key` / `--ctp--key.case`.
//!
//! All answers are substituted in one left-to-right pass. At each position
//! the longest placeholder that matches wins, and substituted values are
//! never scanned again.

use crate::cases::{Case, CaseVariants};
use std::cmp::Reverse;
use std::path::Path;

/// What may follow a placeholder for it to match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    /// Matches wherever the literal occurs
    Any,
    /// Not followed by `[A-Za-z0-9_$]`, so `__ctp__name` never matches
    /// inside `__ctp__nameSpace` or `__ctp__name_bogus`
    Identifier,
    /// Not followed by an alphanumeric character or by `.` and an
    /// alphanumeric character (a cased spelling with an unknown case)
    Word,
}

impl Boundary {
    /// Whether `after`, the text following a match, satisfies the boundary
    pub fn allows(self, after: &str) -> bool {
        let mut chars = after.chars();
        match self {
            Boundary::Any => true,
            Boundary::Identifier => !chars
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
            Boundary::Word => match chars.next() {
                None => true,
                Some('.') => !chars.next().is_some_and(char::is_alphanumeric),
                Some(c) => !c.is_alphanumeric(),
            },
        }
    }
}

/// A literal placeholder to replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub literal: String,
    pub boundary: Boundary,
}

impl Token {
    fn exact(literal: String) -> Self {
        Self {
            literal,
            boundary: Boundary::Any,
        }
    }

    fn bounded(literal: String, boundary: Boundary) -> Self {
        Self { literal, boundary }
    }
}

/// How placeholders are spelled in one family of files
pub trait PlaceholderSyntax: Send + Sync {
    /// Spellings of the raw value of `key`
    fn plain(&self, key: &str) -> Vec<Token>;

    /// Spellings of `key` rendered in `case`
    fn cased(&self, key: &str, case: Case) -> Vec<Token>;

    /// Every placeholder for `answers` with its replacement
    fn rules(&self, answers: &[(&str, &str, CaseVariants)]) -> Rules {
        let mut rules = Vec::new();
        for (key, value, variants) in answers {
            for token in self.plain(key) {
                rules.push((token, value.to_string()));
            }
            for (case, rendered) in variants.iter() {
                for token in self.cased(key, case) {
                    rules.push((token, rendered.to_string()));
                }
            }
        }
        Rules::new(rules)
    }

    /// Replace every placeholder of every answer in `content`
    fn render(&self, content: &str, answers: &[(&str, &str, CaseVariants)]) -> String {
        self.rules(answers).apply(content)
    }
}

/// Placeholders ready to apply, longest literal first
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<(Token, String)>,
    leads: Vec<u8>,
}

impl Rules {
    /// Order `rules` so that the result does not depend on their input order
    pub fn new(mut rules: Vec<(Token, String)>) -> Self {
        rules.retain(|(token, _)| !token.literal.is_empty());
        rules.sort_by(|(a, a_value), (b, b_value)| {
            (Reverse(a.literal.len()), &a.literal, a.boundary, a_value)
                .cmp(&(Reverse(b.literal.len()), &b.literal, b.boundary, b_value))
        });
        rules.dedup_by(|a, b| a.0.literal == b.0.literal && a.0.boundary == b.0.boundary);

        let mut leads: Vec<u8> = rules.iter().map(|(token, _)| token.literal.as_bytes()[0]).collect();
        leads.sort_unstable();
        leads.dedup();

        Self { rules, leads }
    }

    /// Substitute into `content` in a single pass
    pub fn apply(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut copied = 0;
        let mut pos = 0;

        while pos < content.len() {
            if !self.leads.contains(&content.as_bytes()[pos]) {
                pos += 1;
                continue;
            }

            let rest = &content[pos..];
            let hit = self.rules.iter().find(|(token, _)| {
                rest.starts_with(&token.literal) && token.boundary.allows(&rest[token.literal.len()..])
            });

            match hit {
                Some((token, value)) => {
                    out.push_str(&content[copied..pos]);
                    out.push_str(value);
                    pos += token.literal.len();
                    copied = pos;
                }
                None => pos += 1,
            }
        }
        out.push_str(&content[copied..]);

        out
    }
}

/// `__ctp__key` and `__ctp__key_case`
#[derive(Debug, Clone, Copy, Default)]
pub struct BareSyntax;

impl PlaceholderSyntax for BareSyntax {
    fn plain(&self, key: &str) -> Vec<Token> {
        vec![Token::bounded(format!("__ctp__{}", key), Boundary::Identifier)]
    }

    fn cased(&self, key: &str, case: Case) -> Vec<Token> {
        vec![Token::exact(format!("__ctp__{}_{}", key, case.token()))]
    }
}

/// `{key}`, `{key.case}`, `--ctp--key` and `--ctp--key.case`
#[derive(Debug, Clone, Copy, Default)]
pub struct BracedSyntax;

impl PlaceholderSyntax for BracedSyntax {
    fn plain(&self, key: &str) -> Vec<Token> {
        vec![
            Token::exact(format!("{{{}}}", key)),
            Token::bounded(format!("--ctp--{}", key), Boundary::Word),
        ]
    }

    fn cased(&self, key: &str, case: Case) -> Vec<Token> {
        vec![
            Token::exact(format!("{{{}.{}}}", key, case.token())),
            Token::exact(format!("--ctp--{}.{}", key, case.token())),
        ]
    }
}

static BARE: BareSyntax = BareSyntax;
static BRACED: BracedSyntax = BracedSyntax;

/// Pick the syntax for `path` by its extension
pub fn classify(path: &Path, script_extensions: &[String]) -> &'static dyn PlaceholderSyntax {
    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| script_extensions.iter().any(|s| s == ext));

    if is_script {
        &BARE
    } else {
        &BRACED
    }
}
