//! Asking planned questions with cliclack

use crate::error::Result;
use crate::questions::{AnswerSet, Prompter, Question, QuestionKind};

/// Interactive [`Prompter`] drawing Charm-style prompts on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ClackPrompter;

impl ClackPrompter {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self, question: &Question) -> Result<String> {
        let answer = match question.kind {
            QuestionKind::Input => text(question, false)?,
            QuestionKind::Number => text(question, true)?,
            QuestionKind::Password => {
                let rule = question.clone();
                cliclack::password(&question.message)
                    .mask('▪')
                    .validate(move |input: &String| rule.validate(input))
                    .interact()?
            }
            QuestionKind::Confirm => {
                let initial = matches!(question.default.as_deref(), Some("true" | "yes" | "y"));
                let confirmed: bool = cliclack::confirm(&question.message)
                    .initial_value(initial)
                    .interact()?;
                confirmed.to_string()
            }
            QuestionKind::Select if !question.choices.is_empty() => {
                let mut select = cliclack::select(&question.message);
                for choice in &question.choices {
                    select = select.item(choice.value.clone(), &choice.label, "");
                }
                if let Some(default) = question
                    .default
                    .as_ref()
                    .filter(|d| question.choices.iter().any(|c| &c.value == *d))
                {
                    select = select.initial_value(default.clone());
                }
                select.interact()?
            }
            QuestionKind::MultiSelect if !question.choices.is_empty() => {
                let mut multi = cliclack::multiselect(&question.message);
                for choice in &question.choices {
                    multi = multi.item(choice.value.clone(), &choice.label, "");
                }
                let selected: Vec<String> = multi.required(question.is_required()).interact()?;
                selected.join(", ")
            }
            // A select without choices can only be answered as text
            QuestionKind::Select | QuestionKind::MultiSelect => text(question, false)?,
        };

        Ok(answer)
    }
}

fn text(question: &Question, numeric: bool) -> Result<String> {
    let mut input = cliclack::input(&question.message).required(question.is_required());

    if let Some(default) = &question.default {
        input = input.placeholder(default).default_input(default);
    }

    let rule = question.clone();
    let answer: String = input
        .validate(move |input: &String| {
            rule.validate(input)?;
            if numeric && !input.is_empty() && input.trim().parse::<f64>().is_err() {
                return Err("please enter a number");
            }
            Ok(())
        })
        .interact()?;

    Ok(answer)
}

impl Prompter for ClackPrompter {
    fn prompt(&mut self, questions: &[Question]) -> Result<AnswerSet> {
        let mut answers = AnswerSet::new();
        for question in questions {
            let answer = self.ask(question)?;
            answers.insert(question.key.clone(), answer);
        }
        Ok(answers)
    }
}
