//! User input handling.
//! Questions are described declaratively (confirm, input, list) and answered
//! either interactively through dialoguer or from preloaded answers.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, Select};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Answers collected so far, keyed by question name.
pub type Answers = serde_json::Map<String, Value>;

/// Returns `Ok(())` for an acceptable input, or the message to show the user.
pub type Validator = fn(&str) -> std::result::Result<(), String>;

/// One option of a list question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value stored in the answers.
    pub value: String,
    /// Label displayed to the user.
    pub name: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self { value: value.into(), name: name.into() }
    }
}

#[derive(Clone)]
pub enum QuestionKind {
    Confirm { default: bool },
    Input { default: String, validate: Option<Validator> },
    List { choices: Vec<Choice>, default: usize },
}

/// A named prompt.
#[derive(Clone)]
pub struct Question {
    pub name: String,
    pub message: String,
    pub kind: QuestionKind,
    /// Skips the question (and records nothing) when it returns false.
    pub when: Option<fn(&Answers) -> bool>,
}

impl Question {
    pub fn confirm(name: &str, message: &str, default: bool) -> Self {
        Self::new(name, message, QuestionKind::Confirm { default })
    }

    pub fn input(name: &str, message: &str, default: &str) -> Self {
        Self::new(name, message, QuestionKind::Input { default: default.to_string(), validate: None })
    }

    pub fn list(name: &str, message: &str, choices: Vec<Choice>, default: usize) -> Self {
        Self::new(name, message, QuestionKind::List { choices, default })
    }

    fn new(name: &str, message: &str, kind: QuestionKind) -> Self {
        Self { name: name.to_string(), message: message.to_string(), kind, when: None }
    }

    pub fn when(mut self, when: fn(&Answers) -> bool) -> Self {
        self.when = Some(when);
        self
    }

    /// Attaches a validator. Only meaningful for input questions.
    pub fn validate(mut self, validator: Validator) -> Self {
        if let QuestionKind::Input { validate, .. } = &mut self.kind {
            *validate = Some(validator);
        }
        self
    }

    /// The answer used when nothing else is provided.
    pub fn default_value(&self) -> Value {
        match &self.kind {
            QuestionKind::Confirm { default } => Value::Bool(*default),
            QuestionKind::Input { default, .. } => Value::String(default.clone()),
            QuestionKind::List { choices, default } => choices
                .get(*default)
                .map(|choice| Value::String(choice.value.clone()))
                .unwrap_or(Value::Null),
        }
    }

    /// Checks that a provided answer fits the question.
    ///
    /// List answers may be given either as the choice value or as its index.
    pub fn check(&self, value: &Value) -> Result<Value> {
        match &self.kind {
            QuestionKind::Confirm { .. } => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(Error::ValidationError(format!("'{}' expects yes or no", self.name))),
            },
            QuestionKind::Input { validate, .. } => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => {
                        return Err(Error::ValidationError(format!(
                            "'{}' expects a text answer",
                            self.name
                        )))
                    }
                };
                if let Some(validate) = validate {
                    validate(&text).map_err(Error::ValidationError)?;
                }
                Ok(Value::String(text))
            }
            QuestionKind::List { choices, .. } => {
                let selected = match value {
                    Value::String(s) => choices.iter().find(|choice| &choice.value == s),
                    Value::Number(n) => n.as_u64().and_then(|i| choices.get(i as usize)),
                    _ => None,
                };
                selected.map(|choice| Value::String(choice.value.clone())).ok_or_else(|| {
                    Error::ValidationError(format!("'{}' is not a valid choice for '{}'", value, self.name))
                })
            }
        }
    }
}

/// Something able to answer questions.
pub trait Prompter {
    /// Answers a single question.
    fn ask(&self, question: &Question) -> Result<Value>;

    /// A preloaded value for a repeated question group (e.g. all the fields
    /// of an entity at once), if the prompter has one.
    fn preset(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Asks every question in order, honoring `when` predicates.
///
/// # Returns
/// * `Result<Answers>` - Answers of the questions that were shown
pub fn prompt(prompter: &dyn Prompter, questions: &[Question]) -> Result<Answers> {
    let mut answers = Answers::new();
    for question in questions {
        if let Some(when) = question.when {
            if !when(&answers) {
                debug!("Skipping question '{}'", question.name);
                continue;
            }
        }
        let value = prompter.ask(question)?;
        answers.insert(question.name.clone(), value);
    }
    Ok(answers)
}

/// Interactive prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, question: &Question) -> Result<Value> {
        match &question.kind {
            QuestionKind::Confirm { default } => {
                let result = Confirm::new()
                    .with_prompt(&question.message)
                    .default(*default)
                    .interact()
                    .map_err(|e| Error::PromptError(e.to_string()))?;
                Ok(Value::Bool(result))
            }
            QuestionKind::Input { default, validate } => {
                let mut input = Input::<String>::new().with_prompt(&question.message).allow_empty(true);
                if !default.is_empty() {
                    input = input.default(default.clone());
                }
                if let Some(validate) = *validate {
                    input = input.validate_with(move |text: &String| validate(text));
                }
                let result = input.interact_text().map_err(|e| Error::PromptError(e.to_string()))?;
                Ok(Value::String(result))
            }
            QuestionKind::List { choices, default } => {
                let labels: Vec<String> = choices.iter().map(|choice| choice.name.clone()).collect();
                let selection = Select::new()
                    .with_prompt(&question.message)
                    .items(&labels)
                    .default(*default)
                    .interact()
                    .map_err(|e| Error::PromptError(e.to_string()))?;
                Ok(Value::String(choices[selection].value.clone()))
            }
        }
    }
}

/// Prompter answering from preloaded answers.
///
/// Questions without a preloaded answer go to the fallback prompter, or take
/// their default when there is none.
pub struct AnswerPrompter {
    answers: IndexMap<String, Value>,
    fallback: Option<Box<dyn Prompter>>,
}

impl AnswerPrompter {
    pub fn new(answers: IndexMap<String, Value>) -> Self {
        Self { answers, fallback: None }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn Prompter>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl Prompter for AnswerPrompter {
    fn ask(&self, question: &Question) -> Result<Value> {
        match self.answers.get(&question.name) {
            Some(value) => {
                debug!("Using preloaded answer for '{}'", question.name);
                question.check(value)
            }
            None => match &self.fallback {
                Some(fallback) => fallback.ask(question),
                None => question.check(&question.default_value()),
            },
        }
    }

    fn preset(&self, name: &str) -> Option<Value> {
        self.answers.get(name).cloned()
    }
}

/// Parses answers given as a JSON or YAML mapping.
pub fn parse_answers(content: &str) -> Result<IndexMap<String, Value>> {
    if content.trim().is_empty() {
        return Ok(IndexMap::new());
    }
    match serde_json::from_str(content) {
        Ok(answers) => Ok(answers),
        Err(_) => Ok(serde_yaml::from_str(content)?),
    }
}

/// Reads answers from stdin.
pub fn load_answers_from_stdin() -> Result<IndexMap<String, Value>> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer)
}

/// Reads answers from a JSON or YAML file.
pub fn load_answers_from_file<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, Value>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_answers(&content)
}

/// Builds the prompter matching the answer sources given on the command line.
///
/// Answers read from stdin leave no terminal to fall back to, so missing
/// answers take their defaults.
pub fn get_prompter(stdin: bool, answers_file: Option<&Path>) -> Result<Box<dyn Prompter>> {
    if stdin {
        return Ok(Box::new(AnswerPrompter::new(load_answers_from_stdin()?)));
    }
    match answers_file {
        Some(path) => Ok(Box::new(
            AnswerPrompter::new(load_answers_from_file(path)?)
                .with_fallback(Box::new(DialoguerPrompter::new())),
        )),
        None => Ok(Box::new(DialoguerPrompter::new())),
    }
}
