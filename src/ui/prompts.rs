//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Workflows never read the terminal directly. They ask a [`Prompter`],
//! which decides how an answer is obtained:
//!
//! - [`TerminalPrompter`] reads answers from a line-oriented reader
//!   (stdin in production)
//! - [`DefaultPrompter`] accepts every offered default; prompts without a
//!   default fail with [`PromptError::NotInteractive`]
//! - [`ScriptedPrompter`] replays predetermined [`Answer`]s so workflows can
//!   be driven headlessly in tests

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode and no default for: {0}")]
    NotInteractive(String),

    #[error("no scripted answer left for: {0}")]
    Exhausted(String),

    #[error("scripted answer {answer:?} does not fit prompt: {message}")]
    Unexpected { answer: Answer, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Source of operator decisions.
pub trait Prompter {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Ask for free text, optionally offering a default.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Ask to pick one of `options`; returns its index.
    ///
    /// `default` must be a valid index into `options`.
    fn select(
        &mut self,
        message: &str,
        options: &[String],
        default: usize,
    ) -> Result<usize, PromptError>;
}

/// Prompter that reads answers line by line.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            // EOF, e.g. ctrl-D
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {} ", message, hint))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.writer, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        loop {
            let prompt = match default {
                Some(d) => format!("{} [{}]: ", message, d),
                None => format!("{}: ", message),
            };
            let answer = self.ask(&prompt)?;
            match (answer.is_empty(), default) {
                (false, _) => return Ok(answer),
                (true, Some(d)) => return Ok(d.to_string()),
                (true, None) => writeln!(self.writer, "A value is required.")?,
            }
        }
    }

    fn select(
        &mut self,
        message: &str,
        options: &[String],
        default: usize,
    ) -> Result<usize, PromptError> {
        writeln!(self.writer, "{}", message)?;
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default { '*' } else { ' ' };
            writeln!(self.writer, " {} {:>3}) {}", marker, i + 1, option)?;
        }
        loop {
            let answer = self.ask(&format!("Choice [{}]: ", default + 1))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(
                    self.writer,
                    "Enter a number between 1 and {}.",
                    options.len()
                )?,
            }
        }
    }
}

/// Prompter for non-interactive runs: every prompt takes its default.
#[derive(Debug, Default)]
pub struct DefaultPrompter;

impl Prompter for DefaultPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        debug!(prompt = message, answer = default, "auto-confirm");
        Ok(default)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        match default {
            Some(d) => {
                debug!(prompt = message, answer = d, "auto-input");
                Ok(d.to_string())
            }
            None => Err(PromptError::NotInteractive(message.to_string())),
        }
    }

    fn select(
        &mut self,
        message: &str,
        _options: &[String],
        default: usize,
    ) -> Result<usize, PromptError> {
        debug!(prompt = message, answer = default, "auto-select");
        Ok(default)
    }
}

/// A predetermined answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Take whatever default the prompt offers.
    Default,
    /// Confirm.
    Yes,
    /// Decline.
    No,
    /// Free-text input.
    Text(String),
    /// Zero-based option index for a selection.
    Choice(usize),
}

/// Prompter that replays a fixed sequence of answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Every prompt message seen so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer, PromptError> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(message.to_string()))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        match self.next(message)? {
            Answer::Default => Ok(default),
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            answer => Err(PromptError::Unexpected {
                answer,
                message: message.to_string(),
            }),
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        match (self.next(message)?, default) {
            (Answer::Text(text), _) => Ok(text),
            (Answer::Default, Some(d)) => Ok(d.to_string()),
            (answer, _) => Err(PromptError::Unexpected {
                answer,
                message: message.to_string(),
            }),
        }
    }

    fn select(
        &mut self,
        message: &str,
        options: &[String],
        default: usize,
    ) -> Result<usize, PromptError> {
        match self.next(message)? {
            Answer::Default => Ok(default),
            Answer::Choice(i) if i < options.len() => Ok(i),
            answer => Err(PromptError::Unexpected {
                answer,
                message: message.to_string(),
            }),
        }
    }
}
