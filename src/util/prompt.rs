//! Operator confirmation prompts.
//!
//! A decision is the pure function `prior.unwrap_or(default)`; the
//! interactive layer that produces `prior` from stdin is kept separate so
//! the same logic runs without a terminal. Empty input and EOF both apply
//! the default, so the whole flow can run unattended by piping answers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Apply a prompt default to a possibly-absent answer.
pub fn decide(prior: Option<bool>, default: bool) -> bool {
    prior.unwrap_or(default)
}

/// Parse a yes/no answer. Empty or unrecognized input yields `None`.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
enum Mode {
    /// Read answers from stdin.
    Interactive,
    /// Answer every confirmation the same way.
    Assume(bool),
    /// Consume a fixed answer sequence; exhausted answers fall back to
    /// the prompt default.
    Scripted(RefCell<VecDeque<bool>>),
}

/// The interactive reading boundary.
///
/// Operations take a `&Prompter` instead of touching stdin themselves, so
/// tests and unattended runs swap the reading layer without changing any
/// decision logic.
#[derive(Debug)]
pub struct Prompter {
    mode: Mode,
}

impl Prompter {
    /// Prompter that reads answers from stdin.
    pub fn interactive() -> Self {
        Prompter {
            mode: Mode::Interactive,
        }
    }

    /// Prompter that answers every confirmation with `answer`.
    pub fn assume(answer: bool) -> Self {
        Prompter {
            mode: Mode::Assume(answer),
        }
    }

    /// Prompter that consumes `answers` in order.
    pub fn scripted(answers: impl IntoIterator<Item = bool>) -> Self {
        Prompter {
            mode: Mode::Scripted(RefCell::new(answers.into_iter().collect())),
        }
    }

    /// Ask a yes/no question, applying `default` on empty input.
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let prior = match &self.mode {
            Mode::Assume(answer) => Some(*answer),
            Mode::Scripted(queue) => queue.borrow_mut().pop_front(),
            Mode::Interactive => {
                let hint = if default { "[Y/n]" } else { "[y/N]" };
                write!(io::stderr(), "{} {} ", message, hint)?;
                io::stderr().flush()?;
                read_answer(&mut io::stdin().lock())?
            }
        };

        Ok(decide(prior, default))
    }

    /// Ask for a free-form line. Returns `None` on empty input, EOF, or
    /// when the prompter is non-interactive.
    pub fn input(&self, message: &str) -> Result<Option<String>> {
        if !matches!(self.mode, Mode::Interactive) {
            return Ok(None);
        }

        write!(io::stderr(), "{}: ", message)?;
        io::stderr().flush()?;
        read_line(&mut io::stdin().lock())
    }
}

/// Read one answer line from `reader`. EOF yields `None`.
pub fn read_answer(reader: &mut impl BufRead) -> Result<Option<bool>> {
    Ok(read_line(reader)?.as_deref().and_then(parse_answer))
}

fn read_line(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut input = String::new();
    let n = reader.read_line(&mut input)?;
    if n == 0 {
        return Ok(None);
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
