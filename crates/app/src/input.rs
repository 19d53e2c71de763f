use std::fmt;

use quiz_core::model::{Question, Selection};

/// One line of user input while a question is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Select(Selection),
    Finish,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    UnknownLabel(String),
    TooManyForSingle,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnknownLabel(label) => write!(f, "no choice labeled {label:?}"),
            InputError::TooManyForSingle => write!(f, "this question takes a single answer"),
        }
    }
}

impl std::error::Error for InputError {}

/// Recognize the whole-word commands `finish`, `quit` and `exit`.
///
/// Returns `None` for anything else, including single letters.
pub fn parse_command(line: &str) -> Option<Answer> {
    match line.trim().to_ascii_lowercase().as_str() {
        "finish" => Some(Answer::Finish),
        "quit" | "exit" => Some(Answer::Quit),
        _ => None,
    }
}

/// Parse labels like `a`, `B, d` or `A C` into a selection for `question`.
///
/// An empty line parses to an empty selection; the session rejects it.
pub fn parse_answer(line: &str, question: &Question) -> Result<Answer, InputError> {
    if let Some(command) = parse_command(line) {
        return Ok(command);
    }
    let trimmed = line.trim();

    let mut values = Vec::new();
    for label in trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let value = question
            .choice_for_label(label)
            .ok_or_else(|| InputError::UnknownLabel(label.to_owned()))?;
        values.push(value.to_owned());
    }

    let selection = Selection::new(values);
    if !question.is_multi_select() && selection.len() > 1 {
        return Err(InputError::TooManyForSingle);
    }
    Ok(Answer::Select(selection))
}
