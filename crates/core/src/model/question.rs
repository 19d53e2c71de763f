use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("question needs at least 2 choices, got {count}")]
    TooFewChoices { count: usize },

    #[error("duplicate choice: {0}")]
    DuplicateChoice(String),

    #[error("question has no correct answer")]
    EmptyAnswer,

    #[error("duplicate answer: {0}")]
    DuplicateAnswer(String),

    #[error("answer is not one of the choices: {0}")]
    AnswerNotAChoice(String),
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Raw question record as it appears in a question bank file.
///
/// The text field is named `question` in bank files; `text` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "question", alias = "text")]
    pub text: String,
    pub choices: Vec<String>,
    pub answer: Vec<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
        answer: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            text: text.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            answer: answer.into_iter().map(Into::into).collect(),
        }
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, there are fewer than two
    /// distinct choices, or the answer is empty, repeated, or not a choice.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                count: self.choices.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.choices.len());
        for choice in &self.choices {
            if !seen.insert(choice.as_str()) {
                return Err(QuestionError::DuplicateChoice(choice.clone()));
            }
        }

        if self.answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        let mut answered = HashSet::with_capacity(self.answer.len());
        for value in &self.answer {
            if !seen.contains(value.as_str()) {
                return Err(QuestionError::AnswerNotAChoice(value.clone()));
            }
            if !answered.insert(value.as_str()) {
                return Err(QuestionError::DuplicateAnswer(value.clone()));
            }
        }

        Ok(Question {
            text: self.text,
            choices: self.choices,
            answer: self.answer,
        })
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// `answer` keeps the order it was stored in; that order is used whenever the
/// correct answer is shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    choices: Vec<String>,
    answer: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn answer(&self) -> &[String] {
        &self.answer
    }

    /// True when more than one choice must be selected.
    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.answer.len() > 1
    }

    /// Correct answer joined for display, in stored order.
    #[must_use]
    pub fn answer_joined(&self) -> String {
        self.answer.join(", ")
    }

    /// Choices paired with their positional labels (`A`, `B`, ...).
    pub fn labeled_choices(&self) -> impl Iterator<Item = (String, &str)> {
        self.choices
            .iter()
            .enumerate()
            .map(|(index, choice)| (choice_label(index), choice.as_str()))
    }

    /// Look up a choice by its label. Matching ignores case and surrounding whitespace.
    #[must_use]
    pub fn choice_for_label(&self, label: &str) -> Option<&str> {
        let index = label_index(label)?;
        self.choices.get(index).map(String::as_str)
    }
}

//
// ─── LABELS ───────────────────────────────────────────────────────────────────
//

/// Positional label for a choice: `A`..`Z`, then `AA`, `AB`, ...
#[must_use]
pub fn choice_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = u8::try_from((n - 1) % 26).unwrap_or(0);
        label.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Inverse of `choice_label`.
#[must_use]
pub fn label_index(label: &str) -> Option<usize> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
