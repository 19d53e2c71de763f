use std::collections::HashSet;

use crate::model::question::Question;

/// Set of choice values submitted for one question.
///
/// Duplicates are dropped; first-seen order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: Vec<String>,
}

impl Selection {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen = HashSet::new();
        let values = values
            .into_iter()
            .map(Into::into)
            .filter(|v: &String| seen.insert(v.clone()))
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Exact set equality with the question's correct answer.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        let answer = question.answer();
        self.values.len() == answer.len() && answer.iter().all(|a| self.contains(a))
    }

    /// Selected values joined for display: known choices in choice order,
    /// then anything else in submission order.
    #[must_use]
    pub fn joined_for(&self, question: &Question) -> String {
        let choices = question.choices();
        let mut ordered: Vec<&str> = choices
            .iter()
            .filter(|c| self.contains(c))
            .map(String::as_str)
            .collect();
        ordered.extend(
            self.values
                .iter()
                .filter(|v| !choices.contains(v))
                .map(String::as_str),
        );
        ordered.join(", ")
    }
}
