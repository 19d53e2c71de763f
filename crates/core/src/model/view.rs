use crate::model::question::Question;

/// A choice with its positional label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledChoice {
    pub label: String,
    pub value: String,
}

/// Presentation-agnostic data a host needs to render one question.
///
/// No pre-formatted strings: the host decides how to show the number, the
/// labels and the multi-select hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// 1-based position within the session.
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub choices: Vec<LabeledChoice>,
    pub multi_select: bool,
    pub is_last: bool,
}

impl QuestionView {
    #[must_use]
    pub fn new(question: &Question, index: usize, total: usize) -> Self {
        Self {
            number: index + 1,
            total,
            text: question.text().to_owned(),
            choices: question
                .labeled_choices()
                .map(|(label, value)| LabeledChoice {
                    label,
                    value: value.to_owned(),
                })
                .collect(),
            multi_select: question.is_multi_select(),
            is_last: index + 1 == total,
        }
    }
}
