mod grading;
mod question;
mod report;
mod selection;
mod view;

pub use grading::{GradeOutcome, GradingState, MistakeRecord, SequenceError, grade};
pub use question::{Question, QuestionDraft, QuestionError, choice_label, label_index};
pub use report::QuizReport;
pub use selection::Selection;
pub use view::{LabeledChoice, QuestionView};
