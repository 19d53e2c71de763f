use std::fmt::Write as _;

use quiz_core::model::{GradeOutcome, QuestionView, QuizReport};
use services::SessionProgress;

pub fn question(view: &QuestionView, progress: &SessionProgress) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nQuestions pending: {}", progress.remaining);
    let _ = write!(out, "{}. {}", view.number, view.text);
    if view.multi_select {
        out.push_str(" (select all that apply)");
    }
    out.push('\n');
    for choice in &view.choices {
        let _ = writeln!(out, "  {}. {}", choice.label, choice.value);
    }
    out
}

pub fn prompt(view: &QuestionView) -> &'static str {
    if view.multi_select {
        "answer (e.g. A, C), or `finish`> "
    } else {
        "answer (e.g. B), or `finish`> "
    }
}

pub fn next_hint(view: &QuestionView) -> &'static str {
    if view.is_last {
        "press enter to finish exam"
    } else {
        "press enter for the next question"
    }
}

pub fn outcome(outcome: &GradeOutcome) -> String {
    match outcome {
        GradeOutcome::Correct => "Correct!".to_owned(),
        GradeOutcome::Incorrect { correct } => {
            format!("Incorrect. Correct answers: {}", correct.join(", "))
        }
    }
}

pub fn report(report: &QuizReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nQuiz finished!");
    let _ = writeln!(
        out,
        "You scored {} out of {} ({}%).",
        report.score,
        report.total,
        report.rounded_percentage()
    );
    if report.unanswered > 0 {
        let _ = writeln!(out, "{} question(s) left unanswered.", report.unanswered);
    }

    if report.mistakes.is_empty() {
        if report.is_perfect() {
            let _ = writeln!(out, "Perfect score!");
        } else if report.answered > 0 {
            let _ = writeln!(out, "No mistakes in the {} answered.", report.answered);
        }
        return out;
    }

    let _ = writeln!(out, "\nReview your mistakes:");
    for mistake in &report.mistakes {
        let _ = writeln!(out, "\nQ: {}", mistake.question);
        let _ = writeln!(out, "   Your answer:    {}", mistake.user_answer);
        let _ = writeln!(out, "   Correct answer: {}", mistake.correct_answer);
    }
    out
}
