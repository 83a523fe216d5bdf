//! Turning what a user types into option texts.
//!
//! Users refer to options by letter (`B`), by a run of letters for multiple
//! choice (`ACD`), or by text. True/false questions also accept the usual
//! yes/no spellings.

use std::collections::BTreeSet;

use quizforge_core::model::{FALSE_LABEL, OPTION_DELIMITER, TRUE_LABEL};
use quizforge_core::{Answer, AnswerSheet, Category, Exam, ExamQuestion};

/// Option texts selected by `input` for `question`. References that match
/// no option are passed through unchanged.
pub fn resolve_selection(question: &ExamQuestion, input: &str) -> Vec<String> {
    let input = input.trim();
    if input.is_empty() {
        return Vec::new();
    }

    match question.category {
        Category::TrueFalse => {
            let text = match input.to_lowercase().as_str() {
                "t" | "true" | "y" | "yes" | "对" => TRUE_LABEL.to_string(),
                "f" | "false" | "n" | "no" | "错" => FALSE_LABEL.to_string(),
                _ => resolve_one(question, input),
            };
            vec![text]
        }
        Category::SingleChoice => vec![resolve_one(question, input)],
        Category::MultipleChoice => {
            if let Some(option) = question.option_for(input) {
                return vec![option.to_string()];
            }
            if input.chars().all(|c| c.is_ascii_alphabetic()) {
                return input
                    .chars()
                    .map(|c| resolve_one(question, &c.to_string()))
                    .collect();
            }
            input
                .split(|c| c == OPTION_DELIMITER || c == ',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| resolve_one(question, part))
                .collect()
        }
    }
}

fn resolve_one(question: &ExamQuestion, reference: &str) -> String {
    question
        .option_for(reference)
        .map(str::to_string)
        .unwrap_or_else(|| reference.to_string())
}

/// Rewrite an answer sheet written by hand so every entry names option
/// texts of the exam.
pub fn normalize_answers(exam: &Exam, answers: &AnswerSheet) -> AnswerSheet {
    let slots = exam
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| match answers.get(index) {
            Ok(Answer::Single(text)) => {
                let mut selected = resolve_selection(question, text);
                match question.category {
                    Category::MultipleChoice => Answer::Multiple(selected.into_iter().collect()),
                    _ if selected.len() == 1 => Answer::Single(selected.remove(0)),
                    _ => Answer::Single(text.clone()),
                }
            }
            Ok(Answer::Multiple(set)) if question.category == Category::MultipleChoice => {
                let selected: BTreeSet<String> = set
                    .iter()
                    .flat_map(|s| resolve_selection(question, s))
                    .collect();
                Answer::Multiple(selected)
            }
            Ok(other) => other.clone(),
            Err(_) => Answer::Unanswered,
        })
        .collect();
    AnswerSheet::from_answers(slots)
}
