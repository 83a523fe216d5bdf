//! Wrong-answer review and the pre-submit preview.

use serde::{Deserialize, Serialize};

use crate::answers::{Answer, AnswerSheet};
use crate::model::{Category, Exam};
use crate::scoring::is_correct;

/// A question the user missed, with everything a review screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongAnswer {
    /// Position of the question in the exam.
    pub index: usize,
    pub category: Category,
    pub question: String,
    /// The user's answer, or the "not answered" sentinel.
    pub user_answer: String,
    pub correct_answer: String,
    /// Explanation, or the "no explanation" sentinel.
    pub explanation: String,
}

/// Every question not answered correctly, in exam order.
///
/// Uses the same comparison as [`crate::scoring::score`], so the list and the
/// score always agree.
pub fn wrong_answers(exam: &Exam, answers: &AnswerSheet) -> Vec<WrongAnswer> {
    exam.questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let answer = answers.get(index).unwrap_or(&Answer::Unanswered);
            if is_correct(question, answer) {
                return None;
            }
            Some(WrongAnswer {
                index,
                category: question.category,
                question: question.question.clone(),
                user_answer: answer.display(question),
                correct_answer: question.display_answer.clone(),
                explanation: question.explanation_or_default().to_string(),
            })
        })
        .collect()
}

/// How an answer stands in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// One row of the pre-submit preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewItem {
    pub index: usize,
    pub question: String,
    pub user_answer: String,
    /// Revealed only for answered questions.
    pub correct_answer: Option<String>,
    pub status: QuestionStatus,
}

/// Summarize every question before submission.
pub fn preview(exam: &Exam, answers: &AnswerSheet) -> Vec<PreviewItem> {
    exam.questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answer = answers.get(index).unwrap_or(&Answer::Unanswered);
            let status = if !answer.is_answered() {
                QuestionStatus::Unanswered
            } else if is_correct(question, answer) {
                QuestionStatus::Correct
            } else {
                QuestionStatus::Incorrect
            };
            PreviewItem {
                index,
                question: question.question.clone(),
                user_answer: answer.display(question),
                correct_answer: (status != QuestionStatus::Unanswered)
                    .then(|| question.display_answer.clone()),
                status,
            }
        })
        .collect()
}
