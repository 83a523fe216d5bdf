//! Scoring engine.
//!
//! Single choice and true/false questions score on exact text equality.
//! Multiple choice uses the exact-match policy: full points only when the
//! selected set equals the correct set, nothing for missing, extra, or wrong
//! selections. Unanswered questions score zero.

use serde::{Deserialize, Serialize};

use crate::answers::{Answer, AnswerSheet};
use crate::model::{Category, CorrectAnswer, Exam, ExamQuestion};

/// Points are summed as floats; totals are rounded to this many decimal
/// places so that e.g. eight questions at 0.1 add up to exactly 0.8.
const POINT_DECIMALS: i32 = 6;

/// Tolerance for comparing point totals.
pub const POINT_EPSILON: f64 = 1e-9;

/// Round a point sum to a stable number of decimals.
pub fn round_points(points: f64) -> f64 {
    let scale = 10f64.powi(POINT_DECIMALS);
    (points * scale).round() / scale
}

/// Whether `total` reaches `threshold`, tolerating float drift.
pub fn meets_threshold(total: f64, threshold: f64) -> bool {
    total + POINT_EPSILON >= threshold
}

/// Whether `answer` earns full credit for `question`.
pub fn is_correct(question: &ExamQuestion, answer: &Answer) -> bool {
    match (&question.correct_answer, answer) {
        (CorrectAnswer::Single(correct), Answer::Single(given)) => correct == given,
        (CorrectAnswer::Multiple(correct), Answer::Multiple(given)) => {
            !given.is_empty() && correct == given
        }
        _ => false,
    }
}

/// Earned/possible points for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    /// Questions answered correctly.
    pub correct: usize,
    /// Questions of this category in the exam.
    pub questions: usize,
    pub earned: f64,
    pub possible: f64,
}

/// Result of grading an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub possible: f64,
    pub pass_threshold: f64,
    pub passed: bool,
    pub correct_count: usize,
    pub question_count: usize,
    /// Per-category subtotals in block order.
    pub categories: Vec<CategoryScore>,
}

impl ScoreBreakdown {
    /// Subtotal for one category, if the exam contains it.
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Grade `answers` against `exam`.
///
/// Pure: the same exam and answers always produce the same breakdown.
/// Slots missing from a short answer sheet count as unanswered.
pub fn score(exam: &Exam, answers: &AnswerSheet) -> ScoreBreakdown {
    let mut categories: Vec<CategoryScore> = Category::ALL
        .iter()
        .filter(|&&category| exam.questions.iter().any(|q| q.category == category))
        .map(|&category| CategoryScore {
            category,
            correct: 0,
            questions: 0,
            earned: 0.0,
            possible: 0.0,
        })
        .collect();

    for (index, question) in exam.questions.iter().enumerate() {
        let Some(subtotal) = categories
            .iter_mut()
            .find(|c| c.category == question.category)
        else {
            continue;
        };
        subtotal.questions += 1;
        subtotal.possible += question.points;

        let correct = answers
            .get(index)
            .map(|answer| is_correct(question, answer))
            .unwrap_or(false);
        if correct {
            subtotal.correct += 1;
            subtotal.earned += question.points;
        }
    }

    for subtotal in &mut categories {
        subtotal.earned = round_points(subtotal.earned);
        subtotal.possible = round_points(subtotal.possible);
    }
    let total = round_points(categories.iter().map(|c| c.earned).sum());
    let possible = round_points(categories.iter().map(|c| c.possible).sum());
    ScoreBreakdown {
        total,
        possible,
        pass_threshold: exam.pass_threshold,
        passed: meets_threshold(total, exam.pass_threshold),
        correct_count: categories.iter().map(|c| c.correct).sum(),
        question_count: exam.len(),
        categories,
    }
}
