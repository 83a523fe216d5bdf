//! Core data model types for quizforge.
//!
//! Raw questions as they appear in a question bank, and the exam questions
//! the assembler derives from them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::resolve_reference;
use crate::error::IndexError;

/// Separates the letter tag from the body of a labeled option (`"A、body"`).
pub const OPTION_DELIMITER: char = '、';

/// Option text for a true statement.
pub const TRUE_LABEL: &str = "正确";

/// Option text for a false statement.
pub const FALSE_LABEL: &str = "错误";

/// Shown in place of a user answer for unanswered questions.
pub const NOT_ANSWERED: &str = "未作答";

/// Shown when a question carries no explanation.
pub const NO_EXPLANATION: &str = "暂无解析";

/// Question categories, in exam block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
}

impl Category {
    /// All categories in block order.
    pub const ALL: [Category; 3] = [
        Category::SingleChoice,
        Category::MultipleChoice,
        Category::TrueFalse,
    ];

    /// Key used for this category in bank documents and profiles.
    pub fn key(self) -> &'static str {
        match self {
            Category::SingleChoice => "single_choice",
            Category::MultipleChoice => "multiple_choice",
            Category::TrueFalse => "true_false",
        }
    }

    /// Heading shown above questions of this category.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::SingleChoice => "单选题",
            Category::MultipleChoice => "多选题",
            Category::TrueFalse => "判断题",
        }
    }

    /// Whether questions of this category carry their own option list.
    pub fn has_options(self) -> bool {
        !matches!(self, Category::TrueFalse)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_choice" | "single" | "choice" => Ok(Category::SingleChoice),
            "multiple_choice" | "multiple" | "multi" => Ok(Category::MultipleChoice),
            "true_false" | "judgment" | "judgement" | "tf" => Ok(Category::TrueFalse),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// The `answer` field of a raw question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    /// True/false questions.
    Bool(bool),
    /// A label (`"B"`), full option text, option body, or label run (`"ACD"`).
    Text(String),
    /// Multiple-choice answers as a list of references.
    List(Vec<String>),
}

/// A question as stored in the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    /// Question stem.
    pub question: String,
    /// Option texts; empty for true/false questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// Reference to the correct option(s) or the truth value.
    pub answer: RawAnswer,
    /// Optional explanation shown during review.
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A validated question bank.
///
/// Only `bank::validate_bank` constructs one, so every question in it can be
/// assembled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionBank {
    pub(crate) categories: BTreeMap<Category, Vec<RawQuestion>>,
}

impl QuestionBank {
    /// Questions of one category, in bank order.
    pub fn questions(&self, category: Category) -> &[RawQuestion] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of questions in one category.
    pub fn count(&self, category: Category) -> usize {
        self.questions(category).len()
    }

    /// Total number of questions across categories.
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Split a labeled option into its letter and body.
///
/// `"B、Rust"` yields `(Some('B'), "Rust")`; text without a letter tag is
/// returned whole as the body.
pub fn split_label(option: &str) -> (Option<char>, &str) {
    let trimmed = option.trim();
    let mut chars = trimmed.char_indices();
    if let (Some((_, letter)), Some((at, delimiter))) = (chars.next(), chars.next()) {
        if letter.is_ascii_uppercase() && delimiter == OPTION_DELIMITER {
            return (Some(letter), trimmed[at + delimiter.len_utf8()..].trim());
        }
    }
    (None, trimmed)
}

/// The body of an option with any letter tag removed.
pub fn option_body(option: &str) -> &str {
    split_label(option).1
}

/// The correct answer re-expressed in terms of shuffled option texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CorrectAnswer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl CorrectAnswer {
    /// Whether `text` is (one of) the correct option(s).
    pub fn contains(&self, text: &str) -> bool {
        match self {
            CorrectAnswer::Single(answer) => answer == text,
            CorrectAnswer::Multiple(answers) => answers.contains(text),
        }
    }

    /// All correct option texts.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            CorrectAnswer::Single(answer) => vec![answer.as_str()],
            CorrectAnswer::Multiple(answers) => answers.iter().map(String::as_str).collect(),
        }
    }
}

/// A question as it appears in an assembled exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub category: Category,
    /// Position of the source question within its bank category.
    pub source_index: usize,
    pub question: String,
    /// Options in presentation order; user selections are compared against these.
    pub shuffled_options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    /// Human-readable correct answer for review screens.
    pub display_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Points awarded for a correct answer.
    pub points: f64,
}

impl ExamQuestion {
    /// Render a multi-select as labels (or bodies for unlabeled options)
    /// in option order, joined with the option delimiter.
    pub fn display_selection(&self, selected: &BTreeSet<String>) -> String {
        let mut parts: Vec<&str> = self
            .shuffled_options
            .iter()
            .filter(|option| selected.contains(option.as_str()))
            .map(|option| match split_label(option) {
                (Some(_), _) => &option.trim()[..1],
                (None, body) => body,
            })
            .collect();
        // Selections not among the options still show up, after the known ones.
        parts.extend(
            selected
                .iter()
                .filter(|s| !self.shuffled_options.contains(s))
                .map(String::as_str),
        );
        parts.join(&OPTION_DELIMITER.to_string())
    }

    /// Resolve a user reference (letter tag, full text, or body) to one of
    /// this question's options.
    pub fn option_for(&self, reference: &str) -> Option<&str> {
        resolve_reference(&self.shuffled_options, reference)
            .and_then(|pos| self.shuffled_options.get(pos))
            .map(String::as_str)
    }

    /// Explanation text, falling back to the "no explanation" sentinel.
    pub fn explanation_or_default(&self) -> &str {
        self.explanation
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(NO_EXPLANATION)
    }
}

/// An assembled exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    /// Name of the profile the exam was assembled from.
    pub profile: String,
    pub created_at: DateTime<Utc>,
    /// Minimum total score that counts as a pass.
    pub pass_threshold: f64,
    /// Questions in contiguous category blocks.
    pub questions: Vec<ExamQuestion>,
}

impl Exam {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The question at `index`.
    pub fn question(&self, index: usize) -> Result<&ExamQuestion, IndexError> {
        self.questions.get(index).ok_or(IndexError {
            index,
            len: self.questions.len(),
        })
    }

    /// Questions belonging to one category block.
    pub fn block(&self, category: Category) -> impl Iterator<Item = (usize, &ExamQuestion)> {
        self.questions
            .iter()
            .enumerate()
            .filter(move |(_, q)| q.category == category)
    }

    /// Maximum achievable score.
    pub fn possible_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}
