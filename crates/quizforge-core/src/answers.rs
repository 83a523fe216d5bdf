//! Answer tracking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::model::{Category, Exam, ExamQuestion, NOT_ANSWERED};

/// The user's response to one question.
///
/// Serialized untagged: `null`, a string, or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    #[default]
    Unanswered,
    /// Selected option of a single choice or true/false question.
    Single(String),
    /// Selected options of a multiple choice question.
    Multiple(BTreeSet<String>),
}

impl Answer {
    /// A single selection or a non-empty set counts as answered.
    pub fn is_answered(&self) -> bool {
        match self {
            Answer::Unanswered => false,
            Answer::Single(_) => true,
            Answer::Multiple(selected) => !selected.is_empty(),
        }
    }

    /// Text shown for this answer on review screens.
    pub fn display(&self, question: &ExamQuestion) -> String {
        match self {
            Answer::Single(text) => text.clone(),
            Answer::Multiple(selected) if !selected.is_empty() => {
                question.display_selection(selected)
            }
            Answer::Multiple(_) | Answer::Unanswered => NOT_ANSWERED.to_string(),
        }
    }

    /// Whether `option` is part of this answer.
    pub fn includes(&self, option: &str) -> bool {
        match self {
            Answer::Unanswered => false,
            Answer::Single(text) => text == option,
            Answer::Multiple(selected) => selected.contains(option),
        }
    }
}

/// One answer slot per exam question, index-aligned with the exam.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    slots: Vec<Answer>,
}

impl AnswerSheet {
    /// An all-unanswered sheet with `len` slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Answer::Unanswered; len],
        }
    }

    /// An all-unanswered sheet sized for `exam`.
    pub fn for_exam(exam: &Exam) -> Self {
        Self::new(exam.len())
    }

    pub fn from_answers(slots: Vec<Answer>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.slots.iter()
    }

    /// The answer at `index`.
    pub fn get(&self, index: usize) -> Result<&Answer, IndexError> {
        self.slots.get(index).ok_or(IndexError {
            index,
            len: self.slots.len(),
        })
    }

    /// Whether the question at `index` has been answered.
    pub fn is_answered(&self, index: usize) -> Result<bool, IndexError> {
        self.get(index).map(Answer::is_answered)
    }

    /// Number of answered questions.
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|a| a.is_answered()).count()
    }

    /// Record a selection for the question at `index`.
    ///
    /// Single choice and true/false replace the slot; multiple choice
    /// toggles `option` in the slot's set. Options not offered by the
    /// question are recorded as given and simply never score.
    pub fn select(
        &mut self,
        exam: &Exam,
        index: usize,
        option: &str,
    ) -> Result<&Answer, IndexError> {
        let question = exam.question(index)?;
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or(IndexError { index, len })?;

        if !question.shuffled_options.iter().any(|o| o == option) {
            tracing::debug!("question {index} has no option {option:?}; recording it anyway");
        }

        match question.category {
            Category::SingleChoice | Category::TrueFalse => {
                *slot = Answer::Single(option.to_string());
            }
            Category::MultipleChoice => {
                let mut selected = match std::mem::take(slot) {
                    Answer::Multiple(selected) => selected,
                    Answer::Unanswered | Answer::Single(_) => BTreeSet::new(),
                };
                if !selected.remove(option) {
                    selected.insert(option.to_string());
                }
                *slot = Answer::Multiple(selected);
            }
        }
        Ok(slot)
    }

    /// Reset the slot at `index` to unanswered.
    pub fn clear(&mut self, index: usize) -> Result<(), IndexError> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or(IndexError { index, len })?;
        *slot = Answer::Unanswered;
        Ok(())
    }
}
