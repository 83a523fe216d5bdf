//! Exam assembly.
//!
//! Samples each category without replacement, shuffles every question's
//! options with a uniform permutation, and re-derives the correct answer in
//! terms of the shuffled (and optionally relabeled) option texts.

use std::collections::BTreeSet;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::bank::{resolve_correct, resolve_truth};
use crate::model::{
    option_body, Category, CorrectAnswer, Exam, ExamQuestion, QuestionBank, RawQuestion,
    FALSE_LABEL, OPTION_DELIMITER, TRUE_LABEL,
};
use crate::profile::{CategoryRule, ExamProfile};

/// Maps each option's original position to its position after shuffling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRemap {
    positions: Vec<usize>,
}

impl LabelRemap {
    /// Build from a presentation order where `order[new] == original`.
    pub fn from_order(order: &[usize]) -> Self {
        let mut positions = vec![0; order.len()];
        for (new, &original) in order.iter().enumerate() {
            if let Some(slot) = positions.get_mut(original) {
                *slot = new;
            }
        }
        Self { positions }
    }

    /// New position of the option originally at `original`.
    pub fn new_position(&self, original: usize) -> Option<usize> {
        self.positions.get(original).copied()
    }

    /// New letter tag of the option originally at `original`.
    pub fn label_for(&self, original: usize) -> Option<char> {
        self.new_position(original).and_then(label_letter)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn label_letter(position: usize) -> Option<char> {
    ('A'..='Z').nth(position)
}

/// Tag shuffled option bodies with sequential letters.
///
/// Each entry is `(original position, body)` in presentation order. Returns
/// the labeled texts and the original → new position table.
pub fn relabel(shuffled: &[(usize, &str)]) -> (Vec<String>, LabelRemap) {
    let options = shuffled
        .iter()
        .enumerate()
        .map(|(position, (_, body))| match label_letter(position) {
            Some(letter) => format!("{letter}{OPTION_DELIMITER}{body}"),
            None => (*body).to_string(),
        })
        .collect();
    let order: Vec<usize> = shuffled.iter().map(|(original, _)| *original).collect();
    (options, LabelRemap::from_order(&order))
}

/// Assemble an exam from a validated bank.
///
/// Categories are laid out as contiguous blocks in `Category` order. A
/// category with fewer questions than the profile asks for contributes what
/// it has; validation against the profile's requirements rules that out.
pub fn assemble<R: Rng + ?Sized>(bank: &QuestionBank, profile: &ExamProfile, rng: &mut R) -> Exam {
    let mut questions = Vec::with_capacity(profile.question_count());

    for (&category, rule) in &profile.categories {
        if rule.count == 0 {
            continue;
        }
        let pool = bank.questions(category);
        if pool.len() < rule.count {
            tracing::warn!(
                "`{category}` has {} questions, profile asks for {}",
                pool.len(),
                rule.count
            );
        }

        let mut drawn: Vec<usize> = (0..pool.len()).collect();
        drawn.shuffle(rng);
        drawn.truncate(rule.count);

        let before = questions.len();
        for source_index in drawn {
            let raw = &pool[source_index];
            let built = match category {
                Category::TrueFalse => build_true_false(source_index, raw, rule),
                Category::SingleChoice | Category::MultipleChoice => {
                    build_choice(category, source_index, raw, rule, profile.relabel_options, rng)
                }
            };
            match built {
                Ok(question) => questions.push(question),
                Err(reason) => {
                    tracing::warn!("skipping `{category}` question #{source_index}: {reason}")
                }
            }
        }
        tracing::debug!("drew {} `{category}` questions", questions.len() - before);
    }

    Exam {
        id: Uuid::new_v4(),
        profile: profile.name.clone(),
        created_at: Utc::now(),
        pass_threshold: profile.pass_threshold,
        questions,
    }
}

/// Assemble with the thread-local RNG.
pub fn assemble_random(bank: &QuestionBank, profile: &ExamProfile) -> Exam {
    assemble(bank, profile, &mut rand::thread_rng())
}

fn build_choice<R: Rng + ?Sized>(
    category: Category,
    source_index: usize,
    raw: &RawQuestion,
    rule: &CategoryRule,
    relabel_options: bool,
    rng: &mut R,
) -> Result<ExamQuestion, String> {
    let correct = resolve_correct(category, raw)?;

    let mut order: Vec<usize> = (0..raw.options.len()).collect();
    order.shuffle(rng);

    let (shuffled_options, remap) = if relabel_options {
        let shuffled: Vec<(usize, &str)> = order
            .iter()
            .map(|&i| (i, option_body(&raw.options[i])))
            .collect();
        relabel(&shuffled)
    } else {
        let bodies = order
            .iter()
            .map(|&i| option_body(&raw.options[i]).to_string())
            .collect();
        (bodies, LabelRemap::from_order(&order))
    };

    let texts: BTreeSet<String> = correct
        .iter()
        .filter_map(|&original| remap.new_position(original))
        .filter_map(|position| shuffled_options.get(position).cloned())
        .collect();
    if texts.len() != correct.len() {
        return Err("correct options lost while shuffling".into());
    }

    let correct_answer = match category {
        Category::SingleChoice => match texts.into_iter().next() {
            Some(text) => CorrectAnswer::Single(text),
            None => return Err("no correct option".into()),
        },
        _ => CorrectAnswer::Multiple(texts),
    };

    let mut question = ExamQuestion {
        category,
        source_index,
        question: raw.question.clone(),
        shuffled_options,
        correct_answer,
        display_answer: String::new(),
        explanation: raw.explanation.clone(),
        points: rule.points,
    };
    question.display_answer = match &question.correct_answer {
        CorrectAnswer::Single(text) => text.clone(),
        CorrectAnswer::Multiple(texts) => question.display_selection(texts),
    };
    Ok(question)
}

fn build_true_false(
    source_index: usize,
    raw: &RawQuestion,
    rule: &CategoryRule,
) -> Result<ExamQuestion, String> {
    let label = if resolve_truth(&raw.answer)? {
        TRUE_LABEL
    } else {
        FALSE_LABEL
    };
    Ok(ExamQuestion {
        category: Category::TrueFalse,
        source_index,
        question: raw.question.clone(),
        shuffled_options: vec![TRUE_LABEL.to_string(), FALSE_LABEL.to_string()],
        correct_answer: CorrectAnswer::Single(label.to_string()),
        display_answer: label.to_string(),
        explanation: raw.explanation.clone(),
        points: rule.points,
    })
}
