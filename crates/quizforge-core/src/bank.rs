//! Question bank validation.
//!
//! Checks a raw JSON document against the categories and minimum counts an
//! exam profile needs, then checks each question is structurally usable.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{
    option_body, split_label, Category, QuestionBank, RawAnswer, RawQuestion, FALSE_LABEL,
    OPTION_DELIMITER, TRUE_LABEL,
};

/// Most options a choice question may carry (one per letter tag).
pub const MAX_OPTIONS: usize = 26;

/// Minimum question count per required category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankRequirements {
    minimums: BTreeMap<Category, usize>,
}

impl BankRequirements {
    pub fn new(minimums: impl IntoIterator<Item = (Category, usize)>) -> Self {
        Self {
            minimums: minimums.into_iter().filter(|(_, n)| *n > 0).collect(),
        }
    }

    /// 100 single choice, 20 multiple choice, 30 true/false.
    pub fn standard() -> Self {
        Self::new([
            (Category::SingleChoice, 100),
            (Category::MultipleChoice, 20),
            (Category::TrueFalse, 30),
        ])
    }

    /// Minimum count for a category; 0 when it is not required.
    pub fn minimum(&self, category: Category) -> usize {
        self.minimums.get(&category).copied().unwrap_or(0)
    }

    /// Required categories in block order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.minimums.iter().map(|(c, n)| (*c, *n))
    }
}

/// Validate a raw bank document.
///
/// Required categories are checked first, in block order, so the error
/// names the first missing or short category. Every question present is
/// then checked, including those of categories the profile does not draw.
pub fn validate_bank(
    raw: &Value,
    requirements: &BankRequirements,
) -> Result<QuestionBank, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    for (category, required) in requirements.categories() {
        let value = object
            .get(category.key())
            .ok_or(ValidationError::MissingCategory { category })?;
        let items = value
            .as_array()
            .ok_or(ValidationError::NotASequence { category })?;
        if items.len() < required {
            return Err(ValidationError::TooFewQuestions {
                category,
                found: items.len(),
                required,
            });
        }
    }

    let mut categories = BTreeMap::new();
    for category in Category::ALL {
        let Some(value) = object.get(category.key()) else {
            continue;
        };
        let items = value
            .as_array()
            .ok_or(ValidationError::NotASequence { category })?;

        let mut questions = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let malformed = |reason: String| ValidationError::MalformedQuestion {
                category,
                index,
                reason,
            };
            let question = RawQuestion::deserialize(item).map_err(|e| malformed(e.to_string()))?;
            check_question(category, &question).map_err(malformed)?;
            questions.push(question);
        }
        categories.insert(category, questions);
    }

    let bank = QuestionBank { categories };
    tracing::debug!(
        single = bank.count(Category::SingleChoice),
        multiple = bank.count(Category::MultipleChoice),
        true_false = bank.count(Category::TrueFalse),
        "question bank validated"
    );
    Ok(bank)
}

fn check_question(category: Category, question: &RawQuestion) -> Result<(), String> {
    if question.question.trim().is_empty() {
        return Err("question text is empty".into());
    }

    match category {
        Category::TrueFalse => resolve_truth(&question.answer).map(|_| ()),
        Category::SingleChoice | Category::MultipleChoice => {
            let count = question.options.len();
            if !(2..=MAX_OPTIONS).contains(&count) {
                return Err(format!(
                    "expected 2 to {MAX_OPTIONS} options, found {count}"
                ));
            }
            if question.options.iter().any(|o| option_body(o).is_empty()) {
                return Err("option text is empty".into());
            }
            let mut bodies = HashSet::new();
            if let Some(duplicate) = question
                .options
                .iter()
                .map(|o| option_body(o))
                .find(|body| !bodies.insert(*body))
            {
                return Err(format!("option `{duplicate}` appears more than once"));
            }
            resolve_correct(category, question).map(|_| ())
        }
    }
}

/// Resolve one answer reference to an option position.
///
/// Tried in order: letter tag (`"B"`), full option text (`"B、body"`),
/// option body, and finally the letter as a position when the options
/// carry no tags.
pub(crate) fn resolve_reference(options: &[String], reference: &str) -> Option<usize> {
    let reference = reference.trim();
    let letter = single_letter(reference);

    if let Some(letter) = letter {
        if let Some(pos) = options.iter().position(|o| split_label(o).0 == Some(letter)) {
            return Some(pos);
        }
    }
    if let Some(pos) = options.iter().position(|o| o.trim() == reference) {
        return Some(pos);
    }
    let body = option_body(reference);
    if let Some(pos) = options.iter().position(|o| option_body(o) == body) {
        return Some(pos);
    }
    let unlabeled = options.iter().all(|o| split_label(o).0.is_none());
    match letter {
        Some(letter) if unlabeled => {
            let pos = (letter as u8 - b'A') as usize;
            (pos < options.len()).then_some(pos)
        }
        _ => None,
    }
}

fn single_letter(reference: &str) -> Option<char> {
    let mut chars = reference.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Positions of the correct option(s) of a choice question, sorted.
pub(crate) fn resolve_correct(
    category: Category,
    question: &RawQuestion,
) -> Result<Vec<usize>, String> {
    let unresolved = |r: &str| format!("answer `{r}` does not match any option");
    let options = &question.options;

    let mut positions = match (&question.answer, category) {
        (RawAnswer::Bool(_), _) => return Err("choice answer must be text, not a boolean".into()),
        (RawAnswer::Text(reference), Category::SingleChoice) => {
            vec![resolve_reference(options, reference).ok_or_else(|| unresolved(reference))?]
        }
        (RawAnswer::List(references), Category::SingleChoice) => match references.as_slice() {
            [reference] => {
                vec![resolve_reference(options, reference).ok_or_else(|| unresolved(reference))?]
            }
            _ => return Err("single choice answer must name exactly one option".into()),
        },
        (RawAnswer::Text(reference), _) => match resolve_reference(options, reference) {
            Some(pos) => vec![pos],
            // A run of letter tags, e.g. "ACD".
            None => reference
                .chars()
                .filter(|c| !c.is_whitespace() && *c != OPTION_DELIMITER && *c != ',')
                .map(|c| {
                    resolve_reference(options, &c.to_string()).ok_or_else(|| unresolved(reference))
                })
                .collect::<Result<Vec<_>, _>>()?,
        },
        (RawAnswer::List(references), _) => references
            .iter()
            .map(|r| resolve_reference(options, r).ok_or_else(|| unresolved(r)))
            .collect::<Result<Vec<_>, _>>()?,
    };

    positions.sort_unstable();
    positions.dedup();
    if positions.is_empty() {
        return Err("answer names no options".into());
    }
    Ok(positions)
}

/// Truth value of a true/false question.
pub(crate) fn resolve_truth(answer: &RawAnswer) -> Result<bool, String> {
    match answer {
        RawAnswer::Bool(value) => Ok(*value),
        RawAnswer::Text(text) => match text.trim() {
            t if t == TRUE_LABEL || t.eq_ignore_ascii_case("true") => Ok(true),
            t if t == FALSE_LABEL || t.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(format!("true/false answer `{other}` is not a truth value")),
        },
        RawAnswer::List(_) => Err("true/false answer must be a boolean".into()),
    }
}
