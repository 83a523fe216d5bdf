//! Exam profiles: how many questions each category contributes, what they
//! are worth, and the timing rules of an attempt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bank::BankRequirements;
use crate::error::ProfileError;
use crate::model::Category;
use crate::scoring::{meets_threshold, round_points};

/// File picked up from the working directory when no profile is given.
pub const PROFILE_FILE_NAME: &str = "quizforge.toml";

/// Draw size and point value for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Questions drawn from the bank.
    pub count: usize,
    /// Points per correct answer.
    pub points: f64,
}

impl CategoryRule {
    pub fn new(count: usize, points: f64) -> Self {
        Self { count, points }
    }

    /// Points available in this category.
    pub fn possible(&self) -> f64 {
        self.count as f64 * self.points
    }
}

/// Configuration of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamProfile {
    #[serde(default = "default_name")]
    pub name: String,
    /// Per-category rules; iteration order is the exam's block order.
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<Category, CategoryRule>,
    /// Minimum total score that passes.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Seconds that must elapse before a manual submit is accepted.
    #[serde(default = "default_min_submit_secs")]
    pub min_submit_secs: u64,
    /// Total time budget in seconds; reaching it forces submission.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
    /// Relabel shuffled options with fresh `A、`, `B、`, ... tags.
    #[serde(default = "default_true")]
    pub relabel_options: bool,
}

fn default_name() -> String {
    "standard".to_string()
}

fn default_categories() -> BTreeMap<Category, CategoryRule> {
    BTreeMap::from([
        (Category::SingleChoice, CategoryRule::new(100, 0.5)),
        (Category::MultipleChoice, CategoryRule::new(20, 1.0)),
        (Category::TrueFalse, CategoryRule::new(30, 1.0)),
    ])
}

fn default_pass_threshold() -> f64 {
    60.0
}

fn default_min_submit_secs() -> u64 {
    30 * 60
}

fn default_time_limit_secs() -> u64 {
    120 * 60
}

fn default_true() -> bool {
    true
}

impl Default for ExamProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExamProfile {
    /// 100 single choice (0.5), 20 multiple choice (1.0), 30 true/false (1.0).
    pub fn standard() -> Self {
        Self {
            name: default_name(),
            categories: default_categories(),
            pass_threshold: default_pass_threshold(),
            min_submit_secs: default_min_submit_secs(),
            time_limit_secs: default_time_limit_secs(),
            relabel_options: true,
        }
    }

    /// The original 50-question paper: 40 single choice and 10 true/false,
    /// two points each, options shown without letter tags.
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            categories: BTreeMap::from([
                (Category::SingleChoice, CategoryRule::new(40, 2.0)),
                (Category::TrueFalse, CategoryRule::new(10, 2.0)),
            ]),
            pass_threshold: 60.0,
            min_submit_secs: 0,
            time_limit_secs: 60 * 60,
            relabel_options: false,
        }
    }

    /// Look up a built-in profile by name.
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name.to_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "classic" => Ok(Self::classic()),
            other => Err(ProfileError::UnknownPreset(other.to_string())),
        }
    }

    /// Rule for one category, if the profile draws from it.
    pub fn rule(&self, category: Category) -> Option<&CategoryRule> {
        self.categories.get(&category).filter(|r| r.count > 0)
    }

    /// Number of questions in an exam built from this profile.
    pub fn question_count(&self) -> usize {
        self.categories.values().map(|r| r.count).sum()
    }

    /// Maximum achievable score.
    pub fn possible_points(&self) -> f64 {
        round_points(self.categories.values().map(CategoryRule::possible).sum())
    }

    pub fn min_submit(&self) -> Duration {
        Duration::from_secs(self.min_submit_secs)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// What a bank must contain to assemble this profile.
    pub fn requirements(&self) -> BankRequirements {
        BankRequirements::new(
            self.categories
                .iter()
                .filter(|(_, rule)| rule.count > 0)
                .map(|(category, rule)| (*category, rule.count)),
        )
    }

    /// Check the profile for inconsistent values.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.question_count() == 0 {
            return Err(invalid("profile draws no questions".into()));
        }
        for (category, rule) in &self.categories {
            if !rule.points.is_finite() || rule.points < 0.0 {
                return Err(invalid(format!(
                    "points for `{category}` must be a non-negative number"
                )));
            }
        }
        if !self.pass_threshold.is_finite() || self.pass_threshold < 0.0 {
            return Err(invalid("pass_threshold must be a non-negative number".into()));
        }
        if !meets_threshold(self.possible_points(), self.pass_threshold) {
            return Err(invalid(format!(
                "pass_threshold {} exceeds the {} points available",
                self.pass_threshold,
                self.possible_points()
            )));
        }
        if self.time_limit_secs == 0 {
            return Err(invalid("time_limit_secs must be positive".into()));
        }
        if self.min_submit_secs > self.time_limit_secs {
            return Err(invalid(
                "min_submit_secs must not exceed time_limit_secs".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML profile.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let profile: ExamProfile = toml::from_str(content).context("failed to parse profile TOML")?;
        profile.validate()?;
        Ok(profile)
    }
}

/// Load a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<ExamProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    ExamProfile::from_toml_str(&content)
        .with_context(|| format!("invalid profile: {}", path.display()))
}

/// Load a profile from an explicit path, or from `quizforge.toml` in the
/// current directory, falling back to the standard profile.
pub fn load_profile_from(path: Option<&Path>) -> Result<ExamProfile> {
    match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("profile file not found: {}", p.display());
            }
            load_profile(p)
        }
        None => {
            let local = PathBuf::from(PROFILE_FILE_NAME);
            if local.exists() {
                tracing::debug!("using profile from {}", local.display());
                load_profile(&local)
            } else {
                Ok(ExamProfile::standard())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_profile_totals_100() {
        let profile = ExamProfile::standard();
        assert_eq!(profile.question_count(), 150);
        assert!((profile.possible_points() - 100.0).abs() < 1e-9);
        assert!(profile.validate().is_ok());
        assert_eq!(profile.requirements(), BankRequirements::standard());
    }

    #[test]
    fn classic_profile_skips_multiple_choice() {
        let profile = ExamProfile::classic();
        assert_eq!(profile.question_count(), 50);
        assert!((profile.possible_points() - 100.0).abs() < 1e-9);
        assert!(profile.rule(Category::MultipleChoice).is_none());
        assert_eq!(
            profile.requirements().minimum(Category::MultipleChoice),
            0
        );
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(ExamProfile::preset("Classic").unwrap().name, "classic");
        assert!(matches!(
            ExamProfile::preset("weekly"),
            Err(ProfileError::UnknownPreset(_))
        ));
    }

    #[test]
    fn tenth_point_profile_can_be_passed() {
        let profile = ExamProfile {
            name: "tenths".into(),
            categories: BTreeMap::from([
                (Category::SingleChoice, CategoryRule::new(8, 0.1)),
                (Category::TrueFalse, CategoryRule::new(1, 0.2)),
            ]),
            pass_threshold: 1.0,
            min_submit_secs: 0,
            time_limit_secs: 60,
            relabel_options: true,
        };
        assert_eq!(profile.possible_points(), 1.0);
        assert!(profile.validate().is_ok());

        let too_high = ExamProfile {
            pass_threshold: 1.01,
            ..profile
        };
        assert!(matches!(too_high.validate(), Err(ProfileError::Invalid { .. })));
    }

    #[test]
    fn parse_profile_toml() {
        let toml = r#"
name = "demo"
pass_threshold = 4.0
min_submit_secs = 10
time_limit_secs = 300

[categories.single_choice]
count = 2
points = 0.5

[categories.multiple_choice]
count = 1
points = 1.0

[categories.true_false]
count = 1
points = 1.0
"#;
        let err = ExamProfile::from_toml_str(toml).unwrap_err();
        assert!(format!("{err:#}").contains("exceeds"));

        let fixed = toml.replace("pass_threshold = 4.0", "pass_threshold = 1.0");
        let profile = ExamProfile::from_toml_str(&fixed).unwrap();
        assert_eq!(profile.name, "demo");
        assert_eq!(profile.question_count(), 4);
        assert_eq!(profile.min_submit(), Duration::from_secs(10));
        assert!(profile.relabel_options);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let profile = ExamProfile::from_toml_str("name = \"mine\"").unwrap();
        assert_eq!(profile.name, "mine");
        assert_eq!(profile.categories, default_categories());
        assert_eq!(profile.time_limit_secs, 7200);
    }

    #[test]
    fn gate_longer_than_budget_rejected() {
        let mut profile = ExamProfile::standard();
        profile.min_submit_secs = profile.time_limit_secs + 1;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "name = \"file\"\nmin_submit_secs = 0\n").unwrap();
        let profile = load_profile_from(Some(&path)).unwrap();
        assert_eq!(profile.name, "file");
        assert!(load_profile_from(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
