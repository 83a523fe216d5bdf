//! Subcommand implementations and the helpers they share.

pub mod assemble;
pub mod grade;
pub mod init;
pub mod take;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizforge_core::profile::load_profile_from;
use quizforge_core::{ExamProfile, QuestionBank};
use quizforge_loader::{open_source, BankLoader};

/// How the exam profile is chosen.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Profile TOML file (defaults to ./quizforge.toml, then the standard profile)
    #[arg(long, conflicts_with = "preset")]
    pub profile: Option<PathBuf>,

    /// Built-in profile: standard, classic
    #[arg(long)]
    pub preset: Option<String>,
}

impl ProfileArgs {
    pub fn resolve(&self) -> Result<ExamProfile> {
        let profile = match &self.preset {
            Some(name) => ExamProfile::preset(name)?,
            None => load_profile_from(self.profile.as_deref())?,
        };
        tracing::debug!(
            profile = %profile.name,
            questions = profile.question_count(),
            "using exam profile"
        );
        Ok(profile)
    }
}

/// Fetch the bank at `location` and validate it for `profile`.
pub async fn load_bank(location: &str, profile: &ExamProfile) -> Result<QuestionBank> {
    let source = open_source(location)?;
    let loader = BankLoader::new(source, profile.requirements());
    loader
        .load()
        .await
        .with_context(|| format!("failed to load question bank from {location}"))?
        .context("a bank load is already in progress")
}

/// A seeded generator when `seed` is given, an entropy-seeded one otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
