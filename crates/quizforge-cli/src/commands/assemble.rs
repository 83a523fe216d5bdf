//! The `quizforge assemble` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::assemble;
use quizforge_core::report::write_json;

use super::{load_bank, rng_from_seed, ProfileArgs};

pub async fn execute(
    location: String,
    profile_args: ProfileArgs,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let profile = profile_args.resolve()?;
    let bank = load_bank(&location, &profile).await?;

    let mut rng = rng_from_seed(seed);
    let exam = assemble(&bank, &profile, &mut rng);

    match output {
        Some(path) => {
            write_json(&exam, &path)?;
            println!(
                "Wrote exam {} ({} questions) to {}",
                exam.id,
                exam.len(),
                path.display()
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&exam).context("failed to serialize exam")?;
            println!("{json}");
        }
    }
    Ok(())
}
