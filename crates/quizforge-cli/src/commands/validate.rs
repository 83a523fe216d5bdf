//! The `quizforge validate` command.

use anyhow::Result;

use quizforge_core::Category;

use super::{load_bank, ProfileArgs};
use crate::render::format_points;

pub async fn execute(location: String, profile_args: ProfileArgs) -> Result<()> {
    let profile = profile_args.resolve()?;
    let bank = load_bank(&location, &profile).await?;

    println!("Question bank: {location} ({} questions)", bank.total());
    for category in Category::ALL {
        let available = bank.count(category);
        match profile.rule(category) {
            Some(rule) => println!(
                "  {category}: {available} available, draws {} x {} pts",
                rule.count,
                format_points(rule.points)
            ),
            None if available > 0 => println!("  {category}: {available} available, not drawn"),
            None => {}
        }
    }

    println!(
        "Bank is valid for profile `{}` ({} questions, {} points, pass at {}).",
        profile.name,
        profile.question_count(),
        format_points(profile.possible_points()),
        format_points(profile.pass_threshold)
    );
    Ok(())
}
