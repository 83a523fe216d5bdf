//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

use quizforge_core::profile::PROFILE_FILE_NAME;

const SAMPLE_PROFILE: &str = include_str!("../../../../profiles/demo.toml");
const SAMPLE_BANK: &str = include_str!("../../../../banks/demo.json");

pub fn execute() -> Result<()> {
    if Path::new(PROFILE_FILE_NAME).exists() {
        println!("{PROFILE_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(PROFILE_FILE_NAME, SAMPLE_PROFILE)?;
        println!("Created {PROFILE_FILE_NAME}");
    }

    std::fs::create_dir_all("bank")?;
    let bank_path = Path::new("bank/exam.json");
    if bank_path.exists() {
        println!("bank/exam.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created bank/exam.json");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions to bank/exam.json");
    println!("  2. Run: quizforge validate --bank bank");
    println!("  3. Run: quizforge take --bank bank");

    Ok(())
}
