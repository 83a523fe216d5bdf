//! quizforge CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod input;
mod render;

use commands::ProfileArgs;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Randomized exam assembly and scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter profile and question bank
    Init,

    /// Check that a question bank can feed a profile
    Validate {
        /// Bank file, directory, or URL
        #[arg(long)]
        bank: String,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Assemble a randomized exam and write it as JSON
    Assemble {
        /// Bank file, directory, or URL
        #[arg(long)]
        bank: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Seed for a reproducible exam
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Grade an answer sheet against an assembled exam
    Grade {
        /// Exam JSON written by `assemble`
        #[arg(long)]
        exam: PathBuf,

        /// Answers JSON: one entry per question (null, a string, or a list)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Take an exam interactively on the terminal
    Take {
        /// Bank file, directory, or URL
        #[arg(long)]
        bank: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Seed for a reproducible exam
        #[arg(long)]
        seed: Option<u64>,

        /// Save the JSON report here after submission
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { bank, profile } => commands::validate::execute(bank, profile).await,
        Commands::Assemble {
            bank,
            profile,
            seed,
            output,
        } => commands::assemble::execute(bank, profile, seed, output).await,
        Commands::Grade {
            exam,
            answers,
            format,
            output,
        } => commands::grade::execute(exam, answers, format, output),
        Commands::Take {
            bank,
            profile,
            seed,
            report,
        } => commands::take::execute(bank, profile, seed, report).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
