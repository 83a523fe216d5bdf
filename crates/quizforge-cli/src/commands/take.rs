//! The `quizforge take` command: a line-driven exam over stdin/stdout.
//!
//! Input lines become reactor commands; the reactor's updates are printed as
//! they arrive. Each command waits for its response before the next line is
//! read, so answers always apply to the question on screen.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use quizforge_core::{
    format_clock, ExamQuestion, SessionCommand, SessionReactor, SessionUpdate, SubmitKind,
};

use super::{load_bank, ProfileArgs};
use crate::input::resolve_selection;
use crate::render::{
    format_points, render_preview, render_question, render_score, render_wrong_answers,
};

const HELP: &str = "Type option letters (e.g. B or ACD) or option text to answer.\n\
Commands: n next | p previous | g N go to question N | s submit | w wrong answers\n\
          r result | x new exam | q quit | ? help";

/// Remaining times at which a warning is printed.
const CLOCK_WARNINGS: [Duration; 2] = [Duration::from_secs(300), Duration::from_secs(60)];

enum Input {
    Command(SessionCommand),
    Answer(String),
    Help,
    Quit,
}

fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let input = match line {
        "n" | "next" => Input::Command(SessionCommand::Next),
        "p" | "prev" | "previous" => Input::Command(SessionCommand::Previous),
        "s" | "submit" => Input::Command(SessionCommand::Submit),
        "w" | "wrong" => Input::Command(SessionCommand::ShowWrongAnswers),
        "r" | "result" => Input::Command(SessionCommand::BackToResult),
        "x" | "new" => Input::Command(SessionCommand::Start),
        "q" | "quit" | "exit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        other => match other
            .strip_prefix("g ")
            .or_else(|| other.strip_prefix("goto "))
            .and_then(|n| n.trim().parse::<usize>().ok())
        {
            Some(number) if number >= 1 => Input::Command(SessionCommand::Goto(number - 1)),
            _ => Input::Answer(other.to_string()),
        },
    };
    Some(input)
}

/// What the terminal currently shows.
#[derive(Default)]
struct Screen {
    current: Option<(usize, ExamQuestion)>,
    remaining: Option<Duration>,
}

impl Screen {
    /// Print an update. Returns `true` if it answers a command.
    fn show(&mut self, update: SessionUpdate) -> bool {
        match update {
            SessionUpdate::Question {
                index,
                total,
                question,
                answer,
            } => {
                println!("{}", render_question(index, total, &question, &answer));
                if let Some(remaining) = self.remaining {
                    println!("Time left: {}", format_clock(&remaining));
                }
                self.current = Some((index, question));
                true
            }
            SessionUpdate::Preview(items) => {
                println!("{}", render_preview(&items));
                println!("Type `s` to submit or `g N` to revisit a question.");
                self.current = None;
                true
            }
            SessionUpdate::Clock { remaining } => {
                self.remaining = Some(remaining);
                if CLOCK_WARNINGS.contains(&remaining) {
                    println!("({} left)", format_clock(&remaining));
                }
                false
            }
            SessionUpdate::GateOpened { remaining } => {
                self.remaining = Some(remaining);
                println!("(submission is now open)");
                false
            }
            SessionUpdate::Submitted { kind, score } => {
                if kind == SubmitKind::Forced {
                    println!("\nTime is up, the exam was submitted.");
                }
                println!("\n{}", render_score(&score));
                println!("Type `w` to review wrong answers, `x` for a new exam, or `q` to quit.");
                self.current = None;
                kind == SubmitKind::Manual
            }
            SessionUpdate::WrongAnswers(wrong) => {
                println!("\n{}", render_wrong_answers(&wrong));
                true
            }
            SessionUpdate::Score(score) => {
                println!("\n{}", render_score(&score));
                true
            }
            SessionUpdate::Rejected { message } => {
                println!("! {message}");
                true
            }
        }
    }
}

pub async fn execute(
    location: String,
    profile_args: ProfileArgs,
    seed: Option<u64>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let profile = profile_args.resolve()?;
    let bank = load_bank(&location, &profile).await?;

    println!(
        "Profile `{}`: {} questions, {} points, pass at {}, {} to finish.",
        profile.name,
        profile.question_count(),
        format_points(profile.possible_points()),
        format_points(profile.pass_threshold),
        format_clock(&profile.time_limit())
    );
    if !profile.min_submit().is_zero() {
        println!(
            "Submission opens after {}.",
            format_clock(&profile.min_submit())
        );
    }
    println!("{HELP}");

    let mut reactor = SessionReactor::new(Arc::new(bank), profile);
    if let Some(seed) = seed {
        reactor = reactor.with_seed(seed);
    }
    let (handle, mut updates) = reactor.spawn();

    let mut screen = Screen::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    handle.send(SessionCommand::Start).await?;
    let mut pending = 1usize;

    'session: loop {
        while pending > 0 {
            let Some(update) = updates.recv().await else {
                break 'session;
            };
            if screen.show(update) {
                pending -= 1;
            }
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match parse_line(&line) {
                    None => {}
                    Some(Input::Quit) => break,
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Command(command)) => {
                        handle.send(command).await?;
                        pending += 1;
                    }
                    Some(Input::Answer(text)) => match &screen.current {
                        Some((index, question)) => {
                            for option in resolve_selection(question, &text) {
                                handle
                                    .send(SessionCommand::Select { index: *index, option })
                                    .await?;
                                pending += 1;
                            }
                        }
                        None => println!("No question on screen; use `g N` to pick one."),
                    },
                }
            }
            update = updates.recv() => {
                let Some(update) = update else {
                    break;
                };
                screen.show(update);
            }
        }
    }

    let session = handle.shutdown().await?;
    match (session.report(), report_path) {
        (Some(report), Some(path)) => {
            report.save_json(&path)?;
            println!("Report saved to {}", path.display());
        }
        (Some(_), None) => {}
        (None, _) => println!("Exam not submitted."),
    }
    Ok(())
}
