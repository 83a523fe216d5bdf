//! Plain-text rendering shared by `grade` and `take`.

use comfy_table::{Cell, Table};

use quizforge_core::{
    Answer, ExamQuestion, PreviewItem, QuestionStatus, ScoreBreakdown, WrongAnswer,
};

pub use quizforge_report::format_points;

/// Total, verdict, and a per-category table.
pub fn render_score(score: &ScoreBreakdown) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Correct", "Points"]);
    for category in &score.categories {
        table.add_row(vec![
            Cell::new(category.category.display_name()),
            Cell::new(format!("{}/{}", category.correct, category.questions)),
            Cell::new(format!(
                "{}/{}",
                format_points(category.earned),
                format_points(category.possible)
            )),
        ]);
    }

    format!(
        "Score: {} / {} ({}, pass at {})\n{table}",
        format_points(score.total),
        format_points(score.possible),
        if score.passed { "PASSED" } else { "FAILED" },
        format_points(score.pass_threshold),
    )
}

pub fn render_wrong_answers(wrong: &[WrongAnswer]) -> String {
    if wrong.is_empty() {
        return "No wrong answers.".to_string();
    }
    let mut out = format!("Wrong answers ({}):\n", wrong.len());
    for w in wrong {
        out.push_str(&format!(
            "\n{}. [{}] {}\n",
            w.index + 1,
            w.category.display_name(),
            w.question
        ));
        out.push_str(&format!("   Your answer:    {}\n", w.user_answer));
        out.push_str(&format!("   Correct answer: {}\n", w.correct_answer));
        out.push_str(&format!("   {}\n", w.explanation));
    }
    out
}

pub fn render_question(
    index: usize,
    total: usize,
    question: &ExamQuestion,
    answer: &Answer,
) -> String {
    let mut out = format!(
        "\n[{}] {}/{} ({} pts)\n{}\n",
        question.category.display_name(),
        index + 1,
        total,
        format_points(question.points),
        question.question
    );
    for option in &question.shuffled_options {
        let mark = if answer.includes(option) { "*" } else { " " };
        out.push_str(&format!(" {mark} {option}\n"));
    }
    out.push_str(&format!("Your answer: {}", answer.display(question)));
    out
}

pub fn render_preview(items: &[PreviewItem]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Status"]);
    for item in items {
        let status = match item.status {
            QuestionStatus::Correct => "correct",
            QuestionStatus::Incorrect => "incorrect",
            QuestionStatus::Unanswered => "unanswered",
        };
        table.add_row(vec![
            Cell::new(item.index + 1),
            Cell::new(&item.question),
            Cell::new(&item.user_answer),
            Cell::new(status),
        ]);
    }
    let unanswered = items
        .iter()
        .filter(|i| i.status == QuestionStatus::Unanswered)
        .count();
    format!("\nPreview ({unanswered} unanswered)\n{table}")
}
