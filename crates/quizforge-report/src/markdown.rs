//! Markdown export, suitable for pasting into issues or notes.

use quizforge_core::ExamReport;

use crate::html::format_points;

/// Render a graded attempt as markdown.
pub fn to_markdown(report: &ExamReport) -> String {
    let score = &report.score;
    let mut md = String::new();

    md.push_str(&format!("# Exam result: {}\n\n", report.exam.profile));
    md.push_str(&format!(
        "**Score: {} / {}** ({}, pass at {})\n\n",
        format_points(score.total),
        format_points(score.possible),
        if score.passed { "passed" } else { "failed" },
        format_points(score.pass_threshold),
    ));

    md.push_str("| Category | Correct | Points |\n");
    md.push_str("|----------|---------|--------|\n");
    for category in &score.categories {
        md.push_str(&format!(
            "| {} | {}/{} | {}/{} |\n",
            category.category.display_name(),
            category.correct,
            category.questions,
            format_points(category.earned),
            format_points(category.possible),
        ));
    }
    md.push('\n');

    if report.wrong_answers.is_empty() {
        md.push_str("No wrong answers.\n");
        return md;
    }

    md.push_str(&format!("## Wrong answers ({})\n\n", report.wrong_answers.len()));
    for wrong in &report.wrong_answers {
        md.push_str(&format!("### {}. {}\n\n", wrong.index + 1, wrong.question));
        md.push_str(&format!("- Your answer: {}\n", wrong.user_answer));
        md.push_str(&format!("- Correct answer: {}\n", wrong.correct_answer));
        md.push_str(&format!("- {}\n\n", wrong.explanation));
    }
    md
}
