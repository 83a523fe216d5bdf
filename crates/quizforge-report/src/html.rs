//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizforge_core::{preview, ExamReport, QuestionStatus};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page for a graded attempt.
pub fn generate_html(report: &ExamReport) -> String {
    let score = &report.score;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"zh\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizforge result: {}</title>\n",
        html_escape(&report.exam.profile)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizforge result</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Profile: <strong>{}</strong> | {} questions | {}</p>\n",
        html_escape(&report.exam.profile),
        score.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score summary
    let (verdict_class, verdict) = if score.passed {
        ("pass", "PASSED")
    } else {
        ("fail", "FAILED")
    };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Score</h2>\n");
    html.push_str(&format!(
        "<p class=\"score {verdict_class}\"><strong>{}</strong> / {} ({}) - pass at {}</p>\n",
        format_points(score.total),
        format_points(score.possible),
        verdict,
        format_points(score.pass_threshold),
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Category</th><th>Correct</th><th>Points</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for category in &score.categories {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}/{}</td><td>{}/{}</td></tr>\n",
            category.category.display_name(),
            category.correct,
            category.questions,
            format_points(category.earned),
            format_points(category.possible),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Wrong answers
    html.push_str("<section class=\"wrong\">\n");
    html.push_str(&format!(
        "<h2>Wrong answers ({})</h2>\n",
        report.wrong_answers.len()
    ));
    for wrong in &report.wrong_answers {
        html.push_str("<article class=\"wrong-answer\">\n");
        html.push_str(&format!(
            "<h3>{}. {}</h3>\n",
            wrong.index + 1,
            html_escape(&wrong.question)
        ));
        html.push_str(&format!(
            "<p>Your answer: <span class=\"fail\">{}</span></p>\n",
            html_escape(&wrong.user_answer)
        ));
        html.push_str(&format!(
            "<p>Correct answer: <span class=\"pass\">{}</span></p>\n",
            html_escape(&wrong.correct_answer)
        ));
        html.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(&wrong.explanation)
        ));
        html.push_str("</article>\n");
    }
    html.push_str("</section>\n");

    // Every question
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>All questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str(
        "<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Result</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for item in preview(&report.exam, &report.answers) {
        let (class, text) = match item.status {
            QuestionStatus::Correct => ("pass", "OK"),
            QuestionStatus::Incorrect => ("fail", "WRONG"),
            QuestionStatus::Unanswered => ("blank", "-"),
        };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{text}</td></tr>\n",
            item.index + 1,
            html_escape(&item.question),
            html_escape(&item.user_answer),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Full report for re-import
    html.push_str("<details class=\"json\">\n<summary>Report JSON</summary>\n<pre>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</pre>\n</details>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Points without a trailing `.0` for whole numbers.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points}")
    }
}

const CSS: &str = r#"
:root {
  --paper: #fdfdfb; --ink: #202124; --rule: #dadce0;
  --ok: #e6f4ea; --bad: #fce8e6; --dim: #5f6368;
}
@media (prefers-color-scheme: dark) {
  :root {
    --paper: #1f1f1f; --ink: #e8eaed; --rule: #3c4043;
    --ok: #0d3b1e; --bad: #4a1512; --dim: #9aa0a6;
  }
}
body {
  max-width: 60rem; margin: 0 auto; padding: 1.5rem;
  font-family: system-ui, 'PingFang SC', 'Microsoft YaHei', sans-serif;
  background: var(--paper); color: var(--ink);
}
.meta, .explanation { color: var(--dim); }
.score { font-size: 1.4rem; padding: 0.4rem 0.8rem; border-radius: 6px; }
table { width: 100%; border-collapse: collapse; margin: 0.75rem 0; }
th, td { padding: 0.4rem 0.75rem; border-bottom: 1px solid var(--rule); text-align: left; }
.pass { background: var(--ok); }
.fail { background: var(--bad); }
.wrong-answer { border-left: 3px solid var(--bad); padding-left: 0.75rem; margin: 0.75rem 0; }
pre { padding: 0.75rem; overflow-x: auto; border: 1px solid var(--rule); }
details summary { cursor: pointer; }
"#;
