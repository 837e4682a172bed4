//! Terminal front end: argument parsing, command execution and plain-text rendering.

pub mod commands;

use crate::client::{Course, Lesson};
use crate::guard::Decision;
use crate::identity::User;

pub use commands::{parse_args, run, Command, Invocation};

const MAX_CELL: usize = 60;

/// Render rows as an ASCII table. Empty input renders nothing.
///
/// Cells are flattened to one line and cut at `MAX_CELL` characters; all-digit
/// cells are right-aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() { return String::new(); }
    let head: Vec<String> = headers.iter().map(|h| cell_text(h)).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| (0..headers.len()).map(|i| cell_text(r.get(i).map(String::as_str).unwrap_or(""))).collect())
        .collect();
    let widths: Vec<usize> = (0..headers.len())
        .map(|i| body.iter().map(|r| r[i].chars().count()).chain([head[i].chars().count()]).max().unwrap_or(0))
        .collect();

    let rule = widths.iter().fold("+".to_string(), |acc, w| acc + &"-".repeat(w + 2) + "+");
    let line = |cells: &[String]| {
        cells.iter().zip(&widths).fold("|".to_string(), |acc, (c, &w)| {
            if is_count(c) { acc + &format!(" {:>w$} |", c) } else { acc + &format!(" {:<w$} |", c) }
        })
    };

    let mut out = vec![rule.clone(), line(head.as_slice()), rule.clone()];
    out.extend(body.iter().map(|r| line(r.as_slice())));
    out.push(rule);
    out.join("\n") + "\n"
}

pub fn courses_table(courses: &[&Course]) -> String {
    let rows: Vec<Vec<String>> = courses
        .iter()
        .map(|c| vec![c.id.clone(), c.title.clone(), c.category.clone(), c.description.clone()])
        .collect();
    render_table(&["id", "title", "category", "description"], &rows)
}

pub fn lessons_table(lessons: &[Lesson]) -> String {
    let rows: Vec<Vec<String>> = lessons
        .iter()
        .enumerate()
        .map(|(i, l)| vec![(i + 1).to_string(), l.id.clone(), l.title.clone(), l.video_url.clone().unwrap_or_default()])
        .collect();
    render_table(&["#", "id", "title", "video"], &rows)
}

pub fn describe_user(user: &User) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

pub fn describe_decision(decision: &Decision) -> String {
    match decision {
        Decision::Admit => "admit".to_string(),
        Decision::RedirectTo { path, from: Some(from) } => format!("redirect {} (from {})", path, from),
        Decision::RedirectTo { path, from: None } => format!("redirect {}", path),
    }
}

fn cell_text(raw: &str) -> String {
    let flat = raw.replace(['\n', '\r'], " ");
    if flat.chars().count() <= MAX_CELL { return flat; }
    flat.chars().take(MAX_CELL - 1).chain(['…']).collect()
}

fn is_count(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
