//! Renders collected [`Diagnostic`]s in the base spec §6 exact format:
//! `<path>:<line> error: <reason>:` followed by a `<line>| <fragment>`
//! source line, in ANSI red for errors (the base spec's single-line pointed
//! error stream).

use std::path::Path;

use quillc_util::diagnostic::{Diagnostic, Level};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Writes every diagnostic in `diags` to stderr, pointing at `path` and
/// pulling the offending line's text out of `source`.
pub fn render_all(diags: &[Diagnostic], path: &Path, source: &str) {
    let lines: Vec<&str> = source.lines().collect();
    for diag in diags {
        render_one(diag, path, &lines);
    }
}

fn render_one(diag: &Diagnostic, path: &Path, lines: &[&str]) {
    let color = match diag.level {
        Level::Error => RED,
        Level::Warning => YELLOW,
        Level::Note | Level::Help => "",
    };
    let line_no = diag.span.line;
    eprintln!(
        "{color}{}:{} {}: {}:{RESET}",
        path.display(),
        line_no,
        diag.level,
        diag.message
    );
    if line_no > 0 {
        if let Some(fragment) = lines.get(line_no as usize - 1) {
            eprintln!("{line_no}| {fragment}");
        }
    }
    for note in &diag.notes {
        eprintln!("  note: {note}");
    }
    for help in &diag.helps {
        eprintln!("  help: {help}");
    }
}
