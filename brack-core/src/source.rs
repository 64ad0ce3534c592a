//! Source text helpers shared by the assembler and the execution entry points.

/// Line comment marker of the language.
pub const COMMENT: &str = ";;";

/// Removes comments and layout so the program fits on one line.
///
/// `;;` starts a comment that runs to the end of the line, unless it sits
/// inside a double-quoted string. Remaining lines are trimmed, blank lines
/// dropped, and the rest joined with single spaces.
pub fn strip_noise(source: &str) -> String {
    source
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut chars = line.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => in_string = !in_string,
            ';' if !in_string && matches!(chars.peek(), Some((_, ';'))) => {
                return &line[..index];
            }
            _ => {}
        }
    }
    line
}

/// Wraps a program in the language's top-level block.
pub fn wrap_in_body(source: &str) -> String {
    format!("..[{source}]")
}

pub fn dash_comments_to_semi_comments(source: &str) -> String {
    source.replace("//", COMMENT)
}

/// Trims `source` and makes sure the last statement is terminated.
pub fn ensure_trailing_semicolon(source: &str) -> String {
    let code = source.trim();
    if code.ends_with(';') {
        code.to_string()
    } else {
        format!("{code};")
    }
}

/// Display formatter used by the REPL and the `pretty` command.
///
/// This is a cosmetic, order-dependent sequence of rewrites rather than a
/// real printer; its output is meant for reading, not for re-parsing.
pub fn prettify(source: &str) -> String {
    const REWRITES: &[(&str, &str)] = &[
        ("];", "];\n"),
        (";", "; "),
        ("; ;", ";;"),
        ("[", " ["),
        ("|", "| "),
        ("| >", "\n|>"),
        (".. [", ".. [\n"),
        ("; :=", ";\n:="),
    ];
    let mut out = REWRITES
        .iter()
        .fold(source.to_string(), |text, (from, to)| text.replace(from, to));
    out.push('\n');
    out
}
