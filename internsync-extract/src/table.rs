//! Markdown table location and row splitting.

use std::sync::LazyLock;

use regex::Regex;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\|\s*company\s*\|\s*role\s*\|\s*location\s*\|\s*application/link\s*\|\s*date posted\s*\|$",
    )
    .expect("valid regex")
});

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[-|: ]+\|$").expect("valid regex"));

/// Body lines of the internship table, or `None` if the header and separator
/// are not found.
///
/// The body ends at the first line that does not start with `|`.
pub fn locate_table(document: &str) -> Option<Vec<&str>> {
    let lines: Vec<&str> = document.lines().collect();
    let header = lines.windows(2).position(|pair| {
        HEADER_RE.is_match(pair[0].trim()) && SEPARATOR_RE.is_match(pair[1].trim())
    })?;

    let body = lines[header + 2..]
        .iter()
        .map(|line| line.trim())
        .take_while(|line| line.starts_with('|'))
        .collect();
    Some(body)
}

/// Split a table row into trimmed cells.
///
/// Outer pipes are optional. `\|` is a literal pipe inside a cell.
pub fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = match line.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => line,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_body_after_separator() {
        let doc = "intro\n| Company | Role | Location | Application/Link | Date Posted |\n|---|---|---|---|---|\n| A | B | C | D | E |\n| F | G | H | I | J |\n\nafter";
        let body = locate_table(doc).expect("table");
        assert_eq!(body.len(), 2);
        assert_eq!(body[0], "| A | B | C | D | E |");
    }

    #[test]
    fn header_without_separator_is_not_a_table() {
        let doc = "| Company | Role | Location | Application/Link | Date Posted |\n| A | B | C | D | E |";
        assert!(locate_table(doc).is_none());
    }

    #[test]
    fn header_match_tolerates_spacing_and_case() {
        let doc = "|company|ROLE|  Location |Application/Link|Date Posted|\r\n| :--- | :--- | --- | --- | --- |\r\n| A | B | C | D | E |\r\n";
        let body = locate_table(doc).expect("table");
        assert_eq!(body, vec!["| A | B | C | D | E |"]);
    }

    #[test]
    fn split_handles_escaped_pipes() {
        let cells = split_cells(r"| Acme \| Co | Intern | NYC |");
        assert_eq!(cells, vec!["Acme | Co", "Intern", "NYC"]);
    }

    #[test]
    fn split_keeps_empty_cells() {
        let cells = split_cells("| A |  | C |");
        assert_eq!(cells, vec!["A", "", "C"]);
    }
}
