//! Line-oriented helpers for the story markdown format: metadata fields,
//! the title line, `## ` sections, code stripping, and index table bounds.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static DEPENDENCY_RE: OnceLock<Regex> = OnceLock::new();
static FENCED_CODE_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static TBD_RE: OnceLock<Regex> = OnceLock::new();

fn title_re() -> &'static Regex {
    TITLE_RE.get_or_init(|| Regex::new(r"^#\s+(\S+)\s+-\s+(.+)$").unwrap())
}

fn dependency_re() -> &'static Regex {
    DEPENDENCY_RE.get_or_init(|| Regex::new(r"[A-Z]{1,3}\.[0-9]+[A-Z]?").unwrap())
}

fn fenced_code_re() -> &'static Regex {
    FENCED_CODE_RE.get_or_init(|| Regex::new(r"```[\s\S]*?```").unwrap())
}

fn inline_code_re() -> &'static Regex {
    INLINE_CODE_RE.get_or_init(|| Regex::new(r"`[^`]+`").unwrap())
}

pub(crate) fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn tbd_re() -> &'static Regex {
    TBD_RE.get_or_init(|| Regex::new(r"(?i)\b(?:TBD|TODO)\b").unwrap())
}

// ---------------------------------------------------------------------------
// Fields and headings
// ---------------------------------------------------------------------------

/// Format a metadata line: `**Label:** value`.
pub fn format_field(label: &str, value: &str) -> String {
    format!("**{label}:** {value}")
}

/// Value of the first `**Label:** value` line, trimmed. Empty values read as absent.
pub fn extract_field<S: AsRef<str>>(lines: &[S], label: &str) -> Option<String> {
    let prefix = format!("**{label}:**");
    lines.iter().find_map(|line| {
        let value = line.as_ref().trim().strip_prefix(prefix.as_str())?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// The `(id, title)` of the first `# ` line, if it has the `# <ID> - <Title>`
/// shape. The id token is returned as written; callers check its form.
/// Only the first top-level heading is considered.
pub fn extract_title<S: AsRef<str>>(lines: &[S]) -> Option<(String, String)> {
    let line = lines.iter().map(|l| l.as_ref()).find(|l| l.starts_with("# "))?;
    let caps = title_re().captures(line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Lines between `heading` (exact line match) and the next `## ` heading.
pub fn section<'a, S: AsRef<str>>(lines: &'a [S], heading: &str) -> Option<&'a [S]> {
    let start = lines.iter().position(|l| l.as_ref() == heading)? + 1;
    let len = lines[start..]
        .iter()
        .position(|l| l.as_ref().starts_with("## "))
        .unwrap_or(lines.len() - start);
    Some(&lines[start..start + len])
}

pub fn has_line<S: AsRef<str>>(lines: &[S], wanted: &str) -> bool {
    lines.iter().any(|l| l.as_ref() == wanted)
}

pub fn is_checkbox(line: &str) -> bool {
    line.trim().starts_with("- [")
}

/// Story ids referenced by a dependency value. `None` yields nothing.
pub fn parse_dependencies(value: &str) -> Vec<String> {
    if value.trim().is_empty() || value.trim().eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    dependency_re()
        .find_iter(value)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Content filtering
// ---------------------------------------------------------------------------

/// Drop each `headings` section (heading line included) up to the next `## `
/// heading, and join the rest with `\n`.
pub fn strip_sections<S: AsRef<str>>(lines: &[S], headings: &[&str]) -> String {
    let mut kept = Vec::with_capacity(lines.len());
    let mut skipping = false;
    for line in lines.iter().map(|l| l.as_ref()) {
        if headings.contains(&line) {
            skipping = true;
            continue;
        }
        if skipping && line.starts_with("## ") {
            skipping = false;
        }
        if !skipping {
            kept.push(line);
        }
    }
    kept.join("\n")
}

/// Remove fenced blocks first, then inline code spans.
pub fn strip_code(text: &str) -> String {
    let without_fences = fenced_code_re().replace_all(text, "");
    inline_code_re().replace_all(&without_fences, "").into_owned()
}

pub fn has_placeholder(text: &str) -> bool {
    placeholder_re().is_match(text)
}

pub fn has_tbd(text: &str) -> bool {
    tbd_re().is_match(text)
}

// ---------------------------------------------------------------------------
// Table bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLookupError {
    MissingHeading,
    MissingTable,
}

/// Body rows of the table whose header row is `lines[header]`: skips the
/// header and separator, runs until the first line not starting with `|`.
fn body_after_header<S: AsRef<str>>(lines: &[S], header: usize) -> Range<usize> {
    let start = (header + 2).min(lines.len());
    let end = lines[start..]
        .iter()
        .position(|l| !l.as_ref().starts_with('|'))
        .map_or(lines.len(), |offset| start + offset);
    start..end
}

/// Global index convention: the first table following an exact heading line.
pub fn table_after_heading<S: AsRef<str>>(
    lines: &[S],
    heading: &str,
) -> Result<Range<usize>, TableLookupError> {
    let heading_index = lines
        .iter()
        .position(|l| l.as_ref() == heading)
        .ok_or(TableLookupError::MissingHeading)?;
    let header = lines[heading_index + 1..]
        .iter()
        .position(|l| l.as_ref().starts_with('|'))
        .map(|offset| heading_index + 1 + offset)
        .ok_or(TableLookupError::MissingTable)?;
    Ok(body_after_header(lines, header))
}

/// Category index convention: the first table whose header row starts with `header_prefix`.
pub fn table_with_header<S: AsRef<str>>(
    lines: &[S],
    header_prefix: &str,
) -> Result<Range<usize>, TableLookupError> {
    let header = lines
        .iter()
        .position(|l| l.as_ref().starts_with(header_prefix))
        .ok_or(TableLookupError::MissingTable)?;
    Ok(body_after_header(lines, header))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn extract_field_reads_trimmed_value() {
        let doc = lines("# F.01 - X\n\n  **Status:**   Not Started  \n**Epic:** Foundations");
        assert_eq!(extract_field(&doc, "Status").as_deref(), Some("Not Started"));
        assert_eq!(extract_field(&doc, "Epic").as_deref(), Some("Foundations"));
        assert_eq!(extract_field(&doc, "Priority"), None);
    }

    #[test]
    fn extract_field_treats_empty_value_as_absent() {
        let doc = lines("**Target:**   ");
        assert_eq!(extract_field(&doc, "Target"), None);
    }

    #[test]
    fn format_then_extract_is_verbatim() {
        let value = "F.01, A.02 (see <notes> & $1)";
        let doc = vec![format_field("Dependencies", value)];
        assert_eq!(extract_field(&doc, "Dependencies").as_deref(), Some(value));
    }

    #[test]
    fn title_uses_first_top_level_heading_only() {
        let doc = lines("intro\n# F.10 - Add Retry Logic\n# A.01 - Other");
        assert_eq!(
            extract_title(&doc),
            Some(("F.10".to_string(), "Add Retry Logic".to_string()))
        );

        let bad = lines("# Add Retry Logic\n# F.10 - Add Retry Logic");
        assert_eq!(extract_title(&bad), None);

        let loose = lines("# ABC.02b - lower suffix");
        assert_eq!(extract_title(&loose).unwrap().0, "ABC.02b");
        let multi = lines("# ABC.02B - Upper suffix");
        assert_eq!(extract_title(&multi).unwrap().0, "ABC.02B");
    }

    #[test]
    fn section_stops_at_next_h2() {
        let doc = lines("## 1. Objective\n\nDo it.\n### Sub\nmore\n## 2. User Story\nx");
        let body = section(&doc, "## 1. Objective").unwrap();
        assert_eq!(body, &doc[1..5]);
        assert!(section(&doc, "## 9. Missing").is_none());

        let tail = section(&doc, "## 2. User Story").unwrap();
        assert_eq!(tail, &doc[6..]);
    }

    #[test]
    fn dependencies_parse() {
        assert_eq!(parse_dependencies("F.01, F.05"), vec!["F.01", "F.05"]);
        assert_eq!(parse_dependencies("ORA.12b and X.3A"), vec!["ORA.12", "X.3A"]);
        assert!(parse_dependencies("None").is_empty());
        assert!(parse_dependencies(" none ").is_empty());
        assert!(parse_dependencies("the auth work").is_empty());
    }

    #[test]
    fn strip_sections_skips_until_next_h2() {
        let doc = lines("## A\nkeep\n## Completion Status\ndrop <x>\n### still dropped\n## B\nkeep too");
        let text = strip_sections(&doc, &["## Completion Status"]);
        assert_eq!(text, "## A\nkeep\n## B\nkeep too");
    }

    #[test]
    fn strip_code_removes_fences_and_inline() {
        let text = "before\n```rust\nlet v: Vec<x> = vec![];\n```\nuse `Option<T>` here <real>";
        let stripped = strip_code(text);
        assert!(!stripped.contains("Vec<x>"));
        assert!(!stripped.contains("Option<T>"));
        assert!(stripped.contains("<real>"));
    }

    #[test]
    fn tbd_matches_whole_words_case_insensitive() {
        assert!(has_tbd("Effort: tbd"));
        assert!(has_tbd("- [ ] Todo: wire it"));
        assert!(!has_tbd("TODOS and TBDs"));
    }

    #[test]
    fn table_after_heading_bounds() {
        let doc = lines(
            "# Stories\n### F\n\n| ID | Story | Status |\n|---|---|---|\n| F.01 | a | x |\n| F.05 | b | x |\n\n### A\n",
        );
        assert_eq!(table_after_heading(&doc, "### F"), Ok(5..7));
        assert_eq!(
            table_after_heading(&doc, "### L"),
            Err(TableLookupError::MissingHeading)
        );
        assert_eq!(
            table_after_heading(&doc, "### A"),
            Err(TableLookupError::MissingTable)
        );
    }

    #[test]
    fn table_at_end_of_file_runs_to_len() {
        let doc = lines("| Story | Title |\n|---|---|\n| **F.01** | a |");
        assert_eq!(table_with_header(&doc, "| Story "), Ok(2..3));
    }

    #[test]
    fn empty_table_body() {
        let doc = lines("| Story | Title |\n|---|---|");
        assert_eq!(table_with_header(&doc, "| Story "), Ok(2..2));
        let doc = lines("| Story | Title |");
        assert_eq!(table_with_header(&doc, "| Story "), Ok(1..1));
        assert_eq!(
            table_with_header(&doc, "| Nope "),
            Err(TableLookupError::MissingTable)
        );
    }
}
