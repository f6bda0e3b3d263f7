use crate::error::{Result, StoryError};
use crate::markdown::{self, extract_field, has_line, is_checkbox};
use crate::paths;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

pub const REQUIRED_FIELDS: &[&str] = &["Epic", "Status", "Priority", "Dependencies", "Target"];

pub const OBJECTIVE: &str = "## 1. Objective";
pub const ACCEPTANCE_CRITERIA: &str = "## 6. Acceptance Criteria";

pub const SECTION_HEADERS: &[&str] = &[
    OBJECTIVE,
    "## 2. User Story",
    "## 3. Scope",
    "## 4. Architecture Alignment",
    "## 5. Implementation Plan (Draft)",
    ACCEPTANCE_CRITERIA,
    "## 7. Verification Plan",
];

pub const IMPLEMENTATION_SUBSECTIONS: &[&str] = &[
    "### 5.1 Files to Create",
    "### 5.2 Files to Modify",
    "### 5.3 Tests to Add",
];

pub const VERIFICATION_SUBSECTIONS: &[&str] = &["### Automated Tests", "### Manual Tests"];

/// Retrospective sections, excluded from placeholder and TBD scans.
pub const POST_IMPLEMENTATION_HEADERS: &[&str] = &[
    "## Implementation Summary",
    "## Code Review Findings",
    "## Completion Status",
];

// ---------------------------------------------------------------------------
// LintReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintStatus {
    Clean,
    WarningsOnly,
    Errors,
}

impl LintStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            LintStatus::Clean => 0,
            LintStatus::Errors => 1,
            LintStatus::WarningsOnly => 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn status(&self) -> LintStatus {
        if !self.errors.is_empty() {
            LintStatus::Errors
        } else if !self.warnings.is_empty() {
            LintStatus::WarningsOnly
        } else {
            LintStatus::Clean
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Move every warning to the end of the error list.
    fn escalate_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Lint the story at `path`. A missing file is fatal.
pub fn lint_story(path: &Path, strict: bool) -> Result<LintReport> {
    if !path.is_file() {
        return Err(StoryError::StoryNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(lint_content(&content, &paths::filename_id(path), strict))
}

/// Run every rule over `content`. `file_id` is the id token of the story's
/// filename. No rule short-circuits another.
pub fn lint_content(content: &str, file_id: &str, strict: bool) -> LintReport {
    let lines: Vec<&str> = content.lines().collect();
    let mut report = LintReport::default();

    check_title(&lines, file_id, &mut report);
    check_fields(&lines, &mut report);
    check_sections(&lines, &mut report);
    check_checkboxes(&lines, &mut report);
    check_placeholders(&lines, &mut report);
    check_objective(&lines, &mut report);

    if strict && !report.warnings.is_empty() {
        debug!(count = report.warnings.len(), "strict mode, escalating warnings");
        report.escalate_warnings();
    }
    report
}

fn check_title(lines: &[&str], file_id: &str, report: &mut LintReport) {
    let Some((id, _title)) = markdown::extract_title(lines) else {
        report.error("Missing or invalid title line (# <ID> - <Title>).");
        return;
    };
    if file_id != id {
        report.error(format!(
            "Title ID '{id}' does not match filename ID '{file_id}'."
        ));
    }
    if !paths::is_story_ref(&id) {
        report.error(format!("Story ID '{id}' must match pattern [A-Z].[0-9]{{2}}."));
    }
}

fn check_fields(lines: &[&str], report: &mut LintReport) {
    for field in REQUIRED_FIELDS {
        if extract_field(lines, field).is_none() {
            report.error(format!("Missing required field: {field}"));
        }
    }

    if let Some(status) = extract_field(lines, "Status") {
        let status = status.to_lowercase();
        if status.contains("complete") || status.contains("implemented") {
            report.warn(
                "Status indicates completion; new stories should not be Complete/Implemented.",
            );
        }
    }

    if let Some(deps) = extract_field(lines, "Dependencies") {
        if !deps.eq_ignore_ascii_case("none") && markdown::parse_dependencies(&deps).is_empty() {
            report.warn("Dependencies present but no parseable IDs found.");
        }
    }
}

fn check_sections(lines: &[&str], report: &mut LintReport) {
    for header in SECTION_HEADERS {
        if !has_line(lines, header) {
            report.error(format!("Missing section: {header}"));
        }
    }
    for header in IMPLEMENTATION_SUBSECTIONS {
        if !has_line(lines, header) {
            report.warn(format!("Missing implementation subsection: {header}"));
        }
    }
    for header in VERIFICATION_SUBSECTIONS {
        if !has_line(lines, header) {
            report.warn(format!("Missing verification subsection: {header}"));
        }
    }
}

fn check_checkboxes(lines: &[&str], report: &mut LintReport) {
    if !lines.iter().any(|l| is_checkbox(l)) {
        report.error("No checkbox items found (acceptance criteria or verification).");
    }

    if let Some(criteria) = markdown::section(lines, ACCEPTANCE_CRITERIA) {
        if !criteria.iter().any(|l| is_checkbox(l)) {
            report.error("Acceptance Criteria section has no checkbox items.");
        }
    }
}

fn check_placeholders(lines: &[&str], report: &mut LintReport) {
    let filtered = markdown::strip_sections(lines, POST_IMPLEMENTATION_HEADERS);

    if markdown::has_placeholder(&markdown::strip_code(&filtered)) {
        report.error("Template placeholders (<...>) remain in the story.");
    }
    if markdown::has_tbd(&filtered) {
        report.warn("TBD/TODO placeholders found; resolve before implementation.");
    }
}

fn check_objective(lines: &[&str], report: &mut LintReport) {
    let first = markdown::section(lines, OBJECTIVE)
        .and_then(|body| body.iter().map(|l| l.trim()).find(|l| !l.is_empty()));
    if first.is_none() {
        report.warn("Objective section appears empty.");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLEAN: &str = r#"# F.10 - Add Retry Logic

**Epic:** Foundations
**Status:** Not Started
**Priority:** P2 (Medium)
**Dependencies:** F.01, F.05
**Target:** macOS 26 (Tahoe)
**Estimated Effort:** 2 days
**Design Reference:** None

## 1. Objective

Calls to the model server fail transiently.

## 2. User Story

As a user, I want retries so that transient failures recover.

## 3. Scope

Client-side retries only.

## 4. Architecture Alignment

Lives in the transport layer.

## 5. Implementation Plan (Draft)

### 5.1 Files to Create

- `src/retry.rs` with `Backoff<T>`

### 5.2 Files to Modify

- `src/client.rs`

### 5.3 Tests to Add

- `tests/retry.rs`

## 6. Acceptance Criteria

- [ ] Retries stop after three attempts.

## 7. Verification Plan

### Automated Tests

- [ ] Unit tests cover backoff.

### Manual Tests

- [ ] Kill the server mid-request.
"#;

    fn lint(content: &str) -> LintReport {
        lint_content(content, "F.10", false)
    }

    #[test]
    fn clean_story_has_no_findings() {
        let report = lint(CLEAN);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.status().exit_code(), 0);
    }

    #[test]
    fn title_mismatch_and_invalid_title() {
        let report = lint_content(CLEAN, "F.11", false);
        assert_eq!(
            report.errors,
            vec!["Title ID 'F.10' does not match filename ID 'F.11'."]
        );

        let report = lint(&CLEAN.replace("# F.10 - Add Retry Logic", "# Add Retry Logic"));
        assert_eq!(
            report.errors,
            vec!["Missing or invalid title line (# <ID> - <Title>)."]
        );
    }

    #[test]
    fn malformed_title_id_is_reported_apart_from_filename() {
        let doc = CLEAN.replace("# F.10 -", "# f.1 -");
        let report = lint_content(&doc, "f.1", false);
        assert_eq!(
            report.errors,
            vec!["Story ID 'f.1' must match pattern [A-Z].[0-9]{2}."]
        );

        let report = lint(&doc);
        assert_eq!(
            report.errors,
            vec![
                "Title ID 'f.1' does not match filename ID 'F.10'.",
                "Story ID 'f.1' must match pattern [A-Z].[0-9]{2}.",
            ]
        );
    }

    #[test]
    fn multi_letter_title_ids_are_accepted() {
        let doc = CLEAN.replace("# F.10 -", "# ORA.10B -");
        let report = lint_content(&doc, "ORA.10B", false);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn missing_and_empty_fields_are_errors() {
        let doc = CLEAN
            .replace("**Priority:** P2 (Medium)\n", "")
            .replace("**Target:** macOS 26 (Tahoe)", "**Target:**");
        let report = lint(&doc);
        assert_eq!(
            report.errors,
            vec!["Missing required field: Priority", "Missing required field: Target"]
        );
    }

    #[test]
    fn complete_status_warns() {
        let report = lint(&CLEAN.replace("Not Started", "Implemented"));
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec!["Status indicates completion; new stories should not be Complete/Implemented."]
        );
    }

    #[test]
    fn unparseable_dependencies_warn() {
        let report = lint(&CLEAN.replace("F.01, F.05", "the auth work"));
        assert_eq!(
            report.warnings,
            vec!["Dependencies present but no parseable IDs found."]
        );

        let report = lint(&CLEAN.replace("F.01, F.05", "NONE"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_subsections_are_advisory() {
        let doc = CLEAN
            .replace("### 5.2 Files to Modify\n", "")
            .replace("### Manual Tests\n", "");
        let report = lint(&doc);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![
                "Missing implementation subsection: ### 5.2 Files to Modify",
                "Missing verification subsection: ### Manual Tests",
            ]
        );
    }

    #[test]
    fn missing_criteria_heading_with_checkboxes_elsewhere() {
        let doc = CLEAN.replace("## 6. Acceptance Criteria\n", "");
        let report = lint(&doc);
        assert_eq!(
            report.errors,
            vec!["Missing section: ## 6. Acceptance Criteria"]
        );
    }

    #[test]
    fn missing_criteria_heading_without_any_checkboxes() {
        let doc: String = CLEAN
            .replace("## 6. Acceptance Criteria\n", "")
            .lines()
            .filter(|l| !l.starts_with("- ["))
            .map(|l| format!("{l}\n"))
            .collect();
        let report = lint(&doc);
        assert_eq!(
            report.errors,
            vec![
                "Missing section: ## 6. Acceptance Criteria",
                "No checkbox items found (acceptance criteria or verification).",
            ]
        );
    }

    #[test]
    fn criteria_without_checkbox_is_its_own_error() {
        let doc = CLEAN.replace(
            "- [ ] Retries stop after three attempts.",
            "Retries stop after three attempts.",
        );
        let report = lint(&doc);
        assert_eq!(
            report.errors,
            vec!["Acceptance Criteria section has no checkbox items."]
        );
    }

    #[test]
    fn placeholder_in_fenced_code_is_ignored() {
        let doc = CLEAN.replace(
            "Client-side retries only.",
            "Client-side retries only.\n\n```\nretry <x>\n```",
        );
        assert!(lint(&doc).errors.is_empty());

        let doc = CLEAN.replace("Client-side retries only.", "Client-side retries only. <x>");
        assert_eq!(
            lint(&doc).errors,
            vec!["Template placeholders (<...>) remain in the story."]
        );
    }

    #[test]
    fn retrospective_sections_are_not_scanned() {
        let doc = format!("{CLEAN}\n## Completion Status\n\n<fill in after merge> TODO\n");
        let report = lint(&doc);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn tbd_warns() {
        let report = lint(&CLEAN.replace("2 days", "tbd"));
        assert_eq!(
            report.warnings,
            vec!["TBD/TODO placeholders found; resolve before implementation."]
        );
    }

    #[test]
    fn empty_objective_warns() {
        let doc = CLEAN.replace("Calls to the model server fail transiently.\n", "");
        let report = lint(&doc);
        assert_eq!(report.warnings, vec!["Objective section appears empty."]);
    }

    #[test]
    fn strict_mode_escalates_warnings() {
        let doc = CLEAN.replace("Not Started", "Complete");
        let normal = lint_content(&doc, "F.10", false);
        assert_eq!(normal.status(), LintStatus::WarningsOnly);
        assert_eq!(normal.status().exit_code(), 2);

        let strict = lint_content(&doc, "F.10", true);
        assert_eq!(strict.status(), LintStatus::Errors);
        assert_eq!(strict.status().exit_code(), 1);
        assert!(strict.warnings.is_empty());
        assert_eq!(strict.errors, normal.warnings);
    }

    #[test]
    fn errors_keep_rule_order() {
        let report = lint("# F.10 - X\n");
        assert_eq!(report.errors[0], "Missing required field: Epic");
        assert!(report
            .errors
            .iter()
            .any(|e| e == "No checkbox items found (acceptance criteria or verification)."));
        assert!(report.warnings.contains(&"Objective section appears empty.".to_string()));
    }

    #[test]
    fn lint_story_reads_file_and_filename_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("F.10-ADD-RETRY-LOGIC.md");
        std::fs::write(&path, CLEAN).unwrap();
        assert_eq!(lint_story(&path, false).unwrap().status(), LintStatus::Clean);

        let missing = dir.path().join("F.11-NOPE.md");
        assert!(matches!(
            lint_story(&missing, false),
            Err(StoryError::StoryNotFound(_))
        ));
    }
}
