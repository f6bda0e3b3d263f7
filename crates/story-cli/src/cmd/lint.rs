use crate::output::{print_json, print_list};
use anyhow::Context;
use story_core::lint::{lint_story, LintStatus};
use std::path::Path;

/// Lint one story and return the process exit code for its outcome.
pub fn run(root: &Path, path: &Path, strict: bool, json: bool) -> anyhow::Result<i32> {
    let path = if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let report = lint_story(&path, strict)
        .with_context(|| format!("failed to lint '{}'", path.display()))?;
    let status = report.status();

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "status": status,
            "exit_code": status.exit_code(),
            "errors": report.errors,
            "warnings": report.warnings,
        }))?;
        return Ok(status.exit_code());
    }

    print_list("Errors", &report.errors);
    print_list("Warnings", &report.warnings);
    if status == LintStatus::Clean {
        println!("Story lint clean.");
    }
    Ok(status.exit_code())
}
