//! Story index tables: the global `README.md` with one table per category
//! heading, and the per-category `README.md` with a single `| Story |` table.

use crate::error::Result;
use crate::io;
use crate::markdown::{self, TableLookupError};
use crate::paths;
use crate::types::UpsertOutcome;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header prefix that marks the table in a category index.
pub const CATEGORY_TABLE_HEADER: &str = "| Story ";

impl From<TableLookupError> for UpsertOutcome {
    fn from(e: TableLookupError) -> Self {
        match e {
            TableLookupError::MissingHeading => UpsertOutcome::MissingHeading,
            TableLookupError::MissingTable => UpsertOutcome::MissingTable,
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Everything needed to format a story's row in either index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub folder: String,
    pub status_label: String,
    pub description: String,
    pub dependencies: String,
}

impl IndexEntry {
    /// `| F.10 | [Title](folder/F.10-TITLE.md) | 🚧 To Do |`
    pub fn global_row(&self) -> String {
        format!(
            "| {} | [{}]({}/{}) | {} |",
            self.id, self.title, self.folder, self.filename, self.status_label
        )
    }

    /// `| **F.10** | [Title](F.10-TITLE.md) | description | deps |`, plus a
    /// status cell when the category table has a Status column.
    pub fn category_row(&self, with_status: bool) -> String {
        let mut cells = vec![
            format!("**{}**", self.id),
            format!("[{}]({})", self.title, self.filename),
            self.description.clone(),
            self.dependencies.clone(),
        ];
        if with_status {
            cells.push(self.status_label.clone());
        }
        format!("| {} |", cells.join(" | "))
    }
}

/// The id written in a row's first cell, with optional `**bold**` removed.
/// Later cells (dependencies, descriptions) never identify a row.
fn first_cell_id(line: &str) -> Option<&str> {
    let cell = line.split('|').nth(1)?.trim();
    Some(
        cell.strip_prefix("**")
            .and_then(|c| c.strip_suffix("**"))
            .unwrap_or(cell),
    )
}

fn row_matches(line: &str, id: &str) -> bool {
    first_cell_id(line) == Some(id)
}

/// The first-cell id of a row, if it has the single-letter `X.NN` shape
/// used for ordering.
fn row_id(line: &str) -> Option<&str> {
    first_cell_id(line).filter(|id| paths::validate_story_id(id).is_ok())
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

/// Insert or update the row for `id` within the table body `body` of `lines`.
///
/// An existing row is replaced only when `update_existing` is set. A new row
/// goes before the first body row whose id sorts after `id`, or at the end
/// of the body.
pub fn upsert_row(
    lines: &mut Vec<String>,
    body: Range<usize>,
    row: &str,
    id: &str,
    update_existing: bool,
) -> UpsertOutcome {
    if let Some(existing) = body.clone().find(|&i| row_matches(&lines[i], id)) {
        if !update_existing {
            debug!(id, line = existing, "row exists, leaving as is");
            return UpsertOutcome::Exists;
        }
        debug!(id, line = existing, "replacing row");
        lines[existing] = row.to_string();
        return UpsertOutcome::Updated;
    }

    let insert_at = body
        .clone()
        .find(|&i| row_id(&lines[i]).is_some_and(|current| current > id))
        .unwrap_or(body.end);
    debug!(id, line = insert_at, "inserting row");
    lines.insert(insert_at, row.to_string());
    UpsertOutcome::Inserted
}

// ---------------------------------------------------------------------------
// Index files
// ---------------------------------------------------------------------------

/// Upsert `entry` into the table under `heading` in the global index.
/// Categories without a heading are skipped.
pub fn update_global_index(
    path: &Path,
    heading: Option<&str>,
    entry: &IndexEntry,
    update_existing: bool,
) -> Result<UpsertOutcome> {
    let Some(heading) = heading else {
        return Ok(UpsertOutcome::Skipped);
    };
    if !path.exists() {
        warn!(path = %path.display(), "global index not found");
        return Ok(UpsertOutcome::MissingIndex);
    }

    let mut lines = io::read_lines(path)?;
    let body = match markdown::table_after_heading(&lines, heading) {
        Ok(body) => body,
        Err(e) => {
            warn!(path = %path.display(), heading, "global index out of sync: {e:?}");
            return Ok(e.into());
        }
    };

    let outcome = upsert_row(&mut lines, body, &entry.global_row(), &entry.id, update_existing);
    if outcome.changed() {
        io::write_lines(path, &lines)?;
        info!(path = %path.display(), id = %entry.id, "global index {outcome}");
    }
    Ok(outcome)
}

/// Upsert `entry` into the category index table. The row carries a status
/// cell when the table header names a Status column.
pub fn update_category_index(
    path: &Path,
    entry: &IndexEntry,
    update_existing: bool,
) -> Result<UpsertOutcome> {
    if !path.exists() {
        warn!(path = %path.display(), "category index not found");
        return Ok(UpsertOutcome::MissingIndex);
    }

    let mut lines = io::read_lines(path)?;
    let body = match markdown::table_with_header(&lines, CATEGORY_TABLE_HEADER) {
        Ok(body) => body,
        Err(e) => {
            warn!(path = %path.display(), "category index out of sync: {e:?}");
            return Ok(e.into());
        }
    };

    let row = entry.category_row(has_status_column(&lines));
    let outcome = upsert_row(&mut lines, body, &row, &entry.id, update_existing);
    if outcome.changed() {
        io::write_lines(path, &lines)?;
        info!(path = %path.display(), id = %entry.id, "category index {outcome}");
    }
    Ok(outcome)
}

fn has_status_column(lines: &[String]) -> bool {
    lines
        .iter()
        .any(|l| l.contains("| Story |") && l.contains("Status"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
