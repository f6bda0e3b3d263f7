use crate::config::{Config, GeneratorDefaults};
use crate::error::{Result, StoryError};
use crate::index::{self, IndexEntry};
use crate::paths;
use crate::template;
use crate::types::{status_label, Category, UpsertOutcome};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// Template markers
// ---------------------------------------------------------------------------

pub const MARKER_ID: &str = "<ID>";
pub const MARKER_TITLE: &str = "<Title>";
pub const MARKER_EPIC: &str = "<Epic>";
pub const MARKER_ESTIMATE: &str = "<n days>";
pub const MARKER_DEPENDENCIES: &str = "<IDs (e.g., F.01, A.02) or None>";
pub const MARKER_DESIGN: &str = "<link or None>";
pub const MARKER_OBJECTIVE: &str = "<What problem this solves and why it matters.>";

// ---------------------------------------------------------------------------
// NewStory
// ---------------------------------------------------------------------------

/// Caller-supplied values for a new story document.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub dependencies: String,
    pub estimate: String,
    pub target: String,
    pub design: String,
    pub objective: String,
    /// Category index description; the objective is used when unset.
    pub description: Option<String>,
    /// Category display name; the category table name is used when unset.
    pub epic: Option<String>,
}

impl NewStory {
    pub fn new(id: impl Into<String>, title: impl Into<String>, defaults: &GeneratorDefaults) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: "Not Started".to_string(),
            priority: defaults.priority.clone(),
            dependencies: "None".to_string(),
            estimate: "TBD".to_string(),
            target: defaults.target.clone(),
            design: "None".to_string(),
            objective: "TBD".to_string(),
            description: None,
            epic: None,
        }
    }

    fn epic_name(&self, category: &Category) -> String {
        self.epic.clone().unwrap_or_else(|| category.name.to_string())
    }

    /// Render the document from `template_text`.
    pub fn render(&self, template_text: &str, category: &Category) -> String {
        let epic = self.epic_name(category);
        let markers = [
            (MARKER_ID, self.id.as_str()),
            (MARKER_TITLE, self.title.as_str()),
            (MARKER_EPIC, epic.as_str()),
            (MARKER_ESTIMATE, self.estimate.as_str()),
            (MARKER_DEPENDENCIES, self.dependencies.as_str()),
            (MARKER_DESIGN, self.design.as_str()),
            (MARKER_OBJECTIVE, self.objective.as_str()),
        ];
        let fields = [
            ("Epic", epic.as_str()),
            ("Status", self.status.as_str()),
            ("Priority", self.priority.as_str()),
            ("Dependencies", self.dependencies.as_str()),
            ("Target", self.target.as_str()),
            ("Estimated Effort", self.estimate.as_str()),
            ("Design Reference", self.design.as_str()),
        ];
        debug_assert_eq!(fields.len(), template::METADATA_LABELS.len());
        template::render(template_text, &markers, &fields)
    }

    fn index_entry(&self, category: &Category, filename: &str) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            filename: filename.to_string(),
            folder: category.folder.to_string(),
            status_label: status_label(&self.status),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| self.objective.clone()),
            dependencies: self.dependencies.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Replace index rows that already exist for this id.
    pub update_existing: bool,
    /// Leave both index files alone.
    pub skip_indexes: bool,
    /// Replace an existing story file.
    pub overwrite: bool,
    /// Validate and render only.
    pub dry_run: bool,
}

/// What happened to one index file. An I/O failure on one index is
/// reported here instead of hiding the other index's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IndexUpdate {
    Done(UpsertOutcome),
    Failed { error: String },
}

impl IndexUpdate {
    fn from_result(index: &str, result: Result<UpsertOutcome>) -> Self {
        match result {
            Ok(outcome) => IndexUpdate::Done(outcome),
            Err(e) => {
                error!(index, error = %e, "index update failed");
                IndexUpdate::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, IndexUpdate::Failed { .. })
    }
}

impl fmt::Display for IndexUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexUpdate::Done(outcome) => write!(f, "{outcome}"),
            IndexUpdate::Failed { error } => write!(f, "error: {error}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateReport {
    pub path: PathBuf,
    pub dry_run: bool,
    /// `None` when indexes were skipped or in a dry run.
    pub global_index: Option<IndexUpdate>,
    pub category_index: Option<IndexUpdate>,
}

impl CreateReport {
    /// True when either index file could not be read or written.
    pub fn index_failed(&self) -> bool {
        [&self.global_index, &self.category_index]
            .into_iter()
            .flatten()
            .any(IndexUpdate::is_failed)
    }
}

/// Validate, render, write the story, and upsert both index rows.
///
/// Every fatal check runs before anything is written. The two index
/// upserts are independent; each outcome, or its I/O error, is reported on
/// its own.
pub fn create_story(
    root: &Path,
    config: &Config,
    story: &NewStory,
    opts: CreateOptions,
) -> Result<CreateReport> {
    let template_path = config.template_path(root);
    if !template_path.exists() {
        return Err(StoryError::TemplateNotFound(template_path));
    }

    paths::validate_story_id(&story.id)?;
    let category = Category::for_story_id(&story.id)?;

    let stories_dir = config.stories_root(root);
    let filename = paths::story_filename(&story.id, &story.title);
    let story_path = paths::story_path(&stories_dir, category, &filename);

    if story_path.exists() && !opts.overwrite {
        return Err(StoryError::StoryExists(story_path));
    }

    let template_text = std::fs::read_to_string(&template_path)?;
    let content = story.render(&template_text, category);

    if opts.dry_run {
        debug!(path = %story_path.display(), "dry run, nothing written");
        return Ok(CreateReport {
            path: story_path,
            dry_run: true,
            global_index: None,
            category_index: None,
        });
    }

    crate::io::atomic_write(&story_path, content.as_bytes())?;
    info!(path = %story_path.display(), id = %story.id, "story written");

    if opts.skip_indexes {
        return Ok(CreateReport {
            path: story_path,
            dry_run: false,
            global_index: None,
            category_index: None,
        });
    }

    let entry = story.index_entry(category, &filename);
    let global = IndexUpdate::from_result(
        "global",
        index::update_global_index(
            &paths::global_index(&stories_dir),
            category.heading,
            &entry,
            opts.update_existing,
        ),
    );
    let local = IndexUpdate::from_result(
        "category",
        index::update_category_index(
            &paths::category_index(&stories_dir, category),
            &entry,
            opts.update_existing,
        ),
    );

    Ok(CreateReport {
        path: story_path,
        dry_run: false,
        global_index: Some(global),
        category_index: Some(local),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
