use crate::error::{Result, StoryError};
use crate::types::Category;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STORY_DIR: &str = ".story";
pub const CONFIG_FILE: &str = ".story/config.yaml";

pub const DEFAULT_STORIES_DIR: &str = "docs/stories";
pub const DEFAULT_TEMPLATE: &str = ".claude/skills/write-story/references/story-template.md";

pub const INDEX_FILE: &str = "README.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// The global index: `<stories_dir>/README.md`.
pub fn global_index(stories_dir: &Path) -> PathBuf {
    stories_dir.join(INDEX_FILE)
}

pub fn category_dir(stories_dir: &Path, category: &Category) -> PathBuf {
    stories_dir.join(category.folder)
}

/// The per-category index: `<stories_dir>/<folder>/README.md`.
pub fn category_index(stories_dir: &Path, category: &Category) -> PathBuf {
    category_dir(stories_dir, category).join(INDEX_FILE)
}

pub fn story_path(stories_dir: &Path, category: &Category, filename: &str) -> PathBuf {
    category_dir(stories_dir, category).join(filename)
}

// ---------------------------------------------------------------------------
// Story ids and filenames
// ---------------------------------------------------------------------------

static STORY_ID_RE: OnceLock<Regex> = OnceLock::new();
static STORY_REF_RE: OnceLock<Regex> = OnceLock::new();
static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn story_id_re() -> &'static Regex {
    STORY_ID_RE.get_or_init(|| Regex::new(r"^[A-Z]\.[0-9]{2}$").unwrap())
}

fn story_ref_re() -> &'static Regex {
    STORY_REF_RE.get_or_init(|| Regex::new(r"^[A-Z]{1,3}\.[0-9]{2}[A-Z]?$").unwrap())
}

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").unwrap())
}

/// Validate an id for a new story: one uppercase letter, a dot, two digits.
pub fn validate_story_id(id: &str) -> Result<()> {
    if !story_id_re().is_match(id) {
        return Err(StoryError::InvalidStoryId(id.to_string()));
    }
    Ok(())
}

/// The wider id shape accepted in existing documents: one to three
/// uppercase letters, a dot, two digits, and an optional uppercase suffix.
pub fn is_story_ref(id: &str) -> bool {
    story_ref_re().is_match(id)
}

/// Collapse non-alphanumeric runs to single hyphens, trim, and upper-case.
pub fn slugify_title(title: &str) -> String {
    non_alnum_re()
        .replace_all(title.trim(), "-")
        .trim_matches('-')
        .to_uppercase()
}

/// `F.10` + `Add Retry Logic` -> `F.10-ADD-RETRY-LOGIC.md`
pub fn story_filename(id: &str, title: &str) -> String {
    format!("{id}-{}.md", slugify_title(title))
}

/// The id token a story filename starts with (everything before the first `-`).
pub fn filename_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.split('-').next().unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
