use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("invalid story id '{0}': must match [A-Z].[0-9]{{2}} (e.g., F.10)")]
    InvalidStoryId(String),

    #[error("unsupported story prefix: {0}")]
    UnknownCategory(String),

    #[error("story file already exists: {}", .0.display())]
    StoryExists(PathBuf),

    #[error("story file not found: {}", .0.display())]
    StoryNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, StoryError>;
