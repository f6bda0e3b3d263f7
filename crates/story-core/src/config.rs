use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub message: String,
}

// ---------------------------------------------------------------------------
// GeneratorDefaults
// ---------------------------------------------------------------------------

/// Values used by `story new` when the matching flag is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDefaults {
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_priority() -> String {
    "P2 (Medium)".to_string()
}

fn default_target() -> String {
    "macOS 26 (Tahoe)".to_string()
}

impl Default for GeneratorDefaults {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            target: default_target(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Documentation tree root, relative to the project root.
    #[serde(default = "default_stories_dir")]
    pub stories_dir: PathBuf,
    /// Story template, relative to the project root.
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default)]
    pub defaults: GeneratorDefaults,
}

fn default_stories_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_STORIES_DIR)
}

fn default_template() -> PathBuf {
    PathBuf::from(paths::DEFAULT_TEMPLATE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stories_dir: default_stories_dir(),
            template: default_template(),
            defaults: GeneratorDefaults::default(),
        }
    }
}

impl Config {
    /// Load `.story/config.yaml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn stories_root(&self, root: &Path) -> PathBuf {
        root.join(&self.stories_dir)
    }

    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.template)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.stories_dir.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                message: "stories_dir is empty; stories will be written to the project root"
                    .to_string(),
            });
        } else if self.stories_dir.is_absolute() {
            warnings.push(ConfigWarning {
                message: format!(
                    "stories_dir '{}' is absolute; it should be relative to the project root",
                    self.stories_dir.display()
                ),
            });
        }

        if self.template.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                message: "template path is empty".to_string(),
            });
        }

        if self.defaults.priority.trim().is_empty() {
            warnings.push(ConfigWarning {
                message: "defaults.priority is empty; new stories will fail lint".to_string(),
            });
        }
        if self.defaults.target.trim().is_empty() {
            warnings.push(ConfigWarning {
                message: "defaults.target is empty; new stories will fail lint".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
