//! Project lifecycle status and file-map helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a project name, in characters.
pub const MAX_PROJECT_NAME_LEN: u64 = 255;

/// Path -> content mapping of a project's source files.
pub type FileMap = BTreeMap<String, String>;

/// Publication status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(CoreError::Validation(format!(
                "Unknown project status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// First file path in display order, if the project has any files.
pub fn first_file(files: &FileMap) -> Option<&str> {
    files.keys().next().map(String::as_str)
}

/// Reject empty or whitespace-only file paths.
pub fn validate_file_paths(files: &FileMap) -> Result<(), CoreError> {
    match files.keys().find(|path| path.trim().is_empty()) {
        Some(_) => Err(CoreError::Validation(
            "File paths must not be empty".to_string(),
        )),
        None => Ok(()),
    }
}
