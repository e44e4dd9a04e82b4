//! In-memory editing session over a project's file map.
//!
//! Every change persists the whole map, so the server copy always matches
//! what the editor shows.

use async_trait::async_trait;
use shipyard_core::project::{first_file, FileMap};
use shipyard_core::types::DbId;

use crate::error::ClientError;
use crate::models::Project;

/// Where the editor loads projects from and saves file maps to.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn load_project(&self, id: DbId) -> Result<Project, ClientError>;
    async fn save_files(&self, id: DbId, files: &FileMap) -> Result<Project, ClientError>;
}

pub struct ProjectEditor<S> {
    store: S,
    project: Project,
    active: Option<String>,
}

impl<S: ProjectStore> ProjectEditor<S> {
    /// Fetch the project and select its first file, if it has any.
    pub async fn load(store: S, project_id: DbId) -> Result<Self, ClientError> {
        let project = store.load_project(project_id).await?;
        let active = first_file(&project.files).map(str::to_string);
        tracing::debug!(
            project_id = %project_id,
            files = project.files.len(),
            active = ?active,
            "Project loaded into editor",
        );
        Ok(Self {
            store,
            project,
            active,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn files(&self) -> &FileMap {
        &self.project.files
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_content(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|path| self.project.files.get(path))
            .map(String::as_str)
    }

    /// Switch to `path`. Returns `false` and keeps the selection when the
    /// file does not exist.
    pub fn select(&mut self, path: &str) -> bool {
        if self.project.files.contains_key(path) {
            self.active = Some(path.to_string());
            true
        } else {
            false
        }
    }

    /// Replace the active file's content and persist.
    ///
    /// An empty edit, or an edit with no file selected, is ignored and
    /// returns `Ok(false)`.
    pub async fn edit(&mut self, content: &str) -> Result<bool, ClientError> {
        if content.is_empty() {
            return Ok(false);
        }
        let Some(path) = self.active.clone() else {
            return Ok(false);
        };
        let mut files = self.project.files.clone();
        files.insert(path, content.to_string());
        self.save(files).await?;
        Ok(true)
    }

    /// Add (or overwrite) a file, select it, and persist.
    pub async fn add_file(&mut self, path: &str, content: &str) -> Result<(), ClientError> {
        let mut files = self.project.files.clone();
        files.insert(path.to_string(), content.to_string());
        self.save(files).await?;
        self.active = Some(path.to_string());
        Ok(())
    }

    /// Remove a file and persist. Returns `false` if it did not exist.
    ///
    /// Removing the active file moves the selection to the first remaining
    /// file.
    pub async fn remove_file(&mut self, path: &str) -> Result<bool, ClientError> {
        let mut files = self.project.files.clone();
        if files.remove(path).is_none() {
            return Ok(false);
        }
        self.save(files).await?;
        if self.active.as_deref() == Some(path) {
            self.active = first_file(&self.project.files).map(str::to_string);
        }
        Ok(true)
    }

    /// Local state only changes once the server accepted the new map.
    async fn save(&mut self, files: FileMap) -> Result<(), ClientError> {
        self.project = self.store.save_files(self.project.id, &files).await?;
        tracing::debug!(project_id = %self.project.id, files = files.len(), "Project files saved");
        Ok(())
    }
}
