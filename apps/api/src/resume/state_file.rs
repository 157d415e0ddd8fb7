//! Persisted résumé + settings, kept as one JSON file.
//!
//! The in-memory copy is the source of truth for readers; every mutation is
//! written to disk (temp file + rename) before it becomes visible.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{PersistedState, ResumeStore, Settings, SettingsUpdate};

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed state file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Location of the state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StateFileError {
        StateFileError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the state. A missing or blank file yields defaults.
    pub async fn load(&self) -> Result<PersistedState, StateFileError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, using defaults", self.path.display());
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(PersistedState::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| StateFileError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the state atomically: a sibling temp file renamed over the target.
    pub async fn save(&self, state: &PersistedState) -> Result<(), StateFileError> {
        let json = serde_json::to_vec_pretty(state).map_err(|source| StateFileError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Saved state file {} ({} bytes)", self.path.display(), json.len());
        Ok(())
    }
}

/// Shared, persisted application state.
pub struct StateStore {
    file: StateFile,
    state: RwLock<Arc<PersistedState>>,
}

impl StateStore {
    /// Loads the file once at startup.
    pub async fn open(file: StateFile) -> Result<Self, StateFileError> {
        let state = file.load().await?;
        info!(
            "Loaded state from {} ({} resume sections)",
            file.path().display(),
            state.resume_data.len()
        );
        Ok(Self {
            file,
            state: RwLock::new(Arc::new(state)),
        })
    }

    pub async fn snapshot(&self) -> Arc<PersistedState> {
        Arc::clone(&*self.state.read().await)
    }

    pub async fn settings(&self) -> Settings {
        self.state.read().await.settings
    }

    async fn commit(
        &self,
        mutate: impl FnOnce(&mut PersistedState),
    ) -> Result<Arc<PersistedState>, StateFileError> {
        let mut guard = self.state.write().await;
        let mut next = PersistedState::clone(&guard);
        mutate(&mut next);
        self.file.save(&next).await?;
        *guard = Arc::new(next);
        Ok(Arc::clone(&guard))
    }

    /// Replaces the whole résumé; nothing from the previous one survives.
    pub async fn replace_resume(&self, resume: ResumeStore) -> Result<(), StateFileError> {
        self.commit(|state| state.resume_data = resume).await?;
        Ok(())
    }

    /// Empties the résumé and restores default settings.
    pub async fn clear(&self) -> Result<(), StateFileError> {
        self.commit(|state| *state = PersistedState::default()).await?;
        Ok(())
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, StateFileError> {
        let state = self.commit(|state| update.apply(&mut state.settings)).await?;
        Ok(state.settings)
    }
}
