//! Session document kept in a JSON file between CLI runs.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use counsel::session::{SessionError, SessionStore};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SessionError::Unavailable(format!("{}: {error}", self.path.display()))),
        }
    }

    fn save(&self, raw: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Write(e.to_string()))?;
        }
        std::fs::write(&self.path, raw).map_err(|e| SessionError::Write(format!("{}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionError::Write(error.to_string())),
        }
    }
}
