use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Where the serialized session lives between runs.
pub trait SessionStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, value: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// Session persisted as a JSON file, `~/.plan-report/session.json` by default.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(Self::new(home.join(".plan-report").join("session.json")))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Some(content))
    }

    fn save(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, value)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store; clones share the same slot.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    value: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.to_string()))),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.value
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, value: &str) -> Result<()> {
        *self.slot()? = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
