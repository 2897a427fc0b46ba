//! Host-supplied configuration for the personnel store.
//!
//! # Responsibility
//! - Describe where the SQLite store lives and how long writers may block.
//! - Describe the root sentinel identity used as the default administrator.
//!
//! # Invariants
//! - Every field has a default, so partial documents deserialize.
//! - Configuration is plain data; opening connections happens in `db`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ROOT_NAME: &str = "root";
const DEFAULT_ROOT_CREDENTIAL: &str = "toor";

/// Where and how to open the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl StoreSettings {
    /// Settings for a file-backed store at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Settings for a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Fields of the root sentinel administrator.
///
/// The root is never stored as an employee row; these values only live in
/// memory for the lifetime of one `PersonnelManager`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootIdentity {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub credential: String,
}

impl Default for RootIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_ROOT_NAME.to_string(),
            first_name: String::new(),
            email: String::new(),
            credential: DEFAULT_ROOT_CREDENTIAL.to_string(),
        }
    }
}

// Credential stays out of debug output.
impl std::fmt::Debug for RootIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootIdentity")
            .field("name", &self.name)
            .field("first_name", &self.first_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
