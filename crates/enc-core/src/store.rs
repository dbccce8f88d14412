//! Durable user registry.
//!
//! The whole mapping is read on every load and rewritten on every save; there
//! is no partial update and no locking across processes or tasks.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use crate::{domain::UserId, Result};

/// Stored in place of a username when the user has none.
pub const NO_USERNAME: &str = "No username";
/// Stored in place of a first name when the transport reports none.
pub const DEFAULT_FIRST_NAME: &str = "User";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_first_name")]
    pub first_name: String,
    /// Set after a failed delivery. Recorded only; never used to skip a recipient.
    #[serde(default)]
    pub blocked: bool,
}

fn default_username() -> String {
    NO_USERNAME.to_string()
}

fn default_first_name() -> String {
    DEFAULT_FIRST_NAME.to_string()
}

impl UserRecord {
    pub fn new(username: Option<&str>, first_name: Option<&str>) -> Self {
        Self {
            username: username
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_username),
            first_name: first_name
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_first_name),
            blocked: false,
        }
    }
}

/// `user_id -> record`. JSON object keys are the decimal user ids.
pub type UserMap = BTreeMap<i64, UserRecord>;

/// Storage port for the user registry.
///
/// Implementors supply the fallible `read`/`write` primitives; the provided
/// methods carry the fail-open policy the rest of the bot relies on.
pub trait UserStore: Send + Sync {
    fn read(&self) -> Result<UserMap>;
    fn write(&self, users: &UserMap) -> Result<()>;

    /// Full snapshot. Missing or undecodable storage yields an empty map.
    fn load(&self) -> UserMap {
        match self.read() {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, "error loading users");
                UserMap::new()
            }
        }
    }

    /// Overwrite the stored mapping. Failures are logged and dropped.
    fn save(&self, users: &UserMap) {
        if let Err(e) = self.write(users) {
            tracing::error!(error = %e, "error saving users");
        }
    }

    /// Register (or re-register) a user. Always clears `blocked`.
    ///
    /// Returns the record as written, with the absent-name fallbacks applied.
    fn upsert(
        &self,
        user_id: UserId,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> UserRecord {
        let record = UserRecord::new(username, first_name);
        let mut users = self.load();
        users.insert(user_id.0, record.clone());
        self.save(&users);
        record
    }
}

/// JSON file on local disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStore for JsonFileStore {
    fn read(&self) -> Result<UserMap> {
        if !self.path.exists() {
            return Ok(UserMap::new());
        }
        let txt = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    fn write(&self, users: &UserMap) -> Result<()> {
        let txt = serde_json::to_string_pretty(users)?;
        fs::write(&self.path, txt)?;
        Ok(())
    }
}

/// In-process store, for tests and embedders that bring their own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<UserMap>,
}

impl MemoryStore {
    pub fn new(users: UserMap) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

impl UserStore for MemoryStore {
    fn read(&self) -> Result<UserMap> {
        Ok(self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn write(&self, users: &UserMap) -> Result<()> {
        *self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = users.clone();
        Ok(())
    }
}
