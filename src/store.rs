use crate::error::Result;
use crate::investor::UserProfile;
use crate::notifications::Notification;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const USER_PROFILE: &str = "investment_user_profile";
const NOTIFICATIONS: &str = "investment_notifications";
const WATCHLIST: &str = "investment_watchlist";

/// Local key/value persistence: one pretty-printed JSON file per key.
/// No consistency guarantees beyond a single whole-file write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Missing file means absent. A file that exists but doesn't parse is
    /// logged and also treated as absent.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(
                    "[STORE] Could not parse '{}': {} - ignoring stored value",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp_path, &path)?;
        log::debug!("[STORE] Wrote '{}'", path.display());
        Ok(())
    }

    pub fn save_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.save(USER_PROFILE, profile)
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.load(USER_PROFILE)
    }

    pub fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
        self.save(NOTIFICATIONS, notifications)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.load(NOTIFICATIONS).unwrap_or_default()
    }

    pub fn save_watchlist(&self, watchlist: &[String]) -> Result<()> {
        self.save(WATCHLIST, watchlist)
    }

    pub fn watchlist(&self) -> Vec<String> {
        self.load(WATCHLIST).unwrap_or_default()
    }
}
