//! Client-local favorites set, persisted per user between sessions

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

const FAVORITES_CACHE_DIR: &str = ".cache";
const DEFAULT_OWNER: &str = "guest";

/// Favorited track ids of the current user. This set is authoritative for the
/// session; the server favorites table only mirrors it.
#[derive(Clone)]
pub struct FavoritesCache {
    ids: Arc<RwLock<HashSet<String>>>,
    owner: Arc<RwLock<String>>,
    dir: PathBuf,
}

/// File-name-safe form of a user id
fn file_stem(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl FavoritesCache {
    pub fn new() -> Self {
        Self::in_dir(FAVORITES_CACHE_DIR)
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            ids: Arc::new(RwLock::new(HashSet::new())),
            owner: Arc::new(RwLock::new(DEFAULT_OWNER.to_string())),
            dir: dir.into(),
        }
    }

    /// `favorites-<user>.json` for the current owner
    pub async fn path(&self) -> PathBuf {
        let owner = self.owner.read().await;
        self.dir.join(format!("favorites-{}.json", file_stem(&owner)))
    }

    pub async fn owner(&self) -> String {
        self.owner.read().await.clone()
    }

    /// Hands the set to `user_id`: the previous user's ids are dropped and the
    /// new user's saved favorites are read back.
    pub async fn switch_user(&self, user_id: &str) -> Result<()> {
        *self.owner.write().await = user_id.to_string();
        self.replace(Vec::new()).await;
        self.load_from_disk().await
    }

    pub async fn load_from_disk(&self) -> Result<()> {
        let path = self.path().await;
        if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let ids: Vec<String> = serde_json::from_str(&content)?;
            self.replace(ids).await;
        }
        Ok(())
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        let path = self.path().await;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut ids: Vec<String> = self.ids.read().await.iter().cloned().collect();
        ids.sort();
        let content = serde_json::to_string(&ids)?;
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    pub async fn replace(&self, track_ids: impl IntoIterator<Item = String>) {
        *self.ids.write().await = track_ids.into_iter().collect();
    }

    /// Adds ids that are not present yet (used when seeding from the server)
    pub async fn merge(&self, track_ids: impl IntoIterator<Item = String>) {
        self.ids.write().await.extend(track_ids);
    }

    pub async fn contains(&self, track_id: &str) -> bool {
        self.ids.read().await.contains(track_id)
    }

    /// Flips membership and returns the new state
    pub async fn toggle(&self, track_id: &str) -> bool {
        let mut ids = self.ids.write().await;
        if ids.remove(track_id) {
            false
        } else {
            ids.insert(track_id.to_string());
            true
        }
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.ids.read().await.clone()
    }
}

impl Default for FavoritesCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("acidwave-test-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn double_toggle_restores_membership() {
        let cache = FavoritesCache::in_dir(temp_dir("toggle"));
        assert!(!cache.contains("7").await);
        assert!(cache.toggle("7").await);
        assert!(cache.contains("7").await);
        assert!(!cache.toggle("7").await);
        assert!(!cache.contains("7").await);
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let dir = temp_dir("persist");
        let cache = FavoritesCache::in_dir(&dir);
        cache.merge(["3".to_string(), "1".to_string()]).await;
        cache.save_to_disk().await.expect("save");
        assert!(dir.join("favorites-guest.json").exists());

        let reloaded = FavoritesCache::in_dir(&dir);
        reloaded.load_from_disk().await.expect("load");
        assert!(reloaded.contains("1").await);
        assert!(reloaded.contains("3").await);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn each_user_keeps_a_separate_set() {
        let dir = temp_dir("per-user");
        let cache = FavoritesCache::in_dir(&dir);
        cache.toggle("3").await;
        cache.save_to_disk().await.expect("save guest");

        cache.switch_user("neo").await.expect("switch to neo");
        assert!(cache.snapshot().await.is_empty());
        cache.toggle("8").await;
        cache.save_to_disk().await.expect("save neo");

        cache.switch_user("guest").await.expect("switch back");
        assert!(cache.contains("3").await);
        assert!(!cache.contains("8").await);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn odd_user_ids_stay_inside_the_cache_dir() {
        let cache = FavoritesCache::in_dir("cache");
        cache.switch_user("../x y").await.expect("missing file is fine");
        assert_eq!(cache.path().await, PathBuf::from("cache/favorites-___x_y.json"));
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let cache = FavoritesCache::in_dir(temp_dir("missing"));
        cache.load_from_disk().await.expect("missing file is fine");
        assert!(cache.snapshot().await.is_empty());
    }
}
