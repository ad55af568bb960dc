use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const MAX_HISTORY: usize = 10;

/// A departure and destination, by display name. Names survive re-importing a feed better than
/// stop IDs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePair {
    pub dep: String,
    pub dest: String,
}

impl RoutePair {
    pub fn new(dep: &str, dest: &str) -> Self {
        Self {
            dep: dep.to_string(),
            dest: dest.to_string(),
        }
    }
}

/// Favorites and recently viewed pairs, most recent first
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmarks {
    #[serde(default)]
    pub favorites: Vec<RoutePair>,
    #[serde(default)]
    pub history: Vec<RoutePair>,
}

impl Bookmarks {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("bookmarks.json")
    }

    /// A missing or corrupt file just means no bookmarks yet.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        if !path.is_file() {
            return Self::default();
        }
        match read(&path) {
            Ok(bookmarks) => bookmarks,
            Err(err) => {
                warn!("Ignoring unreadable bookmarks: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs_err::create_dir_all(data_dir)?;
        fs_err::write(Self::path(data_dir), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn add_history(&mut self, pair: RoutePair) {
        self.history.retain(|x| x != &pair);
        self.history.insert(0, pair);
        self.history.truncate(MAX_HISTORY);
    }

    pub fn is_favorite(&self, pair: &RoutePair) -> bool {
        self.favorites.contains(pair)
    }

    /// Returns true if the pair is now a favorite
    pub fn toggle_favorite(&mut self, pair: RoutePair) -> bool {
        if self.is_favorite(&pair) {
            self.favorites.retain(|x| x != &pair);
            false
        } else {
            self.favorites.insert(0, pair);
            true
        }
    }

    pub fn remove_favorite(&mut self, idx: usize) -> Result<RoutePair> {
        remove(&mut self.favorites, idx)
    }

    pub fn remove_history(&mut self, idx: usize) -> Result<RoutePair> {
        remove(&mut self.history, idx)
    }
}

fn read(path: &Path) -> Result<Bookmarks> {
    let text = fs_err::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn remove(list: &mut Vec<RoutePair>, idx: usize) -> Result<RoutePair> {
    if idx >= list.len() {
        bail!("There's no bookmark number {idx}; only {} exist", list.len());
    }
    Ok(list.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(dep: &str, dest: &str) -> RoutePair {
        RoutePair::new(dep, dest)
    }

    #[test]
    fn history_dedupes_and_caps() {
        let mut bookmarks = Bookmarks::default();
        for i in 0..12 {
            bookmarks.add_history(pair(&format!("stop {i}"), "Sakae"));
        }
        assert_eq!(bookmarks.history.len(), MAX_HISTORY);
        assert_eq!(bookmarks.history[0], pair("stop 11", "Sakae"));
        assert_eq!(bookmarks.history[9], pair("stop 2", "Sakae"));

        bookmarks.add_history(pair("stop 5", "Sakae"));
        assert_eq!(bookmarks.history.len(), MAX_HISTORY);
        assert_eq!(bookmarks.history[0], pair("stop 5", "Sakae"));
        assert_eq!(
            bookmarks
                .history
                .iter()
                .filter(|x| x.dep == "stop 5")
                .count(),
            1
        );
    }

    #[test]
    fn favorites_toggle() {
        let mut bookmarks = Bookmarks::default();
        assert!(bookmarks.toggle_favorite(pair("Nagoya", "Sakae")));
        assert!(bookmarks.toggle_favorite(pair("Ozone", "Sakae")));
        assert_eq!(bookmarks.favorites[0], pair("Ozone", "Sakae"));
        assert!(bookmarks.is_favorite(&pair("Nagoya", "Sakae")));
        // Direction matters
        assert!(!bookmarks.is_favorite(&pair("Sakae", "Nagoya")));

        assert!(!bookmarks.toggle_favorite(pair("Nagoya", "Sakae")));
        assert_eq!(bookmarks.favorites, vec![pair("Ozone", "Sakae")]);

        assert!(bookmarks.remove_favorite(3).is_err());
        assert_eq!(bookmarks.remove_favorite(0).unwrap(), pair("Ozone", "Sakae"));
        assert!(bookmarks.favorites.is_empty());
    }

    #[test]
    fn storage() {
        let dir = std::env::temp_dir().join(format!("bookmarks-test-{}", std::process::id()));
        assert_eq!(Bookmarks::load(&dir), Bookmarks::default());

        let mut bookmarks = Bookmarks::default();
        bookmarks.toggle_favorite(pair("Nagoya", "Sakae"));
        bookmarks.add_history(pair("Sakae", "Ozone"));
        bookmarks.save(&dir).unwrap();
        assert_eq!(Bookmarks::load(&dir), bookmarks);

        std::fs::write(Bookmarks::path(&dir), "[not json").unwrap();
        assert_eq!(Bookmarks::load(&dir), Bookmarks::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
