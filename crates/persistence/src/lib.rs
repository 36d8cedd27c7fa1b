#![deny(warnings)]

//! Flat-file stores for the shared leaderboard and rumor board.
//!
//! Both stores follow the classroom design: the whole file is read once at
//! session start and overwritten wholesale on every save, so the last
//! writer wins. Missing or empty files mean "no prior data", never an
//! error.

use game_core::Rumor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors from the flat-file stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A row could not be parsed or written.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One leaderboard row. The player name is the unique key; later writes
/// for the same player overwrite earlier ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name.
    pub player: String,
    /// Net worth at the last submitted round.
    pub net_worth: Decimal,
    /// Round the player has reached.
    pub round: u8,
}

/// Whole-file CSV store for the shared leaderboard.
#[derive(Clone, Debug)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    /// Store backed by the given CSV file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted table wholesale into memory.
    pub fn load(&self) -> Result<BTreeMap<String, LeaderboardEntry>, StoreError> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "leaderboard file not found, starting fresh");
            return Ok(BTreeMap::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = BTreeMap::new();
        for record in reader.deserialize() {
            let entry: LeaderboardEntry = record?;
            entries.insert(entry.player.clone(), entry);
        }
        if entries.is_empty() {
            warn!(path = %self.path.display(), "leaderboard file is empty, starting fresh");
        }
        Ok(entries)
    }

    /// Serialize the entire table and overwrite the file, rows sorted
    /// descending by net worth.
    pub fn save(&self, entries: &BTreeMap<String, LeaderboardEntry>) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for entry in ranked(entries) {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Leaderboard rows sorted descending by net worth for display.
pub fn ranked(entries: &BTreeMap<String, LeaderboardEntry>) -> Vec<&LeaderboardEntry> {
    let mut rows: Vec<&LeaderboardEntry> = entries.values().collect();
    rows.sort_by(|a, b| b.net_worth.cmp(&a.net_worth));
    rows
}

/// Whole-file CSV store for submitted rumors.
#[derive(Clone, Debug)]
pub struct RumorStore {
    path: PathBuf,
}

impl RumorStore {
    /// Store backed by the given CSV file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every persisted rumor in submission order.
    pub fn load(&self) -> Result<Vec<Rumor>, StoreError> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "rumor file not found, starting fresh");
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rumors = Vec::new();
        for record in reader.deserialize() {
            let rumor: Rumor = record?;
            rumors.push(rumor);
        }
        Ok(rumors)
    }

    /// Serialize the given rumors and overwrite the file.
    pub fn save(&self, rumors: &[Rumor]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for rumor in rumors {
            writer.serialize(rumor)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// The `n` most recent rumors, newest first. Display only; the file
/// itself is never truncated.
pub fn latest(rumors: &[Rumor], n: usize) -> Vec<&Rumor> {
    rumors.iter().rev().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(player: &str, net_worth: i64, round: u8) -> LeaderboardEntry {
        LeaderboardEntry {
            player: player.to_string(),
            net_worth: Decimal::new(net_worth, 0),
            round,
        }
    }

    #[test]
    fn leaderboard_roundtrip_and_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("leaderboard.csv"));

        let mut table = BTreeMap::new();
        for e in [
            entry("Asha", 98_000, 2),
            entry("Ravi", 121_500, 3),
            entry("Meera", 100_000, 1),
        ] {
            table.insert(e.player.clone(), e);
        }
        store.save(&table).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back, table);
        let rows = ranked(&back);
        let names: Vec<&str> = rows.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(names, ["Ravi", "Meera", "Asha"]);
    }

    #[test]
    fn rows_are_persisted_in_rank_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.csv");
        let store = LeaderboardStore::new(&path);

        let mut table = BTreeMap::new();
        table.insert("Asha".into(), entry("Asha", 90_000, 2));
        table.insert("Ravi".into(), entry("Ravi", 110_000, 2));
        store.save(&table).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("player,net_worth,round"));
        assert_eq!(lines.next(), Some("Ravi,110000,2"));
        assert_eq!(lines.next(), Some("Asha,90000,2"));
    }

    #[test]
    fn missing_and_empty_files_mean_no_prior_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("leaderboard.csv"));
        assert!(store.load().unwrap().is_empty());

        fs::write(store.path(), "").unwrap();
        assert!(store.load().unwrap().is_empty());

        let rumors = RumorStore::new(dir.path().join("rumors.csv"));
        assert!(rumors.load().unwrap().is_empty());
    }

    #[test]
    fn a_later_save_replaces_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("leaderboard.csv"));

        let mut first = BTreeMap::new();
        first.insert("Asha".into(), entry("Asha", 100_000, 1));
        store.save(&first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("Ravi".into(), entry("Ravi", 50_000, 2));
        store.save(&second).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.contains_key("Ravi"));
    }

    #[test]
    fn rumor_roundtrip_keeps_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RumorStore::new(dir.path().join("rumors.csv"));

        let rumors: Vec<Rumor> = (1..=7)
            .map(|i| Rumor::new(Some("Asha"), &format!("rumor {i}")).unwrap())
            .collect();
        store.save(&rumors).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back, rumors);

        let shown = latest(&back, 5);
        assert_eq!(shown.len(), 5);
        assert_eq!(shown[0].text, "rumor 7");
        assert_eq!(shown[4].text, "rumor 3");
    }

    #[test]
    fn rumor_text_with_commas_survives_the_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RumorStore::new(dir.path().join("rumors.csv"));
        let rumor = Rumor::new(None, "buy low, sell high, they said").unwrap();
        store.save(std::slice::from_ref(&rumor)).unwrap();
        assert_eq!(store.load().unwrap(), vec![rumor]);
    }
}
