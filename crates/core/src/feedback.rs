//! User feedback records and the storage they are appended to.
//!
//! Storage is a trait so the service can run against a JSON file while tests
//! use memory.

use crate::error::Result;
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Thumbs up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Positive,
    Negative,
}

/// One feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// `None` when the user only left a comment.
    pub rating: Option<Rating>,
    #[serde(default)]
    pub comment: String,
    /// Feature category the feedback is about; empty when not chosen.
    #[serde(default)]
    pub feature: String,
    /// Milliseconds since the Unix epoch; 0 when the client did not say.
    #[serde(default)]
    pub timestamp: i64,
    /// Page the feedback was sent from.
    #[serde(default)]
    pub url: String,
}

/// Append-only feedback storage.
pub trait FeedbackStore: Send + Sync {
    /// All entries in submission order.
    fn entries(&self) -> Result<Vec<FeedbackEntry>>;

    /// Append one entry.
    fn append(&self, entry: FeedbackEntry) -> Result<()>;

    /// Remove every entry.
    fn clear(&self) -> Result<()>;
}

/// Feedback kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryFeedbackStore {
    entries: Mutex<Vec<FeedbackEntry>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackStore for MemoryFeedbackStore {
    fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn append(&self, entry: FeedbackEntry) -> Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

/// Feedback persisted as a JSON array in a single file.
///
/// A missing file reads as no feedback. Writes rewrite the whole file while
/// holding the store's lock.
#[derive(Debug)]
pub struct JsonFileFeedbackStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileFeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entries: &[FeedbackEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl FeedbackStore for JsonFileFeedbackStore {
    fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn append(&self, entry: FeedbackEntry) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read()?;
        entries.push(entry);
        self.write(&entries)?;
        log::debug!("Stored feedback entry #{} in {}", entries.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.write(&[])
    }
}

/// Summary shown on the feedback dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    /// Number of entries per non-empty feature category.
    pub features: BTreeMap<String, usize>,
}

impl FeedbackStats {
    pub fn from_entries(entries: &[FeedbackEntry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.rating {
                Some(Rating::Positive) => stats.positive += 1,
                Some(Rating::Negative) => stats.negative += 1,
                None => {}
            }
            if !entry.feature.is_empty() {
                *stats.features.entry(entry.feature.clone()).or_insert(0) += 1;
            }
        }
        stats
    }

    /// Most mentioned feature. Ties go to the alphabetically first.
    pub fn top_feature(&self) -> Option<(&str, usize)> {
        self.features
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (name, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((name.as_str(), count)),
            })
    }
}

/// Pretty-printed JSON document of all entries.
pub fn export_json(entries: &[FeedbackEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// File name for a feedback export made on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("feedback-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: Option<Rating>, feature: &str) -> FeedbackEntry {
        FeedbackEntry {
            rating,
            comment: "Bra verktyg".to_string(),
            feature: feature.to_string(),
            timestamp: 1_700_000_000_000,
            url: "http://localhost:3000/".to_string(),
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFeedbackStore::new();
        store.append(entry(Some(Rating::Positive), "export")).unwrap();
        store.append(entry(None, "")).unwrap();
        assert_eq!(store.entries().unwrap().len(), 2);

        store.clear().unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("feedback.json");

        let store = JsonFileFeedbackStore::new(&path);
        assert!(store.entries().unwrap().is_empty());

        store.append(entry(Some(Rating::Negative), "wizard")).unwrap();
        store.append(entry(Some(Rating::Positive), "wizard")).unwrap();

        let reopened = JsonFileFeedbackStore::new(&path);
        let entries = reopened.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rating, Some(Rating::Negative));

        reopened.clear().unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let entries = vec![
            entry(Some(Rating::Positive), "export"),
            entry(Some(Rating::Positive), "wizard"),
            entry(Some(Rating::Negative), "export"),
            entry(None, ""),
        ];
        let stats = FeedbackStats::from_entries(&entries);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.positive, 2);
        assert_eq!(stats.negative, 1);
        assert_eq!(stats.features.get("export"), Some(&2));
        assert_eq!(stats.top_feature(), Some(("export", 2)));
        assert_eq!(FeedbackStats::default().top_feature(), None);
    }

    #[test]
    fn test_export() {
        let json = export_json(&[entry(None, "")]).unwrap();
        assert!(json.contains("\"rating\": null"));
        assert_eq!(
            export_filename(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            "feedback-2024-01-02.json"
        );
    }
}
