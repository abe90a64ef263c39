//! Read model for the dashboard counters and the history list.

use crate::model::category::Category;
use crate::model::log_entry::LogEntry;
use crate::repo::log_repo::LogStore;
use crate::repo::RepoResult;
use chrono::{Local, TimeZone};
use serde::Serialize;

const HISTORY_TIME_FORMAT: &str = "%d %b %Y • %H:%M";

/// Today's acknowledgement count per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DailyCounts {
    pub stand: u32,
    pub water: u32,
    pub bathroom: u32,
}

impl DailyCounts {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Stand => self.stand,
            Category::Water => self.water,
            Category::Bathroom => self.bathroom,
        }
    }

    fn set(&mut self, category: Category, count: u32) {
        match category {
            Category::Stand => self.stand = count,
            Category::Water => self.water = count,
            Category::Bathroom => self.bathroom = count,
        }
    }
}

/// One history row ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub entry: LogEntry,
    pub label: &'static str,
    /// Local time formatted as `dd MMM yyyy • HH:mm`.
    pub when: String,
}

pub struct HistoryService<L: LogStore> {
    store: L,
}

impl<L: LogStore> HistoryService<L> {
    pub fn new(store: L) -> Self {
        Self { store }
    }

    pub fn today_counts(&self) -> RepoResult<DailyCounts> {
        let mut counts = DailyCounts::default();
        for category in Category::ALL {
            counts.set(category, self.store.count_today(category)?);
        }
        Ok(counts)
    }

    /// All entries, newest first.
    pub fn history(&self) -> RepoResult<Vec<HistoryItem>> {
        let mut entries = self.store.list_all()?;
        entries.reverse();
        Ok(entries
            .into_iter()
            .map(|entry| HistoryItem {
                label: entry.category.label(),
                when: format_timestamp(entry.timestamp_ms),
                entry,
            })
            .collect())
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).earliest() {
        Some(at) => at.format(HISTORY_TIME_FORMAT).to_string(),
        None => timestamp_ms.to_string(),
    }
}
