//! Inspectable items and per-session scan bookkeeping.
//!
//! An [`Item`] is read-only reference data: it is built once when the
//! catalogue is constructed and never changes during a session. What
//! the player has done to an item lives in the [`ScanLedger`], which is
//! cleared on every scenario reset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An inspectable part (an aileron in the standard catalogue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique catalogue key.
    pub id: String,
    /// Human-readable label shown at the station.
    pub display_name: String,
    pub description: String,
    /// Whether the part is correct for the active target context.
    pub target_match: bool,
    /// Whether the part is genuine (not counterfeit or damaged).
    pub is_authentic: bool,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        target_match: bool,
        is_authentic: bool,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            target_match,
            is_authentic,
        }
    }
}

/// Ordered, immutable set of items keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalogue {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalogue {
    /// Build a catalogue, keeping input order. Duplicate ids are dropped
    /// (the first occurrence wins).
    pub fn new(items: Vec<Item>) -> Self {
        let mut catalogue = Self::default();
        for item in items {
            if catalogue.index.contains_key(&item.id) {
                log::warn!("Duplicate item id '{}' dropped from catalogue", item.id);
                continue;
            }
            catalogue.index.insert(item.id.clone(), catalogue.items.len());
            catalogue.items.push(item);
        }
        catalogue
    }

    /// The built-in Monaco inspection catalogue.
    pub fn standard() -> Self {
        Self::new(vec![
            Item::new(
                "monaco1",
                "Aileron A-1 (Monaco)",
                "Left-wing aileron, batch 2291. Paperwork lists the Monaco airframe.",
                true,
                true,
            ),
            Item::new(
                "monaco2",
                "Aileron A-2 (Monaco)",
                "Right-wing aileron, batch 2291. Serial matches the Monaco build sheet.",
                true,
                true,
            ),
            Item::new(
                "barcelone",
                "Aileron B-7 (Barcelone)",
                "Genuine aileron, but certified for the Barcelone airframe.",
                false,
                true,
            ),
            Item::new(
                "monaco_counterfeit",
                "Aileron A-9 (unverified)",
                "Claims Monaco fitment. Rivet pattern and certificate stamp are inconsistent.",
                false,
                false,
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items that are correct for the target.
    pub fn matching_count(&self) -> usize {
        self.items.iter().filter(|i| i.target_match).count()
    }
}

/// Per-item session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// How many times the item was scanned this session.
    pub scans: u32,
    /// Set once, never cleared until reset.
    pub validated: bool,
}

/// Scan and validation state for the current session.
#[derive(Debug, Clone, Default)]
pub struct ScanLedger {
    records: HashMap<String, ScanRecord>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scan. Returns the number of scans so far.
    pub fn record_scan(&mut self, id: &str) -> u32 {
        let record = self.records.entry(id.to_string()).or_default();
        record.scans += 1;
        record.scans
    }

    /// Mark an item validated. Returns `false` if it already was.
    pub fn mark_validated(&mut self, id: &str) -> bool {
        let record = self.records.entry(id.to_string()).or_default();
        if record.validated {
            return false;
        }
        record.validated = true;
        true
    }

    pub fn is_scanned(&self, id: &str) -> bool {
        self.records.get(id).is_some_and(|r| r.scans > 0)
    }

    pub fn is_validated(&self, id: &str) -> bool {
        self.records.get(id).is_some_and(|r| r.validated)
    }

    pub fn scan_count(&self, id: &str) -> u32 {
        self.records.get(id).map_or(0, |r| r.scans)
    }

    pub fn record(&self, id: &str) -> Option<ScanRecord> {
        self.records.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalogue() {
        let cat = ItemCatalogue::standard();
        assert_eq!(cat.len(), 4);
        assert_eq!(cat.matching_count(), 2);
        assert!(cat.get("monaco1").unwrap().target_match);
        assert!(!cat.get("barcelone").unwrap().target_match);
        assert!(cat.get("barcelone").unwrap().is_authentic);
        assert!(!cat.get("monaco_counterfeit").unwrap().is_authentic);
    }

    #[test]
    fn test_lookup_missing() {
        let cat = ItemCatalogue::standard();
        assert!(cat.get("does-not-exist").is_none());
        assert!(!cat.contains("does-not-exist"));
    }

    #[test]
    fn test_duplicates_dropped() {
        let cat = ItemCatalogue::new(vec![
            Item::new("a", "First", "", true, true),
            Item::new("b", "Other", "", false, true),
            Item::new("a", "Second", "", false, false),
        ]);
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.get("a").unwrap().display_name, "First");
        let ids: Vec<_> = cat.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_ledger_scans_accumulate() {
        let mut ledger = ScanLedger::new();
        assert!(!ledger.is_scanned("x"));
        assert_eq!(ledger.record_scan("x"), 1);
        assert_eq!(ledger.record_scan("x"), 2);
        assert!(ledger.is_scanned("x"));
        assert!(!ledger.is_validated("x"));
    }

    #[test]
    fn test_ledger_validates_once() {
        let mut ledger = ScanLedger::new();
        assert!(ledger.mark_validated("x"));
        assert!(!ledger.mark_validated("x"));
        assert!(ledger.is_validated("x"));
        // Validation without a scan does not count as a scan
        assert_eq!(ledger.scan_count("x"), 0);
    }

    #[test]
    fn test_ledger_clear() {
        let mut ledger = ScanLedger::new();
        ledger.record_scan("x");
        ledger.mark_validated("x");
        ledger.clear();
        assert!(ledger.record("x").is_none());
        assert!(!ledger.is_validated("x"));
    }
}
