//! Custom icon indirection table
//!
//! Icons that do not live on the fixed sprite sheets are served from
//! standalone assets listed in this table. Entries are keyed by slot, and a
//! slot is always one higher than the icon number it represents: icon 1185
//! lives at slot 1186.
//!
//! The table is persisted as human-editable TOML, one `[[icon]]` record per
//! slot, written in ascending slot order so diffs stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::output::{write_atomic, OutputError};
use crate::resolver::FIRST_CUSTOM_SLOT;

/// Slot suggested for new entries when no preference is given.
pub const PREFERRED_START_SLOT: u32 = 1186;

/// Error type for table operations
#[derive(Debug, Error)]
pub enum TableError {
    /// The slot already has an entry; entries are never overwritten
    #[error("Slot {slot} is already used by '{label}'")]
    SlotConflict { slot: u32, label: String },
    /// The table file lists the same slot twice
    #[error("Slot {0} appears more than once in the icon table")]
    DuplicateSlot(u32),
    #[error("Failed to read icon table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse icon table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize icon table: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write icon table: {0}")]
    Write(#[from] OutputError),
}

/// One custom icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomIconEntry {
    /// Table key, `icon_number + 1`
    #[serde(rename = "slot")]
    pub slot_key: u32,
    /// Asset id of the normal sprite
    pub normal: String,
    /// Asset id of the shiny sprite, if one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shiny: Option<String>,
    /// Human-readable name
    #[serde(default)]
    pub label: String,
}

impl CustomIconEntry {
    pub fn new(slot_key: u32, normal: impl Into<String>, label: impl Into<String>) -> Self {
        Self { slot_key, normal: normal.into(), shiny: None, label: label.into() }
    }

    pub fn with_shiny(mut self, shiny: impl Into<String>) -> Self {
        self.shiny = Some(shiny.into());
        self
    }

    /// The icon number this entry serves.
    pub fn icon_number(&self) -> i64 {
        self.slot_key as i64 - 1
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    #[serde(default, rename = "icon")]
    icons: Vec<CustomIconEntry>,
}

/// Slot-keyed table of custom icons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomIconTable {
    entries: BTreeMap<u32, CustomIconEntry>,
}

impl CustomIconTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: u32) -> Option<&CustomIconEntry> {
        self.entries.get(&slot)
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.entries.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomIconEntry> {
        self.entries.values()
    }

    /// Insert a new entry. Fails with [`TableError::SlotConflict`] if the
    /// slot is taken.
    pub fn put(&mut self, entry: CustomIconEntry) -> Result<(), TableError> {
        if let Some(existing) = self.entries.get(&entry.slot_key) {
            return Err(TableError::SlotConflict {
                slot: entry.slot_key,
                label: existing.label.clone(),
            });
        }
        if entry.slot_key < FIRST_CUSTOM_SLOT {
            warn!(
                slot = entry.slot_key,
                "slot is below the conventional first custom slot {}", FIRST_CUSTOM_SLOT
            );
        }
        debug!(slot = entry.slot_key, label = %entry.label, "adding custom icon");
        self.entries.insert(entry.slot_key, entry);
        Ok(())
    }

    /// Free slots in `start..=end`, ascending.
    pub fn list_gaps(&self, start: u32, end: u32) -> Vec<u32> {
        if start > end {
            return Vec::new();
        }
        (start..=end).filter(|slot| !self.entries.contains_key(slot)).collect()
    }

    /// Holes between consecutive used slots, as inclusive ranges.
    pub fn gap_ranges(&self) -> Vec<(u32, u32)> {
        let keys: Vec<u32> = self.entries.keys().copied().collect();
        keys.windows(2)
            .filter(|pair| pair[1] - pair[0] > 1)
            .map(|pair| (pair[0] + 1, pair[1] - 1))
            .collect()
    }

    /// Highest used slot, if any.
    pub fn highest_slot(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// One past the highest used slot, or the first custom slot when empty.
    /// `None` once the highest slot is `u32::MAX`.
    pub fn next_sequential_slot(&self) -> Option<u32> {
        match self.highest_slot() {
            Some(max) => max.checked_add(1),
            None => Some(FIRST_CUSTOM_SLOT),
        }
    }

    /// First unused slot at or after `preferred`, or `None` if every slot up
    /// to `u32::MAX` is taken.
    pub fn next_available_from(&self, preferred: u32) -> Option<u32> {
        (preferred..=u32::MAX).find(|slot| !self.entries.contains_key(slot))
    }

    /// Parse a table from its TOML form.
    ///
    /// An empty `shiny` string is read as "no shiny asset".
    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(text)?;
        let mut entries = BTreeMap::new();
        for mut entry in file.icons {
            if entry.shiny.as_deref().is_some_and(str::is_empty) {
                entry.shiny = None;
            }
            let slot = entry.slot_key;
            if entries.insert(slot, entry).is_some() {
                return Err(TableError::DuplicateSlot(slot));
            }
        }
        Ok(Self { entries })
    }

    /// Render the table as TOML in ascending slot order.
    pub fn to_toml_string(&self) -> Result<String, TableError> {
        let file = TableFile { icons: self.entries.values().cloned().collect() };
        Ok(toml::to_string(&file)?)
    }

    /// Load a table file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load a table file, treating a missing file as an empty table.
    pub fn load_or_default(path: &Path) -> Result<Self, TableError> {
        if !path.exists() {
            debug!(path = %path.display(), "icon table not found, starting empty");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Save the whole table, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let text = self.to_toml_string()?;
        write_atomic(path, text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> CustomIconTable {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(1186, "111", "Celebi").with_shiny("112")).unwrap();
        table.put(CustomIconEntry::new(1187, "121", "Jirachi")).unwrap();
        table.put(CustomIconEntry::new(1190, "131", "Deoxys")).unwrap();
        table.put(CustomIconEntry::new(1195, "141", "Manaphy")).unwrap();
        table
    }

    #[test]
    fn test_put_and_get() {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(1186, "A", "Celebi").with_shiny("B")).unwrap();

        let entry = table.get(1186).unwrap();
        assert_eq!(entry.normal, "A");
        assert_eq!(entry.shiny.as_deref(), Some("B"));
        assert_eq!(entry.icon_number(), 1185);
        assert!(table.get(1185).is_none());
    }

    #[test]
    fn test_put_conflict_is_explicit() {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(1186, "A", "Celebi")).unwrap();

        let result = table.put(CustomIconEntry::new(1186, "C", "Other"));
        assert!(matches!(
            result,
            Err(TableError::SlotConflict { slot: 1186, ref label }) if label == "Celebi"
        ));
        assert_eq!(table.get(1186).unwrap().normal, "A");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_put_below_convention_is_allowed() {
        let mut table = CustomIconTable::new();
        assert!(table.put(CustomIconEntry::new(10, "A", "Early")).is_ok());
        assert!(table.contains(10));
    }

    #[test]
    fn test_list_gaps() {
        let table = sample_table();
        assert_eq!(table.list_gaps(1185, 1192), vec![1185, 1188, 1189, 1191, 1192]);
        assert_eq!(table.list_gaps(1186, 1187), Vec::<u32>::new());
        assert_eq!(table.list_gaps(1200, 1190), Vec::<u32>::new());
    }

    #[test]
    fn test_gap_ranges() {
        let table = sample_table();
        assert_eq!(table.gap_ranges(), vec![(1188, 1189), (1191, 1194)]);
        assert!(CustomIconTable::new().gap_ranges().is_empty());
    }

    #[test]
    fn test_next_sequential_slot() {
        assert_eq!(CustomIconTable::new().next_sequential_slot(), Some(FIRST_CUSTOM_SLOT));
        assert_eq!(sample_table().next_sequential_slot(), Some(1196));
    }

    #[test]
    fn test_next_available_from() {
        let table = sample_table();
        assert_eq!(table.next_available_from(PREFERRED_START_SLOT), Some(1188));
        assert_eq!(table.next_available_from(1190), Some(1191));
        assert_eq!(table.next_available_from(2000), Some(2000));
    }

    #[test]
    fn test_highest_slot_does_not_overflow() {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(u32::MAX, "1", "Last")).unwrap();

        assert_eq!(table.highest_slot(), Some(u32::MAX));
        assert_eq!(table.next_sequential_slot(), None);
        assert_eq!(table.next_available_from(u32::MAX), None);
        assert_eq!(table.next_available_from(u32::MAX - 1), Some(u32::MAX - 1));
        assert_eq!(table.list_gaps(u32::MAX - 1, u32::MAX), vec![u32::MAX - 1]);
    }

    #[test]
    fn test_iter_is_sorted() {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(1300, "c", "C")).unwrap();
        table.put(CustomIconEntry::new(1200, "a", "A")).unwrap();
        table.put(CustomIconEntry::new(1250, "b", "B")).unwrap();

        let slots: Vec<u32> = table.iter().map(|e| e.slot_key).collect();
        assert_eq!(slots, vec![1200, 1250, 1300]);
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
[[icon]]
slot = 1190
normal = "131"
shiny = ""
label = "Deoxys"

[[icon]]
slot = 1186
normal = "111"
shiny = "112"
label = "Celebi"
"#;
        let table = CustomIconTable::from_toml_str(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1186).unwrap().shiny.as_deref(), Some("112"));
        assert_eq!(table.get(1190).unwrap().shiny, None);
    }

    #[test]
    fn test_parse_empty_file() {
        let table = CustomIconTable::from_toml_str("").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_duplicate_slot() {
        let text = r#"
[[icon]]
slot = 1186
normal = "1"

[[icon]]
slot = 1186
normal = "2"
"#;
        let result = CustomIconTable::from_toml_str(text);
        assert!(matches!(result, Err(TableError::DuplicateSlot(1186))));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = CustomIconTable::from_toml_str("[[icon]\nslot = ");
        assert!(matches!(result, Err(TableError::Parse(_))));
    }

    #[test]
    fn test_serialized_order_is_stable() {
        let mut table = CustomIconTable::new();
        table.put(CustomIconEntry::new(1300, "c", "C")).unwrap();
        table.put(CustomIconEntry::new(1200, "a", "A").with_shiny("s")).unwrap();

        let text = table.to_toml_string().unwrap();
        let first = text.find("slot = 1200").unwrap();
        let second = text.find("slot = 1300").unwrap();
        assert!(first < second);
        assert_eq!(text.matches("shiny").count(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom_icons.toml");

        let table = sample_table();
        table.save(&path).unwrap();

        let loaded = CustomIconTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let table = CustomIconTable::load_or_default(&temp.path().join("missing.toml")).unwrap();
        assert!(table.is_empty());

        let result = CustomIconTable::load(&temp.path().join("missing.toml"));
        assert!(matches!(result, Err(TableError::Io(_))));
    }
}
