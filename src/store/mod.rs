//! Spreadsheet-style row store
//!
//! Persistence is a workbook of named sheets. Each sheet is a header row
//! plus string cells; rows cross the adapter boundary as objects keyed by
//! header name. Writes mutate the in-memory workbook and rewrite the backing
//! JSON file in place; there is no transaction log. Cross-call atomicity is
//! the [`crate::lock::RequestLock`]'s job, not the store's.

pub mod activities;
pub mod announcements;
pub mod checkins;
pub mod locations;
pub mod users;
pub mod venues;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models;

pub use activities::ActivitiesStore;
pub use announcements::AnnouncementsStore;
pub use checkins::CheckInsStore;
pub use locations::LocationsStore;
pub use users::UsersStore;
pub use venues::VenuesStore;

/// A sheet row as an object: header name to cell value, header-ordered.
pub type Row = IndexMap<String, String>;

/// One named sheet: a header row and its data rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn with_header(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Convert one data row into an object keyed by the header.
    fn row_object(&self, cells: &[String]) -> Row {
        self.header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), cells.get(i).cloned().unwrap_or_default()))
            .collect()
    }

    /// Convert an object back to header-ordered cells. Keys the header does
    /// not know are dropped; the header is the schema.
    fn object_cells(&self, row: &Row) -> Vec<String> {
        self.header
            .iter()
            .map(|name| row.get(name).cloned().unwrap_or_default())
            .collect()
    }

    fn position_of(&self, id_column: &str, id: &str) -> Option<usize> {
        let col = self.header.iter().position(|h| h == id_column)?;
        self.rows
            .iter()
            .position(|cells| cells.get(col).map(String::as_str) == Some(id))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Workbook {
    sheets: BTreeMap<String, Sheet>,
}

impl Workbook {
    /// Empty workbook carrying every sheet the application knows, with its
    /// schema header.
    fn with_default_sheets() -> Self {
        let mut sheets = BTreeMap::new();
        sheets.insert(
            locations::SHEET.to_string(),
            Sheet::with_header(models::location::COLUMNS),
        );
        sheets.insert(
            activities::SHEET.to_string(),
            Sheet::with_header(models::activity::COLUMNS),
        );
        sheets.insert(
            checkins::SHEET.to_string(),
            Sheet::with_header(models::checkin::COLUMNS),
        );
        sheets.insert(
            users::SHEET.to_string(),
            Sheet::with_header(models::user::COLUMNS),
        );
        sheets.insert(
            announcements::SHEET.to_string(),
            Sheet::with_header(models::announcement::COLUMNS),
        );
        sheets.insert(
            venues::SHEET.to_string(),
            Sheet::with_header(models::venue::COLUMNS),
        );
        Self { sheets }
    }
}

pub(crate) struct StoreInner {
    path: Option<PathBuf>,
    book: RwLock<Workbook>,
}

impl StoreInner {
    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Workbook>> {
        self.book
            .read()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Workbook>> {
        self.book
            .write()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    pub(crate) fn find_all(&self, sheet: &str) -> AppResult<Vec<Row>> {
        let book = self.read()?;
        let sheet = sheet_ref(&book, sheet)?;
        Ok(sheet.rows.iter().map(|cells| sheet.row_object(cells)).collect())
    }

    pub(crate) fn find_by_id(
        &self,
        sheet: &str,
        id_column: &str,
        id: &str,
    ) -> AppResult<Option<Row>> {
        let book = self.read()?;
        let sheet = sheet_ref(&book, sheet)?;
        Ok(sheet
            .position_of(id_column, id)
            .map(|pos| sheet.row_object(&sheet.rows[pos])))
    }

    pub(crate) fn append(&self, sheet_name: &str, row: &Row) -> AppResult<()> {
        let mut book = self.write()?;
        let sheet = sheet_mut(&mut book, sheet_name)?;
        let cells = sheet.object_cells(row);
        sheet.rows.push(cells);
        self.persist(&book)
    }

    /// Overwrite the matching row, merging with existing values for any
    /// column the patch does not carry.
    pub(crate) fn update_by_id(
        &self,
        sheet_name: &str,
        id_column: &str,
        id: &str,
        patch: &Row,
    ) -> AppResult<()> {
        let mut book = self.write()?;
        let sheet = sheet_mut(&mut book, sheet_name)?;
        let pos = sheet
            .position_of(id_column, id)
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", sheet_name, id)))?;

        let mut merged = sheet.row_object(&sheet.rows[pos]);
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        let cells = sheet.object_cells(&merged);
        sheet.rows[pos] = cells;
        self.persist(&book)
    }

    pub(crate) fn delete_by_id(&self, sheet_name: &str, id_column: &str, id: &str) -> AppResult<()> {
        let mut book = self.write()?;
        let sheet = sheet_mut(&mut book, sheet_name)?;
        let pos = sheet
            .position_of(id_column, id)
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", sheet_name, id)))?;
        sheet.rows.remove(pos);
        self.persist(&book)
    }

    /// Rewrite the backing file. Written to a sibling temp file first so a
    /// crash mid-write cannot truncate the workbook.
    fn persist(&self, book: &Workbook) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(book)
            .map_err(|e| AppError::Store(format!("serialize workbook: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| AppError::Store(format!("write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| AppError::Store(format!("rename {}: {}", tmp.display(), e)))?;
        Ok(())
    }
}

fn sheet_ref<'a>(book: &'a Workbook, name: &str) -> AppResult<&'a Sheet> {
    book.sheets
        .get(name)
        .ok_or_else(|| AppError::Store(format!("sheet '{}' not found", name)))
}

fn sheet_mut<'a>(book: &'a mut Workbook, name: &str) -> AppResult<&'a mut Sheet> {
    book.sheets
        .get_mut(name)
        .ok_or_else(|| AppError::Store(format!("sheet '{}' not found", name)))
}

/// Main row store holding the workbook and the typed per-sheet adapters
#[derive(Clone)]
pub struct RowStore {
    inner: Arc<StoreInner>,
    pub locations: LocationsStore,
    pub activities: ActivitiesStore,
    pub checkins: CheckInsStore,
    pub users: UsersStore,
    pub announcements: AnnouncementsStore,
    pub venues: VenuesStore,
}

impl RowStore {
    /// Open (or create) the workbook file at `path`.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let book = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Store(format!("read {}: {}", path.display(), e)))?;
            let mut book: Workbook = serde_json::from_str(&json)
                .map_err(|e| AppError::Store(format!("parse {}: {}", path.display(), e)))?;
            // Sheets added after the file was written get their schema here.
            for (name, sheet) in Workbook::with_default_sheets().sheets {
                book.sheets.entry(name).or_insert(sheet);
            }
            book
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Store(format!("create {}: {}", parent.display(), e)))?;
            }
            Workbook::with_default_sheets()
        };

        Ok(Self::from_inner(StoreInner {
            path: Some(path),
            book: RwLock::new(book),
        }))
    }

    /// Volatile store with the default schema; used by tests.
    pub fn in_memory() -> Self {
        Self::from_inner(StoreInner {
            path: None,
            book: RwLock::new(Workbook::with_default_sheets()),
        })
    }

    fn from_inner(inner: StoreInner) -> Self {
        let inner = Arc::new(inner);
        Self {
            locations: LocationsStore::new(inner.clone()),
            activities: ActivitiesStore::new(inner.clone()),
            checkins: CheckInsStore::new(inner.clone()),
            users: UsersStore::new(inner.clone()),
            announcements: AnnouncementsStore::new(inner.clone()),
            venues: VenuesStore::new(inner.clone()),
            inner,
        }
    }

    // Generic row operations, for callers working outside the typed adapters.

    pub fn find_all(&self, sheet: &str) -> AppResult<Vec<Row>> {
        self.inner.find_all(sheet)
    }

    pub fn find_by_id(&self, sheet: &str, id_column: &str, id: &str) -> AppResult<Option<Row>> {
        self.inner.find_by_id(sheet, id_column, id)
    }

    pub fn append(&self, sheet: &str, row: &Row) -> AppResult<()> {
        self.inner.append(sheet, row)
    }

    pub fn update_by_id(&self, sheet: &str, id_column: &str, id: &str, patch: &Row) -> AppResult<()> {
        self.inner.update_by_id(sheet, id_column, id, patch)
    }

    pub fn delete_by_id(&self, sheet: &str, id_column: &str, id: &str) -> AppResult<()> {
        self.inner.delete_by_id(sheet, id_column, id)
    }
}

// Cell parsing helpers shared by the model row mappings.

pub fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(|s| s.trim()).unwrap_or("")
}

pub fn cell_opt(row: &Row, key: &str) -> Option<String> {
    let value = cell(row, key);
    (!value.is_empty()).then(|| value.to_string())
}

pub fn cell_f64(row: &Row, key: &str) -> Option<f64> {
    cell(row, key).parse().ok()
}

pub fn cell_u32(row: &Row, key: &str) -> Option<u32> {
    cell(row, key).parse().ok()
}

pub fn cell_bool(row: &Row, key: &str) -> Option<bool> {
    match cell(row, key) {
        "1" | "true" | "TRUE" => Some(true),
        "0" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

pub fn cell_time(row: &Row, key: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(cell(row, key))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

static LAST_ID_MS: AtomicI64 = AtomicI64::new(0);

/// Prefix plus epoch-millisecond suffix, e.g. `CK-1719000000000`.
///
/// The millisecond value is bumped past the last one issued so two ids
/// minted within the same millisecond cannot collide in-process.
pub fn next_id(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let mut assigned = now;
    let _ = LAST_ID_MS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        assigned = now.max(last + 1);
        Some(assigned)
    });
    format!("{}-{}", prefix, assigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_append_and_find() {
        let store = RowStore::in_memory();
        store
            .append(venues::SHEET, &row(&[("id", "VEN-1"), ("name", "Hall A")]))
            .unwrap();

        let found = store.find_by_id(venues::SHEET, "id", "VEN-1").unwrap().unwrap();
        assert_eq!(cell(&found, "name"), "Hall A");
        // Columns the row did not carry come back as empty cells.
        assert_eq!(cell(&found, "description"), "");

        assert!(store.find_by_id(venues::SHEET, "id", "VEN-2").unwrap().is_none());
    }

    #[test]
    fn test_update_merges_unspecified_columns() {
        let store = RowStore::in_memory();
        store
            .append(
                venues::SHEET,
                &row(&[("id", "VEN-1"), ("name", "Hall A"), ("description", "ground floor")]),
            )
            .unwrap();

        store
            .update_by_id(venues::SHEET, "id", "VEN-1", &row(&[("name", "Hall B")]))
            .unwrap();

        let found = store.find_by_id(venues::SHEET, "id", "VEN-1").unwrap().unwrap();
        assert_eq!(cell(&found, "name"), "Hall B");
        assert_eq!(cell(&found, "description"), "ground floor");
    }

    #[test]
    fn test_missing_rows_and_sheets() {
        let store = RowStore::in_memory();
        let err = store
            .update_by_id(venues::SHEET, "id", "VEN-404", &row(&[("name", "x")]))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = store.delete_by_id(venues::SHEET, "id", "VEN-404").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = store.find_all("no-such-sheet").unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workbook.json");

        {
            let store = RowStore::open(&path).unwrap();
            store
                .append(venues::SHEET, &row(&[("id", "VEN-1"), ("name", "Hall A")]))
                .unwrap();
        }

        let reopened = RowStore::open(&path).unwrap();
        let found = reopened.find_by_id(venues::SHEET, "id", "VEN-1").unwrap().unwrap();
        assert_eq!(cell(&found, "name"), "Hall A");
    }

    #[test]
    fn test_next_id_never_collides() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(next_id("CK")));
        }
    }
}
