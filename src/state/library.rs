use rusqlite::Connection;
use std::path::PathBuf;

use super::data::{Marker, MarkerImage, MarkerSummary, NewImage, NewMarker};
use super::store::{MarkerStore, StoreError};

/// SQLite-backed [`MarkerStore`].
///
/// Holds only the database path. rusqlite's `Connection` is not `Send`,
/// and every call runs on the blocking thread pool, so each operation
/// opens its own connection against the shared file.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the catalog at the default location and
    /// initialize its schema.
    ///
    /// The database file lives in the user's data directory:
    /// - Linux: ~/.local/share/waymark/waymark.db
    /// - macOS: ~/Library/Application Support/waymark/waymark.db
    /// - Windows: %APPDATA%\waymark\waymark.db
    pub fn new() -> Result<Self, StoreError> {
        Self::open_at(Self::default_db_path())
    }

    /// Open (or create) the catalog at an explicit path. Tests point this
    /// at a temp directory.
    pub fn open_at(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::storage("open database", e))?;
        }

        let store = SqliteStore { db_path };
        let conn = store.connect()?;
        store.init_schema(&conn)?;

        log::info!("database initialized at {}", store.db_path.display());

        Ok(store)
    }

    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("waymark");
        path.push("waymark.db");
        path
    }

    /// Open a connection to the catalog file.
    ///
    /// Foreign keys are off by default in SQLite and the pragma is
    /// per-connection, so it is set on every open.
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| StoreError::storage("open database", e))?;

        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|e| StoreError::storage("open database", e))?;

        Ok(conn)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&self, conn: &Connection) -> Result<(), StoreError> {
        let op = "initialize schema";

        // Markers table: one row per point of interest
        conn.execute(
            "CREATE TABLE IF NOT EXISTS markers (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                latitude        REAL,
                longitude       REAL,
                created_at      INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        // Images table: gallery rows, removed with their marker
        conn.execute(
            "CREATE TABLE IF NOT EXISTS images (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                marker_id       INTEGER NOT NULL,
                uri             TEXT NOT NULL,
                FOREIGN KEY(marker_id) REFERENCES markers(id) ON DELETE CASCADE
            )",
            [],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_images_marker_id
             ON images(marker_id)",
            [],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_markers_created_at
             ON markers(created_at DESC)",
            [],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        // Add address column if it doesn't exist (databases created before
        // reverse geocoding lack it). If the column exists, the ALTER is
        // silently ignored.
        let _ = conn.execute(
            "ALTER TABLE markers ADD COLUMN address TEXT NOT NULL DEFAULT ''",
            [],
        );

        Ok(())
    }
}

fn marker_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Marker> {
    Ok(Marker {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        address: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const MARKER_COLUMNS: &str =
    "id, title, description, COALESCE(address, ''), latitude, longitude, created_at";

impl MarkerStore for SqliteStore {
    fn list_markers(&self) -> Result<Vec<MarkerSummary>, StoreError> {
        let op = "list markers";
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT m.id, m.title, m.description, COALESCE(m.address, ''),
                        m.latitude, m.longitude, m.created_at, COUNT(i.id)
                 FROM markers m
                 LEFT JOIN images i ON i.marker_id = m.id
                 GROUP BY m.id
                 ORDER BY m.created_at DESC, m.id DESC",
            )
            .map_err(|e| StoreError::storage(op, e))?;

        let rows = stmt
            .query_map([], |row| {
                let marker = marker_from_row(row)?;
                let image_count: i64 = row.get(7)?;
                Ok(MarkerSummary {
                    marker,
                    image_count: image_count as u32,
                })
            })
            .map_err(|e| StoreError::storage(op, e))?;

        let mut summaries = Vec::new();
        for summary in rows {
            summaries.push(summary.map_err(|e| StoreError::storage(op, e))?);
        }

        Ok(summaries)
    }

    fn create_marker(&self, marker: NewMarker) -> Result<Marker, StoreError> {
        let op = "create marker";
        let conn = self.connect()?;
        let created_at = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO markers (title, description, address, latitude, longitude, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                marker.title,
                marker.description,
                marker.address,
                marker.latitude,
                marker.longitude,
                created_at,
            ],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        Ok(Marker {
            id: conn.last_insert_rowid(),
            title: marker.title,
            description: marker.description,
            address: marker.address,
            latitude: marker.latitude,
            longitude: marker.longitude,
            created_at,
        })
    }

    fn marker_by_id(&self, id: i64) -> Result<Option<Marker>, StoreError> {
        let op = "load marker";
        let conn = self.connect()?;

        let result = conn.query_row(
            &format!("SELECT {MARKER_COLUMNS} FROM markers WHERE id = ?1"),
            rusqlite::params![id],
            marker_from_row,
        );

        match result {
            Ok(marker) => Ok(Some(marker)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::storage(op, e)),
        }
    }

    fn update_marker(&self, marker: &Marker) -> Result<(), StoreError> {
        let op = "save marker";
        let conn = self.connect()?;

        conn.execute(
            "UPDATE markers
             SET title = ?1, description = ?2, address = ?3, latitude = ?4, longitude = ?5
             WHERE id = ?6",
            rusqlite::params![
                marker.title,
                marker.description,
                marker.address,
                marker.latitude,
                marker.longitude,
                marker.id,
            ],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        Ok(())
    }

    fn delete_marker(&self, id: i64) -> Result<(), StoreError> {
        let op = "delete marker";
        let conn = self.connect()?;

        // ON DELETE CASCADE removes the gallery rows with the marker
        conn.execute("DELETE FROM markers WHERE id = ?1", rusqlite::params![id])
            .map_err(|e| StoreError::storage(op, e))?;

        Ok(())
    }

    fn images_for(&self, marker_id: i64) -> Result<Vec<MarkerImage>, StoreError> {
        let op = "load images";
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare("SELECT id, marker_id, uri FROM images WHERE marker_id = ?1 ORDER BY id ASC")
            .map_err(|e| StoreError::storage(op, e))?;

        let rows = stmt
            .query_map(rusqlite::params![marker_id], |row| {
                Ok(MarkerImage {
                    id: Some(row.get(0)?),
                    marker_id: row.get(1)?,
                    uri: row.get(2)?,
                })
            })
            .map_err(|e| StoreError::storage(op, e))?;

        let mut images = Vec::new();
        for image in rows {
            images.push(image.map_err(|e| StoreError::storage(op, e))?);
        }

        Ok(images)
    }

    fn add_image(&self, image: NewImage) -> Result<MarkerImage, StoreError> {
        let op = "add image";
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO images (marker_id, uri) VALUES (?1, ?2)",
            rusqlite::params![image.marker_id, image.uri],
        )
        .map_err(|e| StoreError::storage(op, e))?;

        Ok(MarkerImage {
            id: Some(conn.last_insert_rowid()),
            marker_id: image.marker_id,
            uri: image.uri,
        })
    }

    fn delete_image(&self, image: &MarkerImage) -> Result<(), StoreError> {
        let op = "remove image";

        // An image that never got an id has no row to delete
        let Some(id) = image.id else {
            return Ok(());
        };

        let conn = self.connect()?;

        // Zero affected rows is fine; the row may already be gone
        conn.execute("DELETE FROM images WHERE id = ?1", rusqlite::params![id])
            .map_err(|e| StoreError::storage(op, e))?;

        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SqliteStore::open_at(dir.path().join("test.db")).expect("open store");
        (dir, store)
    }

    fn sample_marker(title: &str) -> NewMarker {
        NewMarker {
            title: title.to_string(),
            description: "somewhere worth remembering".to_string(),
            address: "1 Main St".to_string(),
            latitude: Some(59.93),
            longitude: Some(30.31),
        }
    }

    #[test]
    fn create_then_fetch_round_trips() {
        let (_dir, store) = test_store();

        let created = store.create_marker(sample_marker("Harbor")).expect("create");
        assert!(created.id > 0);
        assert!(created.created_at > 0);

        let fetched = store
            .marker_by_id(created.id)
            .expect("fetch")
            .expect("marker exists");
        assert_eq!(fetched, created);
    }

    #[test]
    fn unknown_marker_is_none_not_error() {
        let (_dir, store) = test_store();
        assert_eq!(store.marker_by_id(9999).expect("fetch"), None);
    }

    #[test]
    fn update_persists_edited_fields() {
        let (_dir, store) = test_store();
        let mut marker = store.create_marker(sample_marker("Old title")).expect("create");

        marker.title = "New title".to_string();
        marker.description = "rewritten".to_string();
        store.update_marker(&marker).expect("update");

        let fetched = store
            .marker_by_id(marker.id)
            .expect("fetch")
            .expect("marker exists");
        assert_eq!(fetched.title, "New title");
        assert_eq!(fetched.description, "rewritten");
        // Ride-along fields survive the save untouched
        assert_eq!(fetched.address, "1 Main St");
        assert_eq!(fetched.latitude, Some(59.93));
    }

    #[test]
    fn add_image_returns_generated_id_and_keeps_order() {
        let (_dir, store) = test_store();
        let marker = store.create_marker(sample_marker("Gallery")).expect("create");

        let first = store
            .add_image(NewImage {
                marker_id: marker.id,
                uri: "a.jpg".to_string(),
            })
            .expect("add a");
        let second = store
            .add_image(NewImage {
                marker_id: marker.id,
                uri: "b.jpg".to_string(),
            })
            .expect("add b");

        assert!(first.id.expect("id assigned") < second.id.expect("id assigned"));

        let images = store.images_for(marker.id).expect("load images");
        let uris: Vec<&str> = images.iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(uris, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn delete_image_is_quiet_about_missing_rows() {
        let (_dir, store) = test_store();
        let marker = store.create_marker(sample_marker("Gallery")).expect("create");
        let image = store
            .add_image(NewImage {
                marker_id: marker.id,
                uri: "a.jpg".to_string(),
            })
            .expect("add");

        store.delete_image(&image).expect("first delete");
        assert!(store.images_for(marker.id).expect("load").is_empty());

        // Second delete of the same row, and deleting a row that never
        // got an id, both succeed without touching anything
        store.delete_image(&image).expect("second delete");
        store
            .delete_image(&MarkerImage {
                id: None,
                marker_id: marker.id,
                uri: "phantom.jpg".to_string(),
            })
            .expect("id-less delete");
    }

    #[test]
    fn deleting_a_marker_cascades_to_its_images() {
        let (_dir, store) = test_store();
        let marker = store.create_marker(sample_marker("Doomed")).expect("create");
        for uri in ["a.jpg", "b.jpg"] {
            store
                .add_image(NewImage {
                    marker_id: marker.id,
                    uri: uri.to_string(),
                })
                .expect("add");
        }

        store.delete_marker(marker.id).expect("delete");

        assert_eq!(store.marker_by_id(marker.id).expect("fetch"), None);
        assert!(store.images_for(marker.id).expect("load").is_empty());
    }

    #[test]
    fn list_markers_is_newest_first_with_counts() {
        let (_dir, store) = test_store();
        let older = store.create_marker(sample_marker("Older")).expect("create");
        let newer = store.create_marker(sample_marker("Newer")).expect("create");

        store
            .add_image(NewImage {
                marker_id: older.id,
                uri: "a.jpg".to_string(),
            })
            .expect("add");

        let summaries = store.list_markers().expect("list");
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].marker.id, newer.id);
        assert_eq!(summaries[0].image_count, 0);
        assert_eq!(summaries[1].marker.id, older.id);
        assert_eq!(summaries[1].image_count, 1);
    }
}
