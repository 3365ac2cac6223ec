/// Storage interface consumed by the UI layer
///
/// The screens never talk to SQLite directly; they hold an
/// `Arc<dyn MarkerStore>` so tests can substitute an in-memory double.

use super::data::{Marker, MarkerImage, MarkerSummary, NewImage, NewMarker};
use thiserror::Error;
use tokio::task;

/// Errors surfaced by storage operations.
///
/// Kept `Clone` because results travel inside UI messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A database or background-task failure, tagged with the operation
    /// that was running.
    #[error("storage failure during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
    /// A reload after a write found no row for the marker.
    #[error("marker {0} no longer exists")]
    MarkerMissing(i64),
}

impl StoreError {
    pub fn storage(operation: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Storage {
            operation,
            message: err.to_string(),
        }
    }

    /// The operation tag, used by toast bodies.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::Storage { operation, .. } => operation,
            StoreError::MarkerMissing(_) => "reload marker",
        }
    }
}

/// Marker and image CRUD used by the screens.
///
/// Methods are synchronous; callers wrap them in [`run_blocking`] so the
/// UI thread never waits on the database.
pub trait MarkerStore: Send + Sync {
    /// All markers with their gallery sizes, newest first.
    fn list_markers(&self) -> Result<Vec<MarkerSummary>, StoreError>;

    /// Inserts a marker and returns the stored row with its generated id.
    fn create_marker(&self, marker: NewMarker) -> Result<Marker, StoreError>;

    /// Unknown ids are `Ok(None)`, not an error.
    fn marker_by_id(&self, id: i64) -> Result<Option<Marker>, StoreError>;

    /// Persists every field of the marker, keyed by its id.
    fn update_marker(&self, marker: &Marker) -> Result<(), StoreError>;

    /// Removes the marker; its images go with it.
    fn delete_marker(&self, id: i64) -> Result<(), StoreError>;

    /// The marker's gallery in insertion order.
    fn images_for(&self, marker_id: i64) -> Result<Vec<MarkerImage>, StoreError>;

    /// Inserts an image and returns the stored row with its generated id.
    fn add_image(&self, image: NewImage) -> Result<MarkerImage, StoreError>;

    /// Deleting a row that is already gone, or an image that never got an
    /// id, is `Ok` and affects nothing.
    fn delete_image(&self, image: &MarkerImage) -> Result<(), StoreError>;
}

/// Run a storage closure on the blocking thread pool.
///
/// rusqlite's `Connection` is not `Send`, so implementations open their own
/// connection inside the closure rather than sharing one across threads.
pub async fn run_blocking<T, F>(operation: &'static str, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::storage(operation, format!("background task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_mentions_operation() {
        let err = StoreError::storage("save marker", "disk full");
        assert_eq!(err.operation(), "save marker");
        assert_eq!(
            err.to_string(),
            "storage failure during save marker: disk full"
        );
    }

    #[test]
    fn missing_marker_error_mentions_id() {
        let err = StoreError::MarkerMissing(17);
        assert_eq!(err.to_string(), "marker 17 no longer exists");
    }

    #[tokio::test]
    async fn run_blocking_passes_values_through() {
        let value = run_blocking("count", || Ok(41 + 1)).await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn run_blocking_passes_errors_through() {
        let result: Result<(), StoreError> =
            run_blocking("load marker", || Err(StoreError::storage("load marker", "boom"))).await;
        assert_eq!(result, Err(StoreError::storage("load marker", "boom")));
    }
}
