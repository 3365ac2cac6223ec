/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.

/// A user-created point of interest with text fields and a photo gallery
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Unique database ID, stable once assigned
    pub id: i64,
    /// User-editable title
    pub title: String,
    /// User-editable free-form description
    pub description: String,
    /// Reverse-geocoded address, derived elsewhere and never edited here
    pub address: String,
    /// Coordinates, if the marker was placed on a map
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Unix timestamp (seconds) assigned at insert
    pub created_at: i64,
}

/// A single photo attached to a marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerImage {
    /// Database ID; None until the row has been persisted
    pub id: Option<i64>,
    /// Owning marker; always equals the gallery's marker id
    pub marker_id: i64,
    /// Source locator, unique within a marker's gallery
    pub uri: String,
}

/// Insert payload for a new marker
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewMarker {
    pub title: String,
    pub description: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Insert payload for a new image row
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub marker_id: i64,
    pub uri: String,
}

/// A marker row joined with its gallery size, for the overview list
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSummary {
    pub marker: Marker,
    pub image_count: u32,
}
