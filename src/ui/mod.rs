/// UI module
///
/// Screens, presentational components, and the shared look and feel:
/// - Marker overview screen (overview.rs)
/// - Marker detail screen with its merge rules (detail.rs)
/// - Stateless photo gallery (gallery.rs)
/// - Modal action sheet and overlay composition (action_sheet.rs)
/// - Toast notifications (toast.rs)
/// - Palette and widget styles (style.rs)

pub mod action_sheet;
pub mod detail;
pub mod gallery;
pub mod overview;
pub mod style;
pub mod toast;
