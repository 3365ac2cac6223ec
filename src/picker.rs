/// Platform collaborators for attaching photos
///
/// Covers the photo-library access probe, the native image picker, and
/// the blocking alert shown when access is denied. Everything here runs
/// inside background tasks; the UI thread only sees the returned
/// [`PickOutcome`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Image file extensions offered by the picker
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tiff", "tif", "webp", "bmp"];

/// What came back from the add-image affordance.
///
/// Denial and cancellation are expected outcomes of the flow, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// The platform refused access to the photo library
    PermissionDenied,
    /// The user closed the picker without choosing anything
    Canceled,
    /// The chosen source file
    Picked(PathBuf),
}

/// Ask the user for a photo, guarding the picker behind the access probe.
///
/// On denial the blocking alert is shown here, so callers only have to
/// abort. The picker opens in `last_dir` when it still exists, otherwise
/// in the platform pictures directory.
pub async fn pick_image(last_dir: Option<PathBuf>) -> PickOutcome {
    let pictures_dir = dirs::picture_dir();

    if !photo_access_granted(pictures_dir.as_deref()) {
        log::warn!("photo library access denied");
        show_permission_alert().await;
        return PickOutcome::PermissionDenied;
    }

    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Choose a photo")
        .add_filter("Images", IMAGE_EXTENSIONS);

    let start_dir = last_dir.filter(|dir| dir.exists()).or(pictures_dir);
    if let Some(dir) = start_dir.filter(|dir| dir.exists()) {
        dialog = dialog.set_directory(&dir);
    }

    match dialog.pick_file().await {
        Some(handle) => PickOutcome::Picked(handle.path().to_path_buf()),
        None => PickOutcome::Canceled,
    }
}

/// Probe read access to the photo library directory.
///
/// Only an explicit permission error counts as denied; a missing
/// directory just means there is nothing to protect.
fn photo_access_granted(pictures_dir: Option<&Path>) -> bool {
    let Some(dir) = pictures_dir else {
        return true;
    };

    match fs::read_dir(dir) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::PermissionDenied,
    }
}

async fn show_permission_alert() {
    let _ = rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("Photo access needed")
        .set_description(
            "Waymark was not allowed to read your photo library. \
             Grant access and try again.",
        )
        .set_buttons(rfd::MessageButtons::Ok)
        .show()
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pictures_dir_counts_as_granted() {
        assert!(photo_access_granted(None));
    }

    #[test]
    fn readable_dir_counts_as_granted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(photo_access_granted(Some(dir.path())));
    }

    #[test]
    fn missing_dir_counts_as_granted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let gone = dir.path().join("never-created");
        assert!(photo_access_granted(Some(&gone)));
    }
}
