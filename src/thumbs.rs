/// Thumbnail cache for gallery rendering
///
/// Full-size photos are too heavy to decode on every frame, so gallery
/// cards render a 256px JPEG generated once in a background task and
/// cached on disk under the image's database id.

use image::imageops::FilterType;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;

/// Size of generated thumbnails (longest edge)
const THUMBNAIL_SIZE: u32 = 256;

/// Get the thumbnail cache directory
/// Returns ~/.cache/waymark/thumbnails on Linux
fn cache_dir() -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .expect("Could not determine cache directory");

    path.push("waymark");
    path.push("thumbnails");
    path
}

/// Ensure a thumbnail exists for an image, generating it if needed.
///
/// Decoding and resizing are CPU-heavy, so the work runs on the blocking
/// thread pool. Returns the cached thumbnail path.
pub async fn ensure_thumbnail(image_id: i64, source: PathBuf) -> Result<PathBuf, String> {
    task::spawn_blocking(move || ensure_thumbnail_in(&cache_dir(), image_id, &source))
        .await
        .map_err(|e| format!("thumbnail task failed: {e}"))?
}

/// Drop the cached thumbnail for a removed image. Best-effort: a missing
/// file is fine, anything else is only worth a log line.
pub fn remove_thumbnail(image_id: i64) {
    remove_thumbnail_in(&cache_dir(), image_id);
}

fn thumbnail_file(cache_dir: &Path, image_id: i64) -> PathBuf {
    cache_dir.join(format!("{image_id}.jpg"))
}

fn ensure_thumbnail_in(cache_dir: &Path, image_id: i64, source: &Path) -> Result<PathBuf, String> {
    let path = thumbnail_file(cache_dir, image_id);
    if path.exists() {
        return Ok(path);
    }

    fs::create_dir_all(cache_dir)
        .map_err(|e| format!("could not create {}: {e}", cache_dir.display()))?;

    let img = image::open(source)
        .map_err(|e| format!("could not decode {}: {e}", source.display()))?;

    let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    thumbnail
        .save(&path)
        .map_err(|e| format!("could not save {}: {e}", path.display()))?;

    log::debug!("generated thumbnail {}", path.display());

    Ok(path)
}

fn remove_thumbnail_in(cache_dir: &Path, image_id: i64) {
    let path = thumbnail_file(cache_dir, image_id);
    if let Err(e) = fs::remove_file(&path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("could not remove thumbnail {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample_png(dir: &Path) -> PathBuf {
        let source = dir.join("source.png");
        let img = image::RgbImage::from_pixel(640, 480, image::Rgb([120, 180, 90]));
        img.save(&source).expect("save sample image");
        source
    }

    #[test]
    fn generates_a_bounded_jpeg() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cache = dir.path().join("thumbs");
        let source = write_sample_png(dir.path());

        let path = ensure_thumbnail_in(&cache, 7, &source).expect("generate");
        assert_eq!(path, cache.join("7.jpg"));

        let thumb = image::open(&path).expect("reopen thumbnail");
        assert!(thumb.width() <= THUMBNAIL_SIZE);
        assert!(thumb.height() <= THUMBNAIL_SIZE);
    }

    #[test]
    fn existing_thumbnail_is_reused() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cache = dir.path().join("thumbs");
        let source = write_sample_png(dir.path());

        let first = ensure_thumbnail_in(&cache, 3, &source).expect("generate");
        // Second call must not care that the source is gone
        fs::remove_file(&source).expect("remove source");
        let second = ensure_thumbnail_in(&cache, 3, &source).expect("reuse");

        assert_eq!(first, second);
        assert!(second.exists());
    }

    #[test]
    fn undecodable_source_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cache = dir.path().join("thumbs");
        let source = dir.path().join("bogus.jpg");
        fs::write(&source, b"not an image").expect("write file");

        assert!(ensure_thumbnail_in(&cache, 9, &source).is_err());
    }

    #[test]
    fn removing_a_missing_thumbnail_is_quiet() {
        let dir = tempfile::tempdir().expect("create temp dir");
        remove_thumbnail_in(dir.path(), 42);
    }

    #[test]
    fn remove_deletes_the_cached_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cache = dir.path().join("thumbs");
        let source = write_sample_png(dir.path());

        let path = ensure_thumbnail_in(&cache, 5, &source).expect("generate");
        assert!(path.exists());

        remove_thumbnail_in(&cache, 5);
        assert!(!path.exists());
    }
}
