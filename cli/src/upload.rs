//! Reading user supplied images from disk.

use std::{fs, path::Path};

use color_eyre::{
    Result,
    eyre::{bail, ensure, eyre},
};
use engine::media::SourceImage;
use log::debug;

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Loads an image for upload. Rejects anything that is not a png, jpeg or
/// webp file, and anything larger than [`MAX_UPLOAD_BYTES`].
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let Some(mime_type) = mime_for_path(path) else {
        bail!(
            "{} is not a supported image, use png, jpeg or webp",
            path.display()
        );
    };

    let size = fs::metadata(path)
        .map_err(|e| eyre!("Couldn't read {}: {e}", path.display()))?
        .len();
    ensure!(
        size <= MAX_UPLOAD_BYTES,
        "{} is too large ({:.1}MB), the limit is 5MB",
        path.display(),
        size as f64 / (1024.0 * 1024.0)
    );

    let bytes = fs::read(path)?;
    debug!("Loaded {} ({size} bytes, {mime_type})", path.display());
    Ok(SourceImage::from_bytes(&bytes, mime_type))
}
