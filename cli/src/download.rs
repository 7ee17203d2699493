//! Writing finished assets to disk.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::Result;
use engine::GeneratedAsset;

pub fn file_name(asset: &GeneratedAsset, unix_millis: u128) -> String {
    let prefix = match asset {
        GeneratedAsset::Image(_) => "mockup",
        GeneratedAsset::Video(_) => "promo",
    };
    format!("{prefix}-{unix_millis}.{}", asset.media().extension())
}

/// Saves `asset` into `dir`, creating it if needed, and returns the path.
pub fn save_asset(dir: &Path, asset: &GeneratedAsset) -> Result<PathBuf> {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(asset, millis));
    fs::write(&path, &asset.media().bytes)?;
    Ok(path)
}
