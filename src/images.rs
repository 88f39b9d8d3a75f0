use crate::api::ApiClient;
use crate::error::ClientError;
use image::GenericImageView;
use log::{debug, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub filename: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Downloads `filename` from the backend, checks that it decodes as an image,
/// and writes the original bytes into `dir`.
pub async fn download(
    api: &ApiClient,
    filename: &str,
    dir: &Path,
) -> Result<SavedImage, ClientError> {
    let data = api.image(filename).await?;
    debug!("Fetched {} ({} bytes)", filename, data.len());
    let (width, height) = image::load_from_memory(&data)
        .map_err(|e| ClientError::Image(filename.to_string(), e))?
        .dimensions();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(local_name(filename));
    tokio::fs::write(&path, &data).await?;
    info!("Saved {} ({}x{}) to {:?}", filename, width, height, path);
    Ok(SavedImage {
        filename: filename.to_string(),
        path,
        width,
        height,
    })
}

// Server filenames are only trusted for their final component.
fn local_name(filename: &str) -> String {
    match Path::new(filename).file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => format!("{:x}.jpeg", Uuid::new_v4().to_simple()),
    }
}
