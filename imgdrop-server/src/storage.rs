//! Storage location of the received artifact
//!
//! Every transfer overwrites one fixed, well-known file. Nothing from a
//! previous transfer is kept.

use std::io;
use std::path::{Path, PathBuf};

use imgdrop_common::ARTIFACT_FILE_NAME;
use tokio::fs::{File, OpenOptions};

use crate::constants::{DATA_DIR_NAME, ERR_CREATE_DATA_DIR, ERR_NO_DATA_DIR};

/// Get the default artifact path for the platform
///
/// - **Linux**: `~/.local/share/imgdropd/file_received.png`
/// - **macOS**: `~/Library/Application Support/imgdropd/file_received.png`
/// - **Windows**: `%APPDATA%\imgdropd\file_received.png`
///
/// # Errors
///
/// Returns an error if the platform's data directory cannot be determined.
#[must_use = "artifact path result should be used"]
pub fn default_artifact_path() -> Result<PathBuf, String> {
    let data_dir = dirs::data_dir().ok_or_else(|| ERR_NO_DATA_DIR.to_string())?;
    Ok(data_dir.join(DATA_DIR_NAME).join(ARTIFACT_FILE_NAME))
}

/// Create the directory that will hold the artifact
///
/// Uses `create_dir_all()`, so calling it repeatedly is harmless.
pub fn prepare_artifact_dir(artifact: &Path) -> Result<(), String> {
    let Some(parent) = artifact.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
        .map_err(|e| format!("{}{}: {}", ERR_CREATE_DATA_DIR, parent.display(), e))
}

/// Open the artifact for a new transfer, truncating any previous contents
pub async fn open_artifact(artifact: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(artifact)
        .await
}
