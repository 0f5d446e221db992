use crate::error::Res;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Replace the file at `path` with `contents` without ever leaving it half written. The contents
/// go to a temporary file in the same directory, which is then renamed over `path`.
pub(crate) async fn replace(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .with_context(|| format!("{} does not name a file", path.display()))?;
    let tmp = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .with_context(|| format!("Unable to create {}", tmp.display()))?;
    file.write_all(contents.as_ref())
        .await
        .with_context(|| format!("Unable to write to {}", tmp.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("Unable to flush {}", tmp.display()))?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!("Unable to remove {}: {cleanup}", tmp.display());
        }
        return Err(e).with_context(|| format!("Unable to move {} into place", tmp.display()));
    }
    Ok(())
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Res<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub(crate) async fn deserialize<T>(path: &Path) -> Res<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Create a directory and its parents if they do not exist.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.display()))
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Res<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

pub(crate) async fn read_dir(path: impl AsRef<Path>) -> Res<tokio::fs::ReadDir> {
    let path = path.as_ref();
    tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.display()))
}

pub(crate) async fn remove(path: impl AsRef<Path>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove {}", path.display()))
}
