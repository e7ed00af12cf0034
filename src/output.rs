//! Writes the run's artifacts to disk.
//!
//! `save_*` never fail outward: errors are logged and reported as `false`.
//! Existing files are overwritten.

use crate::{Error, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub async fn save_text(content: &str, path: impl AsRef<Path>) -> bool {
    save_bytes(content.as_bytes(), path).await
}

pub async fn save_bytes(content: &[u8], path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match write_bytes(content, path).await {
        Ok(()) => {
            debug!("Wrote {} bytes to {}", content.len(), path.display());
            true
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// Creates or truncates `path` and writes `content`, flushing before the
/// handle is dropped.
pub async fn write_bytes(content: &[u8], path: &Path) -> Result<()> {
    let to_err = |e: std::io::Error| Error::persistence(format!("{}: {}", path.display(), e));

    let mut file = tokio::fs::File::create(path).await.map_err(to_err)?;
    file.write_all(content).await.map_err(to_err)?;
    file.flush().await.map_err(to_err)?;
    file.sync_all().await.map_err(to_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_save_text_writes_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.txt");

        assert!(save_text("Recipe Name: Küken Eintopf\n", &path).await);
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "Recipe Name: Küken Eintopf\n"
        );
    }

    #[tokio::test]
    async fn test_save_bytes_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");

        assert!(save_bytes(b"first-and-longer", &path).await);
        assert!(save_bytes(b"second", &path).await);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_missing_parent_directory_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/recipe.txt");

        assert!(!save_text("anything", &path).await);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_bytes_to_directory_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = write_bytes(b"x", dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
