//! Text-file export: the document-export boundary made concrete.
//!
//! The only persistence in the system. Writes are atomic (temp file in the
//! same directory, then rename) so an interrupted run never leaves a
//! half-written result where the user's file should be.

use crate::error::Ink2TextError;
use std::path::Path;
use tracing::info;

/// Persist `text` as UTF-8 at `path`, creating parent directories as
/// needed.
pub async fn write_text(path: impl AsRef<Path>, text: &str) -> Result<(), Ink2TextError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Ink2TextError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, text)
        .await
        .map_err(|e| Ink2TextError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Ink2TextError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_utf8_and_cleans_up_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("hasil_rapi.txt");

        write_text(&out, "1. Halo dunia\n2. Selamat pagi").await.expect("write");

        let read = std::fs::read_to_string(&out).expect("read back");
        assert_eq!(read, "1. Halo dunia\n2. Selamat pagi");
        assert!(
            !dir.path().join("hasil_rapi.txt.tmp").exists(),
            "temp file must be renamed away"
        );
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("nested/deeper/out.txt");

        write_text(&out, "isi").await.expect("write");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "isi");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out.txt");
        std::fs::write(&out, "lama").unwrap();

        write_text(&out, "baru").await.expect("write");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "baru");
    }
}
