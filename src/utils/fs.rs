use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use crate::core::{Artifact, SourceFile};
use crate::utils::{ConverterError, ConverterResult, validate_input_path};

/// Reads an input image into a [`SourceFile`] named after the path's file name
pub async fn read_source(path: impl AsRef<Path>) -> ConverterResult<SourceFile> {
    let path = path.as_ref();
    validate_input_path(path)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ConverterError::validation(format!("No file name: {}", path.display())))?;

    let bytes = fs::read(path)
        .await
        .map_err(|e| ConverterError::io(format!("Failed to read {}: {e}", path.display())))?;

    Ok(SourceFile {
        name,
        bytes: Arc::from(bytes),
    })
}

/// Writes a converted artifact into `dir` under its derived file name
pub async fn write_artifact(dir: impl AsRef<Path>, artifact: &Artifact) -> ConverterResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;
    fs::write(dir.join(&artifact.file_name), &artifact.bytes)
        .await
        .map_err(|e| ConverterError::io(format!("Failed to write {}: {e}", artifact.file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_source_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.jpg");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let source = read_source(&path).await.unwrap();
        assert_eq!(source.name, "holiday.jpg");
        assert_eq!(&*source.bytes, &[1, 2, 3]);
    }

    #[tokio::test]
    async fn writes_artifact_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let artifact = Artifact {
            file_name: "holiday.webp".to_string(),
            bytes: vec![9, 9],
            width: 1,
            height: 1,
        };

        write_artifact(&out, &artifact).await.unwrap();
        assert_eq!(std::fs::read(out.join("holiday.webp")).unwrap(), vec![9, 9]);
    }
}
