//! Input and output endpoints for the filter.
//!
//! Opens files (or stdin/stdout when no path is given) as boxed async
//! readers and writers so the pipe can drive either.

use crate::error::{IoError, Result};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

/// Boxed async input.
pub type Input = Box<dyn AsyncRead + Unpin + Send>;

/// Boxed async output.
pub type Output = Box<dyn AsyncWrite + Unpin + Send>;

/// Display name used in errors for a path, or the standard stream.
#[must_use]
pub fn endpoint_name(path: Option<&Path>, fallback: &str) -> String {
    path.map_or_else(|| fallback.to_string(), |p| p.to_string_lossy().to_string())
}

/// Opens `path` for reading, or stdin when `None`.
///
/// # Errors
///
/// Returns [`IoError::ReadFailed`] if the file cannot be opened.
pub async fn open_input(path: Option<&Path>) -> Result<Input> {
    let Some(path) = path else {
        return Ok(Box::new(tokio::io::stdin()));
    };
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| IoError::ReadFailed {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    Ok(Box::new(file))
}

/// Opens `path` for writing, or stdout when `None`.
///
/// Parent directories are created as needed. An existing file is truncated.
///
/// # Errors
///
/// Returns [`IoError::WriteFailed`] if the directory or file cannot be created.
pub async fn open_output(path: Option<&Path>) -> Result<Output> {
    let Some(path) = path else {
        return Ok(Box::new(tokio::io::stdout()));
    };
    let path_str = path.to_string_lossy().to_string();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| IoError::WriteFailed {
                path: parent.to_string_lossy().to_string(),
                kind: e.kind(),
                reason: e.to_string(),
            })?;
    }

    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| IoError::WriteFailed {
            path: path_str,
            kind: e.kind(),
            reason: e.to_string(),
        })?;
    Ok(Box::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_open_input_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("input.txt");
        std::fs::write(&file_path, "Hello, @name@!").unwrap();

        let mut input = open_input(Some(&file_path)).await.unwrap();
        let mut content = String::new();
        input.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "Hello, @name@!");
    }

    #[tokio::test]
    async fn test_open_input_missing_file() {
        let result = open_input(Some(Path::new("/nonexistent/path/input.txt"))).await;
        let Err(err) = result else {
            panic!("expected error");
        };
        assert!(err.to_string().contains("/nonexistent/path/input.txt"));
    }

    #[tokio::test]
    async fn test_open_output_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/dir/out.txt");

        let mut output = open_output(Some(&file_path)).await.unwrap();
        output.write_all(b"filtered").await.unwrap();
        output.shutdown().await.unwrap();
        drop(output);

        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "filtered");
    }

    #[test]
    fn test_endpoint_name() {
        assert_eq!(endpoint_name(None, "<stdin>"), "<stdin>");
        assert_eq!(endpoint_name(Some(Path::new("a/b.txt")), "<stdin>"), "a/b.txt");
    }
}
