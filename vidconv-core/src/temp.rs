use std::path::{Path, PathBuf};

/// A uniquely named file path in a temp directory, removed when dropped.
///
/// Only the path is reserved; the encoder creates the file itself.
#[derive(Debug)]
pub struct TempOutput {
    path: PathBuf,
}

impl TempOutput {
    pub fn new(dir: impl AsRef<Path>, extension: &str) -> Self {
        let name = format!("vidconv-{}.{}", uuid::Uuid::new_v4(), extension);
        Self {
            path: dir.as_ref().join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            log::warn!("Failed to remove temporary file {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let dir = std::env::temp_dir();
        let path = {
            let temp = TempOutput::new(&dir, "mp4");
            std::fs::write(temp.path(), b"frames").unwrap();
            assert!(temp.path().exists());
            temp.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn unique_names_with_extension() {
        let dir = std::env::temp_dir();
        let a = TempOutput::new(&dir, "mpeg-1");
        let b = TempOutput::new(&dir, "mpeg-1");
        assert_ne!(a.path(), b.path());
        assert!(a.path().to_string_lossy().ends_with(".mpeg-1"));
        assert_eq!(a.path().parent(), Some(dir.as_path()));
    }

    #[test]
    fn drop_without_file_is_quiet() {
        let temp = TempOutput::new(std::env::temp_dir(), "webm");
        assert!(!temp.path().exists());
        drop(temp);
    }
}
