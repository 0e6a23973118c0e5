use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::domain::artifact_store::{ArtifactKey, ArtifactStore, StoreError};

/// Stores artifacts as files in one directory, named by [`ArtifactKey`].
///
/// Files are written to a `<name>.part` sibling first and renamed into place.
pub struct DirectoryArtifactStore {
    dir: PathBuf,
}

impl DirectoryArtifactStore {
    /// Opens the store, creating `dir` if needed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::Write {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn write_file(&self, dest: PathBuf, contents: &str) -> Result<String, StoreError> {
        let mut temp_name = dest.clone().into_os_string();
        temp_name.push(".part");
        let temp_path = PathBuf::from(temp_name);

        let written = write_then_rename(&temp_path, &dest, contents);
        if written.is_err() {
            // Leave no stray partial file behind.
            let _ = fs::remove_file(&temp_path);
        }
        written?;
        Ok(dest.display().to_string())
    }
}

fn write_then_rename(temp_path: &Path, dest: &Path, contents: &str) -> Result<(), StoreError> {
    let mut file = fs::File::create(temp_path).map_err(write_error(temp_path))?;
    file.write_all(contents.as_bytes())
        .map_err(write_error(temp_path))?;
    file.flush().map_err(write_error(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_error(dest))
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Write { path, source }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn exists(&self, key: &ArtifactKey) -> Result<bool, StoreError> {
        self.path_for(key)
            .try_exists()
            .map_err(|e| StoreError::Check {
                key: key.to_string(),
                source: e,
            })
    }

    fn write(&self, key: &ArtifactKey, contents: &str) -> Result<String, StoreError> {
        self.write_file(self.path_for(key), contents)
    }

    fn write_text(&self, key: &ArtifactKey, contents: &str) -> Result<String, StoreError> {
        self.write_file(self.dir.join(key.text_file_name()), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::domain::mode::Mode;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("transcripts");
        let store = DirectoryArtifactStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_exists_after_write() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryArtifactStore::open(tmp.path()).unwrap();
        let key = ArtifactKey::new("talk", Mode::WithSpeakers);

        assert!(!store.exists(&key).unwrap());
        let location = store.write(&key, "[]").unwrap();
        assert!(store.exists(&key).unwrap());
        assert!(location.ends_with("talk_with_speakers.json"));
        assert_eq!(fs::read_to_string(store.path_for(&key)).unwrap(), "[]");
    }

    #[test]
    fn test_write_leaves_no_part_file() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryArtifactStore::open(tmp.path()).unwrap();
        store
            .write(&ArtifactKey::new("talk", Mode::Simple), "[]")
            .unwrap();
        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["talk_simple.json".to_string()]);
    }

    #[test]
    fn test_failed_rename_removes_part_file() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryArtifactStore::open(tmp.path()).unwrap();
        let key = ArtifactKey::new("talk", Mode::Simple);
        // A non-empty directory at the destination makes the rename fail.
        let blocker = store.path_for(&key);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = store.write(&key, "[]").unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!tmp.path().join("talk_simple.json.part").exists());
    }

    #[test]
    fn test_text_export_does_not_mark_completion() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryArtifactStore::open(tmp.path()).unwrap();
        let key = ArtifactKey::new("talk", Mode::WithSpeakers);
        store.write_text(&key, "[0:00:00 - 0:00:01] hi\n").unwrap();
        assert!(!store.exists(&key).unwrap());
        assert!(tmp.path().join("talk_with_speakers.txt").exists());
    }

    #[test]
    fn test_modes_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryArtifactStore::open(tmp.path()).unwrap();
        store
            .write(&ArtifactKey::new("talk", Mode::Simple), "[]")
            .unwrap();
        assert!(!store
            .exists(&ArtifactKey::new("talk", Mode::WithSpeakers))
            .unwrap());
    }
}
