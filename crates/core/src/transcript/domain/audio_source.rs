use std::path::{Path, PathBuf};

/// An input audio file and the identifier its artifacts are keyed by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioSource {
    path: PathBuf,
    stem: String,
}

impl AudioSource {
    /// Returns `None` for paths without a usable UTF-8 file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            stem: stem.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension, e.g. `talk` for `audio/talk.wav`.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// File name for log messages, e.g. `talk.wav`.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.clone())
    }
}
