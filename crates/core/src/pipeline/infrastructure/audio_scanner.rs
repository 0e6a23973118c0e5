use std::fs;
use std::path::Path;

use crate::shared::constants::AUDIO_EXTENSIONS;
use crate::transcript::domain::audio_source::AudioSource;

pub fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists eligible audio files directly inside `dir`, sorted by path.
pub fn scan(dir: &Path) -> std::io::Result<Vec<AudioSource>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_audio(&path) {
            continue;
        }
        match AudioSource::from_path(&path) {
            Some(source) => sources.push(source),
            None => log::warn!("Ignoring {}: file name is not valid UTF-8", path.display()),
        }
    }
    sources.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.mp3", "a.wav", "notes.txt", "c.FLAC", "d.m4a", "e.ogg"] {
            touch(tmp.path(), name);
        }
        fs::create_dir(tmp.path().join("sub.wav")).unwrap();

        let names: Vec<String> = scan(tmp.path())
            .unwrap()
            .iter()
            .map(|s| s.display_name())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.mp3", "c.FLAC", "d.m4a"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(&tmp.path().join("absent")).is_err());
    }

    #[test]
    fn test_is_audio_case_insensitive() {
        assert!(is_audio(Path::new("x.WAV")));
        assert!(!is_audio(Path::new("x")));
        assert!(!is_audio(Path::new("x.wav.txt")));
    }
}
