/// Media type detection for single filesystem entries.
///
/// Classification inspects one path and produces an [`Entry`] snapshot: whether
/// it is a directory, the primary MIME type reported by the sniffing oracle,
/// and a normalized extension derived from the MIME subtype. Entries are
/// immutable snapshots and go stale as soon as anything is renamed, so batch
/// operations always classify first, then plan, then execute.
use crate::error::{RelameError, RelameResult};
use std::fs;
use std::path::{Path, PathBuf};

/// One classified filesystem path.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The path as it was found.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Primary MIME type from the oracle ("image", "video", ...).
    /// Empty for directories and for files the oracle cannot identify.
    pub media_type: String,
    /// Normalized extension including the leading dot, lowercased.
    /// Empty for directories and extensionless unidentified files.
    pub suffix: String,
}

impl Entry {
    /// The filename stem, lossily decoded. Empty when the path has none.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// The full filename, lossily decoded.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Content sniffing oracle returning a (primary type, subtype) pair.
///
/// Modeled as a trait so tests can classify without real file contents.
pub trait MimeOracle {
    /// Sniffs the file at `path`. `Ok(None)` means the content is not
    /// recognized as any known format.
    fn sniff(&self, path: &Path) -> RelameResult<Option<(String, String)>>;
}

/// Production oracle backed by the `infer` crate's magic-byte tables.
pub struct InferOracle;

impl MimeOracle for InferOracle {
    fn sniff(&self, path: &Path) -> RelameResult<Option<(String, String)>> {
        let kind = infer::get_from_path(path).map_err(|e| RelameError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(kind.and_then(|k| {
            k.mime_type()
                .split_once('/')
                .map(|(t, s)| (t.to_string(), s.to_string()))
        }))
    }
}

/// Classifies a single path into an [`Entry`].
///
/// Directories come back with an empty media type and suffix. Symlinks,
/// sockets, FIFOs, and device files are rejected as a usage error.
pub fn classify(path: &Path, oracle: &dyn MimeOracle) -> RelameResult<Entry> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelameError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelameError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let file_type = metadata.file_type();
    if file_type.is_dir() {
        return Ok(Entry {
            path: path.to_path_buf(),
            is_directory: true,
            media_type: String::new(),
            suffix: String::new(),
        });
    }
    if !file_type.is_file() {
        return Err(RelameError::InvalidEntryType {
            path: path.to_path_buf(),
        });
    }

    let (media_type, subtype) = oracle.sniff(path)?.unwrap_or_default();
    let suffix = normalized_suffix(&media_type, &subtype, path);

    Ok(Entry {
        path: path.to_path_buf(),
        is_directory: false,
        media_type,
        suffix,
    })
}

/// Maps a sniffed (type, subtype) pair to a canonical extension.
///
/// Unmatched subtypes keep the file's existing extension, lowercased.
fn normalized_suffix(media_type: &str, subtype: &str, path: &Path) -> String {
    let mapped = if subtype.contains("jpeg") {
        Some(".jpg")
    } else if subtype.contains("png") {
        Some(".png")
    } else if subtype.contains("bmp") {
        Some(".bmp")
    } else if subtype.contains("webp") {
        Some(".webp")
    } else if subtype.contains("svg+xml") {
        Some(".svg")
    } else if subtype.contains("tiff") {
        Some(".tif")
    } else if media_type == "video" && subtype.contains("mp4") {
        Some(".mp4")
    } else if subtype.contains("x-matroska") {
        Some(".mkv")
    } else if subtype.contains("quicktime") {
        Some(".mov")
    } else if subtype.contains("x-msvideo") {
        Some(".avi")
    } else if subtype.contains("x-ms-wmv") {
        Some(".wmv")
    } else if subtype.contains("webm") {
        Some(".webm")
    } else if subtype.contains("mpeg") {
        Some(".mpeg")
    } else if media_type == "audio" && subtype.contains("mpeg") {
        // Never reached: the unguarded "mpeg" arm above claims audio/mpeg
        // too, so MP3s keep coming out as ".mpeg". Fixing the precedence
        // would change names on disk for existing collections, so the
        // historical order stays. Pinned by a test below.
        Some(".mp3")
    } else if subtype.contains("wav") {
        Some(".wav")
    } else if subtype.contains("aac") {
        Some(".aac")
    } else if subtype.contains("flac") {
        Some(".flac")
    } else if subtype.contains("ogg") {
        Some(".ogg")
    } else if media_type == "audio" && subtype.contains("mp4") {
        Some(".m4a")
    } else if subtype.contains("x-ms-wma") {
        Some(".wma")
    } else if subtype.contains("gif") {
        Some(".gif")
    } else if subtype.contains("pdf") {
        Some(".pdf")
    } else if subtype.contains("photoshop") {
        Some(".psd")
    } else {
        None
    };

    match mapped {
        Some(suffix) => suffix.to_string(),
        None => path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default(),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeOracle;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn suffix_for(media_type: &str, subtype: &str, name: &str) -> String {
        normalized_suffix(media_type, subtype, Path::new(name))
    }

    #[test]
    fn test_image_suffixes() {
        assert_eq!(suffix_for("image", "jpeg", "x"), ".jpg");
        assert_eq!(suffix_for("image", "png", "x"), ".png");
        assert_eq!(suffix_for("image", "svg+xml", "x"), ".svg");
        assert_eq!(suffix_for("image", "tiff", "x"), ".tif");
        assert_eq!(suffix_for("image", "webp", "x"), ".webp");
    }

    #[test]
    fn test_video_suffixes() {
        assert_eq!(suffix_for("video", "mp4", "x"), ".mp4");
        assert_eq!(suffix_for("video", "x-matroska", "x"), ".mkv");
        assert_eq!(suffix_for("video", "quicktime", "x"), ".mov");
        assert_eq!(suffix_for("video", "x-msvideo", "x"), ".avi");
        assert_eq!(suffix_for("video", "x-ms-wmv", "x"), ".wmv");
        assert_eq!(suffix_for("video", "mpeg", "x"), ".mpeg");
    }

    #[test]
    fn test_audio_suffixes() {
        assert_eq!(suffix_for("audio", "wav", "x"), ".wav");
        assert_eq!(suffix_for("audio", "x-wav", "x"), ".wav");
        assert_eq!(suffix_for("audio", "flac", "x"), ".flac");
        assert_eq!(suffix_for("audio", "ogg", "x"), ".ogg");
        assert_eq!(suffix_for("audio", "mp4", "x"), ".m4a");
        assert_eq!(suffix_for("audio", "x-ms-wma", "x"), ".wma");
    }

    #[test]
    fn test_audio_mpeg_still_maps_to_mpeg_extension() {
        // The ".mp3" arm is shadowed by the unguarded "mpeg" check. This
        // test pins the historical behavior; change it deliberately or not
        // at all.
        assert_eq!(suffix_for("audio", "mpeg", "song"), ".mpeg");
    }

    #[test]
    fn test_document_suffixes() {
        assert_eq!(suffix_for("image", "gif", "x"), ".gif");
        assert_eq!(suffix_for("application", "pdf", "x"), ".pdf");
        assert_eq!(suffix_for("image", "vnd.adobe.photoshop", "x"), ".psd");
    }

    #[test]
    fn test_unmatched_subtype_keeps_existing_extension() {
        assert_eq!(suffix_for("application", "zip", "archive.ZIP"), ".zip");
        assert_eq!(suffix_for("", "", "notes.TXT"), ".txt");
        assert_eq!(suffix_for("", "", "README"), "");
    }

    #[test]
    fn test_classify_directory() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let entry =
            classify(temp.path(), &FakeOracle::new(&[])).expect("Failed to classify directory");
        assert!(entry.is_directory);
        assert!(entry.media_type.is_empty());
        assert!(entry.suffix.is_empty());
    }

    #[test]
    fn test_classify_regular_file() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("photo.jpeg");
        fs::write(&path, b"data").expect("Failed to write file");

        let oracle = FakeOracle::new(&[("photo.jpeg", "image", "jpeg")]);
        let entry = classify(&path, &oracle).expect("Failed to classify file");
        assert!(!entry.is_directory);
        assert_eq!(entry.media_type, "image");
        assert_eq!(entry.suffix, ".jpg");
        assert_eq!(entry.stem(), "photo");
    }

    #[test]
    fn test_classify_missing_path() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let result = classify(&temp.path().join("gone"), &FakeOracle::new(&[]));
        assert!(matches!(result, Err(RelameError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_rejects_symlink() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("target.txt");
        fs::write(&target, b"data").expect("Failed to write file");
        let link = temp.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).expect("Failed to create symlink");

        let result = classify(&link, &FakeOracle::new(&[]));
        assert!(matches!(result, Err(RelameError::InvalidEntryType { .. })));
    }
}
