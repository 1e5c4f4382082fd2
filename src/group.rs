/// Partitioning of a directory's entries into typed buckets.
///
/// Each entry lands in exactly one bucket. Extension-exact kinds (gif, pdf,
/// psd) win over the generic MIME-category kinds, and images whose stem starts
/// with "cover" go to the cover bucket ahead of the image bucket.
use crate::classify::{Entry, MimeOracle, classify};
use crate::error::{RelameError, RelameResult};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Classification label for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Directory,
    Cover,
    Image,
    Video,
    Audio,
    Gif,
    Pdf,
    Psd,
    Unknown,
}

impl Kind {
    /// The subdirectory name used when reindexing this kind into its own
    /// directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Kind::Directory => "directories",
            Kind::Cover => "covers",
            Kind::Image => "image",
            Kind::Video => "video",
            Kind::Audio => "audio",
            Kind::Gif => "gif",
            Kind::Pdf => "pdf",
            Kind::Psd => "psd",
            Kind::Unknown => "others",
        }
    }

    /// Kinds that can be reindexed into a type subdirectory.
    pub const REINDEXABLE: [Kind; 7] = [
        Kind::Image,
        Kind::Video,
        Kind::Audio,
        Kind::Gif,
        Kind::Pdf,
        Kind::Psd,
        Kind::Unknown,
    ];
}

/// Ordered buckets of classified entries, one per [`Kind`].
#[derive(Debug, Default)]
pub struct Groups {
    buckets: BTreeMap<Kind, Vec<Entry>>,
}

impl Groups {
    /// The entries bucketed under `kind`, in discovery order.
    pub fn bucket(&self, kind: Kind) -> &[Entry] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns the bucket for `kind`.
    pub fn take(&mut self, kind: Kind) -> Vec<Entry> {
        self.buckets.remove(&kind).unwrap_or_default()
    }

    fn push(&mut self, kind: Kind, entry: Entry) {
        self.buckets.entry(kind).or_default().push(entry);
    }
}

/// Determines the single bucket an entry belongs to.
fn kind_of(entry: &Entry) -> Kind {
    if entry.is_directory {
        return Kind::Directory;
    }
    match entry.suffix.as_str() {
        ".gif" => return Kind::Gif,
        ".pdf" => return Kind::Pdf,
        ".psd" => return Kind::Psd,
        _ => {}
    }
    match entry.media_type.as_str() {
        "image" => {
            if entry.stem().trim().to_lowercase().starts_with("cover") {
                Kind::Cover
            } else {
                Kind::Image
            }
        }
        "video" => Kind::Video,
        "audio" => Kind::Audio,
        _ => Kind::Unknown,
    }
}

/// Classifies every entry under `base` into buckets.
///
/// With `recursive` set, the whole tree is walked; otherwise only the direct
/// children of `base` are listed. Entries are visited in name order so the
/// resulting buckets are deterministic.
pub fn collect(base: &Path, recursive: bool, oracle: &dyn MimeOracle) -> RelameResult<Groups> {
    if !base.exists() {
        return Err(RelameError::NotFound {
            path: base.to_path_buf(),
        });
    }
    if !base.is_dir() {
        return Err(RelameError::NotADirectory {
            path: base.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name();

    let mut groups = Groups::default();
    for item in walker {
        let item = item.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| base.to_path_buf());
            match e.into_io_error() {
                Some(source) => RelameError::Io { path, source },
                None => RelameError::NotFound { path },
            }
        })?;
        let entry = classify(item.path(), oracle)?;
        groups.push(kind_of(&entry), entry);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::testing::FakeOracle;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entry(name: &str, media_type: &str, suffix: &str) -> Entry {
        Entry {
            path: PathBuf::from(name),
            is_directory: false,
            media_type: media_type.to_string(),
            suffix: suffix.to_string(),
        }
    }

    #[test]
    fn test_kind_of_directory() {
        let e = Entry {
            path: PathBuf::from("album"),
            is_directory: true,
            media_type: String::new(),
            suffix: String::new(),
        };
        assert_eq!(kind_of(&e), Kind::Directory);
    }

    #[test]
    fn test_extension_exact_kinds_beat_mime_category() {
        // A gif is an image by MIME category but goes to the gif bucket.
        assert_eq!(kind_of(&entry("anim.gif", "image", ".gif")), Kind::Gif);
        assert_eq!(kind_of(&entry("doc.pdf", "application", ".pdf")), Kind::Pdf);
        assert_eq!(kind_of(&entry("art.psd", "image", ".psd")), Kind::Psd);
    }

    #[test]
    fn test_cover_beats_generic_image() {
        assert_eq!(kind_of(&entry("Cover.jpg", "image", ".jpg")), Kind::Cover);
        assert_eq!(
            kind_of(&entry("cover_back.png", "image", ".png")),
            Kind::Cover
        );
        assert_eq!(kind_of(&entry("page01.jpg", "image", ".jpg")), Kind::Image);
    }

    #[test]
    fn test_unrecognized_goes_to_unknown() {
        assert_eq!(kind_of(&entry("notes.txt", "", ".txt")), Kind::Unknown);
        assert_eq!(
            kind_of(&entry("archive.zip", "application", ".zip")),
            Kind::Unknown
        );
    }

    #[test]
    fn test_collect_single_level() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp.path().join("01.jpg"), b"a").expect("write");
        fs::write(temp.path().join("clip.mp4"), b"b").expect("write");
        fs::create_dir(temp.path().join("extras")).expect("mkdir");
        fs::write(temp.path().join("extras").join("02.jpg"), b"c").expect("write");

        let oracle = FakeOracle::new(&[
            ("01.jpg", "image", "jpeg"),
            ("02.jpg", "image", "jpeg"),
            ("clip.mp4", "video", "mp4"),
        ]);

        let groups = collect(temp.path(), false, &oracle).expect("Failed to collect");
        assert_eq!(groups.bucket(Kind::Image).len(), 1);
        assert_eq!(groups.bucket(Kind::Video).len(), 1);
        assert_eq!(groups.bucket(Kind::Directory).len(), 1);
    }

    #[test]
    fn test_collect_recursive() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp.path().join("extras")).expect("mkdir");
        fs::write(temp.path().join("01.jpg"), b"a").expect("write");
        fs::write(temp.path().join("extras").join("02.jpg"), b"c").expect("write");

        let oracle = FakeOracle::new(&[
            ("01.jpg", "image", "jpeg"),
            ("02.jpg", "image", "jpeg"),
        ]);

        let groups = collect(temp.path(), true, &oracle).expect("Failed to collect");
        assert_eq!(groups.bucket(Kind::Image).len(), 2);
    }

    #[test]
    fn test_collect_rejects_file_base() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let file = temp.path().join("plain.txt");
        fs::write(&file, b"x").expect("write");

        let result = collect(&file, false, &FakeOracle::new(&[]));
        assert!(matches!(result, Err(RelameError::NotADirectory { .. })));
    }
}
