use std::path::{Path, PathBuf};

const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Makes a display name safe to use as a file or directory name.
///
/// Invalid characters become spaces, runs of whitespace collapse, and
/// trailing dots are stripped so the result is valid on common filesystems.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches('.');
    if trimmed.is_empty() {
        String::from("untitled")
    } else {
        trimmed.to_string()
    }
}

/// Destination for a song: `<root>/<album>/<title>.mp3`, deterministic for a
/// given album name and song title.
pub fn song_path(root: &Path, album: &str, title: &str) -> PathBuf {
    root.join(sanitize(album))
        .join(format!("{}.mp3", sanitize(title)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_separators_and_reserved_chars() {
        assert_eq!(sanitize("Psalm 103 / Bless the Lord"), "Psalm 103 Bless the Lord");
        assert_eq!(sanitize(r#"What "is" this: a\test?"#), "What is this a test");
    }

    #[test]
    fn sanitize_collapses_whitespace_and_trailing_dots() {
        assert_eq!(sanitize("  My   Song ... "), "My Song");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize("///"), "untitled");
        assert_eq!(sanitize(""), "untitled");
    }

    #[test]
    fn song_path_is_deterministic() {
        let root = Path::new("downloads");
        let a = song_path(root, "Great Vespers", "Opening Psalm");
        let b = song_path(root, "Great Vespers", "Opening Psalm");
        assert_eq!(a, b);
        assert_eq!(a, Path::new("downloads/Great Vespers/Opening Psalm.mp3"));
    }
}
