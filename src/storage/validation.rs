//! File name validation
//!
//! Every client-supplied file name passes through [`sanitize_filename`] before
//! it is joined to the storage root.

use std::fmt;
use std::path::Path;

use crate::error::StorageError;

const SEPARATORS: [char; 2] = ['/', '\\'];

/// A single path segment that is safe to join to the storage root.
///
/// Never empty, never `.` or `..`, and never contains `/` or `\`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeName(String);

impl SafeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for SafeName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Reduce a client-supplied name to its final path segment.
///
/// Directory components separated by either slash flavour and a leading drive
/// letter are discarded. Fails when nothing usable is left.
///
/// The drive check is purely lexical, so a Unix name such as `a:b.txt` loses
/// its `a:` prefix and is stored as `b.txt`.
pub fn sanitize_filename(raw: &str) -> Result<SafeName, StorageError> {
    let trimmed = strip_drive(raw).trim_end_matches(SEPARATORS);
    let segment = trimmed.rsplit(SEPARATORS).next().unwrap_or_default();

    match segment {
        "" | "." | ".." => Err(StorageError::InvalidName(raw.to_string())),
        name => Ok(SafeName(name.to_string())),
    }
}

/// Drop a `C:` style volume prefix
fn strip_drive(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &raw[2..]
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Component, PathBuf};

    fn sanitized(raw: &str) -> String {
        sanitize_filename(raw).unwrap().into_string()
    }

    #[test]
    fn test_plain_name_is_unchanged() {
        assert_eq!(sanitized("report.pdf"), "report.pdf");
        assert_eq!(sanitized("my file (1).txt"), "my file (1).txt");
        assert_eq!(sanitized(".hidden"), ".hidden");
        assert_eq!(sanitized("..data"), "..data");
    }

    #[test]
    fn test_directory_components_are_discarded() {
        assert_eq!(sanitized("../../etc/passwd"), "passwd");
        assert_eq!(sanitized("/etc/passwd"), "passwd");
        assert_eq!(sanitized("..\\..\\windows\\win.ini"), "win.ini");
        assert_eq!(sanitized("a/b\\c.txt"), "c.txt");
        assert_eq!(sanitized("docs/"), "docs");
    }

    #[test]
    fn test_drive_prefix_is_discarded() {
        assert_eq!(sanitized("C:\\Users\\me\\notes.txt"), "notes.txt");
        assert_eq!(sanitized("d:notes.txt"), "notes.txt");
    }

    #[test]
    fn test_drive_like_prefix_on_unix_name() {
        assert_eq!(sanitized("a:b.txt"), "b.txt");
        assert_eq!(sanitized("ab:c.txt"), "ab:c.txt");
    }

    #[test]
    fn test_rejects_dot_and_dot_dot() {
        assert!(matches!(
            sanitize_filename("."),
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(
            sanitize_filename(".."),
            Err(StorageError::InvalidName(_))
        ));
        assert!(sanitize_filename("foo/..").is_err());
        assert!(sanitize_filename("foo\\.\\").is_err());
    }

    #[test]
    fn test_rejects_empty_results() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("/").is_err());
        assert!(sanitize_filename("\\\\").is_err());
        assert!(sanitize_filename("C:").is_err());
        assert!(sanitize_filename("C:\\").is_err());
    }

    #[test]
    fn test_sanitized_names_stay_inside_root() {
        let root = PathBuf::from("/srv/uploads");
        let hostile = [
            "../secret",
            "../../../../etc/shadow",
            "/absolute/path.txt",
            "..\\..\\boot.ini",
            "uploads/../../x",
            "C:\\Windows\\System32\\drivers\\etc\\hosts",
            "./././a",
            "....//....//b",
        ];

        for raw in hostile {
            let Ok(name) = sanitize_filename(raw) else {
                continue;
            };
            let joined = root.join(&name);
            assert_eq!(joined.parent(), Some(root.as_path()), "{raw}");
            assert!(
                joined
                    .components()
                    .all(|c| !matches!(c, Component::ParentDir | Component::CurDir)),
                "{raw}"
            );
            assert!(!name.as_str().contains(SEPARATORS), "{raw}");
        }
    }
}
