//! Path validation for storage keys.
//!
//! Every path handed to a backend is relative to that backend's root and must
//! stay inside it.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// `.` and empty components are dropped, `..` is resolved against the
/// components seen so far, and anything that would leave the storage root
/// (or resolves to nothing at all) is rejected.
///
/// > **Note:** This does **not** normalize backslashes or non-UTF8 bytes.
/// >           Null bytes are explicitly rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use kbase_storage::validate_path;
/// assert!(validate_path("handbook/onboarding.md").is_ok());
/// assert!(validate_path("handbook/../faq.md").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("/handbook//./drafts/../onboarding.md/").unwrap(),
///     Path::new("handbook/onboarding.md")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            // Store keys are always relative; a leading slash is tolerated.
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("handbook/onboarding.md").unwrap(), Path::new("handbook/onboarding.md"));
        assert_eq!(validate("a/b/c/notes.txt").unwrap(), Path::new("a/b/c/notes.txt"));
        assert_eq!(validate("readme.md").unwrap(), Path::new("readme.md"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(validate("a//b//c").unwrap(), Path::new("a/b/c"));
        assert_eq!(validate("a/./b/./c").unwrap(), Path::new("a/b/c"));
        assert_eq!(validate("/leading/slash.md").unwrap(), Path::new("leading/slash.md"));
        assert_eq!(validate("trailing/").unwrap(), Path::new("trailing"));
        assert_eq!(validate("a/b/..").unwrap(), Path::new("a"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate("../etc/passwd").is_err());
        assert!(validate("a/../../b").is_err());
        assert!(validate("..").is_err());
    }

    #[test]
    fn test_rejects_empty_and_null() {
        assert!(validate("").is_err());
        assert!(validate(".").is_err());
        assert!(validate("//").is_err());
        assert!(validate("a\0b").is_err());
    }
}
