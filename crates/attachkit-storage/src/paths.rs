//! Lexical path normalization and file-name checks.

use std::path::{Component, Path, PathBuf};

use attachkit_core::error::AppError;
use attachkit_core::result::AppResult;

/// Make `path` absolute (relative to the working directory) and collapse
/// `.`/`..` segments and duplicate separators without touching the
/// filesystem.
pub fn normalize(path: &Path) -> AppResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                AppError::with_source(
                    attachkit_core::error::ErrorKind::Configuration,
                    "Failed to resolve working directory",
                    e,
                )
            })?
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, as in `realpath`.
                out.pop();
            }
        }
    }
    Ok(out)
}

/// Render a directory path with a trailing separator.
pub fn display_dir(path: &Path) -> String {
    let mut rendered = path.display().to_string();
    if !rendered.ends_with(std::path::MAIN_SEPARATOR) {
        rendered.push(std::path::MAIN_SEPARATOR);
    }
    rendered
}

/// Whether `name` is a single plain file-name component that can be
/// joined onto a directory without escaping it.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_segments() {
        let path = normalize(Path::new("/files//avatar/./thumbs/../")).unwrap();
        assert_eq!(path, PathBuf::from("/files/avatar"));
    }

    #[test]
    fn test_normalize_does_not_escape_root() {
        let path = normalize(Path::new("/../../etc")).unwrap();
        assert_eq!(path, PathBuf::from("/etc"));
    }

    #[test]
    fn test_normalize_relative_is_absolute() {
        let path = normalize(Path::new("web/avatar")).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("web/avatar"));
    }

    #[test]
    fn test_display_dir_has_trailing_separator() {
        assert_eq!(display_dir(Path::new("/files/avatar")), "/files/avatar/");
        assert_eq!(display_dir(Path::new("/")), "/");
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("x.png"));
        assert!(is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("sub/x.png"));
        assert!(!is_plain_file_name("/abs.png"));
        assert!(!is_plain_file_name("..\\win.ini"));
    }
}
