//! Sandboxed project root
//!
//! Every tool path is resolved against the root and rejected if it would
//! land outside it.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// The directory all generated files live under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    root: PathBuf,
}

impl ProjectRoot {
    /// Open a project root, creating the directory if missing
    ///
    /// The stored path is canonical so containment checks compare like with like.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let root = std::fs::canonicalize(path)?;
        Ok(Self { root })
    }

    /// Absolute path of the root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a tool-supplied path to an absolute path inside the root
    ///
    /// A leading `/` means the project root, not the filesystem root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let requested = Path::new(path.trim());
        let mut resolved = self.root.clone();

        for component in requested.components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    if resolved == self.root {
                        return Err(Error::PathEscape {
                            path: requested.to_path_buf(),
                        });
                    }
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
            }
        }

        self.check_symlinks(&resolved, requested)?;
        Ok(resolved)
    }

    /// Path relative to the root, for display
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// The nearest existing ancestor must still canonicalize inside the root
    ///
    /// Existence is checked without following links, so a dangling symlink
    /// counts as existing. Its target cannot be canonicalized and is rejected.
    fn check_symlinks(&self, resolved: &Path, requested: &Path) -> Result<()> {
        let escape = || Error::PathEscape {
            path: requested.to_path_buf(),
        };
        let mut candidate = Some(resolved);

        while let Some(path) = candidate {
            if std::fs::symlink_metadata(path).is_ok() {
                let canonical = match std::fs::canonicalize(path) {
                    Ok(canonical) => canonical,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::warn!(path = %path.display(), "Dangling symlink in tool path");
                        return Err(escape());
                    }
                    Err(e) => return Err(e.into()),
                };
                if !canonical.starts_with(&self.root) {
                    return Err(escape());
                }
                return Ok(());
            }
            candidate = path.parent();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, ProjectRoot) {
        let dir = TempDir::new().unwrap();
        let root = ProjectRoot::create(dir.path().join("proj")).unwrap();
        (dir, root)
    }

    #[test]
    fn test_create_makes_directory() {
        let (dir, root) = root();
        assert!(dir.path().join("proj").is_dir());
        assert!(root.path().is_absolute());
    }

    #[test]
    fn test_resolve_relative() {
        let (_dir, root) = root();
        let resolved = root.resolve("src/app.js").unwrap();
        assert_eq!(resolved, root.path().join("src").join("app.js"));
    }

    #[test]
    fn test_resolve_leading_slash_is_root_relative() {
        let (_dir, root) = root();
        let resolved = root.resolve("/index.html").unwrap();
        assert_eq!(resolved, root.path().join("index.html"));
    }

    #[test]
    fn test_resolve_inner_parent_dir() {
        let (_dir, root) = root();
        let resolved = root.resolve("src/../lib/./util.js").unwrap();
        assert_eq!(resolved, root.path().join("lib").join("util.js"));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let (_dir, root) = root();
        assert!(matches!(
            root.resolve("../outside.txt"),
            Err(Error::PathEscape { .. })
        ));
        assert!(matches!(
            root.resolve("a/../../outside.txt"),
            Err(Error::PathEscape { .. })
        ));
    }

    #[test]
    fn test_resolve_dot_is_root() {
        let (_dir, root) = root();
        assert_eq!(root.resolve(".").unwrap(), root.path());
        assert_eq!(root.resolve("").unwrap(), root.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let (dir, root) = root();
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.path().join("link")).unwrap();

        assert!(matches!(
            root.resolve("link/secret.txt"),
            Err(Error::PathEscape { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_dangling_symlink() {
        let (dir, root) = root();
        let target = dir.path().join("outside.txt");
        std::os::unix::fs::symlink(&target, root.path().join("link")).unwrap();

        assert!(matches!(
            root.resolve("link"),
            Err(Error::PathEscape { .. })
        ));
        assert!(matches!(
            root.resolve("link/nested.txt"),
            Err(Error::PathEscape { .. })
        ));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_allows_symlink_inside_root() {
        let (_dir, root) = root();
        std::fs::create_dir_all(root.path().join("real")).unwrap();
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("alias")).unwrap();

        let resolved = root.resolve("alias/file.txt").unwrap();
        assert_eq!(resolved, root.path().join("alias").join("file.txt"));
    }

    #[test]
    fn test_relative() {
        let (_dir, root) = root();
        let path = root.path().join("a").join("b.txt");
        assert_eq!(root.relative(&path), Path::new("a/b.txt"));
    }
}
