//! Location and permission checks for the backing file.
//!
//! The registry is a single file at a configured path. [`PathResolver`]
//! answers whether that path may be read, rewritten, or created, without
//! touching the file itself.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the caller intends to do with the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Read an existing file.
    Read,
    /// Rewrite an existing file in place.
    Write,
    /// Create a file that does not exist yet.
    Create,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Read => write!(f, "read"),
            Intent::Write => write!(f, "write"),
            Intent::Create => write!(f, "create"),
        }
    }
}

/// Resolves the backing file for a given [`Intent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    path: PathBuf,
}

impl PathResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The configured location, whether or not it exists.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the configured path for `intent`.
    ///
    /// # Errors
    ///
    /// - `Read`: [`Error::NotFound`] when no file exists at the path.
    /// - `Write`: [`Error::NotFound`] when no file exists,
    ///   [`Error::PermissionDenied`] when it exists but is not writable.
    /// - `Create`: [`Error::PermissionDenied`] when the parent directory is
    ///   missing or not writable, [`Error::InvalidInput`] when a file is
    ///   already present (it is never overwritten through this intent).
    pub fn resolve(&self, intent: Intent) -> Result<PathBuf> {
        let result = match intent {
            Intent::Read => self.existing(),
            Intent::Write => self.existing().and_then(|path| {
                if is_writable(&path) {
                    Ok(path)
                } else {
                    Err(Error::PermissionDenied(format!(
                        "{} cannot be written, please run as super user",
                        path.display()
                    )))
                }
            }),
            Intent::Create => self.creatable(),
        };
        debug!(
            path = %self.path.display(),
            %intent,
            ok = result.is_ok(),
            "resolved tools file"
        );
        result
    }

    fn existing(&self) -> Result<PathBuf> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(Error::NotFound(format!(
                "no tools file found at {}",
                self.path.display()
            )))
        }
    }

    fn creatable(&self) -> Result<PathBuf> {
        if self.path.exists() {
            return Err(Error::InvalidInput(format!(
                "{} already exists",
                self.path.display()
            )));
        }
        let dir = parent_dir(&self.path);
        if dir.is_dir() && is_writable(dir) {
            Ok(self.path.clone())
        } else {
            Err(Error::PermissionDenied(format!(
                "{} cannot be created, please run as super user",
                self.path.display()
            )))
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Whether the calling process may write to `path`.
#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};

    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestEnv, running_as_root};
    use std::fs;

    // ==================== Read Tests ====================

    #[test]
    fn test_read_existing_file() {
        let env = TestEnv::new();
        env.write_raw("<tools/>");
        let resolver = PathResolver::new(env.store_path());
        assert_eq!(resolver.resolve(Intent::Read).unwrap(), env.store_path());
    }

    #[test]
    fn test_read_missing_file() {
        let env = TestEnv::new();
        let resolver = PathResolver::new(env.store_path());
        let err = resolver.resolve(Intent::Read).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let env = TestEnv::new();
        let resolver = PathResolver::new(env.dir.path());
        assert!(matches!(
            resolver.resolve(Intent::Read).unwrap_err(),
            Error::NotFound(_)
        ));
    }

    // ==================== Write Tests ====================

    #[test]
    fn test_write_existing_writable_file() {
        let env = TestEnv::new();
        env.write_raw("<tools/>");
        let resolver = PathResolver::new(env.store_path());
        assert_eq!(resolver.resolve(Intent::Write).unwrap(), env.store_path());
    }

    #[test]
    fn test_write_missing_file() {
        let env = TestEnv::new();
        let resolver = PathResolver::new(env.store_path());
        assert!(matches!(
            resolver.resolve(Intent::Write).unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_write_read_only_file_is_denied() {
        use std::os::unix::fs::PermissionsExt;

        // access(2) lets root write regardless of mode bits
        if running_as_root() {
            return;
        }
        let env = TestEnv::new();
        env.write_raw("<tools/>");
        fs::set_permissions(env.store_path(), fs::Permissions::from_mode(0o444)).unwrap();

        let resolver = PathResolver::new(env.store_path());
        assert!(matches!(
            resolver.resolve(Intent::Write).unwrap_err(),
            Error::PermissionDenied(_)
        ));
    }

    // ==================== Create Tests ====================

    #[test]
    fn test_create_in_writable_dir() {
        let env = TestEnv::new();
        let resolver = PathResolver::new(env.store_path());
        assert_eq!(resolver.resolve(Intent::Create).unwrap(), env.store_path());
        // Resolution alone never creates the file
        assert!(!env.store_path().exists());
    }

    #[test]
    fn test_create_missing_dir_is_denied() {
        let env = TestEnv::new();
        let resolver = PathResolver::new(env.dir.path().join("missing").join("tools.xml"));
        assert!(matches!(
            resolver.resolve(Intent::Create).unwrap_err(),
            Error::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let env = TestEnv::new();
        env.write_raw("<tools/>");
        let resolver = PathResolver::new(env.store_path());
        assert!(matches!(
            resolver.resolve(Intent::Create).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_create_in_read_only_dir_is_denied() {
        use std::os::unix::fs::PermissionsExt;

        if running_as_root() {
            return;
        }
        let env = TestEnv::new();
        let locked = env.dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let resolver = PathResolver::new(locked.join("tools.xml"));
        let result = resolver.resolve(Intent::Create);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result.unwrap_err(), Error::PermissionDenied(_)));
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("tools.xml")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/etc/tools.xml")), Path::new("/etc"));
    }
}
