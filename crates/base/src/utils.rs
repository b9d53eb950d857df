//! Path handling for running inside a container with the host filesystem
//! mounted at [`HOST_DIR`].

use std::path::{Path, PathBuf};

/// Mount point of the host filesystem when the tool runs inside a container.
pub const HOST_DIR: &str = "/host";

/// Whether the process is running inside a container with the host
/// filesystem mounted.
#[must_use]
pub fn in_container() -> bool { Path::new(HOST_DIR).is_dir() }

/// Prefixes `path` with the host mount point when running inside a
/// container; returns it unchanged otherwise.
#[must_use]
pub fn host_path<P: AsRef<Path>>(path: P) -> PathBuf {
    if in_container() { prefix_host(path.as_ref()) } else { path.as_ref().to_path_buf() }
}

/// Strips the host mount point from `path` when running inside a container.
/// Used when showing paths to the user.
#[must_use]
pub fn display_path(path: &Path) -> PathBuf {
    if in_container() { strip_host(path) } else { path.to_path_buf() }
}

fn prefix_host(path: &Path) -> PathBuf {
    let mut prefixed = PathBuf::from(HOST_DIR);
    prefixed.push(path.strip_prefix("/").unwrap_or(path));
    prefixed
}

fn strip_host(path: &Path) -> PathBuf {
    path.strip_prefix(HOST_DIR).map_or_else(|_| path.to_path_buf(), |rest| Path::new("/").join(rest))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{prefix_host, strip_host};

    #[test]
    fn test_prefix_absolute_path() {
        assert_eq!(prefix_host(Path::new("/var/tmp/app")), PathBuf::from("/host/var/tmp/app"));
    }

    #[test]
    fn test_prefix_then_strip_round_trips() {
        let original = Path::new("/var/tmp/app");
        assert_eq!(strip_host(&prefix_host(original)), original.to_path_buf());
    }

    #[test]
    fn test_strip_leaves_foreign_paths_alone() {
        assert_eq!(strip_host(Path::new("/var/tmp/app")), PathBuf::from("/var/tmp/app"));
    }
}
