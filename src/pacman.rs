//! pacman-backed package queries.

use crate::query::PackageQuery;
use log::debug;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

const ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];

/// Lists installed package files through `pacman -Qlq`.
///
/// One pacman invocation per call, stdout split into one path per line.
/// A failed spawn or a non-zero exit still yields whatever paths pacman
/// printed; a missing pacman binary yields an empty listing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pacman;

impl Pacman {
    fn list_files(&self, names: &BTreeSet<String>) -> Vec<PathBuf> {
        if names.is_empty() {
            return Vec::new();
        }

        let output = match Command::new("pacman").arg("-Qlq").args(names).output() {
            Ok(output) => output,
            Err(err) => {
                debug!("pacman query failed to start: {err}");
                return Vec::new();
            }
        };

        if !output.status.success() {
            // pacman exits non-zero when any requested package is not
            // installed but still lists the ones that are.
            debug!("pacman -Qlq exited with {}", output.status);
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty() && !line.ends_with('/'))
            .map(PathBuf::from)
            .collect()
    }
}

impl PackageQuery for Pacman {
    fn list_desktop_entry_files(&self, names: &BTreeSet<String>) -> Vec<PathBuf> {
        let mut files = self.list_files(names);
        files.retain(|path| is_desktop_file(path));
        files
    }

    fn list_binary_paths(&self, names: &BTreeSet<String>) -> Vec<PathBuf> {
        let mut files = self.list_files(names);
        files.retain(|path| is_binary(path));
        files
    }

    fn list_icon_paths(&self, names: &BTreeSet<String>) -> Vec<PathBuf> {
        let mut files = self.list_files(names);
        files.retain(|path| is_icon_file(path));
        files
    }
}

fn is_desktop_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("desktop"))
}

fn is_binary(path: &Path) -> bool {
    path.parent()
        .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == "bin"))
}

fn is_icon_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ICON_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_file_filter() {
        assert!(is_desktop_file(Path::new(
            "/usr/share/applications/foo.desktop"
        )));
        assert!(!is_desktop_file(Path::new("/usr/share/doc/foo/README")));
    }

    #[test]
    fn test_binary_filter() {
        assert!(is_binary(Path::new("/usr/bin/foo")));
        assert!(is_binary(Path::new("/usr/local/bin/foo")));
        assert!(!is_binary(Path::new("/usr/share/foo/foo.sh")));
    }

    #[test]
    fn test_icon_filter_by_extension() {
        assert!(is_icon_file(Path::new("/usr/share/pixmaps/foo.png")));
        assert!(is_icon_file(Path::new("/usr/share/icons/Foo.SVG")));
        assert!(!is_icon_file(Path::new("/usr/share/pixmaps/foo.bmp")));
    }
}
