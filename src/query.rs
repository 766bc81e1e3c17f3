//! Package query capability.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Listings of installed files associated with sets of package names.
///
/// Implementations typically shell out to the package manager or scan the
/// filesystem, so every call may block. Returned paths are absolute and
/// keep the order of the underlying listing; that order is significant,
/// the resolver breaks ties by taking the first match. "Nothing found" is
/// an empty listing, never an error.
pub trait PackageQuery {
    /// Desktop entry files owned by any of the given packages.
    fn list_desktop_entry_files(&self, names: &BTreeSet<String>) -> Vec<PathBuf>;

    /// Installed executable paths owned by any of the given packages.
    fn list_binary_paths(&self, names: &BTreeSet<String>) -> Vec<PathBuf>;

    /// Icon files owned by any of the given packages.
    fn list_icon_paths(&self, names: &BTreeSet<String>) -> Vec<PathBuf>;
}
