//! Cache records and the on-disk cache layout.
//!
//! One cache entry per `(name, mirror)` key, stored as a small JSON file
//! under `<cache-root>/arch/installed/<bucket>/<name>/`. Records are only
//! written when they carry everything a launcher needs to present the
//! package: a command, an icon path, and the mirror tag.

use crate::error::MetaError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const AUR_BUCKET: &str = "aur";
const MIRROR_BUCKET: &str = "mirror";
const DATA_FILE: &str = "data.json";

/// Directory holding the cache entry for one `(name, mirror)` key.
///
/// Anything tagged with the literal `aur` mirror lands in the `aur`
/// bucket, every other origin shares the `mirror` bucket.
pub fn entry_dir(cache_root: &Path, name: &str, mirror: &str) -> PathBuf {
    let bucket = if mirror == AUR_BUCKET {
        AUR_BUCKET
    } else {
        MIRROR_BUCKET
    };

    cache_root
        .join("arch")
        .join("installed")
        .join(bucket)
        .join(name)
}

/// Data file inside the cache entry directory.
pub fn entry_data_path(cache_root: &Path, name: &str, mirror: &str) -> PathBuf {
    entry_dir(cache_root, name, mirror).join(DATA_FILE)
}

/// Conventional cache root under the user cache directory.
pub fn default_cache_root() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("arch-app-meta"))
}

/// Working structure a resolution pass fills before the eligibility check.
///
/// Accumulates whatever the matching heuristics find; an unset field means
/// "not found", which is never an error. Turned into an immutable
/// [`ResolvedPackage`] at the end of the pass.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub command: Option<String>,
    pub icon_path: Option<PathBuf>,
    pub desktop_entry_path: Option<PathBuf>,
}

/// A cache-eligible record for one `(name, mirror)` key.
///
/// Only constructible through [`ResolvedPackage::from_resolution`], which
/// enforces eligibility. Serializes to exactly the key set
/// `{command, iconPath, mirror, desktopEntryPath}`, the last one omitted
/// when absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    #[serde(skip)]
    name: String,
    command: String,
    icon_path: String,
    mirror: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    desktop_entry_path: Option<String>,
}

impl ResolvedPackage {
    /// Build the record for a finished resolution pass, or `None` when the
    /// result is not cache-eligible: the command, the icon path, and the
    /// mirror must all be present and non-empty.
    pub fn from_resolution(name: &str, mirror: &str, resolution: Resolution) -> Option<Self> {
        if name.is_empty() || mirror.is_empty() {
            return None;
        }

        let command = resolution.command.filter(|c| !c.is_empty())?;
        let icon_path = resolution
            .icon_path
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())?;
        let desktop_entry_path = resolution
            .desktop_entry_path
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty());

        Some(Self {
            name: name.to_string(),
            command,
            icon_path,
            mirror: mirror.to_string(),
            desktop_entry_path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn icon_path(&self) -> &str {
        &self.icon_path
    }

    pub fn mirror(&self) -> &str {
        &self.mirror
    }

    pub fn desktop_entry_path(&self) -> Option<&str> {
        self.desktop_entry_path.as_deref()
    }
}

/// Write one resolved record to its cache location, creating the entry
/// directory if needed and truncating any previous file.
pub fn write_record(cache_root: &Path, package: &ResolvedPackage) -> Result<(), MetaError> {
    let dir = entry_dir(cache_root, package.name(), package.mirror());
    fs::create_dir_all(&dir)?;

    let file = fs::File::create(dir.join(DATA_FILE))?;
    serde_json::to_writer(file, package)?;
    debug!("wrote cache entry for {}", package.name());
    Ok(())
}

/// Cached metadata read back for the consuming launcher.
///
/// All fields are optional: a stored record always carries the first
/// three, but readers must tolerate any subset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CachedMetadata {
    pub command: Option<String>,
    pub icon_path: Option<String>,
    pub mirror: Option<String>,
    pub desktop_entry_path: Option<String>,
}

impl CachedMetadata {
    /// Load the cache entry for `(name, mirror)`, if one exists. Present
    /// but empty values are treated as absent.
    pub fn load(cache_root: &Path, name: &str, mirror: &str) -> Result<Option<Self>, MetaError> {
        let path = entry_data_path(cache_root, name, mirror);
        if !path.exists() {
            return Ok(None);
        }

        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut loaded: Self = serde_json::from_reader(reader)?;

        loaded.command = loaded.command.filter(|v| !v.is_empty());
        loaded.icon_path = loaded.icon_path.filter(|v| !v.is_empty());
        loaded.mirror = loaded.mirror.filter(|v| !v.is_empty());
        loaded.desktop_entry_path = loaded.desktop_entry_path.filter(|v| !v.is_empty());

        Ok(Some(loaded))
    }

    /// Overlay the present values onto `target`, leaving its other fields
    /// untouched.
    pub fn fill(&self, target: &mut CachedMetadata) {
        if let Some(command) = &self.command {
            target.command = Some(command.clone());
        }
        if let Some(icon_path) = &self.icon_path {
            target.icon_path = Some(icon_path.clone());
        }
        if let Some(mirror) = &self.mirror {
            target.mirror = Some(mirror.clone());
        }
        if let Some(entry) = &self.desktop_entry_path {
            target.desktop_entry_path = Some(entry.clone());
        }
    }

    /// Whether the package can be launched from a menu. Command-line only
    /// packages (no source desktop entry) are not.
    pub fn launchable(&self) -> bool {
        self.desktop_entry_path.is_some() && self.command.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_resolution() -> Resolution {
        Resolution {
            command: Some("/usr/bin/foo".to_string()),
            icon_path: Some(PathBuf::from("/usr/share/icons/foo.png")),
            desktop_entry_path: None,
        }
    }

    #[test]
    fn test_entry_dir_buckets_by_mirror() {
        let root = Path::new("/tmp/cache");
        assert_eq!(
            entry_dir(root, "foo", "aur"),
            Path::new("/tmp/cache/arch/installed/aur/foo")
        );
        assert_eq!(
            entry_dir(root, "foo", "community"),
            Path::new("/tmp/cache/arch/installed/mirror/foo")
        );
    }

    #[test]
    fn test_record_requires_command_icon_and_mirror() {
        let mut missing_icon = full_resolution();
        missing_icon.icon_path = None;
        assert!(ResolvedPackage::from_resolution("foo", "core", missing_icon).is_none());

        let mut missing_command = full_resolution();
        missing_command.command = None;
        assert!(ResolvedPackage::from_resolution("foo", "core", missing_command).is_none());

        assert!(ResolvedPackage::from_resolution("foo", "", full_resolution()).is_none());
        assert!(ResolvedPackage::from_resolution("foo", "core", full_resolution()).is_some());
    }

    #[test]
    fn test_written_record_contains_exact_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let package =
            ResolvedPackage::from_resolution("foo", "community", full_resolution()).unwrap();
        write_record(tmp.path(), &package).unwrap();

        let raw = fs::read_to_string(entry_data_path(tmp.path(), "foo", "community")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["command", "iconPath", "mirror"]);
        assert_eq!(object["command"], "/usr/bin/foo");
        assert_eq!(object["iconPath"], "/usr/share/icons/foo.png");
        assert_eq!(object["mirror"], "community");
    }

    #[test]
    fn test_desktop_entry_path_is_written_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolution = full_resolution();
        resolution.desktop_entry_path =
            Some(PathBuf::from("/usr/share/applications/foo.desktop"));
        let package = ResolvedPackage::from_resolution("foo", "aur", resolution).unwrap();
        write_record(tmp.path(), &package).unwrap();

        let loaded = CachedMetadata::load(tmp.path(), "foo", "aur")
            .unwrap()
            .unwrap();
        assert_eq!(
            loaded.desktop_entry_path.as_deref(),
            Some("/usr/share/applications/foo.desktop")
        );
        assert!(loaded.launchable());
    }

    #[test]
    fn test_load_missing_entry_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(CachedMetadata::load(tmp.path(), "foo", "core").unwrap(), None);
    }

    #[test]
    fn test_load_treats_empty_values_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = entry_dir(tmp.path(), "foo", "core");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("data.json"),
            r#"{"command":"/usr/bin/foo","iconPath":"","mirror":"core"}"#,
        )
        .unwrap();

        let loaded = CachedMetadata::load(tmp.path(), "foo", "core")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.command.as_deref(), Some("/usr/bin/foo"));
        assert_eq!(loaded.icon_path, None);
        assert!(!loaded.launchable());
    }

    #[test]
    fn test_fill_overlays_only_present_values() {
        let mut target = CachedMetadata {
            command: Some("old".to_string()),
            icon_path: Some("/old/icon.png".to_string()),
            ..Default::default()
        };
        let update = CachedMetadata {
            command: Some("new".to_string()),
            mirror: Some("core".to_string()),
            ..Default::default()
        };

        update.fill(&mut target);
        assert_eq!(target.command.as_deref(), Some("new"));
        assert_eq!(target.icon_path.as_deref(), Some("/old/icon.png"));
        assert_eq!(target.mirror.as_deref(), Some("core"));
    }
}
