//! Single and batch package resolution.
//!
//! Resolution is exact-match-first: a candidate whose final path segment
//! equals the expected name (plus suffix) beats everything, ties go to the
//! first candidate in listing order, and looser fallbacks only run when
//! the exact pass comes up empty.

use crate::cache::{self, Resolution};
use crate::desktop_entry::extract_launch_fields;
use crate::error::MetaError;
use crate::query::PackageQuery;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves launch metadata for installed packages and persists it to the
/// on-disk cache.
///
/// Synchronous and single-threaded; every query and file write blocks.
/// Callers wanting parallelism schedule independent [`Resolver::save`]
/// calls themselves, one writer per `(name, mirror)` key at a time.
pub struct Resolver<Q> {
    cache_root: PathBuf,
    query: Q,
}

impl<Q: PackageQuery> Resolver<Q> {
    pub fn new(cache_root: impl Into<PathBuf>, query: Q) -> Self {
        Self {
            cache_root: cache_root.into(),
            query,
        }
    }

    /// Resolve one package and persist the record when it is
    /// cache-eligible. Returns whether a record was written.
    pub fn save(&self, name: &str, mirror: &str) -> Result<bool, MetaError> {
        let names = singleton(name);
        let mut resolution = Resolution::default();

        let desktop_files = self.query.list_desktop_entry_files(&names);

        if let Some(first) = desktop_files.first() {
            let entry = find_desktop_entry(&desktop_files, name).unwrap_or(first);

            let document = fs::read_to_string(entry)?;
            let fields = extract_launch_fields(&document);
            resolution.command = fields.command;
            resolution.desktop_entry_path = Some(entry.clone());

            if let Some(icon_ref) = fields.icon {
                if icon_ref.contains('/') {
                    resolution.icon_path = Some(PathBuf::from(icon_ref));
                } else {
                    let candidates = self.query.list_icon_paths(&names);
                    resolution.icon_path =
                        self.resolve_icon(name, icon_basename(&icon_ref), &candidates, false);
                }
            }
        } else {
            let bin_paths = self.query.list_binary_paths(&names);

            if let Some(first) = bin_paths.first() {
                let command = bin_paths
                    .iter()
                    .find(|p| p.file_name().and_then(|f| f.to_str()) == Some(name))
                    .unwrap_or(first);
                resolution.command = Some(command.to_string_lossy().into_owned());
            }

            let candidates = self.query.list_icon_paths(&names);
            resolution.icon_path = self.resolve_icon(name, name, &candidates, false);
        }

        self.persist(name, mirror, resolution)
    }

    /// Resolve a batch of packages from one origin and persist every
    /// record that is cache-eligible.
    ///
    /// With `overwrite` unset, names whose cache entry already exists are
    /// excluded before any query is issued. Returns the number of records
    /// actually written; packages that resolve incompletely are skipped
    /// silently and do not count.
    pub fn save_many(
        &self,
        names: &BTreeSet<String>,
        mirror: &str,
        overwrite: bool,
    ) -> Result<usize, MetaError> {
        let working_set: BTreeSet<String> = names
            .iter()
            .filter(|name| {
                overwrite || !cache::entry_data_path(&self.cache_root, name, mirror).exists()
            })
            .cloned()
            .collect();

        if working_set.is_empty() {
            return Ok(0);
        }

        let desktop_files = self.query.list_desktop_entry_files(&working_set);

        // Exact-match pass over the combined listing, then one scoped
        // query per package the batch listing missed.
        let mut matched: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut no_desktop_entry: BTreeSet<String> = BTreeSet::new();

        for name in &working_set {
            if let Some(hit) = find_desktop_entry(&desktop_files, name) {
                matched.insert(name.clone(), hit.clone());
                continue;
            }

            match self
                .query
                .list_desktop_entry_files(&singleton(name))
                .into_iter()
                .next()
            {
                Some(first) => {
                    matched.insert(name.clone(), first);
                }
                None => {
                    no_desktop_entry.insert(name.clone());
                }
            }
        }

        let mut resolutions: Vec<(String, Resolution)> = Vec::new();
        // Packages whose icon reference is a bare name; resolved below
        // against one shared batch listing.
        let mut pending_icons: Vec<(usize, String)> = Vec::new();

        for (name, entry) in &matched {
            let document = fs::read_to_string(entry)?;
            let fields = extract_launch_fields(&document);

            let mut resolution = Resolution {
                command: fields.command,
                desktop_entry_path: Some(entry.clone()),
                ..Resolution::default()
            };

            if let Some(icon_ref) = fields.icon {
                if icon_ref.contains('/') {
                    resolution.icon_path = Some(PathBuf::from(icon_ref));
                } else {
                    pending_icons.push((resolutions.len(), icon_basename(&icon_ref).to_string()));
                }
            }

            resolutions.push((name.clone(), resolution));
        }

        if !pending_icons.is_empty() {
            let scoped: BTreeSet<String> = pending_icons
                .iter()
                .map(|(idx, _)| resolutions[*idx].0.clone())
                .collect();
            let candidates = self.query.list_icon_paths(&scoped);

            for (idx, basename) in &pending_icons {
                let (name, resolution) = &mut resolutions[*idx];
                resolution.icon_path = self.resolve_icon(name, basename, &candidates, false);
            }
        }

        if !no_desktop_entry.is_empty() {
            debug!("{} packages have no desktop entry", no_desktop_entry.len());

            let bin_paths = self.query.list_binary_paths(&no_desktop_entry);
            let icon_candidates = self.query.list_icon_paths(&no_desktop_entry);

            for name in &no_desktop_entry {
                let mut resolution = Resolution::default();

                if let Some(hit) = bin_paths.iter().find(|p| file_name_matches(p, name)) {
                    resolution.command = Some(hit.to_string_lossy().into_owned());
                }

                // Exact matches only here: the batch path trades icon
                // coverage for fewer per-package queries.
                resolution.icon_path = self.resolve_icon(name, name, &icon_candidates, true);
                resolutions.push((name.clone(), resolution));
            }
        }

        let mut written = 0;
        for (name, resolution) in resolutions {
            if self.persist(&name, mirror, resolution)? {
                written += 1;
            }
        }

        info!(
            "cached launch metadata for {written} of {} packages",
            working_set.len()
        );
        Ok(written)
    }

    /// Pick the icon file for `basename`: the first candidate whose final
    /// segment is `<basename>.png` or `<basename>.svg`, case-insensitive.
    /// Without an exact match and with `exact_only` unset, fall back to a
    /// scoped per-package listing and take its first entry.
    fn resolve_icon(
        &self,
        package: &str,
        basename: &str,
        candidates: &[PathBuf],
        exact_only: bool,
    ) -> Option<PathBuf> {
        let expected = [format!("{basename}.png"), format!("{basename}.svg")];

        let hit = candidates
            .iter()
            .find(|path| expected.iter().any(|name| file_name_matches(path, name)));
        if let Some(hit) = hit {
            return Some(hit.clone());
        }

        if exact_only {
            return None;
        }

        self.query
            .list_icon_paths(&singleton(package))
            .into_iter()
            .next()
    }

    fn persist(&self, name: &str, mirror: &str, resolution: Resolution) -> Result<bool, MetaError> {
        match cache::ResolvedPackage::from_resolution(name, mirror, resolution) {
            Some(package) => {
                cache::write_record(&self.cache_root, &package)?;
                Ok(true)
            }
            None => {
                debug!("{name} did not resolve to a command and an icon, not cached");
                Ok(false)
            }
        }
    }
}

/// First candidate whose final segment is `<name>.desktop`, case-insensitive.
fn find_desktop_entry<'a>(candidates: &'a [PathBuf], name: &str) -> Option<&'a PathBuf> {
    let expected = format!("{name}.desktop");
    candidates
        .iter()
        .find(|path| file_name_matches(path, &expected))
}

fn file_name_matches(path: &Path, expected: &str) -> bool {
    path.file_name()
        .and_then(|f| f.to_str())
        .is_some_and(|f| f.eq_ignore_ascii_case(expected))
}

/// Leading segment of an icon reference, up to the first dot.
fn icon_basename(icon_ref: &str) -> &str {
    icon_ref.split('.').next().unwrap_or(icon_ref)
}

fn singleton(name: &str) -> BTreeSet<String> {
    BTreeSet::from([name.to_string()])
}
