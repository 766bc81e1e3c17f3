//! arch-app-meta: launch metadata resolver and disk cache for installed
//! Arch packages.
//!
//! Provides a small pipeline for desktop-launcher integration:
//! - Desktop entry parsing for the `Exec` and `Icon` launch fields
//! - Exact-match-first resolution of launch commands and icon files
//! - A per-package on-disk cache keyed by package name and mirror
//!
//! File listings come from a [`PackageQuery`] implementation; [`Pacman`]
//! ships as the pacman-backed one. The cache root is explicit
//! configuration passed to [`Resolver::new`], with [`default_cache_root`]
//! as the conventional choice.

mod cache;
mod desktop_entry;
mod error;
mod pacman;
mod query;
mod resolver;

pub use cache::{
    CachedMetadata, ResolvedPackage, Resolution, default_cache_root, entry_data_path, entry_dir,
};
pub use desktop_entry::{LaunchFields, extract_launch_fields};
pub use error::MetaError;
pub use pacman::Pacman;
pub use query::PackageQuery;
pub use resolver::Resolver;
