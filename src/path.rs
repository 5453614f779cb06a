// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine default locations of files that ruledrop reads from the user's
//! machine, and normalize candidate paths before they are probed.

use std::path::{Component, Path, PathBuf};

/// Determine default absolute path to ruledrop's configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/ruledrop/config.toml`. Does
/// not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if user directories cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("ruledrop").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to the local rule-set cache.
///
/// Uses `$XDG_CACHE_HOME/ruledrop/rule-sets`, which is where a user keeps a
/// checkout of the template repository for offline installs. Does not check
/// if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if user directories cannot be determined.
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|path| path.join("ruledrop").join("rule-sets"))
        .ok_or(NoWayHome)
}

/// Resolve path against a base directory, and lexically clean it up.
///
/// Absolute paths are kept as-is. Relative paths are joined onto `base`. Any
/// `.` component is dropped and any `..` component pops its parent, so two
/// spellings of the same directory compare equal. Symbolic links are not
/// followed.
pub fn resolve_against(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let joined = base.as_ref().join(path.as_ref());
    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other.as_os_str()),
        }
    }

    clean
}

/// No way to determine user's directories.
///
/// # See Also
///
/// - [`dirs::config_dir`](https://docs.rs/dirs/latest/dirs/fn.config_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's config or cache directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
