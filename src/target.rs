// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target project location.
//!
//! Rule sets are always installed into a __target project__, i.e., the work
//! tree of the Git repository that encloses the current working directory.
//! Ruledrop refuses to install anywhere else.

use git2::Repository;
use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Find root of the project enclosing target directory.
///
/// Searches upward from `cwd` for a Git repository, and returns its work
/// tree.
///
/// # Errors
///
/// - Return [`TargetError::NotInProject`] if no enclosing repository exists,
///   or the enclosing repository is bare.
#[instrument(skip(cwd), level = "debug")]
pub fn locate_project_root(cwd: impl AsRef<Path>) -> Result<PathBuf> {
    let cwd = cwd.as_ref();
    let repository = Repository::discover(cwd).map_err(|err| TargetError::NotInProject {
        source: err,
        cwd: cwd.to_path_buf(),
    })?;

    let root = repository
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| TargetError::NotInProject {
            source: git2::Error::from_str("repository is bare"),
            cwd: cwd.to_path_buf(),
        })?;
    debug!("project root at {:?}", root.display());

    Ok(root)
}

/// Target project to install rule sets into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProject {
    /// Root of project work tree.
    pub root_path: PathBuf,

    /// Absolute path of project's rules directory.
    pub rules_dir: PathBuf,

    /// Rules directory is present on disk.
    pub rules_dir_exists: bool,

    /// Rules directory has at least one entry.
    pub rules_dir_nonempty: bool,
}

impl TargetProject {
    /// Probe state of target project's rules directory.
    ///
    /// The `rules_dir` is relative to `root`. A non-directory entry sitting at
    /// the rules directory path is treated as existing and non-empty, so it
    /// is never replaced without confirmation.
    ///
    /// # Errors
    ///
    /// - Return [`TargetError::ProbeRulesDir`] if rules directory exists, but
    ///   cannot be read.
    pub fn probe(root: impl Into<PathBuf>, rules_dir: impl AsRef<Path>) -> Result<Self> {
        let root_path = root.into();
        let rules_dir = root_path.join(rules_dir.as_ref());

        let (rules_dir_exists, rules_dir_nonempty) = if rules_dir.is_dir() {
            let mut entries = read_dir(&rules_dir).map_err(|err| TargetError::ProbeRulesDir {
                source: err,
                rules_dir: rules_dir.clone(),
            })?;
            (true, entries.next().is_some())
        } else if rules_dir.exists() {
            (true, true)
        } else {
            (false, false)
        };

        debug!(
            "rules directory {:?} exists: {rules_dir_exists}, non-empty: {rules_dir_nonempty}",
            rules_dir.display()
        );

        Ok(Self {
            root_path,
            rules_dir,
            rules_dir_exists,
            rules_dir_nonempty,
        })
    }
}

/// Target project error types.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// No version-controlled project encloses working directory.
    #[error("{:?} is not inside a git project, run ruledrop from within a repository work tree", cwd.display())]
    NotInProject {
        #[source]
        source: git2::Error,
        cwd: PathBuf,
    },

    /// Rules directory cannot be read.
    #[error("failed to read rules directory at {:?}", rules_dir.display())]
    ProbeRulesDir {
        #[source]
        source: std::io::Error,
        rules_dir: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = TargetError> = std::result::Result<T, E>;
