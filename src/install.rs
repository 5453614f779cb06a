// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule-set installation.
//!
//! Installation places a resolved rule set into a target project. Rule files
//! are copied into the project's rules directory, and the rule set's
//! instructions document, if any, is copied to the project root.
//!
//! # Overwrite Policy
//!
//! The rules directory is protected: if it already holds anything, the
//! operator must confirm before any file in it is replaced, unless the
//! install is forced. Declining leaves the target untouched. The instructions
//! document is not protected. It always overwrites whatever sits at the
//! project root under the same name.
//!
//! # Mirroring
//!
//! Rule files are mirrored by name. Incoming files replace same-named files
//! in the rules directory. Files already in the rules directory that the rule
//! set does not provide are left alone, i.e., stale rules are never pruned.
//!
//! # Partial Installs
//!
//! Files are copied one at a time in lexicographic order. There is no
//! transaction across files. The first failed copy stops the install, and
//! the error lists every file that was already placed, so the operator can
//! finish or revert the install by hand.

use crate::{
    source::{canonical, ResolvedSource, SourceLocation},
    target::TargetProject,
};

use inquire::InquireError;
use std::{
    ffi::OsString,
    fs::{copy, read_dir},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Ask the operator for permission.
pub trait Confirm {
    /// Ask a yes/no question. Answering no must never be an error.
    fn confirm(&self, question: &str) -> Result<bool, InquireError>;
}

/// Ask the operator through the terminal.
///
/// Defaults to no. Pressing escape counts as no.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, question: &str) -> Result<bool, InquireError> {
        match inquire::Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled) => Ok(false),
            Err(error) => Err(error),
        }
    }
}

/// Never ask, always agree.
///
/// For unattended use where the caller already decided to overwrite.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _: &str) -> Result<bool, InquireError> {
        Ok(true)
    }
}

/// File copy primitive.
pub trait FileCopier {
    /// Copy file contents from one path to another, replacing the
    /// destination if it exists.
    fn copy(&self, from: &Path, to: &Path) -> std::io::Result<()>;
}

/// Copy files through the standard file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    fn copy(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        copy(from, to).map(|_| ())
    }
}

/// Result of an installation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// Rule set was installed.
    Installed(InstallationOutcome),

    /// Operator declined to overwrite the rules directory. Nothing was
    /// touched.
    NoOp,
}

/// Record of a completed installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationOutcome {
    /// Names of rule files copied, in copy order.
    pub copied_rule_files: Vec<String>,

    /// Instructions document was copied to project root.
    pub agent_instructions_installed: bool,

    /// Location that served the install.
    pub source_used: SourceLocation,

    /// Rules directory the files were copied into.
    pub rules_dir: PathBuf,
}

/// Install resolved rule sets into target projects.
#[derive(Debug, Default)]
pub struct Installer<C = FsCopier>
where
    C: FileCopier,
{
    copier: C,
}

impl<C> Installer<C>
where
    C: FileCopier,
{
    /// Construct new installer using given copy primitive.
    pub fn new(copier: C) -> Self {
        Self { copier }
    }

    /// Install resolved rule set into target project.
    ///
    /// Asks for confirmation through `confirm` only when the rules directory
    /// is non-empty and `force` is off.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::ReadSource`] if source rules cannot be listed.
    /// - Return [`InstallError::SameFile`] if any source file is its own
    ///   destination.
    /// - Return [`InstallError::Prompt`] if the operator cannot be asked.
    /// - Return [`InstallError::CreateRulesDir`] if the rules directory cannot
    ///   be created.
    /// - Return [`InstallError::Partial`] if any file copy fails.
    #[instrument(skip(self, source, target, confirm), level = "debug")]
    pub fn install(
        &self,
        source: &ResolvedSource,
        target: &TargetProject,
        force: bool,
        confirm: &impl Confirm,
    ) -> Result<InstallResult> {
        let incoming = match source.rules_dir() {
            Some(rules_dir) => list_rule_files(rules_dir)?,
            None => Vec::new(),
        };

        // INVARIANT: Never copy a file onto itself, copying would truncate it.
        let destinations = incoming
            .iter()
            .map(|(name, from)| (from.as_path(), target.rules_dir.join(name)))
            .chain(source.instructions_file().map(|from| {
                let name = from.file_name().unwrap_or(from.as_os_str());
                (from, target.root_path.join(name))
            }));
        for (from, to) in destinations {
            if to.exists() && canonical(from) == canonical(&to) {
                return Err(InstallError::SameFile { path: to });
            }
        }

        if target.rules_dir_nonempty && !force {
            let question = format!(
                "{} already has rules, overwrite same-named files with rule set {}?",
                target.rules_dir.display(),
                source.id()
            );
            if !confirm.confirm(&question)? {
                info!("installation of rule set {} cancelled", source.id());
                return Ok(InstallResult::NoOp);
            }
        }

        mkdirp::mkdirp(&target.rules_dir).map_err(|err| InstallError::CreateRulesDir {
            source: err,
            rules_dir: target.rules_dir.clone(),
        })?;

        let mut copied = Vec::new();
        for (name, from) in incoming {
            let to = target.rules_dir.join(&name);
            let name = name.to_string_lossy().into_owned();
            debug!("copy {:?} to {:?}", from.display(), to.display());
            if let Err(error) = self.copier.copy(&from, &to) {
                return Err(InstallError::Partial {
                    source: error,
                    failed: name,
                    copied,
                });
            }
            copied.push(name);
        }

        let mut agent_instructions_installed = false;
        if let Some(from) = source.instructions_file() {
            // INVARIANT: Instructions document always overwrites, confirmed or not.
            let name = from.file_name().unwrap_or(from.as_os_str());
            let to = target.root_path.join(name);
            debug!("copy {:?} to {:?}", from.display(), to.display());
            if let Err(error) = self.copier.copy(from, &to) {
                return Err(InstallError::Partial {
                    source: error,
                    failed: name.to_string_lossy().into_owned(),
                    copied,
                });
            }
            agent_instructions_installed = true;
        }

        info!(
            "installed {} rule file(s) from rule set {}",
            copied.len(),
            source.id()
        );

        Ok(InstallResult::Installed(InstallationOutcome {
            copied_rule_files: copied,
            agent_instructions_installed,
            source_used: source.location().clone(),
            rules_dir: target.rules_dir.clone(),
        }))
    }
}

// INVARIANT: Only regular files at the top of the rules directory, sorted by name.
fn list_rule_files(rules_dir: &Path) -> Result<Vec<(OsString, PathBuf)>> {
    let read_error = |err| InstallError::ReadSource {
        source: err,
        rules_dir: rules_dir.to_path_buf(),
    };

    let mut files = Vec::new();
    for entry in read_dir(rules_dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if !path.is_file() {
            debug!("skip non-file entry {:?}", path.display());
            continue;
        }
        files.push((entry.file_name(), path));
    }
    files.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

    Ok(files)
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Source rules directory cannot be listed.
    #[error("failed to read rule files from {:?}", rules_dir.display())]
    ReadSource {
        #[source]
        source: std::io::Error,
        rules_dir: PathBuf,
    },

    /// Source and destination of a copy are the same file.
    #[error(
        "refusing to copy {:?} onto itself, rule set source overlaps target project",
        path.display()
    )]
    SameFile { path: PathBuf },

    /// Operator cannot be asked for confirmation.
    #[error("failed to ask for overwrite confirmation, rerun with --force to skip it")]
    Prompt(#[from] InquireError),

    /// Rules directory cannot be created.
    #[error("failed to create rules directory at {:?}", rules_dir.display())]
    CreateRulesDir {
        #[source]
        source: std::io::Error,
        rules_dir: PathBuf,
    },

    /// Copy failed partway through. Files already copied stay in place.
    #[error(
        "failed to copy {failed:?}, installation is incomplete (already copied: {})",
        describe_copied(copied)
    )]
    Partial {
        #[source]
        source: std::io::Error,
        failed: String,
        copied: Vec<String>,
    },
}

fn describe_copied(copied: &[String]) -> String {
    if copied.is_empty() {
        "none".into()
    } else {
        copied.join(", ")
    }
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
