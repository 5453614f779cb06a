// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation pipeline.
//!
//! Ties the pieces of ruledrop together for one invocation: recognize the
//! requested rule set, locate the target project, resolve a source, and
//! install from it. Every failure before installation begins leaves the
//! target project untouched.

use crate::{
    catalog::{Catalog, CatalogError},
    config::Config,
    install::{Confirm, FileCopier, FsCopier, InstallError, InstallResult, Installer},
    source::{CandidateList, Fetcher, Git2Fetcher, Resolver, SourceError, SourcePreference},
    target::{locate_project_root, TargetError, TargetProject},
};

use std::path::Path;
use tracing::{debug, instrument};

/// What the operator asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Requested rule-set identifier, not yet validated.
    pub rule_set: String,

    /// Skip overwrite confirmation.
    pub force: bool,

    /// Where to look for the rule set.
    pub preference: SourcePreference,
}

/// Installation pipeline for one invocation.
#[derive(Debug)]
pub struct Engine<F = Git2Fetcher, C = FsCopier>
where
    F: Fetcher,
    C: FileCopier,
{
    config: Config,
    catalog: Catalog,
    fetcher: F,
    installer: Installer<C>,
}

impl<F, C> Engine<F, C>
where
    F: Fetcher,
    C: FileCopier,
{
    /// Construct new pipeline from configuration.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError`] if configuration lists malformed rule-set
    ///   identifiers.
    pub fn new(config: Config, fetcher: F, copier: C) -> Result<Self, CatalogError> {
        let catalog = Catalog::new(config.rule_sets.iter().cloned())?;

        Ok(Self {
            config,
            catalog,
            fetcher,
            installer: Installer::new(copier),
        })
    }

    /// Catalog of recognized rule sets.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Install requested rule set into project enclosing `cwd`.
    ///
    /// The source is released before returning, whether installation
    /// succeeded or not.
    ///
    /// # Errors
    ///
    /// - Return [`EngineError::UnknownRuleSet`] if rule set is not recognized.
    /// - Return [`EngineError::Target`] if no project encloses `cwd`.
    /// - Return [`EngineError::Source`] if rule set cannot be resolved.
    /// - Return [`EngineError::Install`] if installation fails.
    #[instrument(skip(self, cwd, confirm), level = "debug")]
    pub fn install(
        self,
        cwd: impl AsRef<Path>,
        request: &InstallRequest,
        confirm: &impl Confirm,
    ) -> Result<InstallResult> {
        let id = self.catalog.lookup(&request.rule_set)?;
        let root = locate_project_root(cwd)?;
        let target = TargetProject::probe(&root, &self.config.layout.target_rules_dir)?;

        let candidates = CandidateList::from_settings(&self.config.source, &root);
        debug!("probing {} local candidate(s)", candidates.len());
        let resolver = Resolver::new(
            candidates,
            self.config.remote.clone(),
            self.config.layout.clone(),
            self.fetcher,
        )
        .excluding_target(&target.root_path);
        let source = resolver.resolve(&id, request.preference)?;

        let result = self
            .installer
            .install(&source, &target, request.force, confirm);
        source.release();

        Ok(result?)
    }
}

/// Pipeline error types.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Requested rule set is not recognized.
    #[error(transparent)]
    UnknownRuleSet(#[from] CatalogError),

    /// Target project cannot be located.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Rule set cannot be resolved.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Installation fails.
    #[error(transparent)]
    Install(#[from] InstallError),
}

impl EngineError {
    /// Process exit code to report this error with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownRuleSet(_) => 2,
            Self::Target(_) | Self::Source(_) | Self::Install(_) => 1,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
