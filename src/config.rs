// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of ruledrop's configuration file to simplify the
//! process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::path::default_cache_dir;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Canonical template repository to fetch rule sets from.
pub const DEFAULT_REMOTE_URL: &str = "https://github.com/ruledrop/rule-sets.git";

/// Ruledrop configuration layout.
///
/// Every section is optional. Missing fields fall back to their defaults, so
/// an empty file is a valid configuration.
///
/// # General Layout
///
/// The configuration is composed of four parts: extra rule-set identifiers to
/// recognize, the remote template repository, the local candidate
/// directories to search before going remote, and the directory layout of
/// both the template repository and the target project.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Identifiers to recognize on top of the built-in rule sets.
    pub rule_sets: Vec<String>,

    /// Remote template repository.
    pub remote: RemoteSettings,

    /// Local candidate search settings.
    pub source: SourceSettings,

    /// Directory layout of sources and targets.
    pub layout: Layout,
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every candidate path.
        config.source.candidates = config
            .source
            .candidates
            .iter()
            .map(|path| {
                shellexpand::full(path.to_string_lossy().as_ref())
                    .map(|path| PathBuf::from(path.into_owned()))
                    .map_err(ConfigError::ShellExpansion)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Remote template repository settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// URL of template repository to shallow clone.
    pub url: String,

    /// Branch to clone instead of the remote's default branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_REMOTE_URL.into(),
            branch: None,
        }
    }
}

/// Local candidate search settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Ordered candidate directories holding a checkout of the template
    /// repository. Relative paths are relative to the target project root.
    pub candidates: Vec<PathBuf>,

    /// Also probe every ancestor of the target project root.
    pub search_ancestors: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            candidates: default_cache_dir().into_iter().collect(),
            search_ancestors: true,
        }
    }
}

/// Directory layout of template sources and target projects.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Layout {
    /// Name of the rules subdirectory inside each rule set.
    pub rules_dir_name: String,

    /// Name of the instructions document in each rule set and at the target
    /// project root.
    pub instructions_file: String,

    /// Rules directory of target project, relative to its root.
    pub target_rules_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            rules_dir_name: "rules".into(),
            instructions_file: "AGENTS.md".into(),
            target_rules_dir: PathBuf::from(".cursor").join("rules"),
        }
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
