// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule file headers.
//!
//! Every rule file may open with a small header block that tells the coding
//! assistant when the rule applies. The header is delimited by `---` lines,
//! and holds simple `key: value` entries:
//!
//! ```text
//! ---
//! description: Conventions for Django views
//! globs: src/**/*.py, tests/**/*.py
//! alwaysApply: false
//! ---
//! ```
//!
//! Ruledrop never edits rule files. It only reads headers to tell the user
//! how each installed rule will be applied.

use glob::Pattern;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Application mode of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMode {
    /// Applied to every session.
    Always,

    /// Applied when a session touches files matching any glob pattern.
    FileScoped(Vec<String>),

    /// Applied when the assistant decides the description is relevant.
    AgentDecided(String),

    /// Applied only when invoked explicitly.
    Manual,
}

impl Display for RuleMode {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Always => fmt.write_str("always"),
            Self::FileScoped(globs) => write!(fmt, "files matching {}", globs.join(", ")),
            Self::AgentDecided(_) => fmt.write_str("agent decided"),
            Self::Manual => fmt.write_str("manual"),
        }
    }
}

/// Parsed rule header.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleHeader {
    /// Apply rule to every session.
    pub always_apply: bool,

    /// File glob patterns rule is scoped to.
    pub globs: Vec<String>,

    /// Description the assistant uses to decide relevance.
    pub description: Option<String>,
}

impl RuleHeader {
    /// Parse header block at top of rule file.
    ///
    /// Returns `Ok(None)` if the file does not open with a header block.
    ///
    /// # Errors
    ///
    /// - Return [`RuleError::Unterminated`] if header block never closes.
    /// - Return [`RuleError::InvalidFlag`] if `alwaysApply` is not a boolean.
    /// - Return [`RuleError::InvalidGlob`] if any glob pattern is invalid.
    pub fn parse(contents: &str) -> Result<Option<Self>> {
        let mut lines = contents.lines();
        if lines.next().map(str::trim_end) != Some("---") {
            return Ok(None);
        }

        let mut header = Self::default();
        let mut terminated = false;
        for line in lines.by_ref() {
            let line = line.trim();
            if line == "---" {
                terminated = true;
                break;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "alwaysApply" => {
                    header.always_apply = value
                        .parse::<bool>()
                        .map_err(|_| RuleError::InvalidFlag(value.to_string()))?;
                }
                "globs" => {
                    header.globs = value
                        .split(',')
                        .map(str::trim)
                        .filter(|glob| !glob.is_empty())
                        .map(|glob| {
                            Pattern::new(glob)
                                .map(|_| glob.to_string())
                                .map_err(|err| RuleError::InvalidGlob {
                                    source: err,
                                    glob: glob.to_string(),
                                })
                        })
                        .collect::<Result<Vec<_>>>()?;
                }
                "description" => {
                    header.description = Some(value.to_string()).filter(|desc| !desc.is_empty());
                }
                _ => continue,
            }
        }

        if !terminated {
            return Err(RuleError::Unterminated);
        }

        Ok(Some(header))
    }

    /// Determine application mode of rule.
    ///
    /// Always-apply wins over glob scoping, which wins over a description.
    /// A header with none of them is manual.
    pub fn mode(&self) -> RuleMode {
        if self.always_apply {
            RuleMode::Always
        } else if !self.globs.is_empty() {
            RuleMode::FileScoped(self.globs.clone())
        } else if let Some(description) = &self.description {
            RuleMode::AgentDecided(description.clone())
        } else {
            RuleMode::Manual
        }
    }
}

impl FromStr for RuleMode {
    type Err = RuleError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        RuleHeader::parse(contents)?
            .map(|header| header.mode())
            .ok_or(RuleError::MissingHeader)
    }
}

/// Rule header error types.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// File does not open with a header block.
    #[error("rule file has no header block")]
    MissingHeader,

    /// Header block never closes.
    #[error("rule header block is missing its closing '---' line")]
    Unterminated,

    /// Flag is not a boolean.
    #[error("expected 'true' or 'false' for alwaysApply, found {0:?}")]
    InvalidFlag(String),

    /// Glob pattern is invalid.
    #[error("invalid glob pattern {glob:?} in rule header")]
    InvalidGlob {
        #[source]
        source: glob::PatternError,
        glob: String,
    },
}

/// Friendly result alias :3
type Result<T, E = RuleError> = std::result::Result<T, E>;
