// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule-set identifiers.
//!
//! A __rule set__ is a bundle of rule files plus an optional instructions
//! document, stored as a top-level directory of the template repository. The
//! directory name is the rule set's identifier. Ruledrop only installs rule
//! sets it knows about, i.e., identifiers listed in its __catalog__. The
//! catalog ships with a built-in set of identifiers, and the user can extend
//! it through the configuration file.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Identifiers every catalog starts with.
pub const BUILTIN_RULE_SETS: &[&str] = &["nextjs", "python"];

/// Identifier of a rule set.
///
/// Can only be obtained through [`Catalog::lookup`], so holding one means the
/// identifier was recognized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleSetId(String);

impl RuleSetId {
    /// Treat identifier as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RuleSetId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.0)
    }
}

impl AsRef<str> for RuleSetId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Closed set of recognized rule-set identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ids: BTreeSet<String>,
}

impl Catalog {
    /// Construct catalog of built-in identifiers extended by `extra`.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Malformed`] if any extra identifier is not a
    ///   valid directory name for a rule set.
    pub fn new(extra: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let mut ids = BUILTIN_RULE_SETS
            .iter()
            .map(|id| id.to_string())
            .collect::<BTreeSet<_>>();

        for id in extra.into_iter().map(Into::into) {
            if !is_well_formed(&id) {
                return Err(CatalogError::Malformed(id));
            }
            ids.insert(id);
        }

        Ok(Self { ids })
    }

    /// Look up identifier in catalog.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Malformed`] if identifier cannot name a rule
    ///   set at all.
    /// - Return [`CatalogError::Unrecognized`] if identifier is well formed,
    ///   but not part of the catalog.
    pub fn lookup(&self, id: impl AsRef<str>) -> Result<RuleSetId> {
        let id = id.as_ref();
        if !is_well_formed(id) {
            return Err(CatalogError::Malformed(id.to_string()));
        }

        if !self.ids.contains(id) {
            return Err(CatalogError::Unrecognized {
                id: id.to_string(),
                known: self.ids.iter().cloned().collect::<Vec<_>>().join(", "),
            });
        }

        Ok(RuleSetId(id.to_string()))
    }

    /// Iterate through recognized identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            ids: BUILTIN_RULE_SETS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

// INVARIANT: Identifier must be usable as a single top-level directory name.
fn is_well_formed(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id.chars().all(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '_' | '.')
        })
}

/// Catalog lookup error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Identifier cannot name a rule set.
    #[error("invalid rule set identifier {0:?}")]
    Malformed(String),

    /// Identifier is not part of catalog.
    #[error("unrecognized rule set {id:?} (known rule sets: {known})")]
    Unrecognized { id: String, known: String },
}

/// Friendly result alias :3
type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test]
    fn default_catalog_lists_builtins() {
        let catalog = Catalog::default();
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["nextjs", "python"]);
    }

    #[test]
    fn catalog_extension() -> anyhow::Result<()> {
        let catalog = Catalog::new(["rust", "python"])?;
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec!["nextjs", "python", "rust"]
        );
        assert_eq!(catalog.lookup("rust")?.as_str(), "rust");

        Ok(())
    }

    #[test]
    fn catalog_rejects_malformed_extension() {
        let result = Catalog::new(["../etc"]);
        assert_eq!(result, Err(CatalogError::Malformed("../etc".into())));
    }

    #[test_case("python"; "builtin python")]
    #[test_case("nextjs"; "builtin nextjs")]
    #[test]
    fn lookup_recognized(id: &str) {
        let result = Catalog::default().lookup(id).map(|id| id.to_string());
        pretty_assertions::assert_eq!(result, Ok(id.to_string()));
    }

    #[test_case(""; "empty")]
    #[test_case("Python"; "uppercase")]
    #[test_case(".hidden"; "leading dot")]
    #[test_case("python/rules"; "nested path")]
    #[test]
    fn lookup_malformed(id: &str) {
        let result = Catalog::default().lookup(id);
        pretty_assertions::assert_eq!(result, Err(CatalogError::Malformed(id.into())));
    }

    #[test]
    fn lookup_unrecognized() {
        let result = Catalog::default().lookup("cobol");
        assert_eq!(
            result,
            Err(CatalogError::Unrecognized {
                id: "cobol".into(),
                known: "nextjs, python".into(),
            })
        );
    }
}
