// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Human-readable installation reports.

use crate::{
    install::{InstallResult, InstallationOutcome},
    rule::RuleMode,
    source::SourceLocation,
};

use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
};

/// Report of one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    result: InstallResult,
    modes: HashMap<String, RuleMode>,
}

impl Report {
    /// Construct new report without rule modes.
    pub fn new(result: InstallResult) -> Self {
        Self {
            result,
            modes: HashMap::new(),
        }
    }

    /// Attach application mode of installed rules.
    pub fn with_modes(mut self, modes: HashMap<String, RuleMode>) -> Self {
        self.modes = modes;
        self
    }

    /// Attach application mode of installed rules by reading their headers.
    ///
    /// Rules that cannot be read, or lack a valid header, are listed without
    /// a mode.
    pub fn with_installed_modes(self) -> Self {
        let modes = match &self.result {
            InstallResult::Installed(outcome) => read_modes(outcome),
            InstallResult::NoOp => HashMap::new(),
        };

        self.with_modes(modes)
    }
}

fn read_modes(outcome: &InstallationOutcome) -> HashMap<String, RuleMode> {
    outcome
        .copied_rule_files
        .iter()
        .filter_map(|name| {
            let contents = read_to_string(outcome.rules_dir.join(name)).ok()?;
            let mode = contents.parse::<RuleMode>().ok()?;
            Some((name.clone(), mode))
        })
        .collect()
}

impl Display for Report {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let outcome = match &self.result {
            InstallResult::NoOp => {
                return writeln!(fmt, "installation cancelled, no files were changed");
            }
            InstallResult::Installed(outcome) => outcome,
        };

        let source = match &outcome.source_used {
            SourceLocation::LocalPath(path) => format!("local checkout {}", path.display()),
            SourceLocation::RemoteMirror { url, .. } => format!("remote repository {url}"),
        };
        writeln!(fmt, "source: {source}")?;

        writeln!(
            fmt,
            "rules: {} file(s) into {}",
            outcome.copied_rule_files.len(),
            outcome.rules_dir.display()
        )?;
        for name in &outcome.copied_rule_files {
            match self.modes.get(name) {
                Some(mode) => writeln!(fmt, "  {name} ({mode})")?,
                None => writeln!(fmt, "  {name}")?,
            }
        }

        let instructions = if outcome.agent_instructions_installed {
            "installed"
        } else {
            "not provided by rule set"
        };
        writeln!(fmt, "instructions: {instructions}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs::write;
    use tempfile::TempDir;

    fn outcome(rules_dir: impl Into<std::path::PathBuf>) -> InstallationOutcome {
        InstallationOutcome {
            copied_rule_files: vec!["django.mdc".into(), "style.mdc".into()],
            agent_instructions_installed: true,
            source_used: SourceLocation::LocalPath("/home/blah/rule-sets".into()),
            rules_dir: rules_dir.into(),
        }
    }

    #[test]
    fn report_installed() {
        let mut modes = HashMap::new();
        modes.insert("style.mdc".to_string(), RuleMode::Always);
        let result = Report::new(InstallResult::Installed(outcome("/work/app/.cursor/rules")))
            .with_modes(modes)
            .to_string();

        let expect = indoc! {r#"
            source: local checkout /home/blah/rule-sets
            rules: 2 file(s) into /work/app/.cursor/rules
              django.mdc
              style.mdc (always)
            instructions: installed
        "#};
        assert_eq!(result, expect);
    }

    #[test]
    fn report_remote_without_instructions() {
        let outcome = InstallationOutcome {
            copied_rule_files: vec![],
            agent_instructions_installed: false,
            source_used: SourceLocation::RemoteMirror {
                url: "https://blah.org/rule-sets.git".into(),
                workspace: "/tmp/ruledrop-abc".into(),
            },
            rules_dir: "/work/app/.cursor/rules".into(),
        };
        let result = Report::new(InstallResult::Installed(outcome)).to_string();

        let expect = indoc! {r#"
            source: remote repository https://blah.org/rule-sets.git
            rules: 0 file(s) into /work/app/.cursor/rules
            instructions: not provided by rule set
        "#};
        assert_eq!(result, expect);
    }

    #[test]
    fn report_cancelled() {
        let result = Report::new(InstallResult::NoOp).to_string();
        assert_eq!(result, "installation cancelled, no files were changed\n");
    }

    #[test]
    fn report_reads_installed_modes() -> anyhow::Result<()> {
        let rules_dir = TempDir::new()?;
        write(
            rules_dir.path().join("django.mdc"),
            "---\nglobs: **/views.py\n---\nUse class based views.\n",
        )?;
        write(rules_dir.path().join("style.mdc"), "no header here\n")?;

        let result = Report::new(InstallResult::Installed(outcome(rules_dir.path())))
            .with_installed_modes()
            .to_string();

        assert!(result.contains("  django.mdc (files matching **/views.py)\n"));
        assert!(result.contains("  style.mdc\n"));

        Ok(())
    }
}
