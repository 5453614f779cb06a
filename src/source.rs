// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule-set source resolution.
//!
//! Before anything can be installed, ruledrop needs a directory that holds the
//! requested rule set. That directory is called the __source__. Sources come
//! from one of two places:
//!
//! 1. A __local candidate__, i.e., a checkout of the template repository that
//!    already sits somewhere on the user's machine: the user cache, a sibling
//!    checkout next to the target project, an ancestor directory, etc.
//! 2. A __remote mirror__, i.e., a shallow clone of the template repository
//!    made into an ephemeral workspace for the duration of one run.
//!
//! Local candidates are always probed first, in the order they were given,
//! and the first candidate that holds the rule set wins without touching the
//! network. Only when no candidate matches does ruledrop clone the remote.
//!
//! # Source Layout
//!
//! Each rule set is a top-level directory of the template repository named
//! after its identifier. Inside of it lives a rules subdirectory with one
//! file per rule, and optionally an instructions document:
//!
//! ```text
//! <source root>/
//!   python/
//!     rules/
//!     AGENTS.md
//! ```

use crate::{
    catalog::RuleSetId,
    config::{Layout, RemoteSettings, SourceSettings},
    path::resolve_against,
};

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time,
};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Where the resolver may look for a rule set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourcePreference {
    /// Probe local candidates, then fall back to the remote.
    #[default]
    Auto,

    /// Probe local candidates only. Never touch the network.
    Local,

    /// Skip local candidates, and always fetch the remote.
    Remote,
}

/// Location that served a rule set.
///
/// Only describes the location. The ephemeral workspace backing a remote
/// mirror is owned by [`ResolvedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Local candidate directory.
    LocalPath(PathBuf),

    /// Ephemeral workspace holding a shallow clone of the remote.
    RemoteMirror {
        /// URL the remote was cloned from.
        url: String,

        /// Workspace the clone was made into.
        workspace: PathBuf,
    },
}

impl SourceLocation {
    /// Root directory of the location.
    pub fn as_path(&self) -> &Path {
        match self {
            Self::LocalPath(path) => path.as_path(),
            Self::RemoteMirror { workspace, .. } => workspace.as_path(),
        }
    }

    /// Location is a remote mirror.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteMirror { .. })
    }
}

impl Display for SourceLocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::LocalPath(path) => write!(fmt, "local checkout at {}", path.display()),
            Self::RemoteMirror { url, workspace } => {
                write!(fmt, "remote {url} mirrored at {}", workspace.display())
            }
        }
    }
}

/// Rule set resolved to a usable source directory.
///
/// Holds the ephemeral workspace of a remote mirror. Dropping this resolved
/// source deletes the workspace.
#[derive(Debug)]
pub struct ResolvedSource {
    id: RuleSetId,
    location: SourceLocation,
    rules_dir: Option<PathBuf>,
    instructions_file: Option<PathBuf>,
    workspace: Option<TempDir>,
}

impl ResolvedSource {
    fn new(id: &RuleSetId, location: SourceLocation, layout: &Layout) -> Self {
        let rule_set_dir = location.as_path().join(id.as_str());
        let rules_dir = Some(rule_set_dir.join(&layout.rules_dir_name)).filter(|dir| dir.is_dir());
        let instructions_file =
            Some(rule_set_dir.join(&layout.instructions_file)).filter(|file| file.is_file());

        Self {
            id: id.clone(),
            location,
            rules_dir,
            instructions_file,
            workspace: None,
        }
    }

    /// Identifier of resolved rule set.
    pub fn id(&self) -> &RuleSetId {
        &self.id
    }

    /// Location that served the rule set.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Directory of rule files, if rule set provides one.
    pub fn rules_dir(&self) -> Option<&Path> {
        self.rules_dir.as_deref()
    }

    /// Instructions document, if rule set provides one.
    pub fn instructions_file(&self) -> Option<&Path> {
        self.instructions_file.as_deref()
    }

    /// Release the source, deleting its ephemeral workspace if any.
    ///
    /// Deletion failures are only logged, because nothing the caller did
    /// depends on the workspace anymore.
    pub fn release(self) {
        if let Some(workspace) = self.workspace {
            let path = workspace.path().to_path_buf();
            match workspace.close() {
                Ok(()) => debug!("removed remote workspace {:?}", path.display()),
                Err(error) => warn!("failed to remove remote workspace {:?}: {error}", path.display()),
            }
        }
    }
}

/// Ordered listing of local candidate directories.
///
/// # Invariant
///
/// - Order of insertion is probe order.
/// - No duplicate directories.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CandidateList(Vec<PathBuf>);

impl CandidateList {
    /// Construct new candidate listing, dropping duplicates.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut list = Self::default();
        for path in paths {
            list.push(path);
        }

        list
    }

    /// Build candidate listing from configured search settings.
    ///
    /// Configured candidates come first in their given order. Relative
    /// entries are resolved against the project root. Ancestors of the
    /// project root follow from nearest to farthest if requested.
    pub fn from_settings(settings: &SourceSettings, project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref();
        let mut list = Self::new(
            settings
                .candidates
                .iter()
                .map(|path| resolve_against(project_root, path)),
        );

        if settings.search_ancestors {
            for ancestor in project_root.ancestors().skip(1) {
                list.push(ancestor);
            }
        }

        list
    }

    fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.0.contains(&path) {
            self.0.push(path);
        }
    }

    /// Iterate through candidates in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Listing holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shallow clone primitive.
pub trait Fetcher {
    /// Clone latest snapshot of remote into target directory.
    ///
    /// Target directory exists and is empty.
    fn shallow_clone(&self, remote: &RemoteSettings, into: &Path) -> Result<(), FetchError>;
}

/// Resolve rule sets to source directories.
#[derive(Debug)]
pub struct Resolver<F = Git2Fetcher>
where
    F: Fetcher,
{
    candidates: CandidateList,
    remote: RemoteSettings,
    layout: Layout,
    fetcher: F,
    target_root: Option<PathBuf>,
}

impl<F> Resolver<F>
where
    F: Fetcher,
{
    /// Construct new resolver.
    pub fn new(candidates: CandidateList, remote: RemoteSettings, layout: Layout, fetcher: F) -> Self {
        Self {
            candidates,
            remote,
            layout,
            fetcher,
            target_root: None,
        }
    }

    /// Never use a local candidate that would make the target project a
    /// source of itself.
    ///
    /// A candidate is skipped if its rule-set directory is the target
    /// project root, or contains it.
    pub fn excluding_target(mut self, root: impl Into<PathBuf>) -> Self {
        self.target_root = Some(root.into());
        self
    }

    /// Resolve rule set to a source directory.
    ///
    /// Probes local candidates in order unless remote is preferred. Falls
    /// back to exactly one shallow clone of the remote unless local is
    /// preferred.
    ///
    /// # Errors
    ///
    /// - Return [`SourceError::NotFound`] if no searched location holds the
    ///   rule set.
    /// - Return [`SourceError::Fetch`] if the remote cannot be cloned.
    /// - Return [`SourceError::Workspace`] if the ephemeral workspace cannot
    ///   be created.
    #[instrument(skip(self), level = "debug")]
    pub fn resolve(&self, id: &RuleSetId, preference: SourcePreference) -> Result<ResolvedSource> {
        if preference != SourcePreference::Remote {
            if let Some(source) = self.probe_local(id) {
                info!("using rule set {id} from {}", source.location());
                return Ok(source);
            }
        }

        // INVARIANT: Only report candidates that were actually probed.
        let searched = match preference {
            SourcePreference::Remote => Vec::new(),
            _ => self.candidates.0.clone(),
        };

        if preference == SourcePreference::Local {
            return Err(SourceError::NotFound {
                id: id.to_string(),
                searched,
                remote: None,
            });
        }

        self.fetch_remote(id, searched)
    }

    fn probe_local(&self, id: &RuleSetId) -> Option<ResolvedSource> {
        for candidate in self.candidates.iter() {
            let rule_set_dir = candidate.join(id.as_str());
            if self.overlaps_target(&rule_set_dir) {
                debug!(
                    "skip candidate {:?}, rule set {id} overlaps target project",
                    candidate.display()
                );
                continue;
            }

            let rules_dir = rule_set_dir.join(&self.layout.rules_dir_name);
            if rules_dir.is_dir() {
                debug!("candidate {:?} holds rule set {id}", candidate.display());
                return Some(ResolvedSource::new(
                    id,
                    SourceLocation::LocalPath(candidate.to_path_buf()),
                    &self.layout,
                ));
            }
            debug!("candidate {:?} does not hold rule set {id}", candidate.display());
        }

        None
    }

    fn overlaps_target(&self, rule_set_dir: &Path) -> bool {
        let Some(root) = &self.target_root else {
            return false;
        };

        canonical(root).starts_with(canonical(rule_set_dir))
    }

    fn fetch_remote(&self, id: &RuleSetId, searched: Vec<PathBuf>) -> Result<ResolvedSource> {
        let workspace = tempfile::Builder::new()
            .prefix("ruledrop-")
            .tempdir()
            .map_err(SourceError::Workspace)?;
        info!("fetch {} into {:?}", self.remote.url, workspace.path().display());

        // INVARIANT: Workspace is dropped, and thus deleted, on every early return.
        self.fetcher
            .shallow_clone(&self.remote, workspace.path())
            .map_err(|err| SourceError::Fetch {
                source: err,
                url: self.remote.url.clone(),
            })?;

        if !workspace.path().join(id.as_str()).is_dir() {
            return Err(SourceError::NotFound {
                id: id.to_string(),
                searched,
                remote: Some(self.remote.url.clone()),
            });
        }

        let mut source = ResolvedSource::new(
            id,
            SourceLocation::RemoteMirror {
                url: self.remote.url.clone(),
                workspace: workspace.path().to_path_buf(),
            },
            &self.layout,
        );
        source.workspace = Some(workspace);
        info!("using rule set {id} from {}", source.location());

        Ok(source)
    }
}

/// Shallow clone through libgit2.
///
/// Displays clone progress through a progress bar. If the remote requires
/// credentials, the progress bar is suspended while the user is prompted.
#[derive(Debug, Clone)]
pub struct Git2Fetcher {
    bar: ProgressBar,
}

impl Git2Fetcher {
    /// Construct new libgit2 fetcher reporting progress on given bar.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Fetcher for Git2Fetcher {
    /// Clone latest snapshot of remote.
    ///
    /// Network remotes are fetched with a depth of one. Local remotes are
    /// cloned in full, since libgit2's local transport cannot do shallow
    /// fetches, and there is no network cost to save anyway.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::Git2`] if libgit2 operations fail.
    /// - Return [`FetchError::IndicatifStyleTemplate`] if progress bar style
    ///   is invalid.
    fn shallow_clone(&self, remote: &RemoteSettings, into: &Path) -> Result<(), FetchError> {
        let style = ProgressStyle::with_template(
            "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
        )?
        .progress_chars("-Cco.");
        self.bar.set_style(style);
        self.bar.set_message(remote.url.clone());
        self.bar.enable_steady_tick(time::Duration::from_millis(100));

        let prompter = IndicatifPrompter::new(self.bar.clone());
        let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
        let config = Config::open_default()?;

        let mut throttle = time::Instant::now();
        let mut rc = RemoteCallbacks::new();
        rc.credentials(authenticator.credentials(&config));
        rc.transfer_progress(|progress| {
            let stats = progress.to_owned();
            if throttle.elapsed() > time::Duration::from_millis(10) {
                throttle = time::Instant::now();
                prompter.bar.set_length(stats.total_objects() as u64);
                prompter.bar.set_position(stats.received_objects() as u64);
            }
            true
        });

        let mut fo = FetchOptions::new();
        fo.remote_callbacks(rc);
        if is_network_url(&remote.url) {
            fo.depth(1);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fo);
        if let Some(branch) = &remote.branch {
            builder.branch(branch);
        }

        let result = builder.clone(&remote.url, into);
        self.bar.finish_and_clear();
        result?;

        Ok(())
    }
}

/// Resolve symbolic links where possible, so aliases of one directory compare
/// equal. Paths that do not exist are kept as given.
pub(crate) fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_network_url(url: &str) -> bool {
    if url.starts_with("file://") || Path::new(url).exists() {
        return false;
    }

    url.contains("://") || url.contains('@')
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Remote fetch error types.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Source resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Rule set not present in any searched location.
    #[error("rule set {id:?} not found, {}", describe_search(searched, remote.as_deref()))]
    NotFound {
        id: String,
        searched: Vec<PathBuf>,
        remote: Option<String>,
    },

    /// Remote cannot be cloned.
    #[error("failed to fetch rule sets from {url:?}, check network access and credentials")]
    Fetch {
        #[source]
        source: FetchError,
        url: String,
    },

    /// Ephemeral workspace cannot be created.
    #[error("failed to create workspace for remote fetch")]
    Workspace(#[source] std::io::Error),
}

fn describe_search(searched: &[PathBuf], remote: Option<&str>) -> String {
    let local = match searched.len() {
        0 => "searched no local candidates".to_string(),
        1 => format!("searched 1 local candidate ({})", searched[0].display()),
        count => format!("searched {count} local candidates"),
    };

    match remote {
        Some(url) => format!("{local} and remote {url:?}"),
        None => format!("{local}, remote not consulted"),
    }
}

/// Friendly result alias :3
pub type Result<T, E = SourceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, BUILTIN_RULE_SETS};
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;
    use std::{
        cell::Cell,
        fs::{create_dir_all, write},
    };

    #[derive(Debug, Default)]
    struct FakeRemote {
        files: Vec<(&'static str, &'static str)>,
        fail: bool,
        calls: Cell<usize>,
        last_workspace: std::cell::RefCell<Option<PathBuf>>,
    }

    impl Fetcher for FakeRemote {
        fn shallow_clone(&self, _: &RemoteSettings, into: &Path) -> Result<(), FetchError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_workspace.borrow_mut() = Some(into.to_path_buf());
            if self.fail {
                return Err(FetchError::Git2(git2::Error::from_str("network unreachable")));
            }

            for (name, contents) in &self.files {
                let path = into.join(name);
                if let Some(parent) = path.parent() {
                    create_dir_all(parent).map_err(|err| git2::Error::from_str(&err.to_string()))?;
                }
                write(path, contents).map_err(|err| git2::Error::from_str(&err.to_string()))?;
            }

            Ok(())
        }
    }

    fn resolver(candidates: CandidateList, fetcher: FakeRemote) -> Resolver<FakeRemote> {
        Resolver::new(candidates, RemoteSettings::default(), Layout::default(), fetcher)
    }

    fn python() -> RuleSetId {
        Catalog::default().lookup("python").unwrap()
    }

    #[test]
    fn candidate_list_drops_duplicates() {
        let result = CandidateList::new(["/a", "/b", "/a", "/c"]);
        assert_eq!(
            result.iter().collect::<Vec<_>>(),
            vec![Path::new("/a"), Path::new("/b"), Path::new("/c")]
        );
    }

    #[test]
    fn candidate_list_from_settings() {
        let settings = SourceSettings {
            candidates: vec!["/cache/rule-sets".into(), "../rule-sets".into()],
            search_ancestors: true,
        };
        let result = CandidateList::from_settings(&settings, "/work/app");
        assert_eq!(
            result.iter().collect::<Vec<_>>(),
            vec![
                Path::new("/cache/rule-sets"),
                Path::new("/work/rule-sets"),
                Path::new("/work"),
                Path::new("/"),
            ]
        );

        let settings = SourceSettings {
            search_ancestors: false,
            ..settings
        };
        let result = CandidateList::from_settings(&settings, "/work/app");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn resolve_first_matching_local_candidate() -> anyhow::Result<()> {
        let first = TempDir::new()?;
        let second = TempDir::new()?;
        let third = TempDir::new()?;
        create_dir_all(first.path().join("nextjs/rules"))?;
        create_dir_all(second.path().join("python/rules"))?;
        write(second.path().join("python/AGENTS.md"), "conventions")?;
        create_dir_all(third.path().join("python/rules"))?;

        let candidates = CandidateList::new([first.path(), second.path(), third.path()]);
        let resolver = resolver(candidates, FakeRemote::default());
        let result = resolver.resolve(&python(), SourcePreference::Auto)?;

        assert_eq!(
            result.location(),
            &SourceLocation::LocalPath(second.path().to_path_buf())
        );
        assert_eq!(
            result.rules_dir(),
            Some(second.path().join("python/rules").as_path())
        );
        assert_eq!(
            result.instructions_file(),
            Some(second.path().join("python/AGENTS.md").as_path())
        );
        assert_eq!(resolver.fetcher.calls.get(), 0);

        Ok(())
    }

    #[test_case("nextjs"; "nextjs")]
    #[test_case("python"; "python")]
    #[test]
    fn resolve_builtin_rule_set_locally_without_fetch(id: &str) {
        let candidate = TempDir::new().unwrap();
        create_dir_all(candidate.path().join(id).join("rules")).unwrap();
        let id = Catalog::default().lookup(id).unwrap();

        let resolver = resolver(CandidateList::new([candidate.path()]), FakeRemote::default());
        let result = resolver.resolve(&id, SourcePreference::Auto).unwrap();

        pretty_assertions::assert_eq!(
            result.location(),
            &SourceLocation::LocalPath(candidate.path().to_path_buf())
        );
        pretty_assertions::assert_eq!(resolver.fetcher.calls.get(), 0);
    }

    #[test]
    fn builtin_rule_sets_all_resolve_locally() -> anyhow::Result<()> {
        let candidate = TempDir::new()?;
        for id in BUILTIN_RULE_SETS {
            create_dir_all(candidate.path().join(id).join("rules"))?;
        }

        let catalog = Catalog::default();
        let resolver = resolver(CandidateList::new([candidate.path()]), FakeRemote::default());
        for id in catalog.iter() {
            let result = resolver.resolve(&catalog.lookup(id)?, SourcePreference::Auto)?;
            assert!(!result.location().is_remote());
        }
        assert_eq!(resolver.fetcher.calls.get(), 0);

        Ok(())
    }

    #[test]
    fn resolve_skips_candidate_overlapping_target() -> anyhow::Result<()> {
        let parent = TempDir::new()?;
        let project = parent.path().join("python");
        create_dir_all(project.join("rules"))?;
        create_dir_all(project.join("nested"))?;
        write(project.join("AGENTS.md"), "operator conventions")?;

        let fetcher = FakeRemote {
            files: vec![("python/rules/x.rule", "x")],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::new([parent.path()]), fetcher)
            .excluding_target(&project);
        let result = resolver.resolve(&python(), SourcePreference::Auto)?;

        assert!(result.location().is_remote());
        assert_eq!(resolver.fetcher.calls.get(), 1);

        let resolver = Resolver::new(
            CandidateList::new([parent.path()]),
            RemoteSettings::default(),
            Layout::default(),
            FakeRemote::default(),
        )
        .excluding_target(project.join("nested"));
        let result = resolver.resolve(&python(), SourcePreference::Local);
        assert!(matches!(result, Err(SourceError::NotFound { .. })));

        Ok(())
    }

    #[test]
    fn resolve_remote_only_reports_no_local_search() {
        let fetcher = FakeRemote {
            files: vec![("nextjs/rules/x.rule", "x")],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::new(["/a", "/b"]), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Remote);

        let Err(error @ SourceError::NotFound { .. }) = result else {
            panic!("expected rule set to be missing");
        };
        assert!(matches!(&error, SourceError::NotFound { searched, .. } if searched.is_empty()));
        assert_eq!(
            error.to_string(),
            format!(
                "rule set \"python\" not found, searched no local candidates and remote {:?}",
                crate::config::DEFAULT_REMOTE_URL
            )
        );
    }

    #[test]
    fn remote_location_names_its_url() {
        let location = SourceLocation::RemoteMirror {
            url: "https://blah.org/rule-sets.git".into(),
            workspace: "/tmp/ruledrop-abc".into(),
        };
        assert_eq!(
            location.to_string(),
            "remote https://blah.org/rule-sets.git mirrored at /tmp/ruledrop-abc"
        );
    }

    #[test]
    fn resolve_local_without_instructions() -> anyhow::Result<()> {
        let candidate = TempDir::new()?;
        create_dir_all(candidate.path().join("python/rules"))?;

        let resolver = resolver(CandidateList::new([candidate.path()]), FakeRemote::default());
        let result = resolver.resolve(&python(), SourcePreference::Auto)?;
        assert_eq!(result.instructions_file(), None);
        assert_eq!(resolver.fetcher.calls.get(), 0);

        Ok(())
    }

    #[test]
    fn resolve_candidate_missing_rules_dir_is_skipped() -> anyhow::Result<()> {
        let candidate = TempDir::new()?;
        create_dir_all(candidate.path().join("python"))?;
        write(candidate.path().join("python/AGENTS.md"), "conventions")?;

        let fetcher = FakeRemote {
            files: vec![("python/rules/x.rule", "x")],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::new([candidate.path()]), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Auto)?;
        assert!(result.location().is_remote());
        assert_eq!(resolver.fetcher.calls.get(), 1);

        Ok(())
    }

    #[test]
    fn resolve_falls_back_to_single_remote_fetch() -> anyhow::Result<()> {
        let fetcher = FakeRemote {
            files: vec![
                ("python/rules/x.rule", "x"),
                ("python/rules/y.rule", "y"),
                ("python/AGENTS.md", "conventions"),
            ],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::default(), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Auto)?;

        assert!(result.location().is_remote());
        assert!(result.rules_dir().is_some());
        assert!(result.instructions_file().is_some());
        assert_eq!(resolver.fetcher.calls.get(), 1);

        let workspace = result.location().as_path().to_path_buf();
        assert!(workspace.exists());
        result.release();
        assert!(!workspace.exists());

        Ok(())
    }

    #[test]
    fn resolve_prefers_remote_when_asked() -> anyhow::Result<()> {
        let candidate = TempDir::new()?;
        create_dir_all(candidate.path().join("python/rules"))?;

        let fetcher = FakeRemote {
            files: vec![("python/rules/x.rule", "x")],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::new([candidate.path()]), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Remote)?;
        assert!(result.location().is_remote());
        assert_eq!(resolver.fetcher.calls.get(), 1);

        Ok(())
    }

    #[test]
    fn resolve_local_only_never_fetches() {
        let resolver = resolver(CandidateList::default(), FakeRemote::default());
        let result = resolver.resolve(&python(), SourcePreference::Local);
        assert!(matches!(
            result,
            Err(SourceError::NotFound { remote: None, .. })
        ));
        assert_eq!(resolver.fetcher.calls.get(), 0);
    }

    #[test]
    fn resolve_clone_failure_cleans_workspace() {
        let fetcher = FakeRemote {
            fail: true,
            ..Default::default()
        };
        let resolver = resolver(CandidateList::default(), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Auto);

        assert!(matches!(result, Err(SourceError::Fetch { .. })));
        assert_eq!(resolver.fetcher.calls.get(), 1);
        let workspace = resolver.fetcher.last_workspace.borrow().clone().unwrap();
        assert!(!workspace.exists());
    }

    #[test]
    fn resolve_absent_from_remote_cleans_workspace() {
        let fetcher = FakeRemote {
            files: vec![("nextjs/rules/x.rule", "x")],
            ..Default::default()
        };
        let resolver = resolver(CandidateList::default(), fetcher);
        let result = resolver.resolve(&python(), SourcePreference::Auto);

        assert!(matches!(
            result,
            Err(SourceError::NotFound { remote: Some(_), .. })
        ));
        let workspace = resolver.fetcher.last_workspace.borrow().clone().unwrap();
        assert!(!workspace.exists());
    }

    #[test]
    fn network_url_detection() {
        assert!(is_network_url("https://github.com/ruledrop/rule-sets.git"));
        assert!(is_network_url("git@github.com:ruledrop/rule-sets.git"));
        assert!(!is_network_url("file:///srv/rule-sets"));
        assert!(!is_network_url("/definitely/not/a/real/path/rule-sets"));
    }
}
