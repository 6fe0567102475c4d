//! Resolve a tool kind to an executable, remembering the first hit.
//!
//! A [`Resolver`] snapshots its candidate list and search path when it is
//! built and never re-reads them. The first successful resolution is kept for
//! the resolver's lifetime; later calls return it even if a different candidate
//! list is passed or PATH has changed on disk since.
use std::collections::HashSet;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::{debug, instrument};

use crate::errors::{Result, SensibleError};
use crate::find::{parse_alias, SearchPath};
use crate::session::Session;
use crate::tool::ToolKind;

/// A resolved executable plus the fixed arguments its alias carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug)]
pub struct Resolver {
    kind: ToolKind,
    candidates: Vec<String>,
    search_path: SearchPath,
    cache: OnceCell<Resolved>,
}

impl Resolver {
    /// Resolver for `kind` using the current environment and PATH.
    pub fn new(kind: ToolKind) -> Self {
        Self::with_search_path(kind, kind.candidates(), SearchPath::from_env())
    }

    pub fn with_search_path(kind: ToolKind, candidates: Vec<String>, search_path: SearchPath) -> Self {
        Self {
            kind,
            candidates,
            search_path,
            cache: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// The remembered resolution, if any.
    pub fn cached(&self) -> Option<&Resolved> {
        self.cache.get()
    }

    /// Resolve the configured candidates into a ready-to-run session.
    pub fn find(&self) -> Result<Session> {
        let r = self.resolve(self.candidates.as_slice())?;
        Ok(Session::new(self.kind, r.path, r.args))
    }

    /// Resolve the first candidate present on the search path.
    #[instrument(level = "debug", skip_all, fields(tool = %self.kind))]
    pub fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Resolved> {
        if let Some(hit) = self.cache.get() {
            debug!(path = %hit.path.display(), "cache hit");
            return Ok(hit.clone());
        }
        self.cache
            .get_or_try_init(|| self.scan(candidates))
            .cloned()
    }

    fn scan<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Resolved> {
        let mut dir_errors = Vec::new();
        for candidate in candidates {
            let candidate: &str = candidate.as_ref();
            let Some((name, args)) = parse_alias(candidate) else {
                continue;
            };
            if let Some(path) = self.search_path.locate(&name, &mut dir_errors) {
                debug!(candidate, path = %path.display(), "resolved");
                return Ok(Resolved { path, args });
            }
        }
        // Each candidate rescans the same directories; report every one once.
        let mut seen = HashSet::new();
        dir_errors.retain(|(dir, _)| seen.insert(dir.clone()));
        Err(SensibleError::NotFound {
            tool: self.kind.as_str(),
            env_vars: self.kind.env_vars(),
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            dir_errors,
        })
    }
}
