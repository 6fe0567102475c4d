//! Tool kinds: which environment variables and fallbacks feed each resolver.
use std::env;
use std::fmt;

/// Scratch file prefix for tools without one of their own.
pub const SCRATCH_PREFIX: &str = "sensible_";

/// The three kinds of interactive tool this crate knows how to find.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ToolKind {
    Editor,
    Browser,
    Pager,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Editor => "editor",
            ToolKind::Browser => "browser",
            ToolKind::Pager => "pager",
        }
    }

    /// Environment variables consulted, most specific first.
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Editor => &["EDITOR", "VISUAL"],
            ToolKind::Browser => &["BROWSER"],
            ToolKind::Pager => &["GIT_PAGER", "PAGER"],
        }
    }

    /// Commonly installed tools, tried after the environment.
    pub fn fallbacks(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Editor => &[
                "vim", "nvim", "vi", "emacs", "nano", "pico", "qe", "mg", "jed", "gedit",
                "mc-edit",
            ],
            ToolKind::Browser => &["open", "google-chrome-stable", "firefox", "chromium"],
            ToolKind::Pager => &["less", "more"],
        }
    }

    /// Prefix for scratch files handed to this kind of tool. Only editors are
    /// given scratch files by the helpers; other kinds share a generic prefix.
    pub fn scratch_prefix(&self) -> &'static str {
        match self {
            ToolKind::Editor => "sedit_",
            _ => SCRATCH_PREFIX,
        }
    }

    /// Extra advice attached to launch failures.
    pub(crate) fn spawn_hint(&self) -> Option<&'static str> {
        match self {
            ToolKind::Browser => {
                Some("Make sure that $BROWSER environment variable is set correctly")
            }
            _ => None,
        }
    }

    /// Candidate list from the process environment.
    pub fn candidates(&self) -> Vec<String> {
        self.candidates_with(|k| env::var(k).ok())
    }

    /// Candidate list with environment values taken from `lookup`; empty values are dropped.
    pub fn candidates_with<F>(&self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out: Vec<String> = self
            .env_vars()
            .iter()
            .filter_map(|k| lookup(*k))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        out.extend(self.fallbacks().iter().map(|s| s.to_string()));
        out
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
