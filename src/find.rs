//! Executable discovery on the search path.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SensibleError};

/// Directories searched when PATH is unset or empty.
pub const BASE_PATH: &[&str] = &["/usr/local/bin", "/usr/bin", "/usr/sbin", "/bin"];

/// Ordered list of directories scanned for executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Search path from the current PATH.
    pub fn from_env() -> Self {
        Self::from_value(env::var_os("PATH"))
    }

    /// Search path from a PATH-like value; empty entries are skipped and an
    /// unset or empty value falls back to [`BASE_PATH`].
    pub fn from_value(value: Option<OsString>) -> Self {
        let dirs: Vec<PathBuf> = match value {
            Some(v) if !v.is_empty() => env::split_paths(&v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            _ => Vec::new(),
        };
        if dirs.is_empty() {
            return Self::new(BASE_PATH.iter().copied());
        }
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Look up a single bare executable name.
    pub fn lookup(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(SensibleError::InvalidArgument("empty name".to_string()));
        }
        let mut dir_errors = Vec::new();
        if let Some(p) = self.locate(name, &mut dir_errors) {
            return Ok(p);
        }
        Err(SensibleError::NotFound {
            tool: "executable",
            env_vars: &[],
            candidates: vec![name.to_string()],
            dir_errors,
        })
    }

    /// Resolve `name` to an executable path, recording unreadable directories
    /// in `dir_errors` instead of stopping.
    ///
    /// Names containing a path separator are checked as-is.
    pub(crate) fn locate(
        &self,
        name: &str,
        dir_errors: &mut Vec<(PathBuf, io::Error)>,
    ) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if has_separator(name) {
            let p = PathBuf::from(name);
            return match fs::symlink_metadata(&p) {
                Ok(md) if is_runnable(&p, md.file_type()) => Some(p),
                Ok(_) => None,
                Err(e) => {
                    debug!(path = %p.display(), error = %e, "candidate path not usable");
                    None
                }
            };
        }
        for dir in &self.dirs {
            let entries = match fs::read_dir(dir) {
                Ok(it) => it,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable search path entry");
                    dir_errors.push((dir.clone(), e));
                    continue;
                }
            };
            for entry in entries.flatten() {
                if entry.file_name() != name {
                    continue;
                }
                let Ok(ft) = entry.file_type() else {
                    continue;
                };
                let p = entry.path();
                if is_runnable(&p, ft) {
                    debug!(name, path = %p.display(), "found executable");
                    return Some(p);
                }
            }
        }
        None
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Find `name` on the current PATH.
pub fn executable(name: &str) -> Result<PathBuf> {
    SearchPath::from_env().lookup(name)
}

/// Split an alias such as `vim -e` or `nvim -c ":normal G"` into the executable
/// and its fixed arguments. Returns `None` for blank aliases.
pub fn parse_alias(alias: &str) -> Option<(String, Vec<String>)> {
    let alias = alias.trim();
    if alias.is_empty() {
        return None;
    }
    let words = shlex::split(alias)
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| alias.split_whitespace().map(str::to_string).collect());
    let mut it = words.into_iter();
    let name = it.next()?;
    if name.is_empty() {
        return None;
    }
    Some((name, it.collect()))
}

fn has_separator(name: &str) -> bool {
    name.contains('/') || (cfg!(windows) && name.contains('\\'))
}

/// Regular files and symlinks with an executable bit; symlinks are judged by their target.
fn is_runnable(path: &Path, ft: fs::FileType) -> bool {
    if ft.is_file() {
        return fs::metadata(path).map(|md| is_executable(&md)).unwrap_or(false);
    }
    if ft.is_symlink() {
        return match fs::metadata(path) {
            Ok(md) => !md.is_dir() && is_executable(&md),
            Err(_) => false,
        };
    }
    false
}

#[cfg(unix)]
fn is_executable(md: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(md: &fs::Metadata) -> bool {
    md.is_file()
}
