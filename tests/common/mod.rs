#![allow(dead_code)]
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sensible::{Resolver, SearchPath, ToolKind};

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
pub fn stub_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    p
}

/// Resolver over `dirs` only, with `candidates` as its configured list.
pub fn resolver_in(kind: ToolKind, dirs: &[&Path], candidates: &[&str]) -> Resolver {
    Resolver::with_search_path(
        kind,
        candidates.iter().map(|s| s.to_string()).collect(),
        SearchPath::new(dirs.iter().copied()),
    )
}

pub fn no_inputs() -> std::iter::Empty<&'static str> {
    std::iter::empty()
}
