//! Scratch files for the edit round-trip.
use std::fs;
use std::io::Write;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::errors::Result;
use crate::session::Session;

/// Create a scratch file in the shared temp directory holding `text`.
/// The file is removed when the returned handle is dropped.
pub fn stage(prefix: &str, text: &str) -> Result<NamedTempFile> {
    let mut f = Builder::new().prefix(prefix).tempfile()?;
    f.write_all(text.as_bytes())?;
    f.as_file_mut().sync_all()?;
    debug!(path = %f.path().display(), bytes = text.len(), "staged scratch file");
    Ok(f)
}

/// Stage `text`, run `session` on the scratch file, read it back.
/// The scratch file is gone afterwards on every path.
pub fn round_trip(session: &mut Session, text: &str) -> Result<String> {
    let f = stage(session.kind().scratch_prefix(), text)?;
    session.run([f.path()])?;
    // Editors may replace the file on save, so read by path rather than through the handle.
    let out = fs::read_to_string(f.path())?;
    Ok(out)
}
