//! Speed ramps and concatenation through the system `ffmpeg` CLI, working on files instead of
//! in-memory blobs.

pub(crate) mod concat;
pub(crate) mod ramp;

use std::path::Path;

/// Single-quoted path for concat-demuxer lists (`'` becomes `'\''`).
pub(crate) fn quote_concat_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "../../tests/unit/cli_stitch/lists.rs"]
mod tests;
