//! Capability-scoped access to single files named by ambient paths.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};

/// Open the parent directory of `path` and return it with the file name.
///
/// A bare file name resolves against the working directory.
pub(crate) fn open_parent(path: &Path) -> io::Result<(Dir, PathBuf)> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path must name a file")
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((directory, PathBuf::from(file_name)))
}
