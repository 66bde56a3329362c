//! Capability-based file helpers for model artefacts and dataset files.
//!
//! Every operation opens the containing directory with ambient authority
//! and then works relative to it through `cap-std`, so callers hand over
//! plain UTF-8 paths while the filesystem access itself stays scoped.
#![forbid(unsafe_code)]

use std::io;
use std::process;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Split `path` into its root anchor (`/`, a drive prefix, or `.`) and the
/// remainder relative to it.
fn anchor_and_rest(path: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut anchor = Utf8PathBuf::new();
    let mut rest = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => anchor.push(component.as_str()),
            other => rest.push(other.as_str()),
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    (anchor, rest)
}

/// Open the directory that contains `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or the directory cannot be opened.
pub fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
///
/// # Errors
/// Propagates I/O errors from opening the anchor or creating directories.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (anchor, rest) = anchor_and_rest(parent);
    if rest.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?.create_dir_all(&rest)
}

/// Read the whole file at `path`.
///
/// # Errors
/// Propagates I/O errors, including `NotFound` for a missing file.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_parent(path)?;
    dir.read(&name)
}

/// Replace the file at `path` with `contents` in one step.
///
/// The bytes are written to a temporary sibling which is then renamed
/// over the target, so readers see either the old or the new file. The
/// parent directory is created when missing.
///
/// # Errors
/// Propagates I/O errors. The temporary file is removed on failure.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    let staging = format!(".{name}.tmp-{}", process::id());
    if let Err(err) = dir
        .write(&staging, contents)
        .and_then(|()| dir.rename(&staging, &dir, &name))
    {
        let _cleanup = dir.remove_file(&staging);
        return Err(err);
    }
    Ok(())
}

/// Report whether `path` exists and is a regular file.
///
/// # Errors
/// Fails when the parent directory cannot be opened. A missing file in an
/// existing directory yields `Ok(false)`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    match dir.metadata(&name) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
