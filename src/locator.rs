//! Local artifact enumeration
//!
//! Expands a resolved local source into the set of files to transfer. A
//! single file becomes one artifact; a directory is walked recursively and
//! every regular file under it becomes one artifact with its sub-structure
//! preserved in the remote key. Directories are never artifacts themselves.

use std::fs;
use std::io;
use std::path::PathBuf;

use walkdir::WalkDir;

use artifact_protocol::SignedUrl;

use crate::paths::{join_key, ResolvedPath};

/// One local-file-to-remote-key transfer unit.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Remote key this artifact maps to.
    pub remote_path: String,
    /// Local file it is read from (push) or written to (pull).
    pub local_path: PathBuf,
    /// Signed URLs attached by the orchestrator, in execution order.
    pub urls: Vec<SignedUrl>,
}

impl Artifact {
    pub fn new(remote_path: String, local_path: PathBuf) -> Self {
        Self {
            remote_path,
            local_path,
            urls: Vec::new(),
        }
    }
}

/// Artifact enumeration errors.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("source {path} is neither a file nor a directory")]
    SourceNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("walked path {} is not under the source root", path.display())]
    OutsideRoot { path: PathBuf },
}

/// Enumerate the artifacts under a resolved push source.
///
/// Walk order is lexical by file name, deterministic within one run.
pub fn locate(resolved: &ResolvedPath) -> Result<Vec<Artifact>, LocateError> {
    let source = PathBuf::from(&resolved.source);

    let meta = fs::metadata(&source).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            LocateError::SourceNotFound {
                path: resolved.source.clone(),
            }
        } else {
            LocateError::Io(e)
        }
    })?;

    if meta.is_file() {
        return Ok(vec![Artifact::new(
            resolved.destination.clone(),
            source,
        )]);
    }

    if !meta.is_dir() {
        return Err(LocateError::SourceNotFound {
            path: resolved.source.clone(),
        });
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(&source)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Remote key keeps the path relative to the walked source root.
        let rel = entry
            .path()
            .strip_prefix(&source)
            .map_err(|_| LocateError::OutsideRoot {
                path: entry.path().to_path_buf(),
            })?
            .to_string_lossy()
            .replace('\\', "/");
        let remote = join_key([resolved.destination.as_str(), rel.as_str()]);
        artifacts.push(Artifact::new(remote, entry.path().to_path_buf()));
    }

    Ok(artifacts)
}
