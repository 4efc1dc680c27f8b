//! Path resolution and normalization
//!
//! Maps a user-supplied path plus a resource scope to a canonical remote
//! key and a local filesystem path, per operation. Remote keys are always
//! slash-separated and relative: `artifacts/<pluralKind>/<identifier>/<rel>`.
//!
//! All routines here are purely lexical; nothing touches the filesystem.

use crate::scope::ResourceScope;

/// First segment of every remote key.
pub const REMOTE_ROOT: &str = "artifacts";

/// Operation kind a path is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Push,
    Pull,
    Yank,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Yank => "yank",
        };
        write!(f, "{s}")
    }
}

/// Path resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("source path is empty")]
    EmptySource,
    #[error("{operation}: path {path:?} resolves to nothing inside the scope")]
    OutsideScope { operation: Operation, path: String },
}

/// Resolved source/destination pair.
///
/// For push, `source` is local and `destination` is a remote key. For pull,
/// `source` is a remote key (or prefix) and `destination` is local. For
/// yank, `source` is the remote key and `destination` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub source: String,
    pub destination: String,
}

/// Lexically clean a slash-separated path.
///
/// Collapses `.` segments, repeated separators, and `..` where a parent is
/// available; a rooted path never escapes `/`. The empty path cleans to
/// `"."`.
pub fn lexical_clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&"..") => out.push(".."),
                Some(_) => {
                    out.pop();
                }
                None => {
                    if !rooted {
                        out.push("..");
                    }
                }
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Normalize a path into a relative remote-key component.
///
/// After lexical cleaning, a result made solely of dot characters means the
/// path resolved to the root and yields the empty string. Otherwise the
/// leading run of `.` and `/` characters is stripped so the result starts
/// at the first real path component.
pub fn to_relative(path: &str) -> String {
    let cleaned = lexical_clean(path);
    if cleaned.chars().all(|c| c == '.') {
        return String::new();
    }
    cleaned
        .trim_start_matches(|c| c == '.' || c == '/')
        .to_string()
}

/// Last component of a slash-separated path, after cleaning.
pub fn base_name(path: &str) -> String {
    let cleaned = lexical_clean(path);
    cleaned
        .rsplit('/')
        .next()
        .unwrap_or(cleaned.as_str())
        .to_string()
}

/// Join key segments with `/`, skipping empty segments.
pub fn join_key<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Prefix a normalized relative path with the scope's remote-key root.
pub fn prefixed(scope: &ResourceScope, relative: &str) -> String {
    join_key([
        REMOTE_ROOT,
        scope.kind.plural(),
        scope.identifier.as_str(),
        relative,
    ])
}

/// Resolve a user path into a source/destination pair for one operation.
pub fn resolve(
    scope: &ResourceScope,
    operation: Operation,
    source: &str,
    destination: Option<&str>,
) -> Result<ResolvedPath, PathError> {
    if source.is_empty() {
        return Err(PathError::EmptySource);
    }
    let destination = destination.filter(|d| !d.is_empty());

    match operation {
        Operation::Push => {
            // Remote filename defaults to the basename of the local source.
            let remote_name = match destination {
                Some(d) => d.to_string(),
                None => base_name(source),
            };
            let remote = to_relative(&remote_name);
            if remote.is_empty() {
                return Err(PathError::OutsideScope {
                    operation,
                    path: source.to_string(),
                });
            }
            Ok(ResolvedPath {
                source: lexical_clean(source),
                destination: prefixed(scope, &remote),
            })
        }
        Operation::Pull => {
            let remote = to_relative(source);
            if remote.is_empty() {
                return Err(PathError::OutsideScope {
                    operation,
                    path: source.to_string(),
                });
            }
            let local = destination.map_or_else(|| base_name(source), str::to_string);
            Ok(ResolvedPath {
                source: prefixed(scope, &remote),
                destination: lexical_clean(&local),
            })
        }
        Operation::Yank => {
            let remote = to_relative(source);
            if remote.is_empty() {
                return Err(PathError::OutsideScope {
                    operation,
                    path: source.to_string(),
                });
            }
            Ok(ResolvedPath {
                source: prefixed(scope, &remote),
                destination: String::new(),
            })
        }
    }
}
