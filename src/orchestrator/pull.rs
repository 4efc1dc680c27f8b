//! Pull orchestration.

use std::path::{Path, PathBuf};

use artifact_protocol::OperationType;

use crate::locator::Artifact;
use crate::paths::{self, lexical_clean, Operation};
use crate::scope::ResourceScope;
use crate::transfer::{extract_object_key, TransferError};

use super::{Orchestrator, OrchestrateError, PullOptions, TransferStats};

impl Orchestrator {
    /// Pull a remote key or prefix into a local destination.
    ///
    /// The hub expands a directory prefix into one GET URL per object; the
    /// object key parsed back out of each URL decides where the file lands
    /// under the destination. Without `force`, any pre-existing local path
    /// aborts before anything is downloaded.
    pub async fn pull(
        &self,
        scope: &ResourceScope,
        options: &PullOptions,
    ) -> Result<TransferStats, OrchestrateError> {
        let resolved = paths::resolve(
            scope,
            Operation::Pull,
            &options.source,
            options.destination.as_deref(),
        )?;

        let urls = self
            .hub
            .generate_signed_urls(
                std::slice::from_ref(&resolved.source),
                OperationType::Pull,
            )
            .await?;

        let mut artifacts = Vec::with_capacity(urls.len());
        for signed in urls {
            let key = extract_object_key(&signed.url)?;
            let local = local_path_for(&key, &resolved.source, &resolved.destination)?;
            let mut artifact = Artifact::new(key, local);
            artifact.urls = vec![signed];
            artifacts.push(artifact);
        }

        if !options.force {
            for artifact in &artifacts {
                if artifact.local_path.exists() {
                    return Err(OrchestrateError::LocalExists {
                        path: artifact.local_path.display().to_string(),
                    });
                }
            }
        }

        let mut stats = TransferStats::default();
        for artifact in &artifacts {
            tracing::debug!(
                remote = %artifact.remote_path,
                local = %artifact.local_path.display(),
                "pulling artifact"
            );
            let bytes = self.execute_artifact(artifact).await?;
            stats.record(bytes);
        }

        tracing::info!(
            files = stats.file_count,
            bytes = stats.total_bytes,
            "pull complete"
        );
        Ok(stats)
    }
}

/// Re-root an object key under the local destination.
///
/// A key equal to the requested remote source is a single-file pull and
/// lands at the destination itself; anything below the source prefix keeps
/// its relative sub-structure.
fn local_path_for(
    key: &str,
    remote_source: &str,
    destination: &str,
) -> Result<PathBuf, OrchestrateError> {
    if key == remote_source {
        return Ok(PathBuf::from(destination));
    }
    let prefix = format!("{remote_source}/");
    match key.strip_prefix(&prefix) {
        Some(rel) if !rel.is_empty() => {
            Ok(Path::new(&lexical_clean(destination)).join(rel))
        }
        _ => Err(TransferError::UnparseableUrl {
            url: key.to_string(),
            reason: format!("object key is outside the requested prefix {remote_source}"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_pull_lands_at_destination() {
        let local = local_path_for(
            "artifacts/jobs/J1/x.zip",
            "artifacts/jobs/J1/x.zip",
            "x.zip",
        )
        .unwrap();
        assert_eq!(local, PathBuf::from("x.zip"));
    }

    #[test]
    fn test_prefix_pull_keeps_substructure() {
        let local = local_path_for(
            "artifacts/jobs/J1/first/sub/file2.txt",
            "artifacts/jobs/J1/first",
            "first",
        )
        .unwrap();
        assert_eq!(local, PathBuf::from("first/sub/file2.txt"));
    }

    #[test]
    fn test_key_outside_prefix_rejected() {
        let err = local_path_for(
            "artifacts/jobs/J2/other.txt",
            "artifacts/jobs/J1/first",
            "first",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OrchestrateError::Transfer(TransferError::UnparseableUrl { .. })
        ));
    }
}
