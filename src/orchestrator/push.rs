//! Push orchestration.

use artifact_protocol::OperationType;

use crate::locator;
use crate::paths::{self, Operation};
use crate::scope::ResourceScope;

use super::{Orchestrator, OrchestrateError, PushOptions, TransferStats};

impl Orchestrator {
    /// Push a local file or directory tree into the scope's remote space.
    ///
    /// Without `force`, each artifact gets a `[HEAD, PUT]` URL pair and an
    /// existing remote object fails the operation. With `force`, one PUT
    /// URL per artifact, no probe.
    pub async fn push(
        &self,
        scope: &ResourceScope,
        options: &PushOptions,
    ) -> Result<TransferStats, OrchestrateError> {
        let resolved = paths::resolve(
            scope,
            Operation::Push,
            &options.source,
            options.destination.as_deref(),
        )?;

        let mut artifacts = locator::locate(&resolved)?;
        let remote_keys: Vec<String> =
            artifacts.iter().map(|a| a.remote_path.clone()).collect();

        let operation = if options.force {
            OperationType::PushForce
        } else {
            OperationType::Push
        };
        let urls = self.hub.generate_signed_urls(&remote_keys, operation).await?;

        // Positional attachment: one URL per artifact when forced, a
        // [HEAD, PUT] pair otherwise. A count mismatch is a protocol
        // error, not a per-file condition; nothing is transferred.
        let per_artifact = if options.force { 1 } else { 2 };
        let expected = artifacts.len() * per_artifact;
        if urls.len() != expected {
            return Err(OrchestrateError::UrlCountMismatch {
                artifacts: artifacts.len(),
                expected,
                got: urls.len(),
            });
        }
        let mut chunks = urls.chunks_exact(per_artifact);
        for artifact in artifacts.iter_mut() {
            if let Some(chunk) = chunks.next() {
                artifact.urls = chunk.to_vec();
            }
        }

        let mut stats = TransferStats::default();
        for artifact in &artifacts {
            tracing::debug!(remote = %artifact.remote_path, "pushing artifact");
            let bytes = self.execute_artifact(artifact).await?;
            stats.record(bytes);
        }

        tracing::info!(
            files = stats.file_count,
            bytes = stats.total_bytes,
            "push complete"
        );
        Ok(stats)
    }
}
