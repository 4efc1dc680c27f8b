//! Yank orchestration.

use reqwest::StatusCode;

use artifact_protocol::OperationType;

use crate::hub::HubError;
use crate::paths::{self, Operation};
use crate::scope::ResourceScope;
use crate::transfer::TransferError;

use super::{Orchestrator, OrchestrateError, TransferStats};

impl Orchestrator {
    /// Delete a remote key or prefix.
    ///
    /// The hub omits the HTTP method for yank batches, so DELETE is issued
    /// directly regardless of what the URL carries. A key that no longer
    /// exists is a successful no-op: nothing to delete is not an error.
    pub async fn yank(
        &self,
        scope: &ResourceScope,
        path: &str,
    ) -> Result<TransferStats, OrchestrateError> {
        let resolved = paths::resolve(scope, Operation::Yank, path, None)?;

        let urls = match self
            .hub
            .generate_signed_urls(
                std::slice::from_ref(&resolved.source),
                OperationType::Yank,
            )
            .await
        {
            Ok(urls) => urls,
            Err(HubError::Request { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::info!(remote = %resolved.source, "nothing to yank");
                return Ok(TransferStats::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut stats = TransferStats::default();
        for signed in urls {
            tracing::debug!(url = %signed.url, "deleting remote object");
            match self.executor.delete(&signed.url).await {
                Ok(_) => stats.record(0),
                // The object vanished between signing and execution.
                Err(TransferError::RemoteRequestFailed { status, .. })
                    if status == StatusCode::NOT_FOUND => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(files = stats.file_count, "yank complete");
        Ok(stats)
    }
}
