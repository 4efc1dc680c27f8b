//! Transfer orchestration
//!
//! Composes path resolution, artifact location, the hub batch protocol and
//! signed-URL execution into the three user-facing operations: push, pull,
//! yank. URL attachment is strictly positional; a batch whose URL count
//! does not match the artifact set aborts before any transfer begins.

mod pull;
mod push;
mod yank;

use serde::Serialize;

use artifact_protocol::Method;

use crate::config::HubConfig;
use crate::hub::{HubClient, HubError};
use crate::locator::{Artifact, LocateError};
use crate::paths::PathError;
use crate::scope::ScopeError;
use crate::transfer::{Executor, TransferError};

/// Push options.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Local file or directory to push.
    pub source: String,
    /// Remote destination override; defaults to the source basename.
    pub destination: Option<String>,
    /// Skip the existence probe and overwrite.
    pub force: bool,
}

/// Pull options.
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Remote key or prefix to pull.
    pub source: String,
    /// Local destination override; defaults to the source basename.
    pub destination: Option<String>,
    /// Overwrite pre-existing local files.
    pub force: bool,
}

/// Counters for completed transfers only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferStats {
    pub file_count: u64,
    pub total_bytes: u64,
}

impl TransferStats {
    /// Record one completed transfer.
    pub fn record(&mut self, bytes: u64) {
        self.file_count += 1;
        self.total_bytes += bytes;
    }
}

/// Orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrateError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("hub issued {got} signed URLs for {artifacts} artifacts (expected {expected})")]
    UrlCountMismatch {
        artifacts: usize,
        expected: usize,
        got: usize,
    },

    #[error("local path {path} already exists; pass --force to overwrite")]
    LocalExists { path: String },
}

/// Drives push, pull and yank against one hub.
///
/// Explicitly constructed from configuration; holds no global state.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    hub: HubClient,
    executor: Executor,
}

impl Orchestrator {
    pub fn new(config: &HubConfig) -> Result<Self, OrchestrateError> {
        Ok(Self {
            hub: HubClient::new(config)?,
            executor: Executor::new(),
        })
    }

    /// Execute one artifact's attached URLs in order.
    ///
    /// Returns the bytes moved by the artifact's GET or PUT. A HEAD that
    /// finds the object present aborts before the paired PUT runs.
    async fn execute_artifact(&self, artifact: &Artifact) -> Result<u64, OrchestrateError> {
        let mut bytes = 0;
        for signed in &artifact.urls {
            let method = signed.method.ok_or_else(|| TransferError::MissingMethod {
                url: signed.url.clone(),
            })?;
            match method {
                Method::Head => {
                    self.executor
                        .probe_absent(&signed.url, &artifact.remote_path)
                        .await?
                }
                Method::Put => {
                    bytes = self
                        .executor
                        .upload(&signed.url, &artifact.local_path)
                        .await?
                }
                Method::Get => {
                    bytes = self
                        .executor
                        .download(&signed.url, &artifact.local_path)
                        .await?
                }
                Method::Delete => {
                    self.executor.delete(&signed.url).await?;
                }
            }
        }
        Ok(bytes)
    }
}
