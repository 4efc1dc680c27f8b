//! Signed-URL execution
//!
//! Executes the single HTTP method a signed URL embodies against the blob
//! store. All four verbs run through one retryable send primitive: bounded
//! attempts, doubling backoff capped at one second, retries on connection
//! failure and 5xx only. 4xx outcomes are never retried.

mod object_key;

pub use object_key::extract_object_key;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use artifact_protocol::Method;

/// Maximum attempts per signed-URL execution, including the first.
const MAX_ATTEMPTS: u32 = 4;

/// Base delay between attempts (doubles each retry, capped below).
const BASE_DELAY_MS: u64 = 125;

/// Longest wait between attempts.
const MAX_DELAY_MS: u64 = 1_000;

/// Signed-URL execution errors.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("request failed after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}")]
    RemoteRequestFailed {
        method: Method,
        url: String,
        status: StatusCode,
    },

    #[error("artifact {remote_path} already exists; pass --force to overwrite")]
    AlreadyExists { remote_path: String },

    #[error("signed URL {url} carries no method")]
    MissingMethod { url: String },

    #[error("unrecognized signed-URL host {host:?} in {url}")]
    UnrecognizedHost { host: String, url: String },

    #[error("signed URL {url} is not parseable: {reason}")]
    UnparseableUrl { url: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TransferError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn transport(source: reqwest::Error) -> Self {
        TransferError::Transport {
            attempts: 1,
            source,
        }
    }
}

/// Executes signed URLs against the blob store.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    http: reqwest::Client,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Send a request, retrying on connection failure and 5xx.
    ///
    /// The closure builds and dispatches one attempt; it is re-invoked per
    /// retry so request bodies (e.g. a streamed file) start from scratch
    /// each time. Returns the terminal response even when it is non-2xx;
    /// interpreting the status is per-verb. Only transport failures are
    /// retried; any other error from an attempt surfaces immediately.
    async fn send_with_retry<F, Fut>(&self, send: F) -> Result<reqwest::Response, TransferError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, TransferError>>,
    {
        // Retry attempts with backoff, then one final attempt.
        for attempt in 1..MAX_ATTEMPTS {
            match send().await {
                Ok(resp) if resp.status().is_server_error() => {
                    tracing::warn!(attempt, status = %resp.status(), "server error, will retry");
                }
                Ok(resp) => return Ok(resp),
                Err(TransferError::Transport { source, .. }) => {
                    tracing::warn!(attempt, "request failed, will retry: {source}");
                }
                Err(other) => return Err(other),
            }
            tokio::time::sleep(backoff_delay(attempt)).await;
        }

        match send().await {
            Ok(resp) => Ok(resp),
            Err(TransferError::Transport { source, .. }) => Err(TransferError::Transport {
                attempts: MAX_ATTEMPTS,
                source,
            }),
            Err(other) => Err(other),
        }
    }

    /// HEAD: probe whether the remote object exists.
    ///
    /// Any 2xx means the object is present, which blocks a non-forced push.
    /// Any non-2xx means absent and the transfer may proceed.
    pub async fn probe_absent(&self, url: &str, remote_path: &str) -> Result<(), TransferError> {
        let resp = self
            .send_with_retry(|| async {
                self.http
                    .head(url)
                    .send()
                    .await
                    .map_err(TransferError::transport)
            })
            .await?;
        if resp.status().is_success() {
            return Err(TransferError::AlreadyExists {
                remote_path: remote_path.to_string(),
            });
        }
        Ok(())
    }

    /// GET: stream the remote object into a newly created local file.
    ///
    /// Parent directories are created as needed. On any failure the
    /// partially written file is removed. Returns bytes written.
    pub async fn download(&self, url: &str, local_path: &Path) -> Result<u64, TransferError> {
        let resp = self
            .send_with_retry(|| async {
                self.http
                    .get(url)
                    .send()
                    .await
                    .map_err(TransferError::transport)
            })
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::RemoteRequestFailed {
                method: Method::Get,
                url: url.to_string(),
                status,
            });
        }

        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TransferError::io(parent, e))?;
            }
        }

        let written = match self.copy_body(resp, local_path).await {
            Ok(written) => written,
            Err(e) => {
                // Never leave a truncated artifact behind.
                let _ = fs::remove_file(local_path).await;
                return Err(e);
            }
        };
        Ok(written)
    }

    async fn copy_body(
        &self,
        mut resp: reqwest::Response,
        local_path: &Path,
    ) -> Result<u64, TransferError> {
        let mut file = fs::File::create(local_path)
            .await
            .map_err(|e| TransferError::io(local_path, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await.map_err(TransferError::transport)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| TransferError::io(local_path, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| TransferError::io(local_path, e))?;
        Ok(written)
    }

    /// PUT: upload the local file body. Empty files send a body-less
    /// request. Returns bytes sent.
    pub async fn upload(&self, url: &str, local_path: &Path) -> Result<u64, TransferError> {
        let meta = fs::metadata(local_path)
            .await
            .map_err(|e| TransferError::io(local_path, e))?;
        let size = meta.len();

        let resp = if size == 0 {
            self.send_with_retry(|| async {
                self.http
                    .put(url)
                    .send()
                    .await
                    .map_err(TransferError::transport)
            })
            .await?
        } else {
            // A fresh handle per attempt so a retried PUT streams the
            // file from the start instead of resending a spent body.
            self.send_with_retry(|| async {
                let file = fs::File::open(local_path)
                    .await
                    .map_err(|e| TransferError::io(local_path, e))?;
                self.http
                    .put(url)
                    .header(reqwest::header::CONTENT_LENGTH, size)
                    .body(file)
                    .send()
                    .await
                    .map_err(TransferError::transport)
            })
            .await?
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::RemoteRequestFailed {
                method: Method::Put,
                url: url.to_string(),
                status,
            });
        }
        Ok(size)
    }

    /// DELETE: remove the remote object.
    pub async fn delete(&self, url: &str) -> Result<StatusCode, TransferError> {
        let resp = self
            .send_with_retry(|| async {
                self.http
                    .delete(url)
                    .send()
                    .await
                    .map_err(TransferError::transport)
            })
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::RemoteRequestFailed {
                method: Method::Delete,
                url: url.to_string(),
                status,
            });
        }
        Ok(status)
    }
}

/// Delay before the given (1-based) retry attempt.
fn backoff_delay(attempt: u32) -> Duration {
    let ms = BASE_DELAY_MS.saturating_mul(1 << (attempt - 1));
    Duration::from_millis(ms.min(MAX_DELAY_MS))
}
