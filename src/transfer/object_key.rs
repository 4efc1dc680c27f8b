//! Object-key extraction from signed URLs
//!
//! Pull operates on a key prefix, so the hub may answer with URLs for many
//! objects. The object key is recovered from each URL itself to compute the
//! artifact's local path. Three URL shapes are recognized:
//!
//! - Google storage: `https://storage.googleapis.com/<bucket>/<key>?...`
//!   (bucket segment dropped)
//! - S3: `https://<bucket>.s3[.<region>].amazonaws.com/<prefix>/<key>?...`
//!   (leading prefix segment dropped)
//! - Loopback test server: `http://127.0.0.1:<port>/<key>` (path verbatim)

use url::{Host, Url};

use super::TransferError;

const GCS_HOST: &str = "storage.googleapis.com";
const S3_HOST_SUFFIX: &str = ".amazonaws.com";

/// Recover the remote object key embedded in a signed URL.
pub fn extract_object_key(signed_url: &str) -> Result<String, TransferError> {
    let parsed = Url::parse(signed_url).map_err(|e| TransferError::UnparseableUrl {
        url: signed_url.to_string(),
        reason: e.to_string(),
    })?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(other) => other.to_string(),
        None => {
            return Err(TransferError::UnparseableUrl {
                url: signed_url.to_string(),
                reason: "missing host".to_string(),
            })
        }
    };

    let path = parsed.path().trim_start_matches('/');

    if host == GCS_HOST || host.ends_with(S3_HOST_SUFFIX) {
        // First segment is the bucket (GCS) or a storage prefix (S3);
        // either way the key starts after it.
        return match path.split_once('/') {
            Some((_, key)) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(TransferError::UnparseableUrl {
                url: signed_url.to_string(),
                reason: "no object key after leading segment".to_string(),
            }),
        };
    }

    if host == "127.0.0.1" {
        return Ok(path.to_string());
    }

    Err(TransferError::UnrecognizedHost {
        host,
        url: signed_url.to_string(),
    })
}
