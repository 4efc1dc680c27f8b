//! Signed-URL batch response types.

use serde::{Deserialize, Serialize};

/// HTTP method a signed URL is authorized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Head,
    Get,
    Put,
    Delete,
}

impl Method {
    /// Returns the method as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pre-authorized URL issued by the hub.
///
/// Immutable once issued; consumed by exactly one HTTP execution. The hub
/// omits `method` for yank batches, in which case the client fixes it to
/// DELETE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

/// Response body of the signed-URL batch endpoint.
///
/// `urls` is in request order; a non-empty `error` means the whole batch
/// was refused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateUrlsResponse {
    #[serde(default)]
    pub urls: Vec<SignedUrl>,
    #[serde(default)]
    pub error: String,
}
