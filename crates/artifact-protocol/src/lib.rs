//! Artifact Hub Protocol Types
//!
//! Defines the JSON request/response pair for the hub's signed-URL batch
//! endpoint. The hub authorizes one logical operation (push, pull, yank)
//! over a batch of remote keys and answers with pre-authorized URLs in
//! request order; callers depend on that positional matching.

pub mod request;
pub mod response;

pub use request::{GenerateUrlsRequest, OperationType, UnknownOperationType};
pub use response::{GenerateUrlsResponse, Method, SignedUrl};

/// Path of the signed-URL batch endpoint, relative to the hub base URL.
pub const API_PATH: &str = "/api/v1/artifacts";
