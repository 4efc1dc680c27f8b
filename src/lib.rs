//! Artifact Transfer - hub-mediated artifact push/pull/yank
//!
//! This crate implements the client side of the hub-mediated artifact
//! protocol: build jobs store, retrieve and delete named artifacts scoped
//! to a project, workflow or job, without ever holding blob-store
//! credentials. The hub issues short-lived signed URLs per operation; this
//! client resolves logical paths to remote keys, acquires the URL batch,
//! and executes the transfers.

pub mod config;
pub mod hub;
pub mod locator;
pub mod orchestrator;
pub mod paths;
pub mod scope;
pub mod transfer;

pub use config::HubConfig;
pub use locator::Artifact;
pub use orchestrator::{Orchestrator, PullOptions, PushOptions, TransferStats};
pub use paths::{Operation, ResolvedPath};
pub use scope::{ResourceScope, ScopeKind};
