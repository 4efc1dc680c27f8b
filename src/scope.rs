//! Resource scope resolution
//!
//! Every remote artifact key is namespaced by a project, workflow, or job.
//! The identifier comes from an explicit CLI override or from the
//! environment the build system injects into the job.

use std::env;

/// Environment variable carrying the default project identifier.
pub const PROJECT_ID_ENV: &str = "ARTIFACT_PROJECT_ID";
/// Environment variable carrying the default workflow identifier.
pub const WORKFLOW_ID_ENV: &str = "ARTIFACT_WORKFLOW_ID";
/// Environment variable carrying the default job identifier.
pub const JOB_ID_ENV: &str = "ARTIFACT_JOB_ID";

/// Kind of resource a transfer is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Project,
    Workflow,
    Job,
}

impl ScopeKind {
    /// Plural form used as the second segment of every remote key.
    pub fn plural(&self) -> &'static str {
        match self {
            ScopeKind::Project => "projects",
            ScopeKind::Workflow => "workflows",
            ScopeKind::Job => "jobs",
        }
    }

    fn env_var(&self) -> &'static str {
        match self {
            ScopeKind::Project => PROJECT_ID_ENV,
            ScopeKind::Workflow => WORKFLOW_ID_ENV,
            ScopeKind::Job => JOB_ID_ENV,
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScopeKind::Project => "project",
            ScopeKind::Workflow => "workflow",
            ScopeKind::Job => "job",
        };
        write!(f, "{s}")
    }
}

/// Scope resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("{kind} identifier not set; pass it explicitly or export {env_var}")]
    Unresolved {
        kind: ScopeKind,
        env_var: &'static str,
    },
}

/// A fully resolved scope: kind plus a non-empty identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    pub kind: ScopeKind,
    pub identifier: String,
}

impl ResourceScope {
    /// Resolve a scope from an explicit override or the environment.
    ///
    /// The override wins when non-empty; otherwise the kind's environment
    /// variable supplies the identifier. Both empty is an error.
    pub fn resolve(kind: ScopeKind, identifier: Option<&str>) -> Result<Self, ScopeError> {
        let explicit = identifier.unwrap_or("").trim();
        let identifier = if explicit.is_empty() {
            env::var(kind.env_var()).unwrap_or_default()
        } else {
            explicit.to_string()
        };

        if identifier.is_empty() {
            return Err(ScopeError::Unresolved {
                kind,
                env_var: kind.env_var(),
            });
        }

        Ok(Self { kind, identifier })
    }
}
