//! Job generation error types

use std::path::PathBuf;

use k8s_openapi::api::batch::v1::Job;

/// A template that breaks one of the naming or content rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("name is required")]
    NameRequired,

    #[error("name must be no more than {max} characters")]
    NameTooLong { max: usize },

    #[error("\"{name}\" : DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character")]
    InvalidName { name: String },

    #[error("image is required")]
    ImageRequired,
}

/// Failure to load a template file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is a directory; directories are not supported", .path.display())]
    IsDirectory { path: PathBuf },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid template #{index} in {}: Config validate error: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        index: usize,
        source: TemplateError,
    },
}

/// Failure while generating jobs for one event
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("\"{key}\" : a valid environment variable name must consist of alphabetic characters, digits, '_', '-', or '.', and must not start with a digit")]
    InvalidEnvName { key: String },

    #[error("failed to create job for template '{template}': {source}")]
    Submission {
        template: String,
        source: kube::Error,
    },
}

/// Error from `JobGenerator::generate`, carrying the jobs created before the failure.
///
/// Created jobs are not rolled back; callers own deciding what to do with them.
#[derive(Debug, thiserror::Error)]
#[error("{source} ({} job(s) created before the failure)", .created.len())]
pub struct GenerateError {
    /// Jobs the orchestrator accepted before `source` occurred, in template order
    pub created: Vec<Job>,
    /// The failure that stopped generation
    pub source: JobError,
}

impl GenerateError {
    pub(crate) fn before_submission(source: JobError) -> Self {
        Self {
            created: Vec::new(),
            source,
        }
    }
}
