//! Job templates and the generator that turns event payloads into Kubernetes Jobs
//!
//! - `template` / `loader`: declared templates, their validation, and YAML loading
//! - `env`: payload keys to container environment variables
//! - `manifest`: one `batch/v1` Job per template with a unique name
//! - `generator`: the per-event loop with stop-at-first-failure semantics
//! - `submitter`: the seam to the Kubernetes API

pub mod env;
pub mod error;
pub mod generator;
pub mod loader;
pub mod manifest;
pub mod submitter;
pub mod template;

pub use error::{GenerateError, JobError, LoadError, TemplateError};
pub use generator::JobGenerator;
pub use loader::{load_template_file, load_templates};
pub use submitter::{JobSubmitter, KubeJobSubmitter};
pub use template::{JobTemplate, TemplateSet};
