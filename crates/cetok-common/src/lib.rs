//! Common pieces shared by the cetokjob crates: constants, telemetry, and YAML parsing

#![deny(missing_docs)]

pub mod telemetry;
pub mod yaml;

/// Service name reported in logs, traces, and metrics
pub const SERVICE_NAME: &str = "cetokjob";

/// Field manager recorded on every Job this service creates
pub const FIELD_MANAGER: &str = "cetokjob";

/// Default port for the CloudEvents HTTP receiver
pub const DEFAULT_RECEIVER_PORT: u16 = 8080;

/// File mounted into every pod that holds the pod's own namespace
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Label key identifying the tool that created a Job
pub const MANAGED_BY_LABEL_KEY: &str = "app.kubernetes.io/managed-by";

/// Label key recording which template a Job was generated from
pub const TEMPLATE_LABEL_KEY: &str = "cetokjob.dev/template";
