//! Job manifest construction
//!
//! Each template plus the event's environment becomes one `batch/v1` Job whose
//! name is `{template}-{fnv1a(pod template)}-{unix seconds}`.

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapEnvSource, Container, EnvFromSource, EnvVar, PodSpec, PodTemplateSpec,
    SecretEnvSource,
};
use kube::api::ObjectMeta;

use cetok_common::{MANAGED_BY_LABEL_KEY, SERVICE_NAME, TEMPLATE_LABEL_KEY};

use crate::template::JobTemplate;

/// Name of the single container in every generated pod
pub const CONTAINER_NAME: &str = "job";

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(FNV32_PRIME)
    })
}

/// Env-from references for the template: ConfigMap first, then Secret.
///
/// `None` when the template references neither, so the field is omitted.
fn env_from_sources(template: &JobTemplate) -> Option<Vec<EnvFromSource>> {
    let mut sources = Vec::new();

    if let Some(cm) = template.config_source.as_deref().filter(|s| !s.is_empty()) {
        sources.push(EnvFromSource {
            config_map_ref: Some(ConfigMapEnvSource {
                name: cm.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });
    }
    if let Some(secret) = template.secret_source.as_deref().filter(|s| !s.is_empty()) {
        sources.push(EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: secret.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    (!sources.is_empty()).then_some(sources)
}

/// Pod template for one run of `template` with the given environment
pub fn build_pod_template(template: &JobTemplate, env: &[EnvVar]) -> PodTemplateSpec {
    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(template.image.clone()),
        command: template.command.clone(),
        args: template.args.clone(),
        env: Some(env.to_vec()),
        env_from: env_from_sources(template),
        ..Default::default()
    };

    PodTemplateSpec {
        metadata: None,
        spec: Some(PodSpec {
            containers: vec![container],
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
    }
}

/// Hash of the pod template's canonical JSON rendering
pub fn pod_template_hash(pod_template: &PodTemplateSpec) -> u32 {
    let rendered = serde_json::to_string(pod_template).unwrap_or_default();
    fnv1a_32(rendered.as_bytes())
}

/// `{template}-{hash as lowercase hex}-{unix seconds}`
pub fn job_name(template_name: &str, hash: u32, unix_seconds: i64) -> String {
    format!("{}-{:x}-{}", template_name, hash, unix_seconds)
}

/// Build the Job for `template` using an explicit creation timestamp
pub fn build_job_at(template: &JobTemplate, env: &[EnvVar], unix_seconds: i64) -> Job {
    let pod_template = build_pod_template(template, env);
    let name = job_name(&template.name, pod_template_hash(&pod_template), unix_seconds);

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(BTreeMap::from([
                (MANAGED_BY_LABEL_KEY.to_string(), SERVICE_NAME.to_string()),
                (TEMPLATE_LABEL_KEY.to_string(), template.name.clone()),
            ])),
            ..Default::default()
        },
        spec: Some(JobSpec {
            template: pod_template,
            ..Default::default()
        }),
        status: None,
    }
}

/// Build the Job for `template`, stamped with the current time
pub fn build_job(template: &JobTemplate, env: &[EnvVar]) -> Job {
    build_job_at(template, env, chrono::Utc::now().timestamp())
}
