//! Submission of generated Jobs to the cluster

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, PostParams};
use kube::Client;
#[cfg(test)]
use mockall::automock;

use cetok_common::FIELD_MANAGER;

/// Creates Jobs in a fixed namespace.
///
/// Abstracts the Kubernetes API so the generator can be tested without a cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Create `job` and return the object the API server stored
    async fn create(&self, job: &Job) -> Result<Job, kube::Error>;
}

/// `JobSubmitter` backed by the Kubernetes API
pub struct KubeJobSubmitter {
    api: Api<Job>,
    namespace: String,
}

impl KubeJobSubmitter {
    /// Bind a submitter to `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            api: Api::namespaced(client, &namespace),
            namespace,
        }
    }

    /// Namespace Jobs are created in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl JobSubmitter for KubeJobSubmitter {
    async fn create(&self, job: &Job) -> Result<Job, kube::Error> {
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        self.api.create(&params, job).await
    }
}
