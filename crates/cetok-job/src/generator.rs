//! JobGenerator: expands one event payload into a Job per template

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::batch::v1::Job;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use crate::env::build_env;
use crate::error::{GenerateError, JobError};
use crate::manifest::build_job;
use crate::submitter::JobSubmitter;
use crate::template::TemplateSet;

/// Generates Jobs from event payloads.
///
/// Holds only immutable state, so one instance can be shared across concurrent
/// events behind an `Arc`.
pub struct JobGenerator {
    templates: TemplateSet,
    submitter: Arc<dyn JobSubmitter>,
}

impl JobGenerator {
    /// Create a generator for `templates` that submits through `submitter`
    pub fn new(templates: TemplateSet, submitter: Arc<dyn JobSubmitter>) -> Self {
        Self {
            templates,
            submitter,
        }
    }

    /// Templates this generator expands, in declaration order
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Create one Job per template with `payload` injected as environment variables.
    ///
    /// The environment is validated once before anything is submitted; an invalid key
    /// fails the call with nothing created. Templates are then submitted one at a time
    /// in declaration order. The first rejected submission stops the loop and the
    /// error carries every Job created before it. Those Jobs are not rolled back and
    /// failed submissions are not retried.
    pub async fn generate(
        &self,
        payload: &BTreeMap<String, String>,
    ) -> Result<Vec<Job>, GenerateError> {
        let env = build_env(payload).map_err(GenerateError::before_submission)?;

        let mut created = Vec::with_capacity(self.templates.len());
        for (index, template) in self.templates.iter().enumerate() {
            let job = build_job(template, &env);
            debug!(
                index,
                template = %template.name,
                job = %job.name_any(),
                "submitting job"
            );

            match self.submitter.create(&job).await {
                Ok(stored) => {
                    info!(template = %template.name, job = %stored.name_any(), "created job");
                    created.push(stored);
                }
                Err(source) => {
                    warn!(
                        template = %template.name,
                        job = %job.name_any(),
                        created = created.len(),
                        error = %source,
                        "job submission failed, skipping remaining templates"
                    );
                    return Err(GenerateError {
                        created,
                        source: JobError::Submission {
                            template: template.name.clone(),
                            source,
                        },
                    });
                }
            }
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Container;
    use mockall::predicate::always;
    use mockall::Sequence;

    use crate::submitter::MockJobSubmitter;
    use crate::template::JobTemplate;

    fn templates(list: Vec<JobTemplate>) -> TemplateSet {
        TemplateSet::new(list).unwrap()
    }

    fn payload(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Mimic the API server: echo the Job back with a namespace and uid filled in
    fn stored(job: &Job) -> Job {
        let mut job = job.clone();
        job.metadata.namespace = Some("test".to_string());
        job.metadata.uid = Some(format!("uid-{}", job.name_any()));
        job
    }

    fn rejected(message: &str) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        })
    }

    fn container(job: &Job) -> &Container {
        &job.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0]
    }

    fn is_for(template: &'static str) -> impl Fn(&Job) -> bool + Send + 'static {
        move |job: &Job| job.name_any().starts_with(&format!("{template}-"))
    }

    #[tokio::test]
    async fn no_templates_creates_nothing() {
        let mut submitter = MockJobSubmitter::new();
        submitter.expect_create().never();

        let generator = JobGenerator::new(TemplateSet::default(), Arc::new(submitter));
        let jobs = generator.generate(&payload(&[("KEY1", "VALUE1")])).await.unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn full_config_template_end_to_end() {
        let mut template = JobTemplate::new("full-config", "debian");
        template.command = Some(vec!["echo".to_string(), "hi".to_string()]);
        template.config_source = Some("cm".to_string());
        template.secret_source = Some("sec".to_string());

        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_create()
            .with(always())
            .times(1)
            .returning(|job| Ok(stored(job)));

        let generator = JobGenerator::new(templates(vec![template]), Arc::new(submitter));
        let jobs = generator.generate(&payload(&[("KEY1", "VALUE1")])).await.unwrap();

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert!(job.name_any().starts_with("full-config-"));
        assert_eq!(job.metadata.namespace.as_deref(), Some("test"));

        let pod = job.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
        assert_eq!(pod.restart_policy.as_deref(), Some("Never"));

        let c = container(job);
        assert_eq!(c.name, "job");
        assert_eq!(c.image.as_deref(), Some("debian"));
        assert_eq!(
            c.command,
            Some(vec!["echo".to_string(), "hi".to_string()])
        );

        let env = c.env.as_ref().unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env[0].name, "KEY1");
        assert_eq!(env[0].value.as_deref(), Some("VALUE1"));

        let env_from = c.env_from.as_ref().unwrap();
        assert_eq!(env_from.len(), 2);
        assert_eq!(env_from[0].config_map_ref.as_ref().unwrap().name, "cm");
        assert_eq!(env_from[1].secret_ref.as_ref().unwrap().name, "sec");
    }

    #[tokio::test]
    async fn env_is_shared_by_every_template() {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_create()
            .times(2)
            .returning(|job| Ok(stored(job)));

        let generator = JobGenerator::new(
            templates(vec![
                JobTemplate::new("first", "alpine"),
                JobTemplate::new("second", "busybox"),
            ]),
            Arc::new(submitter),
        );
        let input = payload(&[("KEY1", "VALUE1"), ("camelCase", "Camel"), ("Snake_Case", "Snake")]);
        let jobs = generator.generate(&input).await.unwrap();

        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            let env: BTreeMap<String, String> = container(job)
                .env
                .clone()
                .unwrap()
                .into_iter()
                .map(|e| (e.name, e.value.unwrap_or_default()))
                .collect();
            assert_eq!(env, input);
        }
    }

    #[tokio::test]
    async fn results_follow_declaration_order() {
        let mut seq = Sequence::new();
        let mut submitter = MockJobSubmitter::new();
        for name in ["zeta", "alpha", "mid"] {
            submitter
                .expect_create()
                .withf(is_for(name))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|job| Ok(stored(job)));
        }

        let generator = JobGenerator::new(
            templates(vec![
                JobTemplate::new("zeta", "img"),
                JobTemplate::new("alpha", "img"),
                JobTemplate::new("mid", "img"),
            ]),
            Arc::new(submitter),
        );
        let jobs = generator.generate(&BTreeMap::new()).await.unwrap();

        let names: Vec<String> = jobs.iter().map(|j| j.name_any()).collect();
        assert!(names[0].starts_with("zeta-"));
        assert!(names[1].starts_with("alpha-"));
        assert!(names[2].starts_with("mid-"));
    }

    #[tokio::test]
    async fn failure_keeps_earlier_jobs_and_stops() {
        let mut seq = Sequence::new();
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_create()
            .withf(is_for("a"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|job| Ok(stored(job)));
        submitter
            .expect_create()
            .withf(is_for("b"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(rejected("quota exceeded")));
        submitter.expect_create().withf(is_for("c")).never();

        let generator = JobGenerator::new(
            templates(vec![
                JobTemplate::new("a", "img"),
                JobTemplate::new("b", "img"),
                JobTemplate::new("c", "img"),
            ]),
            Arc::new(submitter),
        );
        let err = generator.generate(&BTreeMap::new()).await.unwrap_err();

        assert_eq!(err.created.len(), 1);
        assert!(err.created[0].name_any().starts_with("a-"));
        assert_eq!(err.created[0].metadata.namespace.as_deref(), Some("test"));
        match &err.source {
            JobError::Submission { template, source } => {
                assert_eq!(template, "b");
                assert!(matches!(source, kube::Error::Api(ae) if ae.code == 403));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("template 'b'"));
        assert!(err.to_string().contains("1 job(s) created"));
    }

    #[tokio::test]
    async fn first_template_failure_creates_nothing() {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_create()
            .times(1)
            .returning(|_| Err(rejected("denied")));

        let generator = JobGenerator::new(
            templates(vec![JobTemplate::new("a", "img"), JobTemplate::new("b", "img")]),
            Arc::new(submitter),
        );
        let err = generator.generate(&BTreeMap::new()).await.unwrap_err();
        assert!(err.created.is_empty());
    }

    #[tokio::test]
    async fn invalid_key_submits_nothing() {
        let mut submitter = MockJobSubmitter::new();
        submitter.expect_create().never();

        let generator = JobGenerator::new(
            templates(vec![JobTemplate::new("a", "img")]),
            Arc::new(submitter),
        );
        let err = generator
            .generate(&payload(&[("KE Y1", "VALUE1")]))
            .await
            .unwrap_err();

        assert!(err.created.is_empty());
        assert!(matches!(&err.source, JobError::InvalidEnvName { key } if key == "KE Y1"));
    }

    #[tokio::test]
    async fn concurrent_generations_share_one_generator() {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_create()
            .times(4)
            .returning(|job| Ok(stored(job)));

        let generator = Arc::new(JobGenerator::new(
            templates(vec![JobTemplate::new("a", "img"), JobTemplate::new("b", "img")]),
            Arc::new(submitter),
        ));

        let one = payload(&[("N", "1")]);
        let two = payload(&[("N", "2")]);
        let (first, second) = tokio::join!(generator.generate(&one), generator.generate(&two));
        assert_eq!(first.unwrap().len(), 2);
        assert_eq!(second.unwrap().len(), 2);
    }
}
