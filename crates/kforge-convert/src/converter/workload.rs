//! Workload conversions: Job and Pod

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, Pod, PodSpec};

use kforge_common::{ResourceKind, Result};
use kforge_resources::workload::*;

use super::{apply_labels, converted, non_empty, Converter};
use crate::config::{JobConfig, PodConfig};

/// Restart policy used for Jobs that do not name one
const DEFAULT_JOB_RESTART_POLICY: &str = "Never";

fn container(
    name: &str,
    image: &str,
    command: &[String],
    args: &[String],
    env: &BTreeMap<String, String>,
) -> Container {
    Container {
        name: name.to_string(),
        image: non_empty(image).map(str::to_string),
        command: (!command.is_empty()).then(|| command.to_vec()),
        args: (!args.is_empty()).then(|| args.to_vec()),
        env: (!env.is_empty()).then(|| {
            env.iter()
                .map(|(name, value)| EnvVar {
                    name: name.clone(),
                    value: Some(value.clone()),
                    ..Default::default()
                })
                .collect()
        }),
        ..Default::default()
    }
}

impl Converter {
    /// Convert a Job declaration
    pub fn job(&self, cfg: Option<&JobConfig>) -> Result<Option<Job>> {
        cfg.map(|cfg| self.build_job(cfg)).transpose()
    }

    /// Convert a Pod declaration
    pub fn pod(&self, cfg: Option<&PodConfig>) -> Result<Option<Pod>> {
        cfg.map(|cfg| self.build_pod(cfg)).transpose()
    }

    pub(crate) fn build_job(&self, cfg: &JobConfig) -> Result<Job> {
        let kind = ResourceKind::Job;
        let mut job = create_job(&cfg.name, &cfg.namespace, JobSpec::default());

        add_pod_container(
            Some(&mut job),
            Some(container(&cfg.name, &cfg.image, &cfg.command, &cfg.args, &cfg.env)),
        )?;
        let restart_policy = non_empty(&cfg.restart_policy).unwrap_or(DEFAULT_JOB_RESTART_POLICY);
        set_pod_restart_policy(Some(&mut job), restart_policy)?;
        if let Some(account) = non_empty(&cfg.service_account) {
            set_pod_service_account(Some(&mut job), account)?;
        }
        for (key, value) in &cfg.node_selector {
            add_pod_node_selector(Some(&mut job), key.as_str(), value.as_str())?;
        }
        if let Some(limit) = cfg.backoff_limit {
            set_job_backoff_limit(Some(&mut job), limit)?;
        }
        let ttl =
            self.optional_seconds(kind, "ttlAfterFinished", &cfg.ttl_after_finished, i32::MAX)?;
        if let Some(seconds) = ttl {
            set_job_ttl_seconds_after_finished(Some(&mut job), seconds)?;
        }
        let deadline =
            self.optional_seconds(kind, "activeDeadline", &cfg.active_deadline, i64::MAX)?;
        if let Some(seconds) = deadline {
            set_job_active_deadline_seconds(Some(&mut job), seconds)?;
        }
        for (key, value) in &cfg.labels {
            add_pod_template_label(Some(&mut job), key.as_str(), value.as_str())?;
        }
        apply_labels(&mut job, &cfg.labels)?;

        converted(&job);
        Ok(job)
    }

    pub(crate) fn build_pod(&self, cfg: &PodConfig) -> Result<Pod> {
        let mut pod = create_pod(&cfg.name, &cfg.namespace, PodSpec::default());

        add_pod_container(
            Some(&mut pod),
            Some(container(&cfg.name, &cfg.image, &cfg.command, &cfg.args, &cfg.env)),
        )?;
        if let Some(policy) = non_empty(&cfg.restart_policy) {
            set_pod_restart_policy(Some(&mut pod), policy)?;
        }
        if let Some(account) = non_empty(&cfg.service_account) {
            set_pod_service_account(Some(&mut pod), account)?;
        }
        for (key, value) in &cfg.node_selector {
            add_pod_node_selector(Some(&mut pod), key.as_str(), value.as_str())?;
        }
        apply_labels(&mut pod, &cfg.labels)?;

        converted(&pod);
        Ok(pod)
    }
}
