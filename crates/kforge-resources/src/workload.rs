//! Workload resources: Pod, Job and Deployment
//!
//! All three carry a pod spec, directly (Pod) or inside a pod template (Job,
//! Deployment). The `*_pod_*` operations are generic over [`HasPodSpec`], so
//! `add_pod_container` works on any of them and reports the sentinel of the
//! kind it was handed.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, LocalObjectReference, Pod, PodSpec, PodTemplateSpec, Toleration,
    TopologySpreadConstraint, Volume,
};

use kforge_common::Result;

use crate::builder::{self, Buildable, HasSpec};

impl_builtin_buildable!(Pod, PodSpec, init_pod_spec);
impl_builtin_buildable!(Job, JobSpec, init_job_spec);
impl_builtin_buildable!(Deployment, DeploymentSpec, init_deployment_spec);

fn init_pod_spec(spec: &mut PodSpec) {
    spec.init_containers.get_or_insert_with(Vec::new);
    spec.volumes.get_or_insert_with(Vec::new);
    spec.tolerations.get_or_insert_with(Vec::new);
    spec.topology_spread_constraints.get_or_insert_with(Vec::new);
    spec.image_pull_secrets.get_or_insert_with(Vec::new);
    spec.node_selector.get_or_insert_with(BTreeMap::new);
    spec.ephemeral_containers.get_or_insert_with(Vec::new);
    spec.host_aliases.get_or_insert_with(Vec::new);
    spec.readiness_gates.get_or_insert_with(Vec::new);
    spec.resource_claims.get_or_insert_with(Vec::new);
    spec.scheduling_gates.get_or_insert_with(Vec::new);
    spec.overhead.get_or_insert_with(BTreeMap::new);
}

fn init_pod_template(template: &mut PodTemplateSpec) {
    template
        .metadata
        .get_or_insert_with(Default::default)
        .labels
        .get_or_insert_with(BTreeMap::new);
    init_pod_spec(template.spec.get_or_insert_with(Default::default));
}

fn init_job_spec(spec: &mut JobSpec) {
    init_pod_template(&mut spec.template);
}

fn init_deployment_spec(spec: &mut DeploymentSpec) {
    spec.selector.match_labels.get_or_insert_with(BTreeMap::new);
    spec.selector.match_expressions.get_or_insert_with(Vec::new);
    init_pod_template(&mut spec.template);
}

/// A record that carries a pod spec.
pub trait HasPodSpec: Buildable {
    /// Mutable access to the pod spec, allocating it if absent
    fn pod_spec_mut(&mut self) -> &mut PodSpec;
}

/// A record that stamps out pods from a template.
pub trait HasPodTemplate: HasPodSpec {
    /// Mutable access to the pod template
    fn template_mut(&mut self) -> &mut PodTemplateSpec;
}

impl HasPodSpec for Pod {
    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec_mut()
    }
}

impl HasPodTemplate for Job {
    fn template_mut(&mut self) -> &mut PodTemplateSpec {
        &mut self.spec_mut().template
    }
}

impl HasPodTemplate for Deployment {
    fn template_mut(&mut self) -> &mut PodTemplateSpec {
        &mut self.spec_mut().template
    }
}

impl HasPodSpec for Job {
    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.template_mut().spec.get_or_insert_with(Default::default)
    }
}

impl HasPodSpec for Deployment {
    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.template_mut().spec.get_or_insert_with(Default::default)
    }
}

// =============================================================================
// Pod spec operations (Pod, Job, Deployment)
// =============================================================================

/// Create a Pod
pub fn create_pod(name: &str, namespace: &str, spec: PodSpec) -> Pod {
    builder::create(name, Some(namespace), spec)
}

/// Add an application container
pub fn add_pod_container<K: HasPodSpec>(
    target: Option<&mut K>,
    container: Option<Container>,
) -> Result<()> {
    builder::push_required(
        target,
        "container",
        |r| &mut r.pod_spec_mut().containers,
        container,
    )
}

/// Add an init container
pub fn add_pod_init_container<K: HasPodSpec>(
    target: Option<&mut K>,
    container: Option<Container>,
) -> Result<()> {
    builder::push_required(
        target,
        "init_container",
        |r| r.pod_spec_mut().init_containers.get_or_insert_with(Vec::new),
        container,
    )
}

/// Add a volume
pub fn add_pod_volume<K: HasPodSpec>(target: Option<&mut K>, volume: Option<Volume>) -> Result<()> {
    builder::push_required(
        target,
        "volume",
        |r| r.pod_spec_mut().volumes.get_or_insert_with(Vec::new),
        volume,
    )
}

/// Add a toleration
pub fn add_pod_toleration<K: HasPodSpec>(
    target: Option<&mut K>,
    toleration: Option<Toleration>,
) -> Result<()> {
    builder::push_required(
        target,
        "toleration",
        |r| r.pod_spec_mut().tolerations.get_or_insert_with(Vec::new),
        toleration,
    )
}

/// Add a topology spread constraint.
///
/// Constraints are optional scheduling hints, so `None` is accepted and
/// leaves the record unchanged.
pub fn add_pod_topology_spread_constraint<K: HasPodSpec>(
    target: Option<&mut K>,
    constraint: Option<TopologySpreadConstraint>,
) -> Result<()> {
    builder::push_if_present(
        target,
        |r| {
            r.pod_spec_mut()
                .topology_spread_constraints
                .get_or_insert_with(Vec::new)
        },
        constraint,
    )
}

/// Require a node label
pub fn add_pod_node_selector<K: HasPodSpec>(
    target: Option<&mut K>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |r| r.pod_spec_mut().node_selector.get_or_insert_with(BTreeMap::new),
        key,
        value,
    )
}

/// Pull images with the credentials in a Secret
pub fn add_pod_image_pull_secret<K: HasPodSpec>(
    target: Option<&mut K>,
    secret: impl Into<String>,
) -> Result<()> {
    let secret: String = secret.into();
    builder::push(
        target,
        |r| r.pod_spec_mut().image_pull_secrets.get_or_insert_with(Vec::new),
        LocalObjectReference {
            name: secret.into(),
        },
    )
}

/// Set the restart policy (Always, OnFailure, Never)
pub fn set_pod_restart_policy<K: HasPodSpec>(
    target: Option<&mut K>,
    policy: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.pod_spec_mut().restart_policy, policy.into())
}

/// Run pods as a service account
pub fn set_pod_service_account<K: HasPodSpec>(
    target: Option<&mut K>,
    service_account: impl Into<String>,
) -> Result<()> {
    builder::set_some(
        target,
        |r| &mut r.pod_spec_mut().service_account_name,
        service_account.into(),
    )
}

/// Label the pods created from a template
pub fn add_pod_template_label<K: HasPodTemplate>(
    target: Option<&mut K>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |r| {
            r.template_mut()
                .metadata
                .get_or_insert_with(Default::default)
                .labels
                .get_or_insert_with(BTreeMap::new)
        },
        key,
        value,
    )
}

// =============================================================================
// Job
// =============================================================================

/// Create a Job
pub fn create_job(name: &str, namespace: &str, spec: JobSpec) -> Job {
    builder::create(name, Some(namespace), spec)
}

/// Retries before the Job is marked failed
pub fn set_job_backoff_limit(target: Option<&mut Job>, limit: i32) -> Result<()> {
    builder::set_some(target, |j| &mut j.spec_mut().backoff_limit, limit)
}

/// Delete the Job this many seconds after it finishes
pub fn set_job_ttl_seconds_after_finished(target: Option<&mut Job>, seconds: i32) -> Result<()> {
    builder::set_some(
        target,
        |j| &mut j.spec_mut().ttl_seconds_after_finished,
        seconds,
    )
}

/// Terminate the Job after this many seconds
pub fn set_job_active_deadline_seconds(target: Option<&mut Job>, seconds: i64) -> Result<()> {
    builder::set_some(target, |j| &mut j.spec_mut().active_deadline_seconds, seconds)
}

/// Required number of successful pods
pub fn set_job_completions(target: Option<&mut Job>, completions: i32) -> Result<()> {
    builder::set_some(target, |j| &mut j.spec_mut().completions, completions)
}

/// Maximum pods running at once
pub fn set_job_parallelism(target: Option<&mut Job>, parallelism: i32) -> Result<()> {
    builder::set_some(target, |j| &mut j.spec_mut().parallelism, parallelism)
}

// =============================================================================
// Deployment
// =============================================================================

/// Create a Deployment
pub fn create_deployment(name: &str, namespace: &str, spec: DeploymentSpec) -> Deployment {
    builder::create(name, Some(namespace), spec)
}

/// Set the desired replica count
pub fn set_deployment_replicas(target: Option<&mut Deployment>, replicas: i32) -> Result<()> {
    builder::set_some(target, |d| &mut d.spec_mut().replicas, replicas)
}

/// Select pods by label
pub fn add_deployment_selector_label(
    target: Option<&mut Deployment>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |d| {
            d.spec_mut()
                .selector
                .match_labels
                .get_or_insert_with(BTreeMap::new)
        },
        key,
        value,
    )
}

/// Set the rollout strategy (RollingUpdate or Recreate)
pub fn set_deployment_strategy_type(
    target: Option<&mut Deployment>,
    strategy: impl Into<String>,
) -> Result<()> {
    builder::set_some(
        target,
        |d| {
            &mut d
                .spec_mut()
                .strategy
                .get_or_insert_with(DeploymentStrategy::default)
                .type_
        },
        strategy.into(),
    )
}
