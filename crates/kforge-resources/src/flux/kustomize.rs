//! Flux Kustomization

use std::collections::BTreeMap;
use std::time::Duration;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::duration::{serde_duration, serde_opt_duration};
use kforge_common::{ResourceKind, Result};

use super::{impl_reconciled, CrossNamespaceSourceReference, DependencyReference};
use crate::builder;

/// Flux Kustomization specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kustomize.toolkit.fluxcd.io",
    version = "v1",
    kind = "Kustomization",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct KustomizationSpec {
    /// Source holding the manifests
    pub source_ref: CrossNamespaceSourceReference,

    /// Path within the source; defaults to the source root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Delete objects removed from the source
    pub prune: bool,

    /// Wait for all applied objects to become ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<bool>,

    /// Recreate objects whose immutable fields changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    /// Override the namespace of all applied objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    /// Service account to impersonate when applying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    /// Kustomizations that must be ready first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<DependencyReference>,

    /// Kustomize components to include
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    /// Variable substitution after kustomize build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_build: Option<PostBuild>,

    /// How often the source is re-applied
    #[serde(with = "serde_duration")]
    #[schemars(with = "String")]
    pub interval: Duration,

    /// Interval used after a failed reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub retry_interval: Option<Duration>,

    /// Timeout for apply and health checks
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Suspend reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// Post-build variable substitution
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostBuild {
    /// Inline variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub substitute: BTreeMap<String, String>,
    /// ConfigMaps and Secrets holding variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitute_from: Vec<SubstituteReference>,
}

/// ConfigMap or Secret holding substitution variables
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct SubstituteReference {
    /// ConfigMap or Secret
    pub kind: String,
    /// Object name
    pub name: String,
    /// Tolerate a missing object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl_buildable!(Kustomization, KustomizationSpec, ResourceKind::Kustomization);
impl_reconciled!(Kustomization);

/// Create a Kustomization
pub fn create_kustomization(name: &str, namespace: &str, spec: KustomizationSpec) -> Kustomization {
    builder::create(name, Some(namespace), spec)
}

/// Point the Kustomization at a source
pub fn set_kustomization_source_ref(
    target: Option<&mut Kustomization>,
    source_ref: Option<CrossNamespaceSourceReference>,
) -> Result<()> {
    builder::set_required(target, "source_ref", |k| &mut k.spec.source_ref, source_ref)
}

/// Set the path within the source
pub fn set_kustomization_path(
    target: Option<&mut Kustomization>,
    path: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |k| &mut k.spec.path, path.into())
}

/// Enable or disable garbage collection
pub fn set_kustomization_prune(target: Option<&mut Kustomization>, prune: bool) -> Result<()> {
    builder::set(target, |k| &mut k.spec.prune, prune)
}

/// Wait for readiness of applied objects
pub fn set_kustomization_wait(target: Option<&mut Kustomization>, wait: bool) -> Result<()> {
    builder::set_some(target, |k| &mut k.spec.wait, wait)
}

/// Recreate objects on immutable field changes
pub fn set_kustomization_force(target: Option<&mut Kustomization>, force: bool) -> Result<()> {
    builder::set_some(target, |k| &mut k.spec.force, force)
}

/// Override the namespace of applied objects
pub fn set_kustomization_target_namespace(
    target: Option<&mut Kustomization>,
    namespace: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |k| &mut k.spec.target_namespace, namespace.into())
}

/// Impersonate a service account when applying
pub fn set_kustomization_service_account(
    target: Option<&mut Kustomization>,
    service_account: impl Into<String>,
) -> Result<()> {
    builder::set_some(
        target,
        |k| &mut k.spec.service_account_name,
        service_account.into(),
    )
}

/// Set the retry interval after failures
pub fn set_kustomization_retry_interval(
    target: Option<&mut Kustomization>,
    retry_interval: Duration,
) -> Result<()> {
    builder::set_some(target, |k| &mut k.spec.retry_interval, retry_interval)
}

/// Add a dependency on another Kustomization
pub fn add_kustomization_dependency(
    target: Option<&mut Kustomization>,
    dependency: Option<DependencyReference>,
) -> Result<()> {
    builder::push_required(target, "dependency", |k| &mut k.spec.depends_on, dependency)
}

/// Include a kustomize component
pub fn add_kustomization_component(
    target: Option<&mut Kustomization>,
    component: impl Into<String>,
) -> Result<()> {
    builder::push(target, |k| &mut k.spec.components, component.into())
}

/// Add an inline post-build variable
pub fn add_kustomization_substitute(
    target: Option<&mut Kustomization>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |k| &mut k.spec.post_build.get_or_insert_with(Default::default).substitute,
        key,
        value,
    )
}

/// Read post-build variables from a ConfigMap or Secret
pub fn add_kustomization_substitute_from(
    target: Option<&mut Kustomization>,
    reference: Option<SubstituteReference>,
) -> Result<()> {
    builder::push_required(
        target,
        "substitute_from",
        |k| &mut k.spec.post_build.get_or_insert_with(Default::default).substitute_from,
        reference,
    )
}
