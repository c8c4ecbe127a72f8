//! Flux HelmRelease

use std::time::Duration;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kforge_common::duration::{serde_duration, serde_opt_duration};
use kforge_common::{ResourceKind, Result};

use super::{impl_reconciled, CrossNamespaceSourceReference, DependencyReference};
use crate::builder;

/// Flux HelmRelease specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "helm.toolkit.fluxcd.io",
    version = "v2",
    kind = "HelmRelease",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    /// Chart template used to create the HelmChart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<HelmChartTemplate>,

    /// Helm release name; defaults to `[targetNamespace-]name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    /// Namespace the release is installed into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    /// Namespace for Helm's release storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_namespace: Option<String>,

    /// Service account to impersonate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    /// HelmReleases that must be ready first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<DependencyReference>,

    /// Install action settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<HelmInstall>,

    /// Upgrade action settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<HelmUpgrade>,

    /// Inline chart values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,

    /// Values merged from ConfigMaps and Secrets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values_from: Vec<ValuesReference>,

    /// How often the release is reconciled
    #[serde(with = "serde_duration")]
    #[schemars(with = "String")]
    pub interval: Duration,

    /// Timeout for Helm actions
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Suspend reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// Chart template of a HelmRelease
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct HelmChartTemplate {
    /// Chart template spec
    pub spec: HelmChartTemplateSpec,
}

/// Which chart to install and where it comes from
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplateSpec {
    /// Chart name (or path within a Git/Bucket source)
    pub chart: String,
    /// SemVer version or range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Source holding the chart
    pub source_ref: CrossNamespaceSourceReference,
    /// How often the chart source is checked
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub interval: Option<Duration>,
}

/// Install action settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmInstall {
    /// Create the target namespace if missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_namespace: Option<bool>,
    /// CRD policy: Skip, Create or CreateReplace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crds: Option<String>,
    /// Failure remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<HelmRemediation>,
}

/// Upgrade action settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct HelmUpgrade {
    /// CRD policy: Skip, Create or CreateReplace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crds: Option<String>,
    /// Failure remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<HelmRemediation>,
}

/// Retry behaviour after a failed Helm action
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmRemediation {
    /// Number of retries; negative means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i32>,
    /// Remediate the last failure when retries are exhausted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediate_last_failure: Option<bool>,
}

/// ConfigMap or Secret holding chart values
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuesReference {
    /// ConfigMap or Secret
    pub kind: String,
    /// Object name
    pub name: String,
    /// Data key holding the values; defaults to values.yaml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_key: Option<String>,
    /// Dotted path the value is merged at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    /// Tolerate a missing object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl_buildable!(HelmRelease, HelmReleaseSpec, ResourceKind::HelmRelease);
impl_reconciled!(HelmRelease);

/// Create a HelmRelease
pub fn create_helm_release(name: &str, namespace: &str, spec: HelmReleaseSpec) -> HelmRelease {
    builder::create(name, Some(namespace), spec)
}

fn chart_spec(release: &mut HelmRelease) -> &mut HelmChartTemplateSpec {
    &mut release.spec.chart.get_or_insert_with(Default::default).spec
}

/// Set the chart name
pub fn set_helm_release_chart(
    target: Option<&mut HelmRelease>,
    chart: impl Into<String>,
) -> Result<()> {
    builder::set(target, |r| &mut chart_spec(r).chart, chart.into())
}

/// Set the chart version or range
pub fn set_helm_release_chart_version(
    target: Option<&mut HelmRelease>,
    version: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut chart_spec(r).version, version.into())
}

/// Point the chart at a source
pub fn set_helm_release_source_ref(
    target: Option<&mut HelmRelease>,
    source_ref: Option<CrossNamespaceSourceReference>,
) -> Result<()> {
    builder::set_required(target, "source_ref", |r| &mut chart_spec(r).source_ref, source_ref)
}

/// Set the Helm release name
pub fn set_helm_release_release_name(
    target: Option<&mut HelmRelease>,
    release_name: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.release_name, release_name.into())
}

/// Set the install namespace
pub fn set_helm_release_target_namespace(
    target: Option<&mut HelmRelease>,
    namespace: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.target_namespace, namespace.into())
}

/// Set the release storage namespace
pub fn set_helm_release_storage_namespace(
    target: Option<&mut HelmRelease>,
    namespace: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |r| &mut r.spec.storage_namespace, namespace.into())
}

/// Impersonate a service account
pub fn set_helm_release_service_account(
    target: Option<&mut HelmRelease>,
    service_account: impl Into<String>,
) -> Result<()> {
    builder::set_some(
        target,
        |r| &mut r.spec.service_account_name,
        service_account.into(),
    )
}

/// Create the target namespace on install
pub fn set_helm_release_create_namespace(
    target: Option<&mut HelmRelease>,
    create: bool,
) -> Result<()> {
    builder::set_some(
        target,
        |r| &mut r.spec.install.get_or_insert_with(Default::default).create_namespace,
        create,
    )
}

/// Retries after a failed install
pub fn set_helm_release_install_retries(
    target: Option<&mut HelmRelease>,
    retries: i32,
) -> Result<()> {
    builder::update(target, |r| {
        let install = r.spec.install.get_or_insert_with(Default::default);
        install.remediation.get_or_insert_with(Default::default).retries = Some(retries);
    })
}

/// Retries after a failed upgrade
pub fn set_helm_release_upgrade_retries(
    target: Option<&mut HelmRelease>,
    retries: i32,
) -> Result<()> {
    builder::update(target, |r| {
        let upgrade = r.spec.upgrade.get_or_insert_with(Default::default);
        upgrade.remediation.get_or_insert_with(Default::default).retries = Some(retries);
    })
}

/// Add a dependency on another HelmRelease
pub fn add_helm_release_dependency(
    target: Option<&mut HelmRelease>,
    dependency: Option<DependencyReference>,
) -> Result<()> {
    builder::push_required(target, "dependency", |r| &mut r.spec.depends_on, dependency)
}

/// Replace the inline values document
pub fn set_helm_release_values(
    target: Option<&mut HelmRelease>,
    values: Option<Value>,
) -> Result<()> {
    builder::set_required(
        target,
        "values",
        |r| &mut r.spec.values,
        values.map(Some),
    )
}

/// Set a single top-level value, creating the values document if needed.
///
/// A non-object values document is replaced by an object.
pub fn set_helm_release_value(
    target: Option<&mut HelmRelease>,
    key: impl Into<String>,
    value: Value,
) -> Result<()> {
    let key = key.into();
    builder::update(target, |r| {
        let values = r
            .spec
            .values
            .get_or_insert_with(|| Value::Object(Default::default()));
        if !values.is_object() {
            *values = Value::Object(Default::default());
        }
        if let Value::Object(map) = values {
            map.insert(key, value);
        }
    })
}

/// Merge values from a ConfigMap or Secret
pub fn add_helm_release_values_from(
    target: Option<&mut HelmRelease>,
    reference: Option<ValuesReference>,
) -> Result<()> {
    builder::push_required(target, "values_from", |r| &mut r.spec.values_from, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::set_interval;
    use kforge_common::Error;
    use kube::Resource;
    use serde_json::json;

    fn podinfo_release() -> HelmRelease {
        create_helm_release("podinfo", "apps", HelmReleaseSpec::default())
    }

    #[test]
    fn helm_release_identity() {
        let release = podinfo_release();
        assert_eq!(HelmRelease::kind(&()), "HelmRelease");
        assert_eq!(HelmRelease::api_version(&()), "helm.toolkit.fluxcd.io/v2");
        assert!(release.spec.depends_on.is_empty());
        assert!(release.spec.values_from.is_empty());
    }

    #[test]
    fn interval_of_five_minutes_reads_back_exactly() {
        let mut release = podinfo_release();
        set_interval(Some(&mut release), Duration::from_secs(5 * 60)).unwrap();
        assert_eq!(release.spec.interval, Duration::from_secs(300));

        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["spec"]["interval"], "5m");
    }

    #[test]
    fn chart_template_is_allocated_on_first_set() {
        let mut release = podinfo_release();
        set_helm_release_chart(Some(&mut release), "podinfo").unwrap();
        set_helm_release_chart_version(Some(&mut release), ">=6.0.0").unwrap();
        set_helm_release_source_ref(
            Some(&mut release),
            Some(
                CrossNamespaceSourceReference::new("HelmRepository", "podinfo")
                    .in_namespace("flux-system"),
            ),
        )
        .unwrap();

        let chart = &release.spec.chart.as_ref().unwrap().spec;
        assert_eq!(chart.chart, "podinfo");
        assert_eq!(chart.version.as_deref(), Some(">=6.0.0"));
        assert_eq!(chart.source_ref.namespace.as_deref(), Some("flux-system"));

        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["spec"]["chart"]["spec"]["sourceRef"]["kind"], "HelmRepository");
    }

    #[test]
    fn install_and_upgrade_remediation() {
        let mut release = podinfo_release();
        set_helm_release_create_namespace(Some(&mut release), true).unwrap();
        set_helm_release_install_retries(Some(&mut release), 3).unwrap();
        set_helm_release_upgrade_retries(Some(&mut release), -1).unwrap();

        let install = release.spec.install.as_ref().unwrap();
        assert_eq!(install.create_namespace, Some(true));
        assert_eq!(install.remediation.as_ref().unwrap().retries, Some(3));
        let upgrade = release.spec.upgrade.as_ref().unwrap();
        assert_eq!(upgrade.remediation.as_ref().unwrap().retries, Some(-1));
    }

    #[test]
    fn values_document() {
        let mut release = podinfo_release();
        set_helm_release_value(Some(&mut release), "replicaCount", json!(2)).unwrap();
        set_helm_release_value(Some(&mut release), "ingress", json!({"enabled": true})).unwrap();
        assert_eq!(
            release.spec.values,
            Some(json!({"replicaCount": 2, "ingress": {"enabled": true}}))
        );

        assert_eq!(
            set_helm_release_values(Some(&mut release), None),
            Err(Error::argument_absent("values"))
        );
        set_helm_release_values(Some(&mut release), Some(json!({"image": "nginx"}))).unwrap();
        assert_eq!(release.spec.values, Some(json!({"image": "nginx"})));
    }

    #[test]
    fn scalar_value_document_is_replaced_by_object() {
        let mut release = podinfo_release();
        set_helm_release_values(Some(&mut release), Some(json!("oops"))).unwrap();
        set_helm_release_value(Some(&mut release), "a", json!(1)).unwrap();
        assert_eq!(release.spec.values, Some(json!({"a": 1})));
    }

    #[test]
    fn release_scalars_round_trip() {
        let mut release = podinfo_release();
        set_helm_release_release_name(Some(&mut release), "podinfo-prod").unwrap();
        set_helm_release_target_namespace(Some(&mut release), "prod").unwrap();
        set_helm_release_storage_namespace(Some(&mut release), "flux-system").unwrap();
        set_helm_release_service_account(Some(&mut release), "helm-applier").unwrap();
        add_helm_release_dependency(
            Some(&mut release),
            Some(DependencyReference::new("cert-manager")),
        )
        .unwrap();
        add_helm_release_values_from(
            Some(&mut release),
            Some(ValuesReference {
                kind: "Secret".to_string(),
                name: "podinfo-values".to_string(),
                ..Default::default()
            }),
        )
        .unwrap();

        assert_eq!(release.spec.release_name.as_deref(), Some("podinfo-prod"));
        assert_eq!(release.spec.target_namespace.as_deref(), Some("prod"));
        assert_eq!(release.spec.storage_namespace.as_deref(), Some("flux-system"));
        assert_eq!(release.spec.service_account_name.as_deref(), Some("helm-applier"));
        assert_eq!(release.spec.depends_on.len(), 1);
        assert_eq!(release.spec.values_from[0].kind, "Secret");
    }

    #[test]
    fn mutators_reject_absent_target() {
        let sentinel = ResourceKind::HelmRelease.absent();
        assert_eq!(set_helm_release_chart(None, "c"), Err(sentinel.clone()));
        assert_eq!(set_helm_release_install_retries(None, 1), Err(sentinel.clone()));
        assert_eq!(set_helm_release_value(None, "k", json!(1)), Err(sentinel.clone()));
        assert_eq!(add_helm_release_dependency(None, None), Err(sentinel));
    }

    #[test]
    fn every_helm_release_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            ("set_helm_release_chart", set_helm_release_chart(None, "podinfo")),
            ("set_helm_release_chart_version", set_helm_release_chart_version(None, "6.x")),
            (
                "set_helm_release_source_ref",
                set_helm_release_source_ref(
                    None,
                    Some(CrossNamespaceSourceReference::new("HelmRepository", "podinfo")),
                ),
            ),
            ("set_helm_release_release_name", set_helm_release_release_name(None, "podinfo")),
            ("set_helm_release_target_namespace", set_helm_release_target_namespace(None, "apps")),
            (
                "set_helm_release_storage_namespace",
                set_helm_release_storage_namespace(None, "flux-system"),
            ),
            ("set_helm_release_service_account", set_helm_release_service_account(None, "helm")),
            ("set_helm_release_create_namespace", set_helm_release_create_namespace(None, true)),
            ("set_helm_release_install_retries", set_helm_release_install_retries(None, 3)),
            ("set_helm_release_upgrade_retries", set_helm_release_upgrade_retries(None, 3)),
            (
                "add_helm_release_dependency",
                add_helm_release_dependency(None, Some(DependencyReference::new("cert-manager"))),
            ),
            ("set_helm_release_values", set_helm_release_values(None, Some(Value::Null))),
            (
                "set_helm_release_value",
                set_helm_release_value(None, "replicaCount", Value::from(2)),
            ),
            (
                "add_helm_release_values_from",
                add_helm_release_values_from(None, Some(ValuesReference::default())),
            ),
            (
                "set_interval",
                crate::flux::set_interval::<HelmRelease>(None, Duration::from_secs(60)),
            ),
            ("set_timeout", crate::flux::set_timeout::<HelmRelease>(None, Duration::from_secs(60))),
            ("set_suspend", crate::flux::set_suspend::<HelmRelease>(None, true)),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::HelmRelease.absent()), "{operation}");
        }
    }
}
