//! Config documents
//!
//! A config file is a multi-document YAML stream. Each document names its
//! kind and lists the fields of the matching `*Config`:
//!
//! ```yaml
//! kind: GitRepository
//! name: fleet
//! namespace: flux-system
//! url: https://github.com/example/fleet
//! branch: main
//! ---
//! kind: Kustomization
//! name: apps
//! namespace: flux-system
//! sourceName: fleet
//! path: ./apps
//! prune: true
//! ```

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use kforge_common::yaml::parse_yaml_documents;
use kforge_common::{Error, ResourceKind, Result};
use kforge_resources::cert_manager::{Certificate, ClusterIssuer, Issuer};
use kforge_resources::cilium::CiliumLoadBalancerIPPool;
use kforge_resources::flux::{
    GitRepository, HelmRelease, HelmRepository, Kustomization, OCIRepository,
};
use kforge_resources::metallb::{IPAddressPool, L2Advertisement};

use crate::config::*;
use crate::Converter;

/// One config declaration, tagged by `kind`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConfigDocument {
    /// cert-manager Certificate
    Certificate(CertificateConfig),
    /// cert-manager Issuer
    Issuer(IssuerConfig),
    /// cert-manager ClusterIssuer
    ClusterIssuer(IssuerConfig),
    /// Flux GitRepository
    GitRepository(GitRepositoryConfig),
    /// Flux HelmRepository
    HelmRepository(HelmRepositoryConfig),
    /// Flux OCIRepository
    #[serde(rename = "OCIRepository")]
    OciRepository(OciRepositoryConfig),
    /// Flux Kustomization
    Kustomization(KustomizationConfig),
    /// Flux HelmRelease
    HelmRelease(HelmReleaseConfig),
    /// MetalLB IPAddressPool
    #[serde(rename = "IPAddressPool")]
    IpAddressPool(IpAddressPoolConfig),
    /// MetalLB L2Advertisement
    L2Advertisement(L2AdvertisementConfig),
    /// Cilium LB-IPAM pool
    #[serde(rename = "CiliumLoadBalancerIPPool")]
    CiliumLbIpPool(CiliumLbIpPoolConfig),
    /// Batch Job
    Job(JobConfig),
    /// Pod
    Pod(PodConfig),
}

impl ConfigDocument {
    /// Kind of resource this declaration converts to
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Certificate(_) => ResourceKind::Certificate,
            Self::Issuer(_) => ResourceKind::Issuer,
            Self::ClusterIssuer(_) => ResourceKind::ClusterIssuer,
            Self::GitRepository(_) => ResourceKind::GitRepository,
            Self::HelmRepository(_) => ResourceKind::HelmRepository,
            Self::OciRepository(_) => ResourceKind::OciRepository,
            Self::Kustomization(_) => ResourceKind::Kustomization,
            Self::HelmRelease(_) => ResourceKind::HelmRelease,
            Self::IpAddressPool(_) => ResourceKind::IpAddressPool,
            Self::L2Advertisement(_) => ResourceKind::L2Advertisement,
            Self::CiliumLbIpPool(_) => ResourceKind::CiliumLoadBalancerIpPool,
            Self::Job(_) => ResourceKind::Job,
            Self::Pod(_) => ResourceKind::Pod,
        }
    }
}

/// Any record a [`ConfigDocument`] converts to
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum AnyResource {
    /// cert-manager Certificate
    Certificate(Certificate),
    /// cert-manager Issuer
    Issuer(Issuer),
    /// cert-manager ClusterIssuer
    ClusterIssuer(ClusterIssuer),
    /// Flux GitRepository
    GitRepository(GitRepository),
    /// Flux HelmRepository
    HelmRepository(HelmRepository),
    /// Flux OCIRepository
    OciRepository(OCIRepository),
    /// Flux Kustomization
    Kustomization(Kustomization),
    /// Flux HelmRelease
    HelmRelease(HelmRelease),
    /// MetalLB IPAddressPool
    IpAddressPool(IPAddressPool),
    /// MetalLB L2Advertisement
    L2Advertisement(L2Advertisement),
    /// Cilium LB-IPAM pool
    CiliumLbIpPool(CiliumLoadBalancerIPPool),
    /// Batch Job
    Job(Job),
    /// Pod
    Pod(Pod),
}

impl AnyResource {
    /// Kind of the wrapped record
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Certificate(_) => ResourceKind::Certificate,
            Self::Issuer(_) => ResourceKind::Issuer,
            Self::ClusterIssuer(_) => ResourceKind::ClusterIssuer,
            Self::GitRepository(_) => ResourceKind::GitRepository,
            Self::HelmRepository(_) => ResourceKind::HelmRepository,
            Self::OciRepository(_) => ResourceKind::OciRepository,
            Self::Kustomization(_) => ResourceKind::Kustomization,
            Self::HelmRelease(_) => ResourceKind::HelmRelease,
            Self::IpAddressPool(_) => ResourceKind::IpAddressPool,
            Self::L2Advertisement(_) => ResourceKind::L2Advertisement,
            Self::CiliumLbIpPool(_) => ResourceKind::CiliumLoadBalancerIpPool,
            Self::Job(_) => ResourceKind::Job,
            Self::Pod(_) => ResourceKind::Pod,
        }
    }

    /// Name of the wrapped record
    pub fn name(&self) -> Option<&str> {
        let meta = match self {
            Self::Certificate(r) => &r.metadata,
            Self::Issuer(r) => &r.metadata,
            Self::ClusterIssuer(r) => &r.metadata,
            Self::GitRepository(r) => &r.metadata,
            Self::HelmRepository(r) => &r.metadata,
            Self::OciRepository(r) => &r.metadata,
            Self::Kustomization(r) => &r.metadata,
            Self::HelmRelease(r) => &r.metadata,
            Self::IpAddressPool(r) => &r.metadata,
            Self::L2Advertisement(r) => &r.metadata,
            Self::CiliumLbIpPool(r) => &r.metadata,
            Self::Job(r) => &r.metadata,
            Self::Pod(r) => &r.metadata,
        };
        meta.name.as_deref()
    }
}

/// Parse a multi-document YAML stream into config declarations.
///
/// Empty documents are skipped. A document without a `kind`, with a kind
/// outside the registry, or with a kind that has no config form, is an error
/// naming the document's position.
pub fn load_documents(input: &str) -> Result<Vec<ConfigDocument>> {
    parse_yaml_documents(input)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_document(index, value))
        .collect()
}

fn parse_document(index: usize, value: Value) -> Result<ConfigDocument> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::config(format!("document {index} has no kind")))?;
    if ResourceKind::from_kind_str(&kind).is_none() {
        return Err(Error::config_for_kind(
            &kind,
            format!("document {index}: unknown kind {kind:?}"),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::config_for_kind(&kind, format!("document {index}: {e}")))
}

impl Converter {
    /// Convert one declaration
    pub fn convert_document(&self, document: &ConfigDocument) -> Result<AnyResource> {
        let resource = match document {
            ConfigDocument::Certificate(cfg) => {
                AnyResource::Certificate(self.build_certificate(cfg)?)
            }
            ConfigDocument::Issuer(cfg) => AnyResource::Issuer(self.build_issuer(cfg)?),
            ConfigDocument::ClusterIssuer(cfg) => {
                AnyResource::ClusterIssuer(self.build_cluster_issuer(cfg)?)
            }
            ConfigDocument::GitRepository(cfg) => {
                AnyResource::GitRepository(self.build_git_repository(cfg)?)
            }
            ConfigDocument::HelmRepository(cfg) => {
                AnyResource::HelmRepository(self.build_helm_repository(cfg)?)
            }
            ConfigDocument::OciRepository(cfg) => {
                AnyResource::OciRepository(self.build_oci_repository(cfg)?)
            }
            ConfigDocument::Kustomization(cfg) => {
                AnyResource::Kustomization(self.build_kustomization(cfg)?)
            }
            ConfigDocument::HelmRelease(cfg) => {
                AnyResource::HelmRelease(self.build_helm_release(cfg)?)
            }
            ConfigDocument::IpAddressPool(cfg) => {
                AnyResource::IpAddressPool(self.build_ip_address_pool(cfg)?)
            }
            ConfigDocument::L2Advertisement(cfg) => {
                AnyResource::L2Advertisement(self.build_l2_advertisement(cfg)?)
            }
            ConfigDocument::CiliumLbIpPool(cfg) => {
                AnyResource::CiliumLbIpPool(self.build_cilium_lb_ip_pool(cfg)?)
            }
            ConfigDocument::Job(cfg) => AnyResource::Job(self.build_job(cfg)?),
            ConfigDocument::Pod(cfg) => AnyResource::Pod(self.build_pod(cfg)?),
        };
        Ok(resource)
    }

    /// Convert a batch of declarations, stopping at the first failure
    pub fn convert_all(&self, documents: &[ConfigDocument]) -> Result<Vec<AnyResource>> {
        let resources = documents
            .iter()
            .map(|document| self.convert_document(document))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = resources.len(), "converted config documents");
        Ok(resources)
    }
}
