//! Flat config declarations and their conversion into resource records
//!
//! Each `*Config` struct is a flat, string-typed declaration of one resource.
//! A [`Converter`] turns it into the matching record from
//! [`kforge_resources`], applying defaults and resolving durations according
//! to its [`ConvertOptions`].
//!
//! The free `convert_*` functions use a default converter: lenient duration
//! handling with a one minute default interval.

#![deny(missing_docs)]

pub mod config;
mod converter;
pub mod document;
pub mod options;

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;

use kforge_common::Result;
use kforge_resources::cert_manager::{Certificate, ClusterIssuer, Issuer};
use kforge_resources::cilium::CiliumLoadBalancerIPPool;
use kforge_resources::flux::{
    GitRepository, HelmRelease, HelmRepository, Kustomization, OCIRepository,
};
use kforge_resources::metallb::{IPAddressPool, L2Advertisement};

pub use config::*;
pub use converter::Converter;
pub use document::{load_documents, AnyResource, ConfigDocument};
pub use options::{ConvertOptions, DurationPolicy, DEFAULT_RECONCILE_INTERVAL};

/// Convert a Certificate declaration
pub fn convert_certificate(cfg: Option<&CertificateConfig>) -> Result<Option<Certificate>> {
    Converter::default().certificate(cfg)
}

/// Convert an Issuer declaration
pub fn convert_issuer(cfg: Option<&IssuerConfig>) -> Result<Option<Issuer>> {
    Converter::default().issuer(cfg)
}

/// Convert a ClusterIssuer declaration
pub fn convert_cluster_issuer(cfg: Option<&IssuerConfig>) -> Result<Option<ClusterIssuer>> {
    Converter::default().cluster_issuer(cfg)
}

/// Convert a GitRepository declaration
pub fn convert_git_repository(cfg: Option<&GitRepositoryConfig>) -> Result<Option<GitRepository>> {
    Converter::default().git_repository(cfg)
}

/// Convert a HelmRepository declaration
pub fn convert_helm_repository(
    cfg: Option<&HelmRepositoryConfig>,
) -> Result<Option<HelmRepository>> {
    Converter::default().helm_repository(cfg)
}

/// Convert an OCIRepository declaration
pub fn convert_oci_repository(cfg: Option<&OciRepositoryConfig>) -> Result<Option<OCIRepository>> {
    Converter::default().oci_repository(cfg)
}

/// Convert a Kustomization declaration
pub fn convert_kustomization(cfg: Option<&KustomizationConfig>) -> Result<Option<Kustomization>> {
    Converter::default().kustomization(cfg)
}

/// Convert a HelmRelease declaration
pub fn convert_helm_release(cfg: Option<&HelmReleaseConfig>) -> Result<Option<HelmRelease>> {
    Converter::default().helm_release(cfg)
}

/// Convert an IPAddressPool declaration
pub fn convert_ip_address_pool(cfg: Option<&IpAddressPoolConfig>) -> Result<Option<IPAddressPool>> {
    Converter::default().ip_address_pool(cfg)
}

/// Convert an L2Advertisement declaration
pub fn convert_l2_advertisement(
    cfg: Option<&L2AdvertisementConfig>,
) -> Result<Option<L2Advertisement>> {
    Converter::default().l2_advertisement(cfg)
}

/// Convert a CiliumLoadBalancerIPPool declaration
pub fn convert_cilium_lb_ip_pool(
    cfg: Option<&CiliumLbIpPoolConfig>,
) -> Result<Option<CiliumLoadBalancerIPPool>> {
    Converter::default().cilium_lb_ip_pool(cfg)
}

/// Convert a Job declaration
pub fn convert_job(cfg: Option<&JobConfig>) -> Result<Option<Job>> {
    Converter::default().job(cfg)
}

/// Convert a Pod declaration
pub fn convert_pod(cfg: Option<&PodConfig>) -> Result<Option<Pod>> {
    Converter::default().pod(cfg)
}
