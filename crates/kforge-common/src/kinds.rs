//! Registry of supported resource kinds
//!
//! Every record kforge can build has one [`ResourceKind`] variant. The variant
//! carries the registered API group/version and Kind string, and doubles as
//! the identity of that kind's absence sentinel.

use std::fmt;

use crate::Error;

/// Resource kinds kforge builds and converts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Certificate (cert-manager.io)
    Certificate,
    /// Issuer (cert-manager.io)
    Issuer,
    /// ClusterIssuer (cert-manager.io)
    ClusterIssuer,
    /// GitRepository (source.toolkit.fluxcd.io)
    GitRepository,
    /// HelmRepository (source.toolkit.fluxcd.io)
    HelmRepository,
    /// OCIRepository (source.toolkit.fluxcd.io)
    OciRepository,
    /// Kustomization (kustomize.toolkit.fluxcd.io)
    Kustomization,
    /// HelmRelease (helm.toolkit.fluxcd.io)
    HelmRelease,
    /// IPAddressPool (metallb.io)
    IpAddressPool,
    /// L2Advertisement (metallb.io)
    L2Advertisement,
    /// BGPAdvertisement (metallb.io)
    BgpAdvertisement,
    /// CiliumLoadBalancerIPPool (cilium.io)
    CiliumLoadBalancerIpPool,
    /// CiliumL2AnnouncementPolicy (cilium.io)
    CiliumL2AnnouncementPolicy,
    /// Namespace (core)
    Namespace,
    /// Service (core)
    Service,
    /// Pod (core)
    Pod,
    /// Deployment (apps)
    Deployment,
    /// Job (batch)
    Job,
}

/// All ResourceKind variants for iteration.
pub const ALL_RESOURCE_KINDS: &[ResourceKind] = &[
    ResourceKind::Certificate,
    ResourceKind::Issuer,
    ResourceKind::ClusterIssuer,
    ResourceKind::GitRepository,
    ResourceKind::HelmRepository,
    ResourceKind::OciRepository,
    ResourceKind::Kustomization,
    ResourceKind::HelmRelease,
    ResourceKind::IpAddressPool,
    ResourceKind::L2Advertisement,
    ResourceKind::BgpAdvertisement,
    ResourceKind::CiliumLoadBalancerIpPool,
    ResourceKind::CiliumL2AnnouncementPolicy,
    ResourceKind::Namespace,
    ResourceKind::Service,
    ResourceKind::Pod,
    ResourceKind::Deployment,
    ResourceKind::Job,
];

impl ResourceKind {
    /// API group; empty for the core group.
    pub fn group(&self) -> &'static str {
        match self {
            Self::Certificate | Self::Issuer | Self::ClusterIssuer => "cert-manager.io",
            Self::GitRepository | Self::HelmRepository | Self::OciRepository => {
                "source.toolkit.fluxcd.io"
            }
            Self::Kustomization => "kustomize.toolkit.fluxcd.io",
            Self::HelmRelease => "helm.toolkit.fluxcd.io",
            Self::IpAddressPool | Self::L2Advertisement | Self::BgpAdvertisement => "metallb.io",
            Self::CiliumLoadBalancerIpPool | Self::CiliumL2AnnouncementPolicy => "cilium.io",
            Self::Namespace | Self::Service | Self::Pod => "",
            Self::Deployment => "apps",
            Self::Job => "batch",
        }
    }

    /// API version within the group.
    pub fn version(&self) -> &'static str {
        match self {
            Self::Certificate | Self::Issuer | Self::ClusterIssuer => "v1",
            Self::GitRepository | Self::HelmRepository => "v1",
            Self::OciRepository => "v1beta2",
            Self::Kustomization => "v1",
            Self::HelmRelease => "v2",
            Self::IpAddressPool | Self::L2Advertisement | Self::BgpAdvertisement => "v1beta1",
            Self::CiliumLoadBalancerIpPool | Self::CiliumL2AnnouncementPolicy => "v2alpha1",
            Self::Namespace | Self::Service | Self::Pod => "v1",
            Self::Deployment | Self::Job => "v1",
        }
    }

    /// Full apiVersion string (e.g., "cert-manager.io/v1", "v1").
    pub fn api_version(&self) -> String {
        let group = self.group();
        if group.is_empty() {
            self.version().to_string()
        } else {
            format!("{}/{}", group, self.version())
        }
    }

    /// Kubernetes Kind string.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Certificate => "Certificate",
            Self::Issuer => "Issuer",
            Self::ClusterIssuer => "ClusterIssuer",
            Self::GitRepository => "GitRepository",
            Self::HelmRepository => "HelmRepository",
            Self::OciRepository => "OCIRepository",
            Self::Kustomization => "Kustomization",
            Self::HelmRelease => "HelmRelease",
            Self::IpAddressPool => "IPAddressPool",
            Self::L2Advertisement => "L2Advertisement",
            Self::BgpAdvertisement => "BGPAdvertisement",
            Self::CiliumLoadBalancerIpPool => "CiliumLoadBalancerIPPool",
            Self::CiliumL2AnnouncementPolicy => "CiliumL2AnnouncementPolicy",
            Self::Namespace => "Namespace",
            Self::Service => "Service",
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::Job => "Job",
        }
    }

    /// Whether records of this kind live in a namespace.
    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            Self::ClusterIssuer
                | Self::CiliumLoadBalancerIpPool
                | Self::CiliumL2AnnouncementPolicy
                | Self::Namespace
        )
    }

    /// The "target is absent" sentinel for this kind.
    pub const fn absent(self) -> Error {
        Error::resource_absent(self)
    }

    /// Look up a kind by its Kind string.
    pub fn from_kind_str(kind: &str) -> Option<Self> {
        ALL_RESOURCE_KINDS
            .iter()
            .copied()
            .find(|k| k.kind_str() == kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_str())
    }
}
