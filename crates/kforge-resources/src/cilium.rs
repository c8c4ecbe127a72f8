//! Cilium load-balancer resources
//!
//! Both kinds are cluster-scoped: LB-IPAM pools hand out service addresses and
//! L2 announcement policies decide which nodes answer ARP for them.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::{ResourceKind, Result};

use crate::builder;

/// CiliumLoadBalancerIPPool specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cilium.io",
    version = "v2alpha1",
    kind = "CiliumLoadBalancerIPPool",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct CiliumLoadBalancerIPPoolSpec {
    /// Address blocks in the pool
    #[serde(default)]
    pub blocks: Vec<IpPoolBlock>,

    /// Services eligible for addresses from this pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_selector: Option<LabelSelector>,

    /// Stop allocating from the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    /// Allow the first and last address of each CIDR
    #[serde(
        default,
        rename = "allowFirstLastIPs",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_first_last_ips: Option<String>,
}

/// One CIDR or start/stop range
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct IpPoolBlock {
    /// CIDR block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    /// First address of a range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Last address of a range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

impl IpPoolBlock {
    /// Block covering a CIDR
    pub fn cidr(cidr: impl Into<String>) -> Self {
        Self {
            cidr: Some(cidr.into()),
            ..Default::default()
        }
    }

    /// Block covering an inclusive address range
    pub fn range(start: impl Into<String>, stop: impl Into<String>) -> Self {
        Self {
            cidr: None,
            start: Some(start.into()),
            stop: Some(stop.into()),
        }
    }
}

/// CiliumL2AnnouncementPolicy specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cilium.io",
    version = "v2alpha1",
    kind = "CiliumL2AnnouncementPolicy",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct CiliumL2AnnouncementPolicySpec {
    /// Services announced by this policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_selector: Option<LabelSelector>,

    /// Nodes that announce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,

    /// Interface name regexes to announce on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,

    /// Announce service external IPs
    #[serde(default, rename = "externalIPs", skip_serializing_if = "Option::is_none")]
    pub external_ips: Option<bool>,

    /// Announce load-balancer ingress IPs
    #[serde(
        default,
        rename = "loadBalancerIPs",
        skip_serializing_if = "Option::is_none"
    )]
    pub load_balancer_ips: Option<bool>,
}

impl_buildable!(
    CiliumLoadBalancerIPPool,
    CiliumLoadBalancerIPPoolSpec,
    ResourceKind::CiliumLoadBalancerIpPool
);
impl_buildable!(
    CiliumL2AnnouncementPolicy,
    CiliumL2AnnouncementPolicySpec,
    ResourceKind::CiliumL2AnnouncementPolicy
);

/// Create a CiliumLoadBalancerIPPool
pub fn create_cilium_lb_ip_pool(
    name: &str,
    spec: CiliumLoadBalancerIPPoolSpec,
) -> CiliumLoadBalancerIPPool {
    builder::create(name, None, spec)
}

/// Add an address block
pub fn add_cilium_lb_ip_pool_block(
    target: Option<&mut CiliumLoadBalancerIPPool>,
    block: Option<IpPoolBlock>,
) -> Result<()> {
    builder::push_required(target, "block", |p| &mut p.spec.blocks, block)
}

/// Restrict the pool to matching services
pub fn set_cilium_lb_ip_pool_service_selector(
    target: Option<&mut CiliumLoadBalancerIPPool>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::set_required(
        target,
        "service_selector",
        |p| &mut p.spec.service_selector,
        selector.map(Some),
    )
}

/// Enable or disable allocation from the pool
pub fn set_cilium_lb_ip_pool_disabled(
    target: Option<&mut CiliumLoadBalancerIPPool>,
    disabled: bool,
) -> Result<()> {
    builder::set_some(target, |p| &mut p.spec.disabled, disabled)
}

/// Allow network and broadcast addresses ("Yes" or "No")
pub fn set_cilium_lb_ip_pool_allow_first_last_ips(
    target: Option<&mut CiliumLoadBalancerIPPool>,
    allow: bool,
) -> Result<()> {
    let value = if allow { "Yes" } else { "No" };
    builder::set_some(
        target,
        |p| &mut p.spec.allow_first_last_ips,
        value.to_string(),
    )
}

/// Create a CiliumL2AnnouncementPolicy
pub fn create_cilium_l2_announcement_policy(
    name: &str,
    spec: CiliumL2AnnouncementPolicySpec,
) -> CiliumL2AnnouncementPolicy {
    builder::create(name, None, spec)
}

/// Announce on interfaces matching a regex
pub fn add_cilium_l2_announcement_policy_interface(
    target: Option<&mut CiliumL2AnnouncementPolicy>,
    interface: impl Into<String>,
) -> Result<()> {
    builder::push(target, |p| &mut p.spec.interfaces, interface.into())
}

/// Restrict announcements to matching services
pub fn set_cilium_l2_announcement_policy_service_selector(
    target: Option<&mut CiliumL2AnnouncementPolicy>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::set_required(
        target,
        "service_selector",
        |p| &mut p.spec.service_selector,
        selector.map(Some),
    )
}

/// Restrict announcing nodes
pub fn set_cilium_l2_announcement_policy_node_selector(
    target: Option<&mut CiliumL2AnnouncementPolicy>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::set_required(
        target,
        "node_selector",
        |p| &mut p.spec.node_selector,
        selector.map(Some),
    )
}

/// Announce service external IPs
pub fn set_cilium_l2_announcement_policy_external_ips(
    target: Option<&mut CiliumL2AnnouncementPolicy>,
    enabled: bool,
) -> Result<()> {
    builder::set_some(target, |p| &mut p.spec.external_ips, enabled)
}

/// Announce load-balancer ingress IPs
pub fn set_cilium_l2_announcement_policy_load_balancer_ips(
    target: Option<&mut CiliumL2AnnouncementPolicy>,
    enabled: bool,
) -> Result<()> {
    builder::set_some(target, |p| &mut p.spec.load_balancer_ips, enabled)
}
