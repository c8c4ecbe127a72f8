//! MetalLB resources: IPAddressPool, L2Advertisement and BGPAdvertisement

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::{ResourceKind, Result};

use crate::builder;

/// MetalLB IPAddressPool specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "metallb.io",
    version = "v1beta1",
    kind = "IPAddressPool",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct IPAddressPoolSpec {
    /// CIDRs or `start-end` ranges handed out by the pool
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Hand out addresses without an explicit request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_assign: Option<bool>,

    /// Skip .0 and .255 addresses
    #[serde(
        default,
        rename = "avoidBuggyIPs",
        skip_serializing_if = "Option::is_none"
    )]
    pub avoid_buggy_ips: Option<bool>,

    /// Restrict which services may take addresses from the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_allocation: Option<ServiceAllocation>,
}

/// Service restrictions on an IPAddressPool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAllocation {
    /// Pool priority; lower wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Namespaces allowed to use the pool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    /// Services allowed to use the pool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_selectors: Vec<LabelSelector>,
}

/// MetalLB L2Advertisement specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "metallb.io",
    version = "v1beta1",
    kind = "L2Advertisement",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct L2AdvertisementSpec {
    /// Pools announced by name; empty means all pools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_address_pools: Vec<String>,

    /// Pools announced by label
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_address_pool_selectors: Vec<LabelSelector>,

    /// Nodes that announce; empty means all nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_selectors: Vec<LabelSelector>,

    /// Interfaces to announce from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
}

/// MetalLB BGPAdvertisement specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "metallb.io",
    version = "v1beta1",
    kind = "BGPAdvertisement",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct BGPAdvertisementSpec {
    /// Pools announced by name; empty means all pools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_address_pools: Vec<String>,

    /// Prefix length used to aggregate IPv4 routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_length: Option<i32>,

    /// BGP LOCAL_PREF attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_pref: Option<u32>,

    /// BGP communities attached to the routes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<String>,

    /// BGPPeers to announce to; empty means all peers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<String>,

    /// Nodes that announce; empty means all nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_selectors: Vec<LabelSelector>,
}

impl_buildable!(IPAddressPool, IPAddressPoolSpec, ResourceKind::IpAddressPool);
impl_buildable!(L2Advertisement, L2AdvertisementSpec, ResourceKind::L2Advertisement);
impl_buildable!(BGPAdvertisement, BGPAdvertisementSpec, ResourceKind::BgpAdvertisement);

/// Selector matching exactly the given labels
pub fn match_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> LabelSelector
where
    K: Into<String>,
    V: Into<String>,
{
    LabelSelector {
        match_labels: Some(
            labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ),
        match_expressions: None,
    }
}

// =============================================================================
// IPAddressPool
// =============================================================================

/// Create an IPAddressPool
pub fn create_ip_address_pool(
    name: &str,
    namespace: &str,
    spec: IPAddressPoolSpec,
) -> IPAddressPool {
    builder::create(name, Some(namespace), spec)
}

/// Add a CIDR or address range
pub fn add_ip_address_pool_address(
    target: Option<&mut IPAddressPool>,
    address: impl Into<String>,
) -> Result<()> {
    builder::push(target, |p| &mut p.spec.addresses, address.into())
}

/// Enable or disable automatic assignment
pub fn set_ip_address_pool_auto_assign(
    target: Option<&mut IPAddressPool>,
    auto_assign: bool,
) -> Result<()> {
    builder::set_some(target, |p| &mut p.spec.auto_assign, auto_assign)
}

/// Skip network and broadcast addresses
pub fn set_ip_address_pool_avoid_buggy_ips(
    target: Option<&mut IPAddressPool>,
    avoid: bool,
) -> Result<()> {
    builder::set_some(target, |p| &mut p.spec.avoid_buggy_ips, avoid)
}

/// Restrict the pool to services in a namespace
pub fn add_ip_address_pool_allocation_namespace(
    target: Option<&mut IPAddressPool>,
    namespace: impl Into<String>,
) -> Result<()> {
    builder::push(
        target,
        |p| {
            &mut p
                .spec
                .service_allocation
                .get_or_insert_with(Default::default)
                .namespaces
        },
        namespace.into(),
    )
}

/// Set the pool's allocation priority
pub fn set_ip_address_pool_allocation_priority(
    target: Option<&mut IPAddressPool>,
    priority: i32,
) -> Result<()> {
    builder::set_some(
        target,
        |p| {
            &mut p
                .spec
                .service_allocation
                .get_or_insert_with(Default::default)
                .priority
        },
        priority,
    )
}

// =============================================================================
// L2Advertisement
// =============================================================================

/// Create an L2Advertisement
pub fn create_l2_advertisement(
    name: &str,
    namespace: &str,
    spec: L2AdvertisementSpec,
) -> L2Advertisement {
    builder::create(name, Some(namespace), spec)
}

/// Announce a pool by name
pub fn add_l2_advertisement_ip_address_pool(
    target: Option<&mut L2Advertisement>,
    pool: impl Into<String>,
) -> Result<()> {
    builder::push(target, |a| &mut a.spec.ip_address_pools, pool.into())
}

/// Announce pools matching a selector
pub fn add_l2_advertisement_ip_address_pool_selector(
    target: Option<&mut L2Advertisement>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::push_required(
        target,
        "ip_address_pool_selector",
        |a| &mut a.spec.ip_address_pool_selectors,
        selector,
    )
}

/// Limit announcing nodes by selector
pub fn add_l2_advertisement_node_selector(
    target: Option<&mut L2Advertisement>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::push_required(
        target,
        "node_selector",
        |a| &mut a.spec.node_selectors,
        selector,
    )
}

/// Announce from an interface
pub fn add_l2_advertisement_interface(
    target: Option<&mut L2Advertisement>,
    interface: impl Into<String>,
) -> Result<()> {
    builder::push(target, |a| &mut a.spec.interfaces, interface.into())
}

// =============================================================================
// BGPAdvertisement
// =============================================================================

/// Create a BGPAdvertisement
pub fn create_bgp_advertisement(
    name: &str,
    namespace: &str,
    spec: BGPAdvertisementSpec,
) -> BGPAdvertisement {
    builder::create(name, Some(namespace), spec)
}

/// Announce a pool by name
pub fn add_bgp_advertisement_ip_address_pool(
    target: Option<&mut BGPAdvertisement>,
    pool: impl Into<String>,
) -> Result<()> {
    builder::push(target, |a| &mut a.spec.ip_address_pools, pool.into())
}

/// Attach a BGP community
pub fn add_bgp_advertisement_community(
    target: Option<&mut BGPAdvertisement>,
    community: impl Into<String>,
) -> Result<()> {
    builder::push(target, |a| &mut a.spec.communities, community.into())
}

/// Announce to a peer
pub fn add_bgp_advertisement_peer(
    target: Option<&mut BGPAdvertisement>,
    peer: impl Into<String>,
) -> Result<()> {
    builder::push(target, |a| &mut a.spec.peers, peer.into())
}

/// Limit announcing nodes by selector
pub fn add_bgp_advertisement_node_selector(
    target: Option<&mut BGPAdvertisement>,
    selector: Option<LabelSelector>,
) -> Result<()> {
    builder::push_required(
        target,
        "node_selector",
        |a| &mut a.spec.node_selectors,
        selector,
    )
}

/// Set the LOCAL_PREF attribute
pub fn set_bgp_advertisement_local_pref(
    target: Option<&mut BGPAdvertisement>,
    local_pref: u32,
) -> Result<()> {
    builder::set_some(target, |a| &mut a.spec.local_pref, local_pref)
}

/// Set the IPv4 aggregation length
pub fn set_bgp_advertisement_aggregation_length(
    target: Option<&mut BGPAdvertisement>,
    length: i32,
) -> Result<()> {
    builder::set_some(target, |a| &mut a.spec.aggregation_length, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kforge_common::Error;
    use kube::Resource;

    #[test]
    fn metallb_kinds_use_v1beta1() {
        assert_eq!(IPAddressPool::api_version(&()), "metallb.io/v1beta1");
        assert_eq!(IPAddressPool::kind(&()), "IPAddressPool");
        assert_eq!(L2Advertisement::kind(&()), "L2Advertisement");
        assert_eq!(BGPAdvertisement::kind(&()), "BGPAdvertisement");
    }

    #[test]
    fn ip_address_pool_builder() {
        let mut pool = create_ip_address_pool("public", "metallb-system", Default::default());
        assert!(pool.spec.addresses.is_empty());

        add_ip_address_pool_address(Some(&mut pool), "192.168.1.240-192.168.1.250").unwrap();
        add_ip_address_pool_address(Some(&mut pool), "10.0.100.0/28").unwrap();
        set_ip_address_pool_auto_assign(Some(&mut pool), false).unwrap();
        set_ip_address_pool_avoid_buggy_ips(Some(&mut pool), true).unwrap();
        add_ip_address_pool_allocation_namespace(Some(&mut pool), "ingress").unwrap();
        set_ip_address_pool_allocation_priority(Some(&mut pool), 10).unwrap();

        assert_eq!(pool.spec.addresses.len(), 2);
        assert_eq!(pool.spec.auto_assign, Some(false));
        let allocation = pool.spec.service_allocation.as_ref().unwrap();
        assert_eq!(allocation.namespaces, vec!["ingress".to_string()]);
        assert_eq!(allocation.priority, Some(10));

        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["spec"]["avoidBuggyIPs"], true);
        assert_eq!(json["spec"]["autoAssign"], false);
    }

    #[test]
    fn l2_advertisement_selectors_are_required_arguments() {
        let mut adv = create_l2_advertisement("public", "metallb-system", Default::default());
        assert_eq!(
            add_l2_advertisement_node_selector(Some(&mut adv), None),
            Err(Error::argument_absent("node_selector"))
        );
        assert!(adv.spec.node_selectors.is_empty());

        add_l2_advertisement_node_selector(
            Some(&mut adv),
            Some(match_labels([("node-role.kubernetes.io/worker", "")])),
        )
        .unwrap();
        add_l2_advertisement_ip_address_pool(Some(&mut adv), "public").unwrap();
        add_l2_advertisement_interface(Some(&mut adv), "eth0").unwrap();

        let json = serde_json::to_value(&adv).unwrap();
        assert_eq!(json["spec"]["ipAddressPools"][0], "public");
        assert_eq!(json["spec"]["interfaces"][0], "eth0");
        assert_eq!(
            json["spec"]["nodeSelectors"][0]["matchLabels"]["node-role.kubernetes.io/worker"],
            ""
        );
    }

    #[test]
    fn bgp_advertisement_builder() {
        let mut adv = create_bgp_advertisement("public", "metallb-system", Default::default());
        add_bgp_advertisement_ip_address_pool(Some(&mut adv), "public").unwrap();
        add_bgp_advertisement_community(Some(&mut adv), "65535:65282").unwrap();
        add_bgp_advertisement_peer(Some(&mut adv), "tor-a").unwrap();
        set_bgp_advertisement_local_pref(Some(&mut adv), 100).unwrap();
        set_bgp_advertisement_aggregation_length(Some(&mut adv), 32).unwrap();

        assert_eq!(adv.spec.communities, vec!["65535:65282".to_string()]);
        assert_eq!(adv.spec.peers, vec!["tor-a".to_string()]);
        assert_eq!(adv.spec.local_pref, Some(100));
        assert_eq!(adv.spec.aggregation_length, Some(32));
    }

    #[test]
    fn mutators_reject_absent_target() {
        assert_eq!(
            add_ip_address_pool_address(None, "10.0.0.0/24"),
            Err(ResourceKind::IpAddressPool.absent())
        );
        assert_eq!(
            add_l2_advertisement_interface(None, "eth0"),
            Err(ResourceKind::L2Advertisement.absent())
        );
        assert_eq!(
            add_l2_advertisement_node_selector(None, None),
            Err(ResourceKind::L2Advertisement.absent())
        );
        assert_eq!(
            set_bgp_advertisement_local_pref(None, 1),
            Err(ResourceKind::BgpAdvertisement.absent())
        );
    }

    #[test]
    fn every_ip_address_pool_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            ("add_ip_address_pool_address", add_ip_address_pool_address(None, "192.168.1.0/24")),
            ("set_ip_address_pool_auto_assign", set_ip_address_pool_auto_assign(None, false)),
            (
                "set_ip_address_pool_avoid_buggy_ips",
                set_ip_address_pool_avoid_buggy_ips(None, true),
            ),
            (
                "add_ip_address_pool_allocation_namespace",
                add_ip_address_pool_allocation_namespace(None, "apps"),
            ),
            (
                "set_ip_address_pool_allocation_priority",
                set_ip_address_pool_allocation_priority(None, 10),
            ),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::IpAddressPool.absent()), "{operation}");
        }
    }

    #[test]
    fn every_l2_advertisement_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            (
                "add_l2_advertisement_ip_address_pool",
                add_l2_advertisement_ip_address_pool(None, "public"),
            ),
            (
                "add_l2_advertisement_ip_address_pool_selector",
                add_l2_advertisement_ip_address_pool_selector(None, Some(LabelSelector::default())),
            ),
            (
                "add_l2_advertisement_node_selector",
                add_l2_advertisement_node_selector(None, Some(LabelSelector::default())),
            ),
            ("add_l2_advertisement_interface", add_l2_advertisement_interface(None, "eth0")),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::L2Advertisement.absent()), "{operation}");
        }
    }

    #[test]
    fn every_bgp_advertisement_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            (
                "add_bgp_advertisement_ip_address_pool",
                add_bgp_advertisement_ip_address_pool(None, "public"),
            ),
            (
                "add_bgp_advertisement_community",
                add_bgp_advertisement_community(None, "65535:65282"),
            ),
            ("add_bgp_advertisement_peer", add_bgp_advertisement_peer(None, "edge-router")),
            (
                "add_bgp_advertisement_node_selector",
                add_bgp_advertisement_node_selector(None, Some(LabelSelector::default())),
            ),
            ("set_bgp_advertisement_local_pref", set_bgp_advertisement_local_pref(None, 100)),
            (
                "set_bgp_advertisement_aggregation_length",
                set_bgp_advertisement_aggregation_length(None, 32),
            ),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::BgpAdvertisement.absent()), "{operation}");
        }
    }
}
