//! Load-balancer conversions: MetalLB pools and advertisements, Cilium LB-IPAM

use kforge_common::Result;
use kforge_resources::cilium::*;
use kforge_resources::metallb::*;

use super::{apply_labels, converted, Converter};
use crate::config::{CiliumLbIpPoolConfig, IpAddressPoolConfig, L2AdvertisementConfig};

impl Converter {
    /// Convert an IPAddressPool declaration
    pub fn ip_address_pool(
        &self,
        cfg: Option<&IpAddressPoolConfig>,
    ) -> Result<Option<IPAddressPool>> {
        cfg.map(|cfg| self.build_ip_address_pool(cfg)).transpose()
    }

    /// Convert an L2Advertisement declaration
    pub fn l2_advertisement(
        &self,
        cfg: Option<&L2AdvertisementConfig>,
    ) -> Result<Option<L2Advertisement>> {
        cfg.map(|cfg| self.build_l2_advertisement(cfg)).transpose()
    }

    /// Convert a CiliumLoadBalancerIPPool declaration
    pub fn cilium_lb_ip_pool(
        &self,
        cfg: Option<&CiliumLbIpPoolConfig>,
    ) -> Result<Option<CiliumLoadBalancerIPPool>> {
        cfg.map(|cfg| self.build_cilium_lb_ip_pool(cfg)).transpose()
    }

    pub(crate) fn build_ip_address_pool(&self, cfg: &IpAddressPoolConfig) -> Result<IPAddressPool> {
        let mut pool =
            create_ip_address_pool(&cfg.name, &cfg.namespace, IPAddressPoolSpec::default());
        for address in &cfg.addresses {
            add_ip_address_pool_address(Some(&mut pool), address.as_str())?;
        }
        if let Some(auto_assign) = cfg.auto_assign {
            set_ip_address_pool_auto_assign(Some(&mut pool), auto_assign)?;
        }
        if cfg.avoid_buggy_ips {
            set_ip_address_pool_avoid_buggy_ips(Some(&mut pool), true)?;
        }
        apply_labels(&mut pool, &cfg.labels)?;

        converted(&pool);
        Ok(pool)
    }

    pub(crate) fn build_l2_advertisement(
        &self,
        cfg: &L2AdvertisementConfig,
    ) -> Result<L2Advertisement> {
        let mut adv =
            create_l2_advertisement(&cfg.name, &cfg.namespace, L2AdvertisementSpec::default());
        for pool in &cfg.ip_address_pools {
            add_l2_advertisement_ip_address_pool(Some(&mut adv), pool.as_str())?;
        }
        for interface in &cfg.interfaces {
            add_l2_advertisement_interface(Some(&mut adv), interface.as_str())?;
        }
        if !cfg.node_selector.is_empty() {
            add_l2_advertisement_node_selector(
                Some(&mut adv),
                Some(match_labels(cfg.node_selector.clone())),
            )?;
        }
        apply_labels(&mut adv, &cfg.labels)?;

        converted(&adv);
        Ok(adv)
    }

    pub(crate) fn build_cilium_lb_ip_pool(
        &self,
        cfg: &CiliumLbIpPoolConfig,
    ) -> Result<CiliumLoadBalancerIPPool> {
        let mut pool = create_cilium_lb_ip_pool(&cfg.name, CiliumLoadBalancerIPPoolSpec::default());
        for cidr in &cfg.cidrs {
            add_cilium_lb_ip_pool_block(Some(&mut pool), Some(IpPoolBlock::cidr(cidr)))?;
        }
        for range in &cfg.ranges {
            add_cilium_lb_ip_pool_block(
                Some(&mut pool),
                Some(IpPoolBlock::range(&range.start, &range.stop)),
            )?;
        }
        if !cfg.service_selector.is_empty() {
            set_cilium_lb_ip_pool_service_selector(
                Some(&mut pool),
                Some(match_labels(cfg.service_selector.clone())),
            )?;
        }
        if cfg.disabled {
            set_cilium_lb_ip_pool_disabled(Some(&mut pool), true)?;
        }
        apply_labels(&mut pool, &cfg.labels)?;

        converted(&pool);
        Ok(pool)
    }
}
