//! Flat config declarations
//!
//! Each `*Config` is the user-facing, simplified form of one resource kind:
//! strings, booleans and small collections, with no validation state. Empty
//! strings mean "not specified". Every field defaults, so a document only
//! lists what it sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Certificate declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateConfig {
    /// Certificate name
    pub name: String,
    /// Certificate namespace
    pub namespace: String,
    /// Secret the signed certificate is written to; defaults to `<name>-tls`
    pub secret_name: String,
    /// Common name
    pub common_name: String,
    /// DNS subject alternative names
    pub dns_names: Vec<String>,
    /// IP subject alternative names
    pub ip_addresses: Vec<String>,
    /// Key usages
    pub usages: Vec<String>,
    /// Name of the signing issuer
    pub issuer_name: String,
    /// `Issuer` or `ClusterIssuer`; empty means `ClusterIssuer`, anything else is rejected
    pub issuer_kind: String,
    /// Requested lifetime, e.g. `2160h`
    pub duration: String,
    /// Renewal window, e.g. `360h`
    pub renew_before: String,
    /// Whether the certificate is a CA
    pub is_ca: bool,
    /// Private key algorithm (RSA, ECDSA, Ed25519)
    pub private_key_algorithm: String,
    /// Private key size in bits
    pub private_key_size: Option<u32>,
    /// Labels on the Certificate
    pub labels: BTreeMap<String, String>,
}

/// Issuer or ClusterIssuer declaration
///
/// Exactly one of the ACME, CA or self-signed settings is expected; when
/// several are given, all are applied and cert-manager rejects the result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssuerConfig {
    /// Issuer name
    pub name: String,
    /// Issuer namespace; ignored for ClusterIssuers
    pub namespace: String,
    /// ACME directory URL
    pub acme_server: String,
    /// ACME account email
    pub acme_email: String,
    /// Secret holding the ACME account key; defaults to `<name>-account-key`
    pub acme_private_key_secret: String,
    /// IngressClass for HTTP-01 challenges
    pub acme_ingress_class: String,
    /// Secret holding a CA key pair
    pub ca_secret: String,
    /// Issue self-signed certificates
    pub self_signed: bool,
    /// Labels on the issuer
    pub labels: BTreeMap<String, String>,
}

/// GitRepository declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GitRepositoryConfig {
    /// Repository name
    pub name: String,
    /// Repository namespace
    pub namespace: String,
    /// Clone URL
    pub url: String,
    /// Branch to track
    pub branch: String,
    /// Tag to pin
    pub tag: String,
    /// SemVer range to follow
    pub semver: String,
    /// Commit to pin
    pub commit: String,
    /// Fetch interval
    pub interval: String,
    /// Fetch timeout
    pub timeout: String,
    /// Secret holding credentials
    pub secret_name: String,
    /// Exclusion patterns
    pub ignore: String,
    /// Suspend fetching
    pub suspend: bool,
    /// Labels on the repository
    pub labels: BTreeMap<String, String>,
}

/// HelmRepository declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelmRepositoryConfig {
    /// Repository name
    pub name: String,
    /// Repository namespace
    pub namespace: String,
    /// Index URL
    pub url: String,
    /// `default` or `oci`
    #[serde(rename = "type")]
    pub repo_type: String,
    /// Fetch interval
    pub interval: String,
    /// Fetch timeout
    pub timeout: String,
    /// Secret holding credentials
    pub secret_name: String,
    /// Forward credentials to chart hosts
    pub pass_credentials: bool,
    /// Suspend fetching
    pub suspend: bool,
    /// Labels on the repository
    pub labels: BTreeMap<String, String>,
}

/// OCIRepository declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OciRepositoryConfig {
    /// Repository name
    pub name: String,
    /// Repository namespace
    pub namespace: String,
    /// Artifact URL (`oci://...`)
    pub url: String,
    /// Tag to pull
    pub tag: String,
    /// SemVer range to follow
    pub semver: String,
    /// Digest to pin
    pub digest: String,
    /// Fetch interval
    pub interval: String,
    /// Fetch timeout
    pub timeout: String,
    /// Secret holding registry credentials
    pub secret_name: String,
    /// OIDC provider (aws, azure, gcp)
    pub provider: String,
    /// Allow plain HTTP
    pub insecure: bool,
    /// Suspend fetching
    pub suspend: bool,
    /// Labels on the repository
    pub labels: BTreeMap<String, String>,
}

/// Kustomization declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KustomizationConfig {
    /// Kustomization name
    pub name: String,
    /// Kustomization namespace
    pub namespace: String,
    /// Source kind; empty means `GitRepository`
    pub source_kind: String,
    /// Source name
    pub source_name: String,
    /// Source namespace; empty means the Kustomization's namespace
    pub source_namespace: String,
    /// Path within the source
    pub path: String,
    /// Apply interval
    pub interval: String,
    /// Interval after a failure
    pub retry_interval: String,
    /// Apply timeout
    pub timeout: String,
    /// Garbage-collect removed objects
    pub prune: bool,
    /// Wait for readiness
    pub wait: bool,
    /// Namespace override for applied objects
    pub target_namespace: String,
    /// Names of Kustomizations that must be ready first
    pub depends_on: Vec<String>,
    /// Post-build substitution variables
    pub substitute: BTreeMap<String, String>,
    /// Suspend reconciliation
    pub suspend: bool,
    /// Labels on the Kustomization
    pub labels: BTreeMap<String, String>,
}

/// HelmRelease declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelmReleaseConfig {
    /// Release name
    pub name: String,
    /// Release namespace
    pub namespace: String,
    /// Chart name
    pub chart: String,
    /// Chart version or range
    pub version: String,
    /// Source kind; empty means `HelmRepository`
    pub source_kind: String,
    /// Source name
    pub source_name: String,
    /// Source namespace; empty means the release's namespace
    pub source_namespace: String,
    /// Reconcile interval
    pub interval: String,
    /// Helm action timeout
    pub timeout: String,
    /// Helm release name override
    pub release_name: String,
    /// Install namespace
    pub target_namespace: String,
    /// Create the install namespace
    pub create_namespace: bool,
    /// Names of HelmReleases that must be ready first
    pub depends_on: Vec<String>,
    /// Inline chart values
    pub values: Option<Value>,
    /// Suspend reconciliation
    pub suspend: bool,
    /// Labels on the HelmRelease
    pub labels: BTreeMap<String, String>,
}

/// IPAddressPool declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpAddressPoolConfig {
    /// Pool name
    pub name: String,
    /// Pool namespace
    pub namespace: String,
    /// CIDRs or ranges
    pub addresses: Vec<String>,
    /// Automatic assignment; unset keeps the MetalLB default
    pub auto_assign: Option<bool>,
    /// Skip network and broadcast addresses
    #[serde(rename = "avoidBuggyIPs")]
    pub avoid_buggy_ips: bool,
    /// Labels on the pool
    pub labels: BTreeMap<String, String>,
}

/// L2Advertisement declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct L2AdvertisementConfig {
    /// Advertisement name
    pub name: String,
    /// Advertisement namespace
    pub namespace: String,
    /// Pools to announce; empty means all
    pub ip_address_pools: Vec<String>,
    /// Interfaces to announce from
    pub interfaces: Vec<String>,
    /// Labels announcing nodes must carry
    pub node_selector: BTreeMap<String, String>,
    /// Labels on the advertisement
    pub labels: BTreeMap<String, String>,
}

/// CiliumLoadBalancerIPPool declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CiliumLbIpPoolConfig {
    /// Pool name
    pub name: String,
    /// CIDR blocks
    pub cidrs: Vec<String>,
    /// Address ranges
    pub ranges: Vec<IpRangeConfig>,
    /// Labels a service must carry to use the pool
    pub service_selector: BTreeMap<String, String>,
    /// Stop allocating from the pool
    pub disabled: bool,
    /// Labels on the pool
    pub labels: BTreeMap<String, String>,
}

/// Inclusive address range
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRangeConfig {
    /// First address
    pub start: String,
    /// Last address
    pub stop: String,
}

/// Job declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobConfig {
    /// Job name; also the container name
    pub name: String,
    /// Job namespace
    pub namespace: String,
    /// Container image
    pub image: String,
    /// Entrypoint override
    pub command: Vec<String>,
    /// Arguments
    pub args: Vec<String>,
    /// Environment variables
    pub env: BTreeMap<String, String>,
    /// `OnFailure` or `Never`; empty means `Never`
    pub restart_policy: String,
    /// Retries before the Job fails
    pub backoff_limit: Option<i32>,
    /// How long a finished Job is kept, e.g. `1h`
    pub ttl_after_finished: String,
    /// Maximum run time, e.g. `30m`
    pub active_deadline: String,
    /// Service account for the pods
    pub service_account: String,
    /// Node labels the pods require
    pub node_selector: BTreeMap<String, String>,
    /// Labels on the Job and its pods
    pub labels: BTreeMap<String, String>,
}

/// Pod declaration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodConfig {
    /// Pod name; also the container name
    pub name: String,
    /// Pod namespace
    pub namespace: String,
    /// Container image
    pub image: String,
    /// Entrypoint override
    pub command: Vec<String>,
    /// Arguments
    pub args: Vec<String>,
    /// Environment variables
    pub env: BTreeMap<String, String>,
    /// `Always`, `OnFailure` or `Never`; empty keeps the cluster default
    pub restart_policy: String,
    /// Service account
    pub service_account: String,
    /// Node labels the pod requires
    pub node_selector: BTreeMap<String, String>,
    /// Labels on the Pod
    pub labels: BTreeMap<String, String>,
}
