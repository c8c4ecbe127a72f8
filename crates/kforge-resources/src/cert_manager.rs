//! cert-manager resources: Certificate, Issuer and ClusterIssuer
//!
//! Issuer and ClusterIssuer share one settings block ([`IssuerSettings`]),
//! flattened into each spec the way cert-manager inlines it, so the issuer
//! operations below are generic over [`IssuerKind`] and report the sentinel of
//! whichever kind they were handed.

use std::collections::BTreeMap;
use std::time::Duration;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::duration::serde_opt_duration;
use kforge_common::{ResourceKind, Result};

use crate::builder::{self, HasSpec};

// =============================================================================
// Certificate
// =============================================================================

/// cert-manager Certificate specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Certificate",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Name of the Secret the signed certificate is stored in
    pub secret_name: String,

    /// Common name (deprecated upstream in favour of SANs, still widely used)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// DNS subject alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,

    /// IP address subject alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,

    /// URI subject alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,

    /// Email subject alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<String>,

    /// Requested key usages (e.g., "server auth")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usages: Vec<String>,

    /// Requested certificate lifetime
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub duration: Option<Duration>,

    /// How long before expiry the certificate is renewed
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_opt_duration")]
    #[schemars(with = "Option<String>")]
    pub renew_before: Option<Duration>,

    /// Issuer that signs this certificate
    pub issuer_ref: IssuerRef,

    /// Whether the certificate is a CA
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "isCA")]
    pub is_ca: Option<bool>,

    /// Private key generation settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<CertificatePrivateKey>,

    /// Labels and annotations copied onto the generated Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_template: Option<SecretTemplate>,
}

/// Reference to the Issuer or ClusterIssuer signing a certificate
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRef {
    /// Issuer name
    pub name: String,
    /// Issuer kind (Issuer or ClusterIssuer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// API group (cert-manager.io)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl IssuerRef {
    /// Reference a namespaced Issuer
    pub fn issuer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(ResourceKind::Issuer.kind_str().to_string()),
            group: Some(ResourceKind::Issuer.group().to_string()),
        }
    }

    /// Reference a ClusterIssuer
    pub fn cluster_issuer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(ResourceKind::ClusterIssuer.kind_str().to_string()),
            group: Some(ResourceKind::ClusterIssuer.group().to_string()),
        }
    }
}

/// Private key settings for a Certificate
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePrivateKey {
    /// Key algorithm (RSA, ECDSA, Ed25519)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Key size in bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Never or Always
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_policy: Option<String>,
}

/// Metadata applied to the Secret cert-manager writes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct SecretTemplate {
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl_buildable!(Certificate, CertificateSpec, ResourceKind::Certificate);

/// Create a Certificate
pub fn create_certificate(name: &str, namespace: &str, spec: CertificateSpec) -> Certificate {
    builder::create(name, Some(namespace), spec)
}

/// Append a DNS subject alternative name
pub fn add_certificate_dns_name(
    target: Option<&mut Certificate>,
    dns_name: impl Into<String>,
) -> Result<()> {
    builder::push(target, |c| &mut c.spec.dns_names, dns_name.into())
}

/// Append an IP address subject alternative name
pub fn add_certificate_ip_address(
    target: Option<&mut Certificate>,
    ip_address: impl Into<String>,
) -> Result<()> {
    builder::push(target, |c| &mut c.spec.ip_addresses, ip_address.into())
}

/// Append a URI subject alternative name
pub fn add_certificate_uri(target: Option<&mut Certificate>, uri: impl Into<String>) -> Result<()> {
    builder::push(target, |c| &mut c.spec.uris, uri.into())
}

/// Append an email subject alternative name
pub fn add_certificate_email_address(
    target: Option<&mut Certificate>,
    email: impl Into<String>,
) -> Result<()> {
    builder::push(target, |c| &mut c.spec.email_addresses, email.into())
}

/// Append a key usage
pub fn add_certificate_usage(
    target: Option<&mut Certificate>,
    usage: impl Into<String>,
) -> Result<()> {
    builder::push(target, |c| &mut c.spec.usages, usage.into())
}

/// Set the Secret the certificate is written to
pub fn set_certificate_secret_name(
    target: Option<&mut Certificate>,
    secret_name: impl Into<String>,
) -> Result<()> {
    builder::set(target, |c| &mut c.spec.secret_name, secret_name.into())
}

/// Set the common name
pub fn set_certificate_common_name(
    target: Option<&mut Certificate>,
    common_name: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |c| &mut c.spec.common_name, common_name.into())
}

/// Set the requested lifetime
pub fn set_certificate_duration(
    target: Option<&mut Certificate>,
    duration: Duration,
) -> Result<()> {
    builder::set_some(target, |c| &mut c.spec.duration, duration)
}

/// Set the renewal window
pub fn set_certificate_renew_before(
    target: Option<&mut Certificate>,
    renew_before: Duration,
) -> Result<()> {
    builder::set_some(target, |c| &mut c.spec.renew_before, renew_before)
}

/// Point the certificate at an issuer
pub fn set_certificate_issuer_ref(
    target: Option<&mut Certificate>,
    issuer_ref: Option<IssuerRef>,
) -> Result<()> {
    builder::set_required(target, "issuer_ref", |c| &mut c.spec.issuer_ref, issuer_ref)
}

/// Mark the certificate as a CA
pub fn set_certificate_is_ca(target: Option<&mut Certificate>, is_ca: bool) -> Result<()> {
    builder::set_some(target, |c| &mut c.spec.is_ca, is_ca)
}

/// Set the private key algorithm
pub fn set_certificate_private_key_algorithm(
    target: Option<&mut Certificate>,
    algorithm: impl Into<String>,
) -> Result<()> {
    let algorithm = algorithm.into();
    builder::update(target, |c| {
        c.spec.private_key.get_or_insert_with(Default::default).algorithm = Some(algorithm);
    })
}

/// Set the private key size in bits
pub fn set_certificate_private_key_size(
    target: Option<&mut Certificate>,
    size: u32,
) -> Result<()> {
    builder::update(target, |c| {
        c.spec.private_key.get_or_insert_with(Default::default).size = Some(size);
    })
}

/// Set the private key rotation policy
pub fn set_certificate_private_key_rotation_policy(
    target: Option<&mut Certificate>,
    policy: impl Into<String>,
) -> Result<()> {
    let policy = policy.into();
    builder::update(target, |c| {
        c.spec.private_key.get_or_insert_with(Default::default).rotation_policy = Some(policy);
    })
}

/// Add a label to the generated Secret
pub fn add_certificate_secret_template_label(
    target: Option<&mut Certificate>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |c| &mut c.spec.secret_template.get_or_insert_with(Default::default).labels,
        key,
        value,
    )
}

// =============================================================================
// Issuer / ClusterIssuer
// =============================================================================

/// Settings shared by Issuer and ClusterIssuer. Exactly one of the issuer
/// types is expected to be set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSettings {
    /// ACME (e.g., Let's Encrypt) issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<AcmeIssuer>,
    /// CA issuer backed by a key pair Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<CaIssuer>,
    /// Self-signed issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<SelfSignedIssuer>,
}

/// cert-manager Issuer specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Issuer",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
pub struct IssuerSpec {
    /// Issuer settings
    #[serde(flatten)]
    pub settings: IssuerSettings,
}

/// cert-manager ClusterIssuer specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "ClusterIssuer",
    derive = "PartialEq",
    derive = "Default"
)]
pub struct ClusterIssuerSpec {
    /// Issuer settings
    #[serde(flatten)]
    pub settings: IssuerSettings,
}

/// ACME issuer settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcmeIssuer {
    /// ACME directory URL
    pub server: String,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Secret holding the ACME account key
    pub private_key_secret_ref: SecretKeySelector,
    /// Challenge solvers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solvers: Vec<AcmeSolver>,
    /// Skip TLS verification of the ACME server
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "skipTLSVerify")]
    pub skip_tls_verify: Option<bool>,
}

/// Reference to a key within a Secret
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct SecretKeySelector {
    /// Secret name
    pub name: String,
    /// Key within the Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// ACME challenge solver
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct AcmeSolver {
    /// Restrict the solver to matching names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<SolverSelector>,
    /// HTTP-01 challenge solver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http01: Option<Http01Solver>,
    /// DNS-01 challenge solver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns01: Option<Dns01Solver>,
}

impl AcmeSolver {
    /// HTTP-01 solver using the given ingress class
    pub fn http01_ingress(ingress_class_name: impl Into<String>) -> Self {
        Self {
            http01: Some(Http01Solver {
                ingress: Some(Http01Ingress {
                    ingress_class_name: Some(ingress_class_name.into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }
}

/// Names a solver applies to
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolverSelector {
    /// Exact DNS names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    /// DNS zones (suffix match)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_zones: Vec<String>,
}

/// HTTP-01 solver
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Http01Solver {
    /// Solve through an Ingress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Http01Ingress>,
}

/// Ingress used by the HTTP-01 solver
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Http01Ingress {
    /// Legacy ingress class annotation value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// IngressClass name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,
}

/// DNS-01 solver
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Dns01Solver {
    /// Cloudflare DNS provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare: Option<CloudflareDns01>,
    /// Route53 DNS provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route53: Option<Route53Dns01>,
}

/// Cloudflare DNS-01 provider
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudflareDns01 {
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Secret holding the API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_secret_ref: Option<SecretKeySelector>,
}

/// Route53 DNS-01 provider
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route53Dns01 {
    /// AWS region
    pub region: String,
    /// Hosted zone to use
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "hostedZoneID")]
    pub hosted_zone_id: Option<String>,
}

/// CA issuer settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaIssuer {
    /// Secret holding the CA key pair
    pub secret_name: String,
    /// CRL distribution points embedded in issued certificates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crl_distribution_points: Vec<String>,
}

/// Self-signed issuer settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignedIssuer {
    /// CRL distribution points embedded in issued certificates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crl_distribution_points: Vec<String>,
}

impl_buildable!(Issuer, IssuerSpec, ResourceKind::Issuer);
impl_buildable!(ClusterIssuer, ClusterIssuerSpec, ResourceKind::ClusterIssuer);

/// Issuer and ClusterIssuer
pub trait IssuerKind: HasSpec {
    /// Shared issuer settings
    fn settings_mut(&mut self) -> &mut IssuerSettings;
}

impl IssuerKind for Issuer {
    fn settings_mut(&mut self) -> &mut IssuerSettings {
        &mut self.spec.settings
    }
}

impl IssuerKind for ClusterIssuer {
    fn settings_mut(&mut self) -> &mut IssuerSettings {
        &mut self.spec.settings
    }
}

/// Create a namespaced Issuer
pub fn create_issuer(name: &str, namespace: &str, spec: IssuerSpec) -> Issuer {
    builder::create(name, Some(namespace), spec)
}

/// Create a ClusterIssuer
pub fn create_cluster_issuer(name: &str, spec: ClusterIssuerSpec) -> ClusterIssuer {
    builder::create(name, None, spec)
}

fn acme_mut<K: IssuerKind>(issuer: &mut K) -> &mut AcmeIssuer {
    issuer.settings_mut().acme.get_or_insert_with(Default::default)
}

/// Set the ACME directory URL
pub fn set_issuer_acme_server<K: IssuerKind>(
    target: Option<&mut K>,
    server: impl Into<String>,
) -> Result<()> {
    builder::set(target, |i| &mut acme_mut(i).server, server.into())
}

/// Set the ACME account email
pub fn set_issuer_acme_email<K: IssuerKind>(
    target: Option<&mut K>,
    email: impl Into<String>,
) -> Result<()> {
    builder::set_some(target, |i| &mut acme_mut(i).email, email.into())
}

/// Set the Secret holding the ACME account key
pub fn set_issuer_acme_private_key_secret<K: IssuerKind>(
    target: Option<&mut K>,
    secret_name: impl Into<String>,
) -> Result<()> {
    let selector = SecretKeySelector {
        name: secret_name.into(),
        key: None,
    };
    builder::set(target, |i| &mut acme_mut(i).private_key_secret_ref, selector)
}

/// Append an ACME challenge solver
pub fn add_issuer_acme_solver<K: IssuerKind>(
    target: Option<&mut K>,
    solver: Option<AcmeSolver>,
) -> Result<()> {
    builder::push_required(target, "solver", |i| &mut acme_mut(i).solvers, solver)
}

/// Configure a CA issuer backed by the given key pair Secret
pub fn set_issuer_ca_secret<K: IssuerKind>(
    target: Option<&mut K>,
    secret_name: impl Into<String>,
) -> Result<()> {
    let secret_name = secret_name.into();
    builder::update(target, |i| {
        i.settings_mut().ca.get_or_insert_with(Default::default).secret_name = secret_name;
    })
}

/// Configure a self-signed issuer
pub fn set_issuer_self_signed<K: IssuerKind>(target: Option<&mut K>) -> Result<()> {
    builder::update(target, |i| {
        i.settings_mut().self_signed.get_or_insert_with(Default::default);
    })
}
