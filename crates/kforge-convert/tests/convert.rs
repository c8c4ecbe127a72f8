//! End-to-end conversion: YAML config stream to serialized resource records

use std::sync::Once;
use std::time::Duration;

use kforge_common::telemetry::{init_logging, LoggingConfig};
use kforge_common::{Error, ResourceKind};
use kforge_convert::*;

static LOGGING: Once = Once::new();

fn setup() {
    LOGGING.call_once(|| {
        let _ = init_logging(LoggingConfig {
            default_filter: "kforge=debug".to_string(),
            json: false,
        });
    });
}

const PLATFORM: &str = r#"
kind: GitRepository
name: fleet
namespace: flux-system
url: https://github.com/example/fleet
branch: main
interval: 10m
---
kind: Kustomization
name: infra
namespace: flux-system
sourceName: fleet
path: ./infrastructure
prune: true
interval: 1h
retryInterval: 2m
---
kind: Kustomization
name: apps
namespace: flux-system
sourceName: fleet
path: ./apps
dependsOn: [infra]
substitute:
  cluster: prod
---
kind: HelmRepository
name: jetstack
namespace: flux-system
url: https://charts.jetstack.io
---
kind: HelmRelease
name: cert-manager
namespace: cert-manager
chart: cert-manager
version: v1.16.x
sourceName: jetstack
sourceNamespace: flux-system
createNamespace: true
values:
  crds:
    enabled: true
---
kind: ClusterIssuer
name: letsencrypt
acmeServer: https://acme-v02.api.letsencrypt.org/directory
acmeEmail: ops@example.com
acmeIngressClass: nginx
---
kind: Certificate
name: wildcard
namespace: ingress
dnsNames: ["*.example.com", example.com]
issuerName: letsencrypt
duration: 2160h
renewBefore: 360h
---
kind: IPAddressPool
name: public
namespace: metallb-system
addresses: [192.168.10.0/24]
---
kind: L2Advertisement
name: public
namespace: metallb-system
ipAddressPools: [public]
---
kind: CiliumLoadBalancerIPPool
name: internal
cidrs: [10.0.10.0/24]
---
kind: Job
name: migrate
namespace: db
image: migrate:1.2
args: [up]
ttlAfterFinished: 1h
"#;

#[test]
fn platform_stream_converts_in_order() {
    setup();
    let docs = load_documents(PLATFORM).unwrap();
    let resources = Converter::default().convert_all(&docs).unwrap();

    let kinds: Vec<_> = resources.iter().map(AnyResource::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::GitRepository,
            ResourceKind::Kustomization,
            ResourceKind::Kustomization,
            ResourceKind::HelmRepository,
            ResourceKind::HelmRelease,
            ResourceKind::ClusterIssuer,
            ResourceKind::Certificate,
            ResourceKind::IpAddressPool,
            ResourceKind::L2Advertisement,
            ResourceKind::CiliumLoadBalancerIpPool,
            ResourceKind::Job,
        ]
    );
    assert_eq!(resources[4].name(), Some("cert-manager"));
}

#[test]
fn serialized_records_carry_type_meta_and_formatted_durations() {
    setup();
    let docs = load_documents(PLATFORM).unwrap();
    let resources = Converter::default().convert_all(&docs).unwrap();
    let json: Vec<_> = resources
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();

    let repo = &json[0];
    assert_eq!(repo["apiVersion"], "source.toolkit.fluxcd.io/v1");
    assert_eq!(repo["kind"], "GitRepository");
    assert_eq!(repo["spec"]["ref"]["branch"], "main");
    assert_eq!(repo["spec"]["interval"], "10m");

    let infra = &json[1];
    assert_eq!(infra["apiVersion"], "kustomize.toolkit.fluxcd.io/v1");
    assert_eq!(infra["spec"]["sourceRef"]["kind"], "GitRepository");
    assert_eq!(infra["spec"]["interval"], "1h");
    assert_eq!(infra["spec"]["retryInterval"], "2m");
    assert_eq!(infra["spec"]["prune"], true);

    let apps = &json[2];
    assert_eq!(apps["spec"]["dependsOn"][0]["name"], "infra");
    assert_eq!(apps["spec"]["postBuild"]["substitute"]["cluster"], "prod");
    // no interval given
    assert_eq!(apps["spec"]["interval"], "1m");

    let release = &json[4];
    assert_eq!(release["spec"]["chart"]["spec"]["sourceRef"]["kind"], "HelmRepository");
    assert_eq!(release["spec"]["chart"]["spec"]["sourceRef"]["namespace"], "flux-system");
    assert_eq!(release["spec"]["install"]["createNamespace"], true);
    assert_eq!(release["spec"]["values"]["crds"]["enabled"], true);

    let issuer = &json[5];
    assert!(issuer["metadata"].get("namespace").is_none());
    assert_eq!(
        issuer["spec"]["acme"]["privateKeySecretRef"]["name"],
        "letsencrypt-account-key"
    );

    let cert = &json[6];
    assert_eq!(cert["spec"]["secretName"], "wildcard-tls");
    assert_eq!(cert["spec"]["issuerRef"]["kind"], "ClusterIssuer");
    assert_eq!(cert["spec"]["duration"], "2160h");
    assert_eq!(cert["spec"]["renewBefore"], "360h");

    let job = &json[10];
    assert_eq!(job["spec"]["ttlSecondsAfterFinished"], 3600);
    assert_eq!(job["spec"]["template"]["spec"]["restartPolicy"], "Never");
}

#[test]
fn absent_configs_are_not_errors() {
    assert_eq!(convert_certificate(None), Ok(None));
    assert_eq!(convert_issuer(None), Ok(None));
    assert_eq!(convert_cluster_issuer(None), Ok(None));
    assert_eq!(convert_git_repository(None), Ok(None));
    assert_eq!(convert_helm_repository(None), Ok(None));
    assert_eq!(convert_oci_repository(None), Ok(None));
    assert_eq!(convert_kustomization(None), Ok(None));
    assert_eq!(convert_helm_release(None), Ok(None));
    assert_eq!(convert_ip_address_pool(None), Ok(None));
    assert_eq!(convert_l2_advertisement(None), Ok(None));
    assert_eq!(convert_cilium_lb_ip_pool(None), Ok(None));
    assert_eq!(convert_job(None), Ok(None));
    assert_eq!(convert_pod(None), Ok(None));
}

#[test]
fn malformed_interval_falls_back_to_default() {
    setup();
    let cfg = KustomizationConfig {
        name: "apps".to_string(),
        namespace: "flux-system".to_string(),
        source_name: "fleet".to_string(),
        interval: "every so often".to_string(),
        ..Default::default()
    };
    let ks = convert_kustomization(Some(&cfg)).unwrap().unwrap();
    assert_eq!(ks.spec.interval, DEFAULT_RECONCILE_INTERVAL);
}

#[test]
fn strict_policy_rejects_malformed_durations() {
    setup();
    let converter =
        Converter::new(ConvertOptions::default().with_duration_policy(DurationPolicy::Strict));
    let docs = load_documents(
        r#"
kind: HelmRelease
name: podinfo
namespace: apps
chart: podinfo
sourceName: podinfo
interval: 5m
timeout: quickly
"#,
    )
    .unwrap();

    let err = converter.convert_all(&docs).unwrap_err();
    match err {
        Error::InvalidDuration { field, value, .. } => {
            assert_eq!(field, "timeout");
            assert_eq!(value, "quickly");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // the same stream converts leniently with the timeout left unset
    let resources = Converter::default().convert_all(&docs).unwrap();
    match &resources[0] {
        AnyResource::HelmRelease(release) => {
            assert_eq!(release.spec.interval, Duration::from_secs(300));
            assert!(release.spec.timeout.is_none());
        }
        other => panic!("unexpected resource: {other:?}"),
    }
}

#[test]
fn custom_default_interval_applies_to_every_flux_kind() {
    let converter = Converter::new(
        ConvertOptions::default().with_default_interval(Duration::from_secs(15 * 60)),
    );
    let docs = load_documents(
        r#"
kind: GitRepository
name: fleet
namespace: flux-system
url: https://github.com/example/fleet
---
kind: OCIRepository
name: manifests
namespace: flux-system
url: oci://ghcr.io/example/manifests
---
kind: HelmRepository
name: bitnami
namespace: flux-system
url: oci://registry-1.docker.io/bitnamicharts
type: oci
"#,
    )
    .unwrap();

    for resource in converter.convert_all(&docs).unwrap() {
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["spec"]["interval"], "15m", "{:?}", resource.kind());
    }
}

#[test]
fn bad_document_reports_its_position() {
    let err = load_documents("kind: Pod\nname: a\n---\nname: b\n").unwrap_err();
    assert!(err.to_string().contains("document 1"), "{err}");
}
