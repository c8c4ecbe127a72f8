//! cert-manager conversions

use kforge_common::{Error, ResourceKind, Result};
use kforge_resources::cert_manager::*;

use super::{apply_labels, converted, non_empty, Converter};
use crate::config::{CertificateConfig, IssuerConfig};

impl Converter {
    /// Convert a Certificate declaration
    pub fn certificate(&self, cfg: Option<&CertificateConfig>) -> Result<Option<Certificate>> {
        cfg.map(|cfg| self.build_certificate(cfg)).transpose()
    }

    /// Convert an Issuer declaration
    pub fn issuer(&self, cfg: Option<&IssuerConfig>) -> Result<Option<Issuer>> {
        cfg.map(|cfg| self.build_issuer(cfg)).transpose()
    }

    /// Convert a ClusterIssuer declaration; the config's namespace is ignored
    pub fn cluster_issuer(&self, cfg: Option<&IssuerConfig>) -> Result<Option<ClusterIssuer>> {
        cfg.map(|cfg| self.build_cluster_issuer(cfg)).transpose()
    }

    pub(crate) fn build_certificate(&self, cfg: &CertificateConfig) -> Result<Certificate> {
        let kind = ResourceKind::Certificate;
        let secret_name = match non_empty(&cfg.secret_name) {
            Some(name) => name.to_string(),
            None => format!("{}-tls", cfg.name),
        };
        let issuer_ref = match cfg.issuer_kind.as_str() {
            "" | "ClusterIssuer" => IssuerRef::cluster_issuer(&cfg.issuer_name),
            "Issuer" => IssuerRef::issuer(&cfg.issuer_name),
            other => {
                return Err(Error::config_for_kind(
                    kind.kind_str(),
                    format!("unknown issuer kind {other:?} (expected Issuer or ClusterIssuer)"),
                ))
            }
        };

        let mut cert = create_certificate(
            &cfg.name,
            &cfg.namespace,
            CertificateSpec {
                secret_name,
                ..Default::default()
            },
        );
        set_certificate_issuer_ref(Some(&mut cert), Some(issuer_ref))?;
        if let Some(common_name) = non_empty(&cfg.common_name) {
            set_certificate_common_name(Some(&mut cert), common_name)?;
        }
        for dns_name in &cfg.dns_names {
            add_certificate_dns_name(Some(&mut cert), dns_name.as_str())?;
        }
        for ip in &cfg.ip_addresses {
            add_certificate_ip_address(Some(&mut cert), ip.as_str())?;
        }
        for usage in &cfg.usages {
            add_certificate_usage(Some(&mut cert), usage.as_str())?;
        }
        if let Some(duration) = self.optional_duration(kind, "duration", &cfg.duration)? {
            set_certificate_duration(Some(&mut cert), duration)?;
        }
        if let Some(renew_before) =
            self.optional_duration(kind, "renewBefore", &cfg.renew_before)?
        {
            set_certificate_renew_before(Some(&mut cert), renew_before)?;
        }
        if cfg.is_ca {
            set_certificate_is_ca(Some(&mut cert), true)?;
        }
        if let Some(algorithm) = non_empty(&cfg.private_key_algorithm) {
            set_certificate_private_key_algorithm(Some(&mut cert), algorithm)?;
        }
        if let Some(size) = cfg.private_key_size {
            set_certificate_private_key_size(Some(&mut cert), size)?;
        }
        apply_labels(&mut cert, &cfg.labels)?;

        converted(&cert);
        Ok(cert)
    }

    pub(crate) fn build_issuer(&self, cfg: &IssuerConfig) -> Result<Issuer> {
        let mut issuer = create_issuer(&cfg.name, &cfg.namespace, IssuerSpec::default());
        apply_issuer_settings(&mut issuer, cfg)?;
        converted(&issuer);
        Ok(issuer)
    }

    pub(crate) fn build_cluster_issuer(&self, cfg: &IssuerConfig) -> Result<ClusterIssuer> {
        let mut issuer = create_cluster_issuer(&cfg.name, ClusterIssuerSpec::default());
        apply_issuer_settings(&mut issuer, cfg)?;
        converted(&issuer);
        Ok(issuer)
    }
}

fn apply_issuer_settings<K: IssuerKind>(issuer: &mut K, cfg: &IssuerConfig) -> Result<()> {
    if let Some(server) = non_empty(&cfg.acme_server) {
        set_issuer_acme_server(Some(&mut *issuer), server)?;
        let key_secret = match non_empty(&cfg.acme_private_key_secret) {
            Some(secret) => secret.to_string(),
            None => format!("{}-account-key", cfg.name),
        };
        set_issuer_acme_private_key_secret(Some(&mut *issuer), key_secret)?;
        if let Some(email) = non_empty(&cfg.acme_email) {
            set_issuer_acme_email(Some(&mut *issuer), email)?;
        }
        if let Some(class) = non_empty(&cfg.acme_ingress_class) {
            add_issuer_acme_solver(Some(&mut *issuer), Some(AcmeSolver::http01_ingress(class)))?;
        }
    }
    if let Some(secret) = non_empty(&cfg.ca_secret) {
        set_issuer_ca_secret(Some(&mut *issuer), secret)?;
    }
    if cfg.self_signed {
        set_issuer_self_signed(Some(&mut *issuer))?;
    }
    apply_labels(issuer, &cfg.labels)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::options::{ConvertOptions, DurationPolicy};

    fn demo_certificate() -> CertificateConfig {
        CertificateConfig {
            name: "demo".to_string(),
            namespace: "ns".to_string(),
            issuer_name: "letsencrypt".to_string(),
            dns_names: vec!["example.com".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn absent_config_converts_to_none() {
        let converter = Converter::default();
        assert_eq!(converter.certificate(None), Ok(None));
        assert_eq!(converter.issuer(None), Ok(None));
        assert_eq!(converter.cluster_issuer(None), Ok(None));
    }

    #[test]
    fn certificate_defaults() {
        let cert = Converter::default()
            .certificate(Some(&demo_certificate()))
            .unwrap()
            .unwrap();
        assert_eq!(cert.metadata.name.as_deref(), Some("demo"));
        assert_eq!(cert.spec.secret_name, "demo-tls");
        assert_eq!(cert.spec.dns_names, vec!["example.com".to_string()]);
        assert_eq!(cert.spec.issuer_ref.kind.as_deref(), Some("ClusterIssuer"));
        assert!(cert.spec.common_name.is_none());
        assert!(cert.spec.duration.is_none());
        assert!(cert.spec.is_ca.is_none());
        assert!(cert.spec.private_key.is_none());
    }

    #[test]
    fn certificate_optional_fields() {
        let cfg = CertificateConfig {
            secret_name: "custom".to_string(),
            common_name: "example.com".to_string(),
            issuer_kind: "Issuer".to_string(),
            duration: "2160h".to_string(),
            renew_before: "360h".to_string(),
            is_ca: true,
            private_key_algorithm: "ECDSA".to_string(),
            private_key_size: Some(256),
            labels: [("team".to_string(), "platform".to_string())].into(),
            ..demo_certificate()
        };
        let cert = Converter::default().certificate(Some(&cfg)).unwrap().unwrap();
        assert_eq!(cert.spec.secret_name, "custom");
        assert_eq!(cert.spec.common_name.as_deref(), Some("example.com"));
        assert_eq!(cert.spec.issuer_ref.kind.as_deref(), Some("Issuer"));
        assert_eq!(cert.spec.duration, Some(Duration::from_secs(2160 * 3600)));
        assert_eq!(cert.spec.renew_before, Some(Duration::from_secs(360 * 3600)));
        assert_eq!(cert.spec.is_ca, Some(true));
        let key = cert.spec.private_key.as_ref().unwrap();
        assert_eq!(key.algorithm.as_deref(), Some("ECDSA"));
        assert_eq!(key.size, Some(256));
        assert_eq!(
            cert.metadata.labels.as_ref().unwrap().get("team").map(String::as_str),
            Some("platform")
        );
    }

    #[test]
    fn issuer_kind_must_be_known() {
        let explicit = CertificateConfig {
            issuer_kind: "ClusterIssuer".to_string(),
            ..demo_certificate()
        };
        let cert = Converter::default().certificate(Some(&explicit)).unwrap().unwrap();
        assert_eq!(cert.spec.issuer_ref.kind.as_deref(), Some("ClusterIssuer"));

        for typo in ["issuer", "ClusterIsuer", "Secret"] {
            let cfg = CertificateConfig {
                issuer_kind: typo.to_string(),
                ..demo_certificate()
            };
            match Converter::default().certificate(Some(&cfg)) {
                Err(Error::Config { kind, message }) => {
                    assert_eq!(kind.as_deref(), Some("Certificate"));
                    assert!(message.contains(typo), "{message}");
                }
                other => panic!("{typo}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_certificate_duration() {
        let cfg = CertificateConfig {
            duration: "ninety days".to_string(),
            ..demo_certificate()
        };
        let cert = Converter::default().certificate(Some(&cfg)).unwrap().unwrap();
        assert!(cert.spec.duration.is_none());

        let strict =
            Converter::new(ConvertOptions::default().with_duration_policy(DurationPolicy::Strict));
        assert!(matches!(
            strict.certificate(Some(&cfg)),
            Err(Error::InvalidDuration { .. })
        ));
    }

    #[test]
    fn acme_cluster_issuer() {
        let cfg = IssuerConfig {
            name: "letsencrypt".to_string(),
            namespace: "ignored".to_string(),
            acme_server: "https://acme-v02.api.letsencrypt.org/directory".to_string(),
            acme_email: "ops@example.com".to_string(),
            acme_ingress_class: "nginx".to_string(),
            ..Default::default()
        };
        let issuer = Converter::default().cluster_issuer(Some(&cfg)).unwrap().unwrap();
        assert!(issuer.metadata.namespace.is_none());
        let acme = issuer.spec.settings.acme.as_ref().unwrap();
        assert_eq!(acme.email.as_deref(), Some("ops@example.com"));
        assert_eq!(acme.private_key_secret_ref.name, "letsencrypt-account-key");
        assert_eq!(acme.solvers.len(), 1);
        assert!(issuer.spec.settings.ca.is_none());
    }

    #[test]
    fn ca_and_self_signed_issuers() {
        let ca = IssuerConfig {
            name: "internal-ca".to_string(),
            namespace: "certs".to_string(),
            ca_secret: "internal-ca-keypair".to_string(),
            ..Default::default()
        };
        let issuer = Converter::default().issuer(Some(&ca)).unwrap().unwrap();
        assert_eq!(issuer.metadata.namespace.as_deref(), Some("certs"));
        assert_eq!(
            issuer.spec.settings.ca.as_ref().unwrap().secret_name,
            "internal-ca-keypair"
        );
        assert!(issuer.spec.settings.acme.is_none());

        let selfsigned = IssuerConfig {
            name: "selfsigned".to_string(),
            self_signed: true,
            ..Default::default()
        };
        let issuer = Converter::default().cluster_issuer(Some(&selfsigned)).unwrap().unwrap();
        assert!(issuer.spec.settings.self_signed.is_some());
    }
}
