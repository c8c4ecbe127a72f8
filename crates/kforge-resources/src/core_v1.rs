//! Core v1 resources: Namespace and Service

use k8s_openapi::api::core::v1::{Namespace, NamespaceSpec, Service, ServicePort, ServiceSpec};

use kforge_common::Result;

use crate::builder::{self, HasSpec};

impl_builtin_buildable!(Namespace, NamespaceSpec, init_namespace_spec);
impl_builtin_buildable!(Service, ServiceSpec, init_service_spec);

fn init_namespace_spec(spec: &mut NamespaceSpec) {
    spec.finalizers.get_or_insert_with(Vec::new);
}

fn init_service_spec(spec: &mut ServiceSpec) {
    spec.ports.get_or_insert_with(Vec::new);
    spec.selector.get_or_insert_with(Default::default);
    spec.external_ips.get_or_insert_with(Vec::new);
    spec.cluster_ips.get_or_insert_with(Vec::new);
    spec.ip_families.get_or_insert_with(Vec::new);
    spec.load_balancer_source_ranges.get_or_insert_with(Vec::new);
}

/// Create a Namespace
pub fn create_namespace(name: &str, spec: NamespaceSpec) -> Namespace {
    builder::create(name, None, spec)
}

/// Add a finalizer to the namespace spec
pub fn add_namespace_finalizer(
    target: Option<&mut Namespace>,
    finalizer: impl Into<String>,
) -> Result<()> {
    builder::push(
        target,
        |n| n.spec_mut().finalizers.get_or_insert_with(Vec::new),
        finalizer.into(),
    )
}

/// Create a Service
pub fn create_service(name: &str, namespace: &str, spec: ServiceSpec) -> Service {
    builder::create(name, Some(namespace), spec)
}

/// Expose a port
pub fn add_service_port(target: Option<&mut Service>, port: Option<ServicePort>) -> Result<()> {
    builder::push_required(
        target,
        "port",
        |s| s.spec_mut().ports.get_or_insert_with(Vec::new),
        port,
    )
}

/// Route to pods carrying a label
pub fn add_service_selector(
    target: Option<&mut Service>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    builder::insert(
        target,
        |s| s.spec_mut().selector.get_or_insert_with(Default::default),
        key,
        value,
    )
}

/// Accept traffic on an external IP
pub fn add_service_external_ip(
    target: Option<&mut Service>,
    ip: impl Into<String>,
) -> Result<()> {
    builder::push(
        target,
        |s| s.spec_mut().external_ips.get_or_insert_with(Vec::new),
        ip.into(),
    )
}

/// Set the service type (ClusterIP, NodePort, LoadBalancer, ExternalName)
pub fn set_service_type(target: Option<&mut Service>, type_: impl Into<String>) -> Result<()> {
    builder::set_some(target, |s| &mut s.spec_mut().type_, type_.into())
}

/// Select the load-balancer implementation
pub fn set_service_load_balancer_class(
    target: Option<&mut Service>,
    class: impl Into<String>,
) -> Result<()> {
    builder::set_some(
        target,
        |s| &mut s.spec_mut().load_balancer_class,
        class.into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use kforge_common::{Error, ResourceKind};
    use kube::Resource;

    fn http_port() -> ServicePort {
        ServicePort {
            name: Some("http".to_string()),
            port: 80,
            target_port: Some(IntOrString::Int(8080)),
            ..Default::default()
        }
    }

    #[test]
    fn namespace_is_cluster_scoped_with_empty_finalizers() {
        let ns = create_namespace("apps", NamespaceSpec::default());
        assert_eq!(Namespace::kind(&()), "Namespace");
        assert_eq!(Namespace::api_version(&()), "v1");
        assert!(ns.metadata.namespace.is_none());
        assert_eq!(ns.spec.as_ref().unwrap().finalizers, Some(vec![]));
    }

    #[test]
    fn namespace_finalizer_appends() {
        let mut ns = create_namespace("apps", NamespaceSpec::default());
        add_namespace_finalizer(Some(&mut ns), "kubernetes").unwrap();
        assert_eq!(
            ns.spec.unwrap().finalizers,
            Some(vec!["kubernetes".to_string()])
        );
    }

    #[test]
    fn service_collections_start_empty() {
        let svc = create_service("web", "apps", ServiceSpec::default());
        let spec = svc.spec.as_ref().unwrap();
        assert_eq!(spec.ports, Some(vec![]));
        assert_eq!(spec.selector, Some(Default::default()));
        assert_eq!(spec.external_ips, Some(vec![]));
        assert_eq!(spec.cluster_ips, Some(vec![]));
        assert_eq!(spec.ip_families, Some(vec![]));
        assert_eq!(spec.load_balancer_source_ranges, Some(vec![]));
    }

    #[test]
    fn service_builder() {
        let mut svc = create_service("web", "apps", ServiceSpec::default());
        add_service_port(Some(&mut svc), Some(http_port())).unwrap();
        add_service_selector(Some(&mut svc), "app", "web").unwrap();
        add_service_external_ip(Some(&mut svc), "203.0.113.10").unwrap();
        set_service_type(Some(&mut svc), "LoadBalancer").unwrap();
        set_service_load_balancer_class(Some(&mut svc), "io.cilium/l2-announcer").unwrap();

        let spec = svc.spec.as_ref().unwrap();
        assert_eq!(spec.ports.as_ref().unwrap()[0].port, 80);
        assert_eq!(
            spec.selector.as_ref().unwrap().get("app").map(String::as_str),
            Some("web")
        );
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        assert_eq!(spec.load_balancer_class.as_deref(), Some("io.cilium/l2-announcer"));
    }

    #[test]
    fn absent_port_is_argument_error() {
        let mut svc = create_service("web", "apps", ServiceSpec::default());
        assert_eq!(
            add_service_port(Some(&mut svc), None),
            Err(Error::argument_absent("port"))
        );
        assert_eq!(svc.spec.unwrap().ports, Some(vec![]));
    }

    #[test]
    fn mutators_reject_absent_target() {
        assert_eq!(
            add_namespace_finalizer(None, "kubernetes"),
            Err(ResourceKind::Namespace.absent())
        );
        assert_eq!(
            add_service_port(None, Some(http_port())),
            Err(ResourceKind::Service.absent())
        );
        assert_eq!(
            set_service_type(None, "ClusterIP"),
            Err(ResourceKind::Service.absent())
        );
    }

    #[test]
    fn every_namespace_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            ("add_namespace_finalizer", add_namespace_finalizer(None, "kubernetes")),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::Namespace.absent()), "{operation}");
        }
    }

    #[test]
    fn every_service_mutator_rejects_absent_target() {
        let results: Vec<(&str, Result<()>)> = vec![
            ("add_service_port", add_service_port(None, Some(http_port()))),
            ("add_service_selector", add_service_selector(None, "app", "web")),
            ("add_service_external_ip", add_service_external_ip(None, "203.0.113.10")),
            ("set_service_type", set_service_type(None, "LoadBalancer")),
            (
                "set_service_load_balancer_class",
                set_service_load_balancer_class(None, "io.cilium/l2-announcer"),
            ),
        ];
        for (operation, result) in results {
            assert_eq!(result, Err(ResourceKind::Service.absent()), "{operation}");
        }
    }
}
