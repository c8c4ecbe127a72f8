//! Generic Create/Add/Set mechanics
//!
//! Resource kinds differ only in their records; how a record is created and
//! how a field is validated-then-mutated is the same for all of them. This
//! module holds that shared protocol:
//!
//! - [`Buildable`]: identity metadata (via `kube::Resource`), the presence
//!   sentinel (via [`Validated`]) and how to assemble a fresh record.
//! - [`HasSpec`]: access to the record's spec block.
//! - Field helpers ([`push`], [`set`], [`set_some`], ...) that take the target
//!   as `Option<&mut K>` plus an accessor closure for the field they touch.
//!
//! Per-kind modules wrap these helpers into named operations such as
//! `add_certificate_dns_name`.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use tracing::trace;

use kforge_common::{require, validate, Result, Validated};

/// A record that can be created by [`create`] and mutated by the field helpers.
pub trait Buildable: Resource<DynamicType = ()> + Validated + Sized {
    /// The nested specification block passed to [`create`]
    type Spec;

    /// Build the record from identity metadata and a spec block.
    fn assemble(metadata: ObjectMeta, spec: Self::Spec) -> Self;

    /// Replace every absent repeated-value field with an empty container.
    ///
    /// Records whose list fields are plain `Vec`s have nothing to do here.
    fn init_collections(&mut self) {}
}

/// A record with a replaceable spec block.
pub trait HasSpec: Buildable {
    /// Mutable access to the spec block
    fn spec_mut(&mut self) -> &mut Self::Spec;
}

/// Implements [`Validated`], [`Buildable`] and [`HasSpec`] for a
/// `kube::CustomResource` type with `metadata` and `spec` fields.
macro_rules! impl_buildable {
    ($type:ty, $spec:ty, $kind:expr) => {
        impl kforge_common::Validated for $type {
            const RESOURCE_KIND: kforge_common::ResourceKind = $kind;
        }

        impl $crate::builder::Buildable for $type {
            type Spec = $spec;

            fn assemble(
                metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
                spec: $spec,
            ) -> Self {
                Self { metadata, spec }
            }
        }

        impl $crate::builder::HasSpec for $type {
            fn spec_mut(&mut self) -> &mut $spec {
                &mut self.spec
            }
        }
    };
}

/// Implements [`Buildable`] and [`HasSpec`] for a built-in `k8s-openapi`
/// type whose spec block is optional. Its [`Validated`] impl comes from
/// `kforge_common`.
///
/// `$init` fills the spec's `Option<Vec<_>>` / `Option<BTreeMap<_, _>>`
/// fields with empty containers.
macro_rules! impl_builtin_buildable {
    ($type:ty, $spec:ty, $init:path) => {
        impl $crate::builder::Buildable for $type {
            type Spec = $spec;

            fn assemble(
                metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
                spec: $spec,
            ) -> Self {
                Self {
                    metadata,
                    spec: Some(spec),
                    ..Default::default()
                }
            }

            fn init_collections(&mut self) {
                $init($crate::builder::HasSpec::spec_mut(self));
            }
        }

        impl $crate::builder::HasSpec for $type {
            fn spec_mut(&mut self) -> &mut $spec {
                self.spec.get_or_insert_with(Default::default)
            }
        }
    };
}

/// Create a fully addressed record.
///
/// Labels and annotations start as present, empty maps, and
/// [`Buildable::init_collections`] fills every other repeated field, so
/// later `add_*` calls never see an absent container. Cluster-scoped kinds
/// never carry a namespace.
pub fn create<K: Buildable>(name: &str, namespace: Option<&str>, spec: K::Spec) -> K {
    let namespace = namespace.filter(|_| K::RESOURCE_KIND.is_namespaced());
    let metadata = ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        labels: Some(BTreeMap::new()),
        annotations: Some(BTreeMap::new()),
        ..Default::default()
    };

    let mut record = K::assemble(metadata, spec);
    record.init_collections();

    trace!(
        kind = %K::RESOURCE_KIND,
        name = %name,
        namespace = namespace.unwrap_or_default(),
        "created resource"
    );
    record
}

/// Validate the target, then apply an arbitrary mutation to it.
pub fn update<K: Validated>(target: Option<&mut K>, mutate: impl FnOnce(&mut K)) -> Result<()> {
    let record = validate(target)?;
    mutate(record);
    Ok(())
}

/// Append `item` to the list selected by `field`.
pub fn push<K: Validated, T>(
    target: Option<&mut K>,
    field: impl FnOnce(&mut K) -> &mut Vec<T>,
    item: T,
) -> Result<()> {
    let record = validate(target)?;
    field(record).push(item);
    Ok(())
}

/// Append a required reference-typed item.
///
/// An absent item is reported with the `argument` sentinel, after the target
/// itself has been checked.
pub fn push_required<K: Validated, T>(
    target: Option<&mut K>,
    argument: &'static str,
    field: impl FnOnce(&mut K) -> &mut Vec<T>,
    item: Option<T>,
) -> Result<()> {
    let record = validate(target)?;
    let item = require(argument, item)?;
    field(record).push(item);
    Ok(())
}

/// Append an optional constraint; an absent item leaves the record untouched.
pub fn push_if_present<K: Validated, T>(
    target: Option<&mut K>,
    field: impl FnOnce(&mut K) -> &mut Vec<T>,
    item: Option<T>,
) -> Result<()> {
    let record = validate(target)?;
    if let Some(item) = item {
        field(record).push(item);
    }
    Ok(())
}

/// Insert a key/value pair into the map selected by `field`.
pub fn insert<K: Validated>(
    target: Option<&mut K>,
    field: impl FnOnce(&mut K) -> &mut BTreeMap<String, String>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    let record = validate(target)?;
    field(record).insert(key.into(), value.into());
    Ok(())
}

/// Assign a scalar field.
pub fn set<K: Validated, V>(
    target: Option<&mut K>,
    field: impl FnOnce(&mut K) -> &mut V,
    value: V,
) -> Result<()> {
    let record = validate(target)?;
    *field(record) = value;
    Ok(())
}

/// Assign an optional field, allocating it if it was unset.
pub fn set_some<K: Validated, V>(
    target: Option<&mut K>,
    field: impl FnOnce(&mut K) -> &mut Option<V>,
    value: V,
) -> Result<()> {
    let record = validate(target)?;
    *field(record) = Some(value);
    Ok(())
}

/// Assign a required reference-typed value.
pub fn set_required<K: Validated, V>(
    target: Option<&mut K>,
    argument: &'static str,
    field: impl FnOnce(&mut K) -> &mut V,
    value: Option<V>,
) -> Result<()> {
    let record = validate(target)?;
    let value = require(argument, value)?;
    *field(record) = value;
    Ok(())
}

/// Add a label to any record.
pub fn add_label<K: Buildable>(
    target: Option<&mut K>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    insert(target, |r| r.labels_mut(), key, value)
}

/// Add an annotation to any record.
pub fn add_annotation<K: Buildable>(
    target: Option<&mut K>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<()> {
    insert(target, |r| r.annotations_mut(), key, value)
}

/// Replace a record's spec block.
///
/// Repeated fields of the new spec are re-initialized so the create-time
/// guarantee still holds afterwards.
pub fn set_spec<K: HasSpec>(target: Option<&mut K>, spec: Option<K::Spec>) -> Result<()> {
    let record = validate(target)?;
    let spec = require("spec", spec)?;
    *record.spec_mut() = spec;
    record.init_collections();
    Ok(())
}
