//! Presence validation
//!
//! Every builder function runs its target through [`validate`] before touching
//! a field. Presence is carried by `Option`, so a missing record is `None` and
//! nothing else; there is no second, internally-null form to detect. Beyond
//! presence no schema or business rule is checked here.

use crate::kinds::ResourceKind;
use crate::{Error, Result};

/// Records that can be validated for presence.
pub trait Validated {
    /// Kind whose absence sentinel is returned for a missing record
    const RESOURCE_KIND: ResourceKind;
}

macro_rules! impl_validated {
    ($($type:ty => $kind:expr),* $(,)?) => {
        $(
            impl Validated for $type {
                const RESOURCE_KIND: ResourceKind = $kind;
            }
        )*
    };
}

// Built-in kinds are foreign types, so their impls have to live beside the trait.
impl_validated! {
    k8s_openapi::api::core::v1::Namespace => ResourceKind::Namespace,
    k8s_openapi::api::core::v1::Service => ResourceKind::Service,
    k8s_openapi::api::core::v1::Pod => ResourceKind::Pod,
    k8s_openapi::api::apps::v1::Deployment => ResourceKind::Deployment,
    k8s_openapi::api::batch::v1::Job => ResourceKind::Job,
}

/// Unwrap a mutable target, or return its kind's absence sentinel.
pub fn validate<K: Validated>(target: Option<&mut K>) -> Result<&mut K> {
    target.ok_or(K::RESOURCE_KIND.absent())
}

/// Unwrap a required reference-typed argument, or return the
/// argument-specific sentinel.
pub fn require<T>(argument: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(Error::argument_absent(argument))
}
