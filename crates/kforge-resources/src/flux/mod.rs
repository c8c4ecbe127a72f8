//! Flux GitOps resources
//!
//! Sources (GitRepository, HelmRepository, OCIRepository) and the
//! reconcilers that consume them (Kustomization, HelmRelease). Every Flux
//! object is reconciled on an interval and can be suspended, so those fields
//! are set through the generic [`Reconciled`] operations in this module.

mod helm;
mod kustomize;
mod source;

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use kforge_common::Result;

use crate::builder::{self, HasSpec};

pub use helm::*;
pub use kustomize::*;
pub use source::*;

/// Reference to a Secret (or other object) in the same namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct LocalObjectReference {
    /// Object name
    pub name: String,
}

impl LocalObjectReference {
    /// Reference an object by name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a Flux source, possibly in another namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrossNamespaceSourceReference {
    /// API version of the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Source kind (GitRepository, OCIRepository, HelmRepository, Bucket)
    pub kind: String,
    /// Source name
    pub name: String,
    /// Source namespace; defaults to the referrer's namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl CrossNamespaceSourceReference {
    /// Reference a source of the given kind in the referrer's namespace
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Place the source in another namespace
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Dependency on another object of the same kind
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct DependencyReference {
    /// Name of the dependency
    pub name: String,
    /// Namespace of the dependency; defaults to the referrer's namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl DependencyReference {
    /// Depend on an object in the referrer's namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// Flux objects reconciled on an interval.
pub trait Reconciled: HasSpec {
    /// Reconciliation interval
    fn interval_mut(&mut self) -> &mut Duration;
    /// Timeout for a single reconciliation
    fn timeout_mut(&mut self) -> &mut Option<Duration>;
    /// Whether reconciliation is suspended
    fn suspend_mut(&mut self) -> &mut Option<bool>;
}

macro_rules! impl_reconciled {
    ($type:ty) => {
        impl $crate::flux::Reconciled for $type {
            fn interval_mut(&mut self) -> &mut std::time::Duration {
                &mut self.spec.interval
            }
            fn timeout_mut(&mut self) -> &mut Option<std::time::Duration> {
                &mut self.spec.timeout
            }
            fn suspend_mut(&mut self) -> &mut Option<bool> {
                &mut self.spec.suspend
            }
        }
    };
}
pub(crate) use impl_reconciled;

/// Set the reconciliation interval
pub fn set_interval<K: Reconciled>(target: Option<&mut K>, interval: Duration) -> Result<()> {
    builder::set(target, |r| r.interval_mut(), interval)
}

/// Set the per-reconciliation timeout
pub fn set_timeout<K: Reconciled>(target: Option<&mut K>, timeout: Duration) -> Result<()> {
    builder::set_some(target, |r| r.timeout_mut(), timeout)
}

/// Suspend or resume reconciliation
pub fn set_suspend<K: Reconciled>(target: Option<&mut K>, suspend: bool) -> Result<()> {
    builder::set_some(target, |r| r.suspend_mut(), suspend)
}
