//! Resource records and the builder functions that create and mutate them
//!
//! Each record is created once with a `create_*` function and then mutated
//! through `add_*` / `set_*` functions. Every mutator takes its target as
//! `Option<&mut K>` and returns the kind's absence sentinel when it is `None`.
//!
//! The shared mechanics live in [`builder`]; the per-group modules hold the
//! record definitions and the named operations for each kind.

#![deny(missing_docs)]

#[macro_use]
pub mod builder;

pub mod cert_manager;
pub mod cilium;
pub mod core_v1;
pub mod flux;
pub mod metallb;
pub mod workload;

pub use builder::{add_annotation, add_label, create, set_spec, Buildable, HasSpec};
pub use kforge_common::{Error, ResourceKind, Result};
