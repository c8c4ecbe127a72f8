//! Common types for kforge: errors, the resource-kind registry, presence
//! validation and shared helpers

#![deny(missing_docs)]

pub mod duration;
pub mod error;
pub mod kinds;
pub mod telemetry;
pub mod validate;
pub mod yaml;

pub use error::Error;
pub use kinds::ResourceKind;
pub use validate::{require, validate, Validated};

/// Result type alias using our custom Error type
pub type Result<T, E = Error> = std::result::Result<T, E>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_alias_takes_an_optional_error_type() {
        let ours: Result<()> = Err(ResourceKind::Pod.absent());
        let theirs: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        assert!(ours.is_err());
        assert!(theirs.is_err());
    }
}
