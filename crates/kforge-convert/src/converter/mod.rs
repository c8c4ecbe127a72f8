//! Config-to-resource conversion
//!
//! Every conversion is a `create_*` call followed by a fixed sequence of
//! `set_*` / `add_*` calls driven by the config's fields:
//!
//! - an absent config converts to `Ok(None)`;
//! - an empty optional string leaves its target field unset;
//! - duration strings are resolved through the converter's
//!   [`DurationPolicy`].

mod cert_manager;
mod flux;
mod network;
mod workload;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use kforge_common::duration::parse_duration;
use kforge_common::{Error, ResourceKind, Result};
use kforge_resources::{add_label, Buildable};

use crate::options::{ConvertOptions, DurationPolicy};

/// Converts `*Config` declarations into resource records.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Converter with the given options
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Resolve a required interval.
    ///
    /// Empty input takes the default interval. Malformed input takes the
    /// default under [`DurationPolicy::Lenient`] and fails under
    /// [`DurationPolicy::Strict`].
    pub(crate) fn interval(&self, kind: ResourceKind, field: &str, raw: &str) -> Result<Duration> {
        if raw.trim().is_empty() {
            return Ok(self.options.default_interval);
        }
        match parse_duration(raw) {
            Ok(duration) => Ok(duration),
            Err(message) => match self.options.duration_policy {
                DurationPolicy::Lenient => {
                    warn!(
                        %kind,
                        field,
                        value = raw,
                        error = %message,
                        default = ?self.options.default_interval,
                        "unparseable interval, using default"
                    );
                    Ok(self.options.default_interval)
                }
                DurationPolicy::Strict => Err(Error::invalid_duration(field, raw, message)),
            },
        }
    }

    /// Resolve an optional duration.
    ///
    /// Empty input is `None`. Malformed input is `None` under
    /// [`DurationPolicy::Lenient`] and an error under [`DurationPolicy::Strict`].
    pub(crate) fn optional_duration(
        &self,
        kind: ResourceKind,
        field: &str,
        raw: &str,
    ) -> Result<Option<Duration>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match parse_duration(raw) {
            Ok(duration) => Ok(Some(duration)),
            Err(message) => match self.options.duration_policy {
                DurationPolicy::Lenient => {
                    warn!(
                        %kind,
                        field,
                        value = raw,
                        error = %message,
                        "unparseable duration, leaving unset"
                    );
                    Ok(None)
                }
                DurationPolicy::Strict => Err(Error::invalid_duration(field, raw, message)),
            },
        }
    }

    /// Resolve an optional duration to whole seconds.
    ///
    /// Sub-second remainders round up, so `500ms` is one second rather than
    /// zero. A value larger than `max` seconds fails under
    /// [`DurationPolicy::Strict`] and is clamped to `max` under
    /// [`DurationPolicy::Lenient`].
    pub(crate) fn optional_seconds<T>(
        &self,
        kind: ResourceKind,
        field: &str,
        raw: &str,
        max: T,
    ) -> Result<Option<T>>
    where
        T: TryFrom<u64> + Copy + fmt::Display,
    {
        let Some(duration) = self.optional_duration(kind, field, raw)? else {
            return Ok(None);
        };
        let seconds = duration
            .as_secs()
            .saturating_add(u64::from(duration.subsec_nanos() > 0));
        match T::try_from(seconds) {
            Ok(seconds) => Ok(Some(seconds)),
            Err(_) => match self.options.duration_policy {
                DurationPolicy::Lenient => {
                    warn!(
                        %kind,
                        field,
                        value = raw,
                        max = %max,
                        "duration out of range, clamping"
                    );
                    Ok(Some(max))
                }
                DurationPolicy::Strict => Err(Error::invalid_duration(
                    field,
                    raw,
                    format!("exceeds the maximum of {max} seconds"),
                )),
            },
        }
    }
}

/// `Some(s)` for a non-empty string
pub(crate) fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Copy config labels onto a freshly created record.
pub(crate) fn apply_labels<K: Buildable>(
    record: &mut K,
    labels: &BTreeMap<String, String>,
) -> Result<()> {
    for (key, value) in labels {
        add_label(Some(&mut *record), key.as_str(), value.as_str())?;
    }
    Ok(())
}

pub(crate) fn converted<K: Buildable>(record: &K) {
    debug!(
        kind = %K::RESOURCE_KIND,
        name = record.meta().name.as_deref().unwrap_or_default(),
        namespace = record.meta().namespace.as_deref().unwrap_or_default(),
        "converted config"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> Converter {
        Converter::new(ConvertOptions::default().with_duration_policy(DurationPolicy::Strict))
    }

    #[test]
    fn interval_parses_valid_input() {
        let converter = Converter::default();
        assert_eq!(
            converter.interval(ResourceKind::GitRepository, "interval", "5m"),
            Ok(Duration::from_secs(300))
        );
        assert_eq!(
            converter.interval(ResourceKind::GitRepository, "interval", "1h30m"),
            Ok(Duration::from_secs(5400))
        );
    }

    #[test]
    fn empty_interval_takes_default_under_both_policies() {
        let kind = ResourceKind::Kustomization;
        assert_eq!(
            Converter::default().interval(kind, "interval", ""),
            Ok(Duration::from_secs(60))
        );
        assert_eq!(strict().interval(kind, "interval", "  "), Ok(Duration::from_secs(60)));
    }

    #[test]
    fn malformed_interval_depends_on_policy() {
        let kind = ResourceKind::HelmRelease;
        assert_eq!(
            Converter::default().interval(kind, "interval", "five minutes"),
            Ok(Duration::from_secs(60))
        );
        let err = strict().interval(kind, "interval", "five minutes").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDuration { ref field, ref value, .. }
                if field == "interval" && value == "five minutes"
        ));
    }

    #[test]
    fn custom_default_interval_is_used() {
        let converter = Converter::new(
            ConvertOptions::default().with_default_interval(Duration::from_secs(600)),
        );
        assert_eq!(
            converter.interval(ResourceKind::GitRepository, "interval", "bogus"),
            Ok(Duration::from_secs(600))
        );
    }

    #[test]
    fn optional_duration_policy() {
        let kind = ResourceKind::Certificate;
        let lenient = Converter::default();
        assert_eq!(lenient.optional_duration(kind, "duration", ""), Ok(None));
        assert_eq!(
            lenient.optional_duration(kind, "duration", "2160h"),
            Ok(Some(Duration::from_secs(2160 * 3600)))
        );
        assert_eq!(lenient.optional_duration(kind, "duration", "90 days!"), Ok(None));
        assert!(strict().optional_duration(kind, "duration", "90 days!").is_err());
    }

    #[test]
    fn optional_seconds_round_up_and_respect_policy() {
        let kind = ResourceKind::Job;
        let lenient = Converter::default();
        assert_eq!(lenient.optional_seconds(kind, "ttl", "", i32::MAX), Ok(None));
        assert_eq!(lenient.optional_seconds(kind, "ttl", "500ms", i32::MAX), Ok(Some(1)));
        assert_eq!(lenient.optional_seconds(kind, "ttl", "90s", i32::MAX), Ok(Some(90)));
        assert_eq!(lenient.optional_seconds(kind, "ttl", "1m1ms", i64::MAX), Ok(Some(61)));
        assert_eq!(
            lenient.optional_seconds(kind, "ttl", "600000h", i32::MAX),
            Ok(Some(i32::MAX))
        );

        let err = strict().optional_seconds(kind, "ttl", "600000h", i32::MAX).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDuration { ref field, ref value, .. }
                if field == "ttl" && value == "600000h"
        ));
        assert_eq!(strict().optional_seconds(kind, "ttl", "500ms", i32::MAX), Ok(Some(1)));
    }

    #[test]
    fn non_empty_filters_empty_strings() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("x"), Some("x"));
    }
}
