//! Conversion options
//!
//! Controls how the converter treats duration strings it cannot use. Options
//! can be built directly or read from the environment:
//!
//! | variable                  | values              | default   |
//! |---------------------------|---------------------|-----------|
//! | `KFORGE_DURATION_POLICY`  | `lenient`, `strict` | `lenient` |
//! | `KFORGE_DEFAULT_INTERVAL` | duration, e.g. `5m` | `1m`      |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use kforge_common::duration::parse_duration;
use kforge_common::Error;

/// Interval substituted for an empty or unusable reconcile interval
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(60);

/// Environment variable selecting the [`DurationPolicy`]
pub const DURATION_POLICY_ENV: &str = "KFORGE_DURATION_POLICY";

/// Environment variable overriding [`DEFAULT_RECONCILE_INTERVAL`]
pub const DEFAULT_INTERVAL_ENV: &str = "KFORGE_DEFAULT_INTERVAL";

/// What to do with a duration string that does not parse.
///
/// Empty strings are never an error: an empty required interval takes the
/// default and an empty optional duration stays unset, under either policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Substitute the default (required fields) or leave unset (optional
    /// fields), and log a warning
    #[default]
    Lenient,
    /// Fail the conversion with [`Error::InvalidDuration`]
    Strict,
}

impl FromStr for DurationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(Error::config(format!(
                "unknown duration policy {other:?} (expected lenient or strict)"
            ))),
        }
    }
}

impl fmt::Display for DurationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Options applied by a [`Converter`](crate::Converter)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Handling of malformed duration strings
    pub duration_policy: DurationPolicy,
    /// Interval used when a required interval is empty or unusable
    pub default_interval: Duration,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            duration_policy: DurationPolicy::default(),
            default_interval: DEFAULT_RECONCILE_INTERVAL,
        }
    }
}

impl ConvertOptions {
    /// Read options from the process environment.
    ///
    /// Unrecognized values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(DURATION_POLICY_ENV) {
            match raw.parse() {
                Ok(policy) => options.duration_policy = policy,
                Err(e) => {
                    warn!(variable = DURATION_POLICY_ENV, error = %e, "ignoring invalid value")
                }
            }
        }

        if let Some(raw) = lookup(DEFAULT_INTERVAL_ENV) {
            match parse_duration(&raw) {
                Ok(interval) => options.default_interval = interval,
                Err(e) => warn!(
                    variable = DEFAULT_INTERVAL_ENV,
                    value = %raw,
                    error = %e,
                    "ignoring invalid value"
                ),
            }
        }

        options
    }

    /// Use the given duration policy
    pub fn with_duration_policy(mut self, policy: DurationPolicy) -> Self {
        self.duration_policy = policy;
        self
    }

    /// Use the given default interval
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }
}
