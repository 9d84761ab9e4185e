//! Core types for the lookup subsystem.

use std::path::PathBuf;
use std::time::Duration;

/// Placeholder used wherever a field has no meaningful value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a field a provider left out of its payload.
pub const UNKNOWN: &str = "Unknown";

/// What a single provider call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The provider answered with ownership data.
    Success { owner: String, region: String },
    /// The call was made but yielded no usable data. Still counts as the
    /// answer for this address; the provider stays enabled.
    SoftFailure { owner: String, region: String },
    /// The provider refused the call because of its rate limit.
    RateLimited,
}

impl Outcome {
    pub fn success(owner: impl Into<String>, region: impl Into<String>) -> Self {
        Self::Success {
            owner: owner.into(),
            region: region.into(),
        }
    }

    /// A soft failure carrying an error message in place of the owner.
    pub fn error(message: impl Into<String>) -> Self {
        Self::SoftFailure {
            owner: message.into(),
            region: NOT_AVAILABLE.into(),
        }
    }

    /// The provider reported the lookup as unsuccessful.
    pub fn unknown() -> Self {
        Self::SoftFailure {
            owner: UNKNOWN.into(),
            region: UNKNOWN.into(),
        }
    }
}

/// Result of running one address through the fallback registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub owner: String,
    pub region: String,
    /// Name of the provider that answered, or "None" when exhausted.
    pub provider: String,
    /// How long the caller should wait before the next lookup.
    pub delay: Duration,
    /// True only when the provider returned real data.
    pub succeeded: bool,
}

impl Resolution {
    /// The fixed result returned once every provider is disabled.
    pub fn exhausted() -> Self {
        Self {
            owner: "All APIs exhausted".into(),
            region: NOT_AVAILABLE.into(),
            provider: "None".into(),
            delay: Duration::ZERO,
            succeeded: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.provider == "None" && !self.succeeded
    }
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub input: String,
    pub ip: String,
    pub owner: String,
    pub region: String,
    pub provider_used: String,
}

impl LookupRecord {
    /// Record for an entry whose host name did not resolve.
    pub fn dns_failure(input: &str) -> Self {
        Self {
            input: input.to_string(),
            ip: NOT_AVAILABLE.into(),
            owner: "DNS resolution failed".into(),
            region: NOT_AVAILABLE.into(),
            provider_used: NOT_AVAILABLE.into(),
        }
    }

    pub fn from_resolution(input: &str, ip: &str, resolution: Resolution) -> Self {
        Self {
            input: input.to_string(),
            ip: ip.to_string(),
            owner: resolution.owner,
            region: resolution.region,
            provider_used: resolution.provider,
        }
    }
}

/// Run-level failures. Everything per-entry is recorded as data instead.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("File '{}' not found", .0.display())]
    InputNotFound(PathBuf),
    #[error("Cannot read file '{}': {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write output file '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
