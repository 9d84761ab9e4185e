//! Provider registry and the fallback resolver.
//!
//! Providers are kept in preference order. The cursor sticks to whichever
//! provider answered last and only moves forward when a provider is rate
//! limited, at which point that provider is disabled for the rest of the run.

use std::net::IpAddr;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::{Outcome, Resolution};

/// Anything that can look up ownership data for an IP.
pub trait GeoLookup {
    fn lookup(&self, ip: IpAddr) -> Outcome;
}

/// A registered provider with its pacing delay and run state.
pub struct Provider {
    name: String,
    delay: Duration,
    disabled: bool,
    adapter: Box<dyn GeoLookup>,
}

impl Provider {
    pub fn new(name: impl Into<String>, delay: Duration, adapter: Box<dyn GeoLookup>) -> Self {
        Self {
            name: name.into(),
            delay,
            disabled: false,
            adapter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Ordered providers plus the cursor carried between addresses.
pub struct Registry {
    providers: Vec<Provider>,
    cursor: usize,
}

impl Registry {
    /// Build a registry. Preference order is the order given.
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Index of the provider that will be tried first for the next address.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// True once every provider has been rate limited.
    pub fn all_disabled(&self) -> bool {
        self.providers.iter().all(|p| p.disabled)
    }

    /// Look up one IP, failing over on rate limits.
    ///
    /// Each provider index is examined at most once per call, starting at
    /// the cursor, so the loop always terminates.
    pub fn resolve(&mut self, ip: IpAddr) -> Resolution {
        let n = self.providers.len();
        if self.all_disabled() {
            return Resolution::exhausted();
        }

        for _ in 0..n {
            let idx = self.cursor;
            let provider = &mut self.providers[idx];

            if provider.disabled {
                self.cursor = (idx + 1) % n;
                continue;
            }

            debug!(provider = %provider.name, %ip, "querying provider");
            match provider.adapter.lookup(ip) {
                Outcome::Success { owner, region } => {
                    return Resolution {
                        owner,
                        region,
                        provider: provider.name.clone(),
                        delay: provider.delay,
                        succeeded: true,
                    };
                }
                Outcome::SoftFailure { owner, region } => {
                    return Resolution {
                        owner,
                        region,
                        provider: provider.name.clone(),
                        delay: provider.delay,
                        succeeded: false,
                    };
                }
                Outcome::RateLimited => {
                    warn!(
                        "Rate limit hit on {}, switching to next provider...",
                        provider.name
                    );
                    provider.disabled = true;
                    self.cursor = (idx + 1) % n;
                }
            }
        }

        Resolution::exhausted()
    }
}
