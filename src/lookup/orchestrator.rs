//! Lookup orchestrator — drives the registry across an input list.
//!
//! Flow per entry: IP literal or DNS → registry → record → pause.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

use tracing::{info, warn};

use super::registry::Registry;
use super::types::LookupRecord;

/// Turns a host name into an IP.
pub trait HostResolver {
    fn resolve_host(&self, host: &str) -> io::Result<IpAddr>;
}

/// The platform resolver, preferring IPv4 answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve_host(&self, host: &str) -> io::Result<IpAddr> {
        let addrs: Vec<IpAddr> = (host, 0).to_socket_addrs()?.map(|a| a.ip()).collect();
        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses returned"))
    }
}

/// Waits between lookups.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Owns the registry for one run and produces one record per entry.
pub struct Orchestrator<D = SystemResolver, P = ThreadPacer> {
    registry: Registry,
    dns: D,
    pacer: P,
}

impl Orchestrator {
    pub fn new(registry: Registry) -> Self {
        Self::with_parts(registry, SystemResolver, ThreadPacer)
    }
}

impl<D: HostResolver, P: Pacer> Orchestrator<D, P> {
    /// Create an orchestrator with explicit DNS and pacing (for testing).
    pub fn with_parts(registry: Registry, dns: D, pacer: P) -> Self {
        Self {
            registry,
            dns,
            pacer,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Look up every entry in order. Never fails; problems become records.
    pub fn run(&mut self, entries: &[String]) -> Vec<LookupRecord> {
        let total = entries.len();
        let mut records = Vec::with_capacity(total);
        info!("Processing {} entries...", total);

        for (i, entry) in entries.iter().enumerate() {
            info!("[{}/{}] Checking: {}", i + 1, total, entry);

            let (record, delay) = self.lookup_entry(entry);
            records.push(record);

            let is_last = i + 1 == total;
            if !delay.is_zero() && !is_last {
                self.pacer.pause(delay);
            }
        }

        records
    }

    /// Resolve one entry, returning its record and the pause owed afterwards.
    fn lookup_entry(&mut self, entry: &str) -> (LookupRecord, Duration) {
        let ip = match entry.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => match self.dns.resolve_host(entry) {
                Ok(ip) => ip,
                Err(e) => {
                    warn!("Could not resolve DNS name {}: {}", entry, e);
                    return (LookupRecord::dns_failure(entry), Duration::ZERO);
                }
            },
        };

        let resolution = self.registry.resolve(ip);
        let delay = resolution.delay;
        info!(
            "  IP: {} | Owner: {} | Region: {} | API Used: {}",
            ip, resolution.owner, resolution.region, resolution.provider
        );

        (LookupRecord::from_resolution(entry, &ip.to_string(), resolution), delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::registry::tests::{provider, Scripted};
    use crate::lookup::types::Outcome;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// DNS table; anything missing fails to resolve. Records every query.
    #[derive(Default)]
    struct FakeDns {
        table: HashMap<String, IpAddr>,
        queries: RefCell<Vec<String>>,
    }

    impl FakeDns {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(h, ip)| (h.to_string(), ip.parse().unwrap()))
                    .collect(),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl HostResolver for FakeDns {
        fn resolve_host(&self, host: &str) -> io::Result<IpAddr> {
            self.queries.borrow_mut().push(host.to_string());
            self.table
                .get(host)
                .copied()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "NXDOMAIN"))
        }
    }

    #[derive(Default)]
    struct RecordingPacer {
        pauses: Vec<Duration>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&mut self, delay: Duration) {
            self.pauses.push(delay);
        }
    }

    fn entries(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ok(owner: &str) -> Outcome {
        Outcome::success(owner, "Somewhere, Earth")
    }

    #[test]
    fn test_mixed_input_scenario() {
        let (a, a_calls) = Scripted::new(vec![], ok("Google LLC"));
        let (b, b_calls) = Scripted::new(vec![], ok("other"));
        let registry = Registry::new(vec![provider("ip-api.com", 1500, a), provider("ipapi.co", 2000, b)]);
        let mut orch = Orchestrator::with_parts(registry, FakeDns::default(), RecordingPacer::default());

        let records = orch.run(&entries(&["8.8.8.8", "badhost.invalid", "1.1.1.1"]));

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].input, "8.8.8.8");
        assert_eq!(records[0].ip, "8.8.8.8");
        assert_eq!(records[0].provider_used, "ip-api.com");
        assert_eq!(records[1], LookupRecord::dns_failure("badhost.invalid"));
        assert_eq!(records[1].ip, "N/A");
        assert_eq!(records[2].input, "1.1.1.1");
        assert_eq!(records[2].owner, "Google LLC");

        // DNS failure skips the providers entirely.
        assert_eq!(a_calls.borrow().len(), 2);
        assert!(b_calls.borrow().is_empty());

        // Pause after the first lookup only: DNS failure owes nothing, last entry never pauses.
        assert_eq!(orch.pacer().pauses, vec![Duration::from_millis(1500)]);
    }

    #[test]
    fn test_ip_literals_skip_dns() {
        let (a, _) = Scripted::new(vec![], ok("x"));
        let registry = Registry::new(vec![provider("a", 0, a)]);
        let dns = FakeDns::default();
        let mut orch = Orchestrator::with_parts(registry, dns, RecordingPacer::default());

        orch.run(&entries(&["8.8.8.8", "2001:4860:4860::8888", "::1", "192.168.0.1"]));
        assert!(orch.dns.queries.borrow().is_empty());
    }

    #[test]
    fn test_hostnames_are_resolved_before_lookup() {
        let (a, a_calls) = Scripted::new(vec![], ok("Cloudflare"));
        let registry = Registry::new(vec![provider("a", 0, a)]);
        let dns = FakeDns::with(&[("one.one.one.one", "1.1.1.1")]);
        let mut orch = Orchestrator::with_parts(registry, dns, RecordingPacer::default());

        let records = orch.run(&entries(&["one.one.one.one"]));
        assert_eq!(records[0].input, "one.one.one.one");
        assert_eq!(records[0].ip, "1.1.1.1");
        assert_eq!(a_calls.borrow()[0], "1.1.1.1".parse::<IpAddr>().unwrap());
        assert_eq!(*orch.dns.queries.borrow(), vec!["one.one.one.one".to_string()]);
    }

    #[test]
    fn test_rate_limit_failover_scenario() {
        let (a, a_calls) = Scripted::new(vec![Outcome::RateLimited], ok("never"));
        let (b, _) = Scripted::new(vec![], ok("Level 3"));
        let registry = Registry::new(vec![provider("ip-api.com", 1500, a), provider("ipapi.co", 2000, b)]);
        let mut orch = Orchestrator::with_parts(registry, FakeDns::default(), RecordingPacer::default());

        let records = orch.run(&entries(&["4.2.2.2", "4.2.2.1", "4.2.2.3"]));
        assert!(records.iter().all(|r| r.provider_used == "ipapi.co"));
        assert_eq!(a_calls.borrow().len(), 1);
        assert_eq!(
            orch.pacer().pauses,
            vec![Duration::from_millis(2000), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn test_exhaustion_persists_without_pauses() {
        let mut providers = Vec::new();
        let mut counters = Vec::new();
        for name in ["ip-api.com", "ipapi.co", "ipwho.is", "ipwhois.app"] {
            let (s, calls) = Scripted::new(vec![], Outcome::RateLimited);
            providers.push(provider(name, 1000, s));
            counters.push(calls);
        }
        let mut orch = Orchestrator::with_parts(
            Registry::new(providers),
            FakeDns::default(),
            RecordingPacer::default(),
        );

        let records = orch.run(&entries(&["8.8.8.8", "1.1.1.1", "9.9.9.9"]));
        for r in &records {
            assert_eq!(r.owner, "All APIs exhausted");
            assert_eq!(r.region, "N/A");
            assert_eq!(r.provider_used, "None");
        }
        assert_eq!(records[1].ip, "1.1.1.1");
        for c in &counters {
            assert_eq!(c.borrow().len(), 1);
        }
        assert!(orch.pacer().pauses.is_empty());
        assert!(orch.registry().all_disabled());
    }

    #[test]
    fn test_empty_input() {
        let (a, a_calls) = Scripted::new(vec![], ok("x"));
        let mut orch = Orchestrator::with_parts(
            Registry::new(vec![provider("a", 1000, a)]),
            FakeDns::default(),
            RecordingPacer::default(),
        );
        assert!(orch.run(&[]).is_empty());
        assert!(a_calls.borrow().is_empty());
    }

    #[test]
    fn test_system_resolver_localhost() {
        let ip = SystemResolver.resolve_host("localhost").unwrap();
        assert!(ip.is_loopback());
    }
}
