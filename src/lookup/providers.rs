//! Geolocation API adapters.
//!
//! Each public API has its own URL shape, field names and rate-limit signal.
//! Interpretation is a pure function of the HTTP status and body so that it
//! can be exercised without the network; the actual request goes through a
//! [`Transport`].

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::registry::{GeoLookup, Provider, Registry};
use super::types::{Outcome, UNKNOWN};

/// Upper bound on a single provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = "HostAtlas/0.1";

// ─── Transport ──────────────────────────────────────────────────

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// The request never produced an HTTP status (DNS, connect, timeout, ...).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs one blocking GET.
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpReply, TransportError>;
}

/// `ureq` backed transport sharing one agent across all providers.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpReply, TransportError> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            // ureq reports 4xx/5xx as errors; we still want the status.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => return Err(TransportError(e.to_string())),
        };

        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

// ─── Providers ──────────────────────────────────────────────────

/// The supported geolocation APIs, in default preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// ip-api.com, 45 requests/min.
    IpApiCom,
    /// ipapi.co, 1000 requests/day and 30/min.
    IpApiCo,
    /// ipwho.is, 10000 requests/month.
    IpWhoIs,
    /// ipwhois.app, 10000 requests/month.
    IpWhoisApp,
}

impl Api {
    pub const ALL: [Api; 4] = [Api::IpApiCom, Api::IpApiCo, Api::IpWhoIs, Api::IpWhoisApp];

    pub fn name(self) -> &'static str {
        match self {
            Self::IpApiCom => "ip-api.com",
            Self::IpApiCo => "ipapi.co",
            Self::IpWhoIs => "ipwho.is",
            Self::IpWhoisApp => "ipwhois.app",
        }
    }

    /// Pause to observe after this provider answered.
    pub fn default_delay(self) -> Duration {
        match self {
            Self::IpApiCom => Duration::from_millis(1500),
            Self::IpApiCo => Duration::from_millis(2000),
            Self::IpWhoIs | Self::IpWhoisApp => Duration::from_millis(1000),
        }
    }

    pub fn url(self, ip: IpAddr) -> String {
        match self {
            Self::IpApiCom => format!(
                "http://ip-api.com/json/{}?fields=status,country,regionName,org,query",
                ip
            ),
            Self::IpApiCo => format!("https://ipapi.co/{}/json/", ip),
            Self::IpWhoIs => format!("http://ipwho.is/{}", ip),
            Self::IpWhoisApp => format!("http://ipwhois.app/json/{}", ip),
        }
    }

    pub fn headers(self) -> &'static [(&'static str, &'static str)] {
        match self {
            // ipapi.co rejects unknown clients more aggressively.
            Self::IpApiCo => &[("User-Agent", "ipapi.co/#ipapi-python/1.0.4")],
            _ => &[],
        }
    }

    /// Map a reply from this provider onto an [`Outcome`].
    pub fn interpret(self, reply: &HttpReply) -> Outcome {
        if reply.status == 429 {
            return Outcome::RateLimited;
        }
        if !(200..300).contains(&reply.status) {
            return Outcome::error(format!("HTTP Error: {}", reply.status));
        }

        let parsed = match self {
            Self::IpApiCom => serde_json::from_str(&reply.body).map(interpret_ip_api_com),
            Self::IpApiCo => serde_json::from_str(&reply.body).map(interpret_ipapi_co),
            Self::IpWhoIs => serde_json::from_str(&reply.body).map(interpret_ipwho_is),
            Self::IpWhoisApp => serde_json::from_str(&reply.body).map(interpret_ipwhois_app),
        };
        parsed.unwrap_or_else(|e| Outcome::error(format!("Error: {}", e)))
    }
}

#[derive(Deserialize)]
struct IpApiComResult {
    status: Option<String>,
    country: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    org: Option<String>,
}

fn interpret_ip_api_com(r: IpApiComResult) -> Outcome {
    if r.status.as_deref() != Some("success") {
        return Outcome::unknown();
    }
    Outcome::success(or_unknown(r.org), region_text(r.region_name, r.country))
}

#[derive(Deserialize)]
struct IpApiCoResult {
    #[serde(default)]
    error: Option<serde_json::Value>,
    reason: Option<String>,
    org: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
}

fn interpret_ipapi_co(r: IpApiCoResult) -> Outcome {
    if r.error.is_some() {
        // ipapi.co sometimes signals its limit in the payload with a 200.
        if r.reason.as_deref() == Some("RateLimited") {
            return Outcome::RateLimited;
        }
        return Outcome::unknown();
    }
    Outcome::success(or_unknown(r.org), region_text(r.region, r.country_name))
}

#[derive(Deserialize, Default)]
struct Connection {
    org: Option<String>,
    isp: Option<String>,
}

#[derive(Deserialize)]
struct IpWhoIsResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    connection: Option<Connection>,
    region: Option<String>,
    country: Option<String>,
}

fn interpret_ipwho_is(r: IpWhoIsResult) -> Outcome {
    if !r.success {
        return Outcome::unknown();
    }
    let conn = r.connection.unwrap_or_default();
    Outcome::success(org_or_isp(conn.org, conn.isp), region_text(r.region, r.country))
}

#[derive(Deserialize)]
struct IpWhoisAppResult {
    #[serde(default)]
    success: bool,
    org: Option<String>,
    isp: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

fn interpret_ipwhois_app(r: IpWhoisAppResult) -> Outcome {
    if !r.success {
        return Outcome::unknown();
    }
    Outcome::success(org_or_isp(r.org, r.isp), region_text(r.region, r.country))
}

fn or_unknown(v: Option<String>) -> String {
    v.unwrap_or_else(|| UNKNOWN.into())
}

fn region_text(region: Option<String>, country: Option<String>) -> String {
    format!("{}, {}", or_unknown(region), or_unknown(country))
}

/// The whois services often leave `org` blank and only fill in the ISP.
fn org_or_isp(org: Option<String>, isp: Option<String>) -> String {
    match org {
        Some(o) if !o.is_empty() && o != UNKNOWN => o,
        _ => or_unknown(isp),
    }
}

// ─── Adapter ────────────────────────────────────────────────────

/// One API bound to a transport.
pub struct ApiAdapter {
    api: Api,
    transport: Arc<dyn Transport>,
}

impl ApiAdapter {
    pub fn new(api: Api, transport: Arc<dyn Transport>) -> Self {
        Self { api, transport }
    }
}

impl GeoLookup for ApiAdapter {
    fn lookup(&self, ip: IpAddr) -> Outcome {
        let url = self.api.url(ip);
        match self.transport.get(&url, self.api.headers()) {
            Ok(reply) => self.api.interpret(&reply),
            Err(e) => Outcome::error(format!("Error: {}", e)),
        }
    }
}

/// Registry with all four APIs in default order and with default delays.
pub fn default_registry(transport: Arc<dyn Transport>) -> Registry {
    let providers = Api::ALL
        .iter()
        .map(|&api| {
            Provider::new(
                api.name(),
                api.default_delay(),
                Box::new(ApiAdapter::new(api, Arc::clone(&transport))),
            )
        })
        .collect();
    Registry::new(providers)
}
