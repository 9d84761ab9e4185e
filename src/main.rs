use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use host_atlas::lookup::{default_registry, Orchestrator, UreqTransport};
use host_atlas::report;

/// Host Atlas — IP/DNS ownership and region lookup
///
/// Looks up the owner and region of every IP address or host name in the
/// input file, failing over between geolocation APIs as they rate limit.
#[derive(Parser)]
#[command(
    name = "hostatlas",
    version,
    about,
    long_about = None,
    after_help = "\
Example: hostatlas ips.txt results.txt

Input file format (one per line):
  8.8.8.8
  google.com
  1.1.1.1

Supported APIs (with automatic fallback):
  1. ip-api.com (45 req/min)
  2. ipapi.co (1000 req/day, 30 req/min)
  3. ipwho.is (10000 req/month)
  4. ipwhois.app (10000 req/month)"
)]
struct Cli {
    /// File with one IP address or host name per line.
    input: PathBuf,

    /// Where to write the report. Overwritten if it exists.
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // ── Read input (before any network traffic) ─────────────────

    let entries = report::read_entries(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Look up ─────────────────────────────────────────────────

    let registry = default_registry(Arc::new(UreqTransport::new()));
    let mut orchestrator = Orchestrator::new(registry);
    let records = orchestrator.run(&entries);

    // ── Write report ────────────────────────────────────────────

    if let Err(e) = report::write_report(&cli.output, &records) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Results saved to '{}'", cli.output.display());
}
