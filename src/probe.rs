// src/probe.rs

//! Pre-flight DNS / connectivity self-test.
//!
//! Enabled with ORG_DEBUG_DNS=1. Resolves the API host and attempts a
//! bounded TCP connect so transport failures can be told apart from
//! GitHub-side errors when a dispatch misbehaves inside a locked-down
//! runner. The probe reports to stderr and never aborts the run; the
//! main flow surfaces the real error on its own.

use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pull `(host, port)` out of an API base URL.
///
/// Good enough for the two shapes this tool sees:
/// `https://api.github.com` and `http://host:port` GHES-style overrides.
fn endpoint_of(api_base: &str) -> Option<(&str, u16)> {
    let (scheme, rest) = match api_base.split_once("://") {
        Some((s, r)) => (s, r),
        None => ("https", api_base),
    };

    let default_port = if scheme == "http" { 80 } else { 443 };

    let host_port = rest.split(['/', '?']).next()?;
    let (host, port) = match host_port.rsplit_once(':') {
        Some((h, p)) => (h, p.parse().ok()?),
        None => (host_port, default_port),
    };

    if host.is_empty() {
        return None;
    }

    Some((host, port))
}

/// Run the self-test against the configured API base.
pub async fn run(api_base: &str) {
    let Some((host, port)) = endpoint_of(api_base) else {
        eprintln!("dns probe: cannot parse host from {}", api_base);
        return;
    };

    let addrs = match lookup_host((host, port)).await {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        Err(e) => {
            eprintln!("dns probe: resolving {} failed: {}", host, e);
            return;
        }
    };

    if addrs.is_empty() {
        eprintln!("dns probe: {} resolved to no addresses", host);
        return;
    }

    for addr in &addrs {
        eprintln!("dns probe: {} -> {}", host, addr);
    }

    match timeout(CONNECT_TIMEOUT, TcpStream::connect(addrs[0])).await {
        Ok(Ok(_)) => eprintln!("dns probe: tcp connect to {} ok", addrs[0]),
        Ok(Err(e)) => eprintln!("dns probe: tcp connect to {} failed: {}", addrs[0], e),
        Err(_) => eprintln!(
            "dns probe: tcp connect to {} timed out after {:?}",
            addrs[0], CONNECT_TIMEOUT
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_of_public_api() {
        assert_eq!(
            endpoint_of("https://api.github.com"),
            Some(("api.github.com", 443))
        );
    }

    #[test]
    fn endpoint_of_keeps_explicit_port() {
        assert_eq!(
            endpoint_of("http://github.internal:8080/api/v3"),
            Some(("github.internal", 8080))
        );
    }

    #[test]
    fn endpoint_of_http_defaults_to_80() {
        assert_eq!(endpoint_of("http://localhost"), Some(("localhost", 80)));
    }

    #[test]
    fn endpoint_of_rejects_empty_host() {
        assert_eq!(endpoint_of("https://"), None);
    }
}
