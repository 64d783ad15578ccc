//! Instance address parsing and hostname resolution.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, WmfdbError};
use crate::section::{DEFAULT_PORT, SectionMap};

/// Datacenter names, keyed by the first digit of a host's number.
const DATACENTERS: [(&str, &str); 6] = [
    ("1", "eqiad"),
    ("2", "codfw"),
    ("3", "esams"),
    ("4", "ulsfo"),
    ("5", "eqsin"),
    ("6", "drmrs"),
];

// ASCII digits only: `\d` would also accept other scripts' digits.
static DC_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+(?P<dc_id>[0-9])[0-9]{3}$").expect("valid regex"));

static IPV6_PORT_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<host>[^\]]+)\](?::(?P<port>\w+))?$").expect("valid regex")
});

/// Reverse DNS lookup.
#[cfg_attr(test, mockall::automock)]
pub trait ReverseLookup {
    /// Return the hostname the resolver has for `ip`.
    fn lookup(&self, ip: IpAddr) -> std::io::Result<String>;
}

/// [`ReverseLookup`] backed by the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl ReverseLookup for SystemResolver {
    fn lookup(&self, ip: IpAddr) -> std::io::Result<String> {
        dns_lookup::lookup_addr(&ip)
    }
}

/// Resolve a hostname or IP address to an FQDN.
///
/// IP addresses go through reverse DNS (loopback is always `localhost`).
/// Bare hostnames are qualified with their datacenter domain.
pub fn resolve(host: &str, resolver: &dyn ReverseLookup) -> Result<String> {
    host.parse::<IpAddr>()
        .map_or_else(|_| dc_map(host), |ip| resolve_ip(ip, resolver))
}

fn resolve_ip(ip: IpAddr, resolver: &dyn ReverseLookup) -> Result<String> {
    if ip.is_loopback() {
        return Ok("localhost".to_string());
    }
    let host = resolver
        .lookup(ip)
        .map_err(|e| WmfdbError::value(format!("Unable to resolve ip address: '{ip}': {e}")))?;
    debug!(%ip, %host, "Resolved ip address");
    Ok(host)
}

/// Map a bare hostname like `db2034` to its FQDN, `db2034.codfw.wmnet`.
pub fn dc_map(host: &str) -> Result<String> {
    let caps = DC_RX
        .captures(host)
        .ok_or_else(|| WmfdbError::value(format!("No datacenter ID detected in {host}")))?;
    let dc_id = &caps["dc_id"];
    let (_, dc) = DATACENTERS
        .iter()
        .find(|(id, _)| *id == dc_id)
        .ok_or_else(|| {
            WmfdbError::value(format!("Unknown datacenter ID '{dc_id}' (from '{host}')"))
        })?;
    Ok(format!("{host}.{dc}.wmnet"))
}

/// Split an address into `(host, port)`, defaulting to port 3306.
///
/// See [`split_with_default`].
pub fn split(addr: &str, sm: &SectionMap) -> Result<(String, u16)> {
    split_with_default(addr, sm, DEFAULT_PORT)
}

/// Split an address into `(host, port)`.
///
/// Supported forms:
/// - `192.0.2.1`, `192.0.2.1:3007`
/// - `2001:db8::11`, `[2001:db8::11]`, `[2001:db8::11]:3116`
/// - `db2034`, `db2054.codfw.wmnet:3241`
///
/// A non-numeric port (e.g. `:s4`) is a section name, mapped to its port
/// through `sm`. A numeric port must fit in a `u16`. Without a port,
/// `def_port` is used. Hostnames and IP addresses are not validated.
pub fn split_with_default(addr: &str, sm: &SectionMap, def_port: u16) -> Result<(String, u16)> {
    let (host, port_str) = if addr.matches(':').count() > 1 {
        if addr.starts_with('[') {
            let caps = IPV6_PORT_RX.captures(addr).ok_or_else(|| {
                WmfdbError::value(format!("Invalid [ipv6]:port format: '{addr}'"))
            })?;
            (
                caps["host"].to_string(),
                caps.name("port").map(|m| m.as_str().to_string()),
            )
        } else {
            (addr.to_string(), None)
        }
    } else if let Some((host, port)) = addr.split_once(':') {
        (host.to_string(), Some(port.to_string()))
    } else {
        (addr.to_string(), None)
    };

    let port = match port_str.as_deref() {
        None | Some("") => def_port,
        Some(p) if p.bytes().all(|b| b.is_ascii_digit()) => parse_port(p, addr)?,
        Some(p) => sm.by_name(p)?.port(),
    };
    Ok((host, port))
}

fn parse_port(port: &str, addr: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| WmfdbError::value(format!("Invalid port '{port}' in address '{addr}'")))
}
