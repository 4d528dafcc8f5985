//! The UFW-style port grammar (§6) used as KGSM's canonical port
//! representation, plus translation to/from a compose-style `ports:` list
//! and a flat UPnP port list (§4.2, §8 property 6).
//!
//! Grammar: `<port>[:<port>][/<proto>](|<port>[:<port>][/<proto>])*`

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(PortSpecError::InvalidProtocol(other.to_string())),
        }
    }
}

/// A single bound port with its protocol, the unit UPnP mappings operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub port: u16,
    pub proto: Protocol,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.proto)
    }
}

/// A contiguous inclusive port range on one protocol, the unit the UFW
/// grammar's segments describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
    pub proto: Protocol,
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}/{}", self.start, self.proto)
        } else {
            write!(f, "{}:{}/{}", self.start, self.end, self.proto)
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),
    #[error("invalid port number: {0}")]
    InvalidPort(String),
    #[error("empty port segment")]
    EmptySegment,
    #[error("range start {0} is greater than end {1}")]
    InvertedRange(u16, u16),
}

/// Parse a full UFW-grammar spec, e.g. `"7777/udp|27015:27020/tcp"`.
pub fn parse_ufw_spec(spec: &str) -> Result<Vec<PortRange>, PortSpecError> {
    spec.split('|')
        .filter(|s| !s.trim().is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> Result<PortRange, PortSpecError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(PortSpecError::EmptySegment);
    }

    let (port_part, proto) = match segment.split_once('/') {
        Some((p, proto)) => (p, proto.parse()?),
        None => (segment, Protocol::Tcp),
    };

    let (start, end) = match port_part.split_once(':') {
        Some((a, b)) => (parse_port(a)?, parse_port(b)?),
        None => {
            let p = parse_port(port_part)?;
            (p, p)
        }
    };

    if start > end {
        return Err(PortSpecError::InvertedRange(start, end));
    }

    Ok(PortRange { start, end, proto })
}

fn parse_port(s: &str) -> Result<u16, PortSpecError> {
    s.trim()
        .parse::<u16>()
        .map_err(|_| PortSpecError::InvalidPort(s.to_string()))
}

/// Render a set of ranges back into the canonical UFW-grammar string,
/// sorted by protocol then start port, joined with `|`.
pub fn format_ufw_spec(ranges: &[PortRange]) -> String {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|r| (r.proto, r.start));
    sorted
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Expand a parsed spec into the flat list of individual ports UPnP mapping
/// operates on (§4.2 "extracts declared ports"; §8 property 6).
pub fn expand_to_ports(ranges: &[PortRange]) -> Vec<Port> {
    let mut ports = Vec::new();
    for r in ranges {
        for p in r.start..=r.end {
            ports.push(Port {
                port: p,
                proto: r.proto,
            });
        }
    }
    ports
}

/// Collapse a flat UPnP port list back into canonical contiguous ranges and
/// render as a UFW spec. This is the inverse of [`expand_to_ports`] +
/// [`format_ufw_spec`] and is what makes the round-trip in §8 property 6 an
/// identity on canonical specs: consecutive same-protocol ports fold back
/// into one range segment.
pub fn ports_to_ufw_spec(ports: &[Port]) -> String {
    let mut sorted = ports.to_vec();
    sorted.sort_by_key(|p| (p.proto, p.port));
    sorted.dedup();

    let mut ranges: Vec<PortRange> = Vec::new();
    for p in sorted {
        match ranges.last_mut() {
            Some(last) if last.proto == p.proto && last.end + 1 == p.port => {
                last.end = p.port;
            }
            _ => ranges.push(PortRange {
                start: p.port,
                end: p.port,
                proto: p.proto,
            }),
        }
    }

    format_ufw_spec(&ranges)
}

/// Parse one compose-style `ports:` entry, e.g. `"27015:27015/udp"` or
/// `"27015:27015"` (defaults to `tcp`), into a [`PortRange`] of length one
/// keyed on the *host* port (container blueprints only ever forward a
/// single host port per entry — §6).
pub fn parse_compose_port_entry(entry: &str) -> Result<PortRange, PortSpecError> {
    let (hc, proto) = match entry.split_once('/') {
        Some((hc, proto)) => (hc, proto.parse()?),
        None => (entry, Protocol::Tcp),
    };
    let host = match hc.split_once(':') {
        Some((h, _container)) => parse_port(h)?,
        None => parse_port(hc)?,
    };
    Ok(PortRange {
        start: host,
        end: host,
        proto,
    })
}

/// Translate a compose descriptor's `ports:` entries into the canonical UFW
/// spec (§4.2, §6).
pub fn compose_ports_to_ufw_spec(entries: &[String]) -> Result<String, PortSpecError> {
    let ranges = entries
        .iter()
        .map(|e| parse_compose_port_entry(e))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format_ufw_spec(&ranges))
}

#[cfg(test)]
#[path = "port_spec_tests.rs"]
mod tests;
