//! Client IP resolution behind reverse proxies
//!
//! Forwarding headers are only honoured when the direct peer is a trusted
//! proxy. With no proxies configured, any private or loopback peer counts
//! as one, so local setups behind nginx work out of the box.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::{debug, warn};

pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        // ULA fc00::/7, link-local fe80::/10
        IpAddr::V6(v6) => {
            let head = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || head & 0xfe00 == 0xfc00
                || head & 0xffc0 == 0xfe80
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TrustedProxy {
    Addr(IpAddr),
    Net { network: IpAddr, prefix: u8 },
}

impl TrustedProxy {
    fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let Some((network, prefix)) = entry.split_once('/') else {
            return entry.parse().ok().map(Self::Addr);
        };
        let network: IpAddr = network.parse().ok()?;
        let prefix: u8 = prefix.parse().ok()?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        (prefix <= max).then_some(Self::Net { network, prefix })
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Self::Addr(addr) => addr == ip,
            Self::Net { network, prefix } => match (network, ip) {
                (IpAddr::V4(net), IpAddr::V4(ip)) => {
                    let mask = u32::MAX.checked_shl(32 - u32::from(*prefix)).unwrap_or(0);
                    u32::from(*net) & mask == u32::from(*ip) & mask
                }
                (IpAddr::V6(net), IpAddr::V6(ip)) => {
                    let mask = u128::MAX.checked_shl(128 - u32::from(*prefix)).unwrap_or(0);
                    u128::from(*net) & mask == u128::from(*ip) & mask
                }
                _ => false,
            },
        }
    }
}

/// 预解析的可信代理列表
#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    proxies: Vec<TrustedProxy>,
}

impl ClientIpResolver {
    /// Invalid entries are logged and skipped.
    pub fn new(trusted_proxies: &[String]) -> Self {
        let proxies = trusted_proxies
            .iter()
            .filter_map(|entry| {
                let parsed = TrustedProxy::parse(entry);
                if parsed.is_none() {
                    warn!("Ignoring invalid trusted proxy entry '{}'", entry);
                }
                parsed
            })
            .collect();
        Self { proxies }
    }

    pub fn is_trusted(&self, peer: &IpAddr) -> bool {
        if self.proxies.is_empty() {
            is_private_or_local(peer)
        } else {
            self.proxies.iter().any(|p| p.matches(peer))
        }
    }

    pub fn resolve(&self, req: &HttpRequest) -> Option<String> {
        let peer = req.peer_addr().map(|addr| addr.ip()).or_else(|| {
            req.connection_info()
                .peer_addr()
                .and_then(parse_addr)
        })?;

        if self.is_trusted(&peer)
            && let Some(forwarded) = forwarded_ip(req.headers())
        {
            debug!("Client IP via proxy {}: {}", peer, forwarded);
            return Some(forwarded);
        }
        Some(peer.to_string())
    }
}

/// `ip` 或 `ip:port`
fn parse_addr(raw: &str) -> Option<IpAddr> {
    raw.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .ok()
}

/// X-Forwarded-For 的第一个地址，其次 X-Real-IP
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .or_else(|| header("x-real-ip"))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}
