use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::domains::regions::network::is_kurdistan_addr;

/// Client address, stored in request extensions.
#[derive(Clone, Debug)]
pub struct ClientIp {
    pub ip: IpAddr,
    /// Request comes from a Kurdistan Region ISP range.
    pub is_kurdistan: bool,
}

impl ClientIp {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            is_kurdistan: is_kurdistan_addr(&ip),
        }
    }
}

/// Priority: first X-Forwarded-For entry, then X-Real-IP, then the socket address.
pub fn client_ip(headers: &HeaderMap, peer: IpAddr) -> IpAddr {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        return forwarded
            .to_str()
            .ok()
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .unwrap_or(peer);
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .unwrap_or(peer)
}

pub async fn extract_client_ip(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers(), addr.ip());
    let client = ClientIp::new(ip);
    if client.is_kurdistan {
        tracing::trace!(ip = %client.ip, "Kurdistan client");
    }
    request.extensions_mut().insert(client);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> IpAddr {
        "10.0.0.1".parse().unwrap()
    }

    #[test]
    fn prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("37.237.1.2, 10.0.0.9"));
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        let ip = client_ip(&headers, peer());
        assert_eq!(ip.to_string(), "37.237.1.2");
        assert!(ClientIp::new(ip).is_kurdistan);
    }

    #[test]
    fn falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        assert_eq!(client_ip(&headers, peer()).to_string(), "8.8.8.8");
        assert_eq!(client_ip(&HeaderMap::new(), peer()), peer());
        assert!(!ClientIp::new(peer()).is_kurdistan);
    }
}
