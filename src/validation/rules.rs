//! Reusable field rules.
//!
//! Each rule returns `Err(message)` describing the violation; the field path
//! is attached by [`Context::check`](super::Context::check).

use std::net::{IpAddr, SocketAddr};

use crate::duration::parse_duration;

pub fn non_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(())
}

pub fn port(value: u16) -> Result<(), String> {
    if value == 0 {
        return Err("must be between 1 and 65535".to_string());
    }
    Ok(())
}

pub fn ip_addr(value: &str) -> Result<(), String> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| format!("{:?} is not a valid IP address", value))
}

pub fn socket_addr(value: &str) -> Result<(), String> {
    value
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|_| format!("{:?} is not a valid socket address", value))
}

/// A well-formed duration strictly greater than zero.
pub fn positive_duration(value: &str) -> Result<(), String> {
    match parse_duration(value) {
        Ok(d) if d.is_zero() => Err("must be greater than zero".to_string()),
        Ok(_) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

pub fn min<T: PartialOrd + std::fmt::Display>(value: T, min: T) -> Result<(), String> {
    if value < min {
        return Err(format!("must be at least {}", min));
    }
    Ok(())
}

pub fn http_url(value: &str) -> Result<(), String> {
    let url = url::Url::parse(value).map_err(|e| format!("{:?} is not a valid URL: {}", value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported URL scheme {:?}", other)),
    }
}

/// RFC 1123 label: lowercase alphanumerics and '-', at most 63 characters,
/// starting and ending with an alphanumeric.
pub fn dns_label(value: &str) -> Result<(), String> {
    let valid = !value.is_empty()
        && value.len() <= 63
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !value.starts_with('-')
        && !value.ends_with('-');
    if !valid {
        return Err(format!("{:?} is not a valid DNS label", value));
    }
    Ok(())
}

/// One or more dot-separated DNS labels.
pub fn dns_name(value: &str) -> Result<(), String> {
    if value.is_empty() || value.split('.').any(|label| dns_label(label).is_err()) {
        return Err(format!("{:?} is not a valid DNS name", value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_rules() {
        assert!(ip_addr("0.0.0.0").is_ok());
        assert!(ip_addr("::1").is_ok());
        assert!(ip_addr("localhost").is_err());
        assert!(socket_addr("127.0.0.1:9090").is_ok());
        assert!(socket_addr("127.0.0.1").is_err());
        assert!(port(0).is_err());
        assert!(port(443).is_ok());
    }

    #[test]
    fn test_url_rule() {
        assert!(http_url("http://127.0.0.1:8080").is_ok());
        assert!(http_url("ftp://host").is_err());
        assert!(http_url("not a url").is_err());
    }

    #[test]
    fn test_duration_rule() {
        assert!(positive_duration("2s").is_ok());
        assert!(positive_duration("0s").is_err());
        assert!(positive_duration("soon").is_err());
    }

    #[test]
    fn test_dns_rules() {
        assert!(dns_label("hello-world").is_ok());
        assert!(dns_label("Hello").is_err());
        assert!(dns_label("-edge").is_err());
        assert!(dns_label(&"a".repeat(64)).is_err());
        assert!(dns_name("example.com").is_ok());
        assert!(dns_name("example..com").is_err());
    }
}
