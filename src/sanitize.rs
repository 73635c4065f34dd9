//! URL normalization for free-form indicator text.
//!
//! Feed values range from well-formed URLs to bare hosts, mistyped schemes
//! and bracketed IP literals. Everything is funneled into a plain
//! `http://host[:port][path]` form, or classified as unprobable. This runs
//! ahead of any network activity and seeds the work queue, so it is pure
//! and total: any input yields a value, never a panic.

use std::net::IpAddr;

use url::Url;

/// What became of a raw indicator string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// Normalized URL, ready for a probe.
    Ok(String),
    /// TLS is never terminated here, so the proxy cannot intercept it.
    SkipHttps,
    /// Unreachable outside an anonymity network.
    SkipOnion,
    /// Not salvageable even after normalization attempts.
    ParseError,
}

pub fn sanitize(raw: &str) -> Sanitized {
    let raw = raw.trim();

    // Bare-host inputs lack a scheme; retry those behind an http:// prefix.
    // Prefixing anything else would mangle it (http://http://…).
    let parsed = match Url::parse(raw) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{raw}")),
        other => other,
    };
    let parsed = match parsed {
        Ok(u) => u,
        Err(_) => {
            // The url crate refuses bracketed IPv4 literals such as
            // [1.2.3.4]; accept any plain address it will not.
            let bare = raw.strip_prefix("http://").unwrap_or(raw);
            return match literal_ip(bare) {
                Some(ip) => Sanitized::Ok(format!("http://{ip}")),
                None => Sanitized::ParseError,
            };
        }
    };

    if parsed.scheme() == "https" {
        return Sanitized::SkipHttps;
    }

    // Any other scheme is coerced to http below; free-form indicator text
    // contains things like "ttp://" or "hxxp://".
    let (host, port, path) = match parsed.host_str() {
        Some(h) if !h.is_empty() => (h.to_string(), parsed.port(), parsed.path().to_string()),
        _ => match recover_authority(raw, parsed.path()) {
            Some(authority) => authority,
            None => return Sanitized::ParseError,
        },
    };

    if host.ends_with(".onion") {
        return Sanitized::SkipOnion;
    }

    // Literal IPv6 hosts lose their brackets.
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let mut out = format!("http://{host}");
    if let Some(p) = port {
        out.push(':');
        out.push_str(&p.to_string());
    }
    if !path.is_empty() && path != "/" {
        if !path.starts_with('/') {
            out.push('/');
        }
        out.push_str(&path);
    }
    if let Some(q) = parsed.query() {
        out.push('?');
        out.push_str(q);
    }
    Sanitized::Ok(out)
}

/// A parse that succeeded without a host component. `host:port/path` inputs
/// land here (the "host" part reads as a scheme), as do mistyped schemes
/// like `ttp:example.com`. Retry the whole string behind `http://`; failing
/// that, treat the opaque path as a literal address or as `host/rest`.
fn recover_authority(raw: &str, path_text: &str) -> Option<(String, Option<u16>, String)> {
    if let Ok(u) = Url::parse(&format!("http://{raw}")) {
        if let Some(h) = u.host_str() {
            if !h.is_empty() {
                return Some((h.to_string(), u.port(), u.path().to_string()));
            }
        }
    }

    if let Some(ip) = literal_ip(path_text) {
        return Some((ip.to_string(), None, String::new()));
    }

    let mut parts = path_text.splitn(2, '/');
    let host = parts.next().unwrap_or("");
    if host.is_empty() {
        return None;
    }
    let path = match parts.next() {
        Some(rest) if !rest.is_empty() => format!("/{rest}"),
        _ => String::new(),
    };
    Some((host.to_string(), None, path))
}

fn literal_ip(s: &str) -> Option<IpAddr> {
    let s = s
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(s);
    s.parse().ok()
}
