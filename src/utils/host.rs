//! Host header classification
//!
//! Maps an inbound `Host` header to a tenant candidate. The base domain is
//! compared literally, port included, so `localhost:3000` is a valid base and
//! `partner1.localhost:3000` resolves to candidate `partner1`. Hosts that do
//! not end in the base domain (or a configured platform root) never yield a
//! candidate, regardless of content.

/// Outcome of classifying a `Host` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    /// The base domain itself, or a host outside the tenant namespace.
    None,
    /// A reserved label (`www`) that must not be treated as a tenant.
    Reserved,
    /// An untrusted tenant candidate. Only the directory lookup confers trust.
    Tenant(String),
}

/// Classify a raw host header against the configured base domain.
///
/// `platform_roots` covers hosting platforms whose root domain is itself
/// multi-segment (e.g. `vercel.app`, where the deployment lives at
/// `myapp.vercel.app`). There, exactly one leading label is stripped: the
/// deployment host itself classifies as `None`, while
/// `partner1.myapp.vercel.app` yields candidate `partner1`.
pub fn resolve_host(host: &str, base_domain: &str, platform_roots: &[String]) -> HostClass {
    // Host headers are case-insensitive; stored subdomains are lowercase.
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return HostClass::None;
    }

    if host == base_domain {
        return HostClass::None;
    }

    if let Some(label) = host.strip_suffix(&format!(".{}", base_domain)) {
        return classify_label(label);
    }

    for root in platform_roots {
        if host == *root {
            return HostClass::None;
        }
        if let Some(rest) = host.strip_suffix(&format!(".{}", root)) {
            // `rest` without a dot is the deployment root itself
            // (myapp.vercel.app); with a dot the first label is the candidate.
            return match rest.split_once('.') {
                None => HostClass::None,
                Some((label, _)) => classify_label(label),
            };
        }
    }

    HostClass::None
}

fn classify_label(label: &str) -> HostClass {
    match label {
        "" => HostClass::None,
        "www" => HostClass::Reserved,
        _ => HostClass::Tenant(label.to_string()),
    }
}

/// Check a host against the configured allow-list.
///
/// Patterns are either exact hosts (`aire.com`, `localhost:3000`) or
/// wildcard suffixes (`*.aire.com`, `*.vercel.app`). Anything else is a
/// host-header injection attempt and must be rejected before resolution.
pub fn host_allowed(host: &str, patterns: &[String]) -> bool {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }

    patterns.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix("*.") {
            host.ends_with(&format!(".{}", suffix))
        } else {
            host == *pattern
        }
    })
}
