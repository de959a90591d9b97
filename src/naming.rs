//! Domain name <-> identifier helpers
//!
//! `example.com` maps to `exampleCom` and back. The mapping is lossy for
//! identifiers with consecutive capitals (`shopUSA` comes back as
//! `shop.u.s.a`) and alias-table entries do not round-trip.

use std::collections::HashMap;

/// Host of `url` without a leading `www.`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Identifier for `domain`: the alias if one is registered, otherwise the
/// dot-separated segments camel-cased after the first.
pub fn domain_to_identifier(domain: &str, aliases: &HashMap<String, String>) -> String {
    if let Some(alias) = aliases.get(domain) {
        return alias.clone();
    }

    let mut segments = domain.split('.');
    let mut identifier = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            identifier.extend(first.to_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    identifier
}

/// Domain for `identifier`: a dot before every capital after the first
/// character, then lowercased.
pub fn identifier_to_domain(identifier: &str) -> String {
    let mut domain = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            domain.push('.');
        }
        domain.extend(c.to_lowercase());
    }
    domain
}
