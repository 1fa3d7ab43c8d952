//! Domain normalization helpers.
//!
//! Splitting a domain into label and TLD, converting TLDs between their
//! Unicode and ASCII-compatible (punycode) forms for registry lookups, and
//! preparing the domain that is sent over the wire.

use crate::error::WhoisError;
use crate::types::ParsedDomain;
use tracing::debug;

/// ASCII-compatible encoding prefix, checked right after the leading dot.
const ACE_PREFIX: &str = "xn-";

/// Characters that never require IDN conversion.
fn is_plain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Whether the string contains anything outside `[A-Za-z0-9_.-]`.
pub fn needs_idn_encoding(value: &str) -> bool {
    !value.chars().all(is_plain_char)
}

/// Convert a TLD between its Unicode and ASCII-compatible forms.
///
/// - A TLD with characters outside `[A-Za-z0-9_.-]` is encoded to punycode
///   (".рф" -> ".xn--p1ai").
/// - A TLD starting with "xn-" right after the dot is decoded back to Unicode
///   (".xn--p1ai" -> ".рф").
/// - Anything else is returned unchanged, so `convert_tld(".com") == ".com"`.
///
/// The transform goes one way per call; callers convert at most once. When
/// the conversion fails the input is returned as is.
pub fn convert_tld(tld: &str) -> String {
    let label = tld.strip_prefix('.').unwrap_or(tld);

    if needs_idn_encoding(tld) {
        match idna::domain_to_ascii(label) {
            Ok(ascii) => format!(".{}", ascii),
            Err(e) => {
                debug!("IDN encoding failed for TLD {}: {:?}", tld, e);
                tld.to_string()
            }
        }
    } else if tld
        .get(1..1 + ACE_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(ACE_PREFIX))
    {
        let (unicode, result) = idna::domain_to_unicode(label);
        match result {
            Ok(()) => format!(".{}", unicode),
            Err(e) => {
                debug!("IDN decoding failed for TLD {}: {:?}", tld, e);
                tld.to_string()
            }
        }
    } else {
        tld.to_string()
    }
}

/// Split a domain into second-level label and TLD on the first dot.
///
/// The input is trimmed, lowercased and stripped of a trailing root dot.
/// Everything after the first dot is the TLD, so multi-label suffixes such as
/// "co.uk" stay together.
///
/// # Errors
///
/// Returns `WhoisError::InvalidDomain` if the domain has no dot, or if the
/// label or TLD part is empty.
pub fn split_domain(domain: &str) -> Result<ParsedDomain, WhoisError> {
    let normalized = domain.trim().to_lowercase();
    let normalized = normalized
        .strip_suffix('.')
        .unwrap_or(normalized.as_str());

    let (sld, rest) = normalized
        .split_once('.')
        .ok_or_else(|| WhoisError::invalid_domain(domain, "Domain name has no TLD"))?;

    if sld.is_empty() {
        return Err(WhoisError::invalid_domain(
            domain,
            "Domain label cannot be empty",
        ));
    }
    if rest.is_empty() {
        return Err(WhoisError::invalid_domain(domain, "TLD cannot be empty"));
    }

    Ok(ParsedDomain {
        sld: sld.to_string(),
        tld: format!(".{}", rest),
    })
}

/// Build the domain string sent to the WHOIS server.
///
/// The combined `sld + tld` is punycode-encoded as a whole when it contains
/// non-plain characters. This is independent of the TLD-only conversion used
/// for registry lookups.
pub fn wire_domain(parsed: &ParsedDomain) -> Result<String, WhoisError> {
    let domain = parsed.full();
    if !needs_idn_encoding(&domain) {
        return Ok(domain);
    }

    idna::domain_to_ascii(&domain).map_err(|e| {
        WhoisError::invalid_domain(&domain, format!("IDN encoding failed: {:?}", e))
    })
}

/// Expand domain inputs into fully qualified names.
///
/// - Inputs with a dot are used as given
/// - Inputs without a dot are combined with each TLD (".com" when none given)
/// - Empty inputs are skipped
///
/// TLDs may be given with or without the leading dot.
pub fn expand_domain_inputs(domains: &[String], tlds: &Option<Vec<String>>) -> Vec<String> {
    let mut results = Vec::new();

    for domain in domains {
        let trimmed = domain.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.contains('.') {
            results.push(trimmed.to_string());
            continue;
        }

        match tlds {
            Some(tld_list) => {
                for tld in tld_list {
                    let tld_clean = tld.trim().trim_start_matches('.');
                    if !tld_clean.is_empty() {
                        results.push(format!("{}.{}", trimmed, tld_clean));
                    }
                }
            }
            None => results.push(format!("{}.com", trimmed)),
        }
    }

    results
}
