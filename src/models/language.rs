//! Language negotiation
//!
//! An explicit `language` query parameter always wins. Otherwise the
//! `Accept-Language` header is matched against [`SUPPORTED_LOCALES`],
//! best quality first, and `en` is used when nothing matches.

use crate::constants::{DEFAULT_LANGUAGE, SUPPORTED_LOCALES};

/// One weighted entry of an `Accept-Language` header
#[derive(Debug, Clone, PartialEq)]
struct WeightedTag {
    tag: String,
    quality: f32,
}

/// Resolve the language code for a request
pub fn resolve_language(explicit: Option<&str>, accept_language: Option<&str>) -> String {
    if let Some(language) = explicit.map(str::trim).filter(|l| !l.is_empty()) {
        return language.to_string();
    }

    accept_language
        .and_then(best_supported)
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

/// Best supported locale for an `Accept-Language` header value
pub fn best_supported(header: &str) -> Option<&'static str> {
    for weighted in parse_accept_language(header) {
        if let Some(exact) = SUPPORTED_LOCALES
            .iter()
            .find(|supported| supported.eq_ignore_ascii_case(&weighted.tag))
        {
            return Some(exact);
        }

        let primary = primary_subtag(&weighted.tag);
        if let Some(by_language) = SUPPORTED_LOCALES
            .iter()
            .find(|supported| primary_subtag(supported) == primary)
        {
            return Some(by_language);
        }
    }
    None
}

fn primary_subtag(tag: &str) -> String {
    tag.split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or(tag)
        .to_ascii_lowercase()
}

/// Parse the header into tags ordered by descending quality.
///
/// Entries with the same quality keep header order. `*` and `q=0` are dropped.
fn parse_accept_language(header: &str) -> Vec<WeightedTag> {
    let mut tags: Vec<WeightedTag> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = pieces
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            (quality > 0.0).then(|| WeightedTag {
                tag: tag.to_string(),
                quality,
            })
        })
        .collect();

    tags.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal));
    tags
}
