use crate::shared::inventory_error::{InventoryError, Result};
use std::collections::BTreeSet;

/// Marker that precedes the rack/cluster token in a host name.
pub const CLUSTER_MARKER: &str = "br";

/// Number of trailing labels that make up the domain suffix.
pub const DOMAIN_LABELS: usize = 3;

/// Resolves a batch of fully qualified host names to the cluster key they share.
///
/// For `pgmainbr01.prod.example.com` the domain suffix `prod.example.com` is
/// dropped and everything before the first `br` is the key, here `pgmain`.
pub fn normalize<S: AsRef<str>>(identifiers: &[S]) -> Result<String> {
    let candidates: BTreeSet<&str> = identifiers
        .iter()
        .map(|identifier| cluster_key(identifier.as_ref()))
        .collect();

    let mut iter = candidates.iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(InventoryError::EmptyInput),
        (Some(key), None) => Ok(key.to_string()),
        _ => Err(InventoryError::AmbiguousCluster {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }),
    }
}

/// Last three dot separated labels, or `""` for names with fewer labels.
pub fn domain_suffix(identifier: &str) -> &str {
    let dots: Vec<usize> = identifier.match_indices('.').map(|(i, _)| i).collect();
    if dots.len() + 1 < DOMAIN_LABELS {
        return "";
    }
    match dots.len().checked_sub(DOMAIN_LABELS) {
        Some(index) => &identifier[dots[index] + 1..],
        None => identifier,
    }
}

pub fn cluster_key(identifier: &str) -> &str {
    let suffix = domain_suffix(identifier);
    let remainder = if suffix.is_empty() {
        identifier
    } else {
        identifier.split(suffix).next().unwrap_or_default()
    };
    remainder
        .split(CLUSTER_MARKER)
        .next()
        .unwrap_or_default()
}
