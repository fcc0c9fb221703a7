use crate::inventory::group::Group;
use crate::inventory::host_vars::HostVars;
use crate::inventory::inventory_data::InventoryData;
use crate::shared::inventory_error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Matches every name; used when no filter narrows the inventory.
pub const MATCH_ALL: &str = ".*";

/// Read access to stored groups and host variables.
///
/// Patterns are regular expressions matched case-insensitively. Results come
/// back in store order so that generated documents are reproducible.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Exact name match, or when `match_by_host_pattern` is set, every group
    /// with at least one host matching `name_or_pattern`.
    async fn find_groups(
        &self,
        name_or_pattern: &str,
        match_by_host_pattern: bool,
    ) -> Result<Vec<Group>>;

    async fn find_hosts(&self, name_pattern: &str) -> Result<Vec<HostVars>>;

    /// Hosts of the single group named `group` in `datacenter`. Zero matches
    /// and several matches both yield an empty list.
    async fn hosts_for_group_in_datacenter(
        &self,
        group: &str,
        datacenter: &str,
    ) -> Result<Vec<String>>;

    async fn all_groups(&self) -> Result<Vec<Group>>;
}

/// Which groups go into a `--list` document.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Group(String),
    HostPattern(String),
}

/// Reads the selected groups and the host variables they need.
///
/// With a filter only hosts referenced by the selected groups are looked up;
/// `Selection::All` takes every stored host.
pub async fn collect_inventory(
    repository: &dyn GroupRepository,
    selection: &Selection,
) -> Result<InventoryData> {
    let groups = match selection {
        Selection::All => repository.all_groups().await?,
        Selection::Group(name) => repository.find_groups(name, false).await?,
        Selection::HostPattern(pattern) => repository.find_groups(pattern, true).await?,
    };

    let hosts = match selection {
        Selection::All => repository.find_hosts(MATCH_ALL).await?,
        _ => {
            let names = referenced_hosts(&groups);
            if names.is_empty() {
                Vec::new()
            } else {
                repository.find_hosts(&exact_name_pattern(&names)).await?
            }
        }
    };

    debug!(
        groups = groups.len(),
        hosts = hosts.len(),
        ?selection,
        "collected inventory records"
    );
    Ok(InventoryData::new(groups, hosts))
}

/// Looks up one host by exact name for the `--host` call.
pub async fn find_host(repository: &dyn GroupRepository, name: &str) -> Result<Option<HostVars>> {
    let hosts = repository.find_hosts(&exact_name_pattern(&[name])).await?;
    Ok(hosts.into_iter().find(|h| h.name.eq_ignore_ascii_case(name)))
}

/// Host names of `groups` in first-seen order, without duplicates.
pub fn referenced_hosts(groups: &[Group]) -> Vec<String> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.hosts.iter())
        .filter(|host| seen.insert(host.as_str()))
        .cloned()
        .collect()
}

/// Anchored alternation matching exactly the given names.
pub fn exact_name_pattern<S: AsRef<str>>(names: &[S]) -> String {
    let escaped: Vec<String> = names
        .iter()
        .map(|name| regex::escape(name.as_ref()))
        .collect();
    format!("^({})$", escaped.join("|"))
}

/// Applies the unique-match rule shared by every repository.
pub(crate) fn hosts_of_unique_match(
    matches: Vec<Group>,
    group: &str,
    datacenter: &str,
) -> Vec<String> {
    let count = matches.len();
    let mut matches = matches.into_iter();
    match (matches.next(), count) {
        (Some(found), 1) => found.hosts,
        (None, _) => {
            debug!(group, datacenter, "no group in datacenter");
            Vec::new()
        }
        _ => {
            warn!(group, datacenter, count, "group is not unique in datacenter");
            Vec::new()
        }
    }
}
