use crate::group_repository::group_repository::{GroupRepository, hosts_of_unique_match};
use crate::inventory::group::Group;
use crate::inventory::host_vars::HostVars;
use crate::inventory::inventory_data::InventoryData;
use crate::shared::inventory_error::{InventoryError, Result};
use anyhow::Context;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Inventory kept in a YAML file with top level `groups:` and `hosts:` lists.
pub struct InventoryManager {
    inventory_file_name: String,
    inventory: InventoryData,
}

impl InventoryManager {
    pub fn new(inventory_file_name: &str) -> Self {
        Self {
            inventory_file_name: inventory_file_name.to_string(),
            inventory: InventoryData::default(),
        }
    }

    pub fn from_data(inventory: InventoryData) -> Self {
        Self {
            inventory_file_name: String::new(),
            inventory,
        }
    }

    pub fn inventory(&self) -> &InventoryData {
        &self.inventory
    }

    pub async fn load_inventory_from_file(&mut self) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&self.inventory_file_name)
            .await
            .with_context(|| {
                format!(
                    "Failed to read inventory file: {}",
                    self.inventory_file_name
                )
            })?;

        self.inventory = InventoryData::from_yaml_str(&content).with_context(|| {
            format!(
                "Failed to deserialize inventory file: {}",
                self.inventory_file_name
            )
        })?;

        tracing::debug!(
            file = %self.inventory_file_name,
            groups = self.inventory.groups.len(),
            hosts = self.inventory.hosts.len(),
            "loaded inventory file"
        );
        Ok(())
    }

    pub async fn save_inventory_to_file(
        inventory: &InventoryData,
        inventory_file_name: &str,
    ) -> anyhow::Result<()> {
        let path = Path::new(&inventory_file_name);

        let mut output = tokio::fs::File::create(&path).await.with_context(|| {
            format!("Failed to create output inventory file: {inventory_file_name}")
        })?;

        output.write_all(b"---\n").await.with_context(|| {
            format!("Failed to write header to inventory file: {inventory_file_name}")
        })?;

        let serialized = serde_yaml::to_string(inventory).with_context(|| {
            format!("Failed to serialize inventory for inventory file: {inventory_file_name}")
        })?;

        output
            .write_all(serialized.as_bytes())
            .await
            .with_context(|| {
                format!("Failed to write serialized inventory to inventory file: {inventory_file_name}")
            })?;

        output.write_all(b"...\n").await.with_context(|| {
            format!("Failed to write footer to inventory file: {inventory_file_name}")
        })?;

        output.flush().await.with_context(|| {
            format!("Failed to flush inventory file: {inventory_file_name}")
        })?;

        Ok(())
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| InventoryError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl GroupRepository for InventoryManager {
    async fn find_groups(
        &self,
        name_or_pattern: &str,
        match_by_host_pattern: bool,
    ) -> Result<Vec<Group>> {
        if !match_by_host_pattern {
            return Ok(self
                .inventory
                .groups
                .iter()
                .filter(|group| group.name == name_or_pattern)
                .cloned()
                .collect());
        }
        let re = case_insensitive(name_or_pattern)?;
        Ok(self
            .inventory
            .groups
            .iter()
            .filter(|group| group.hosts.iter().any(|host| re.is_match(host)))
            .cloned()
            .collect())
    }

    async fn find_hosts(&self, name_pattern: &str) -> Result<Vec<HostVars>> {
        let re = case_insensitive(name_pattern)?;
        Ok(self
            .inventory
            .hosts
            .iter()
            .filter(|host| re.is_match(&host.name))
            .cloned()
            .collect())
    }

    async fn hosts_for_group_in_datacenter(
        &self,
        group: &str,
        datacenter: &str,
    ) -> Result<Vec<String>> {
        let matches: Vec<Group> = self
            .inventory
            .groups
            .iter()
            .filter(|g| g.name == group && g.datacenter == datacenter)
            .cloned()
            .collect();
        Ok(hosts_of_unique_match(matches, group, datacenter))
    }

    async fn all_groups(&self) -> Result<Vec<Group>> {
        Ok(self.inventory.groups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group_repository::group_repository::{
        MATCH_ALL, Selection, collect_inventory, find_host,
    };
    use serde_json::json;

    fn vars(value: serde_json::Value) -> crate::inventory::Vars {
        value.as_object().cloned().unwrap_or_default()
    }

    fn manager() -> InventoryManager {
        InventoryManager::from_data(InventoryData::new(
            vec![
                Group::new("pg-main", "dc1")
                    .with_children(&["pg-replicas"])
                    .with_hosts(&["PG01.br01.prod.example.com", "pg02.br01.prod.example.com"]),
                Group::new("pg-replicas", "dc1").with_hosts(&["pg03.br02.prod.example.com"]),
                Group::new("web", "dc1").with_hosts(&["web01.br05.prod.example.com"]),
                Group::new("web", "dc2").with_hosts(&["web11.br15.dr.example.com"]),
                Group::new("web", "dc2").with_hosts(&["web12.br15.dr.example.com"]),
            ],
            vec![
                HostVars::new("PG01.br01.prod.example.com", vars(json!({"role": "leader"}))),
                HostVars::new("pg02.br01.prod.example.com", vars(json!({"role": "replica"}))),
                HostVars::new("pg03.br02.prod.example.com", vars(json!({"role": "replica"}))),
                HostVars::new("web01.br05.prod.example.com", vars(json!({}))),
            ],
        ))
    }

    #[tokio::test]
    async fn exact_name_lookup() {
        let groups = manager().find_groups("pg-main", false).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert!(manager().find_groups("PG-MAIN", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn host_pattern_is_case_insensitive() {
        let groups = manager().find_groups("^pg0[13]", true).await.unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["pg-main", "pg-replicas"]);
    }

    #[tokio::test]
    async fn host_name_pattern() {
        let hosts = manager().find_hosts("^pg").await.unwrap();
        assert_eq!(hosts.len(), 3);
        assert_eq!(manager().find_hosts(MATCH_ALL).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn invalid_pattern_is_reported() {
        let result = manager().find_hosts("pg(").await;
        assert!(matches!(result, Err(InventoryError::Pattern { .. })));
    }

    #[tokio::test]
    async fn group_in_datacenter_requires_unique_match() {
        let manager = manager();
        assert_eq!(
            manager.hosts_for_group_in_datacenter("web", "dc1").await.unwrap(),
            vec!["web01.br05.prod.example.com"]
        );
        assert!(manager.hosts_for_group_in_datacenter("web", "dc2").await.unwrap().is_empty());
        assert!(manager.hosts_for_group_in_datacenter("web", "dc3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn selected_group_brings_only_its_hostvars() {
        let data = collect_inventory(&manager(), &Selection::Group("pg-main".to_string()))
            .await
            .unwrap();
        assert_eq!(data.groups.len(), 1);
        let hosts: Vec<&str> = data.hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(hosts, vec!["PG01.br01.prod.example.com", "pg02.br01.prod.example.com"]);
    }

    #[tokio::test]
    async fn unknown_group_yields_empty_inventory() {
        let data = collect_inventory(&manager(), &Selection::Group("nope".to_string()))
            .await
            .unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn all_selection_takes_every_record() {
        let data = collect_inventory(&manager(), &Selection::All).await.unwrap();
        assert_eq!(data.groups.len(), 5);
        assert_eq!(data.hosts.len(), 4);
    }

    #[tokio::test]
    async fn host_lookup_is_exact() {
        let manager = manager();
        let host = find_host(&manager, "pg02.br01.prod.example.com").await.unwrap();
        assert_eq!(host.unwrap().vars["role"], "replica");
        assert!(find_host(&manager, "pg02").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.yml");
        let path = path.to_str().unwrap();

        let original = manager();
        InventoryManager::save_inventory_to_file(original.inventory(), path)
            .await
            .unwrap();

        let mut loaded = InventoryManager::new(path);
        loaded.load_inventory_from_file().await.unwrap();
        assert_eq!(loaded.inventory(), original.inventory());
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let mut manager = InventoryManager::new("/nonexistent/inventory.yml");
        let error = manager.load_inventory_from_file().await.unwrap_err();
        assert!(error.to_string().contains("/nonexistent/inventory.yml"));
    }
}
