use crate::inventory::group::Group;
use crate::inventory::host_vars::HostVars;
use crate::shared::inventory_error::{InventoryError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One generation pass worth of records, in the order they should be emitted.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct InventoryData {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub hosts: Vec<HostVars>,
}

impl InventoryData {
    pub fn new(groups: Vec<Group>, hosts: Vec<HostVars>) -> Self {
        Self { groups, hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.hosts.is_empty()
    }

    /// Parses an inventory file with top level `groups:` and `hosts:` lists.
    ///
    /// Any record that is not plain JSON data (non-string keys, `.nan`/`.inf`,
    /// tagged values) aborts the whole load with [`InventoryError::Decode`].
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| InventoryError::Decode {
                record: "inventory document".to_string(),
                reason: e.to_string(),
            })?;

        let mapping = match document {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(InventoryError::Decode {
                    record: "inventory document".to_string(),
                    reason: "expected a mapping with `groups` and `hosts`".to_string(),
                });
            }
        };

        let groups = decode_section(&mapping, "groups", "group")?;
        let hosts = decode_section(&mapping, "hosts", "host")?;
        Ok(Self { groups, hosts })
    }
}

fn decode_section<T: DeserializeOwned>(
    mapping: &serde_yaml::Mapping,
    section: &str,
    kind: &str,
) -> Result<Vec<T>> {
    let items = match mapping.get(section) {
        None | Some(serde_yaml::Value::Null) => return Ok(Vec::new()),
        Some(serde_yaml::Value::Sequence(items)) => items,
        Some(_) => {
            return Err(InventoryError::Decode {
                record: format!("section `{section}`"),
                reason: "expected a list".to_string(),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let document = yaml_to_json(item).map_err(|reason| InventoryError::Decode {
                record: record_label(kind, index, yaml_name(item)),
                reason,
            })?;
            decode_record(kind, index, document)
        })
        .collect()
}

/// Maps a stored document onto `T`, naming the record on failure.
pub(crate) fn decode_record<T: DeserializeOwned>(
    kind: &str,
    index: usize,
    document: Value,
) -> Result<T> {
    let label = record_label(kind, index, document.get("name").and_then(Value::as_str));
    serde_json::from_value(document).map_err(|e| InventoryError::Decode {
        record: label,
        reason: e.to_string(),
    })
}

fn record_label(kind: &str, index: usize, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{kind} {name:?}"),
        None => format!("{kind} #{index}"),
    }
}

fn yaml_name(item: &serde_yaml::Value) -> Option<&str> {
    item.get("name").and_then(serde_yaml::Value::as_str)
}

fn yaml_to_json(value: &serde_yaml::Value) -> std::result::Result<Value, String> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} is not representable in JSON"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = key
                    .as_str()
                    .ok_or_else(|| format!("mapping key {key:?} is not a string"))?;
                object.insert(key.to_string(), yaml_to_json(value)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => {
            Err(format!("tagged value {} is not supported", tagged.tag))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"
groups:
  - name: pg-main
    datacenter: dc1
    children: [pg-replicas]
    hosts: [pg01.br01.prod.example.com]
    vars:
      port: 5432
      tuning: {shared_buffers: 4GB, work_mem: 64MB}
  - name: pg-replicas
    datacenter: dc1
hosts:
  - name: pg01.br01.prod.example.com
    vars:
      role: leader
      weight: 1.5
"#;

    #[test]
    fn loads_groups_and_hosts_in_order() {
        let data = InventoryData::from_yaml_str(INVENTORY).unwrap();
        let names: Vec<&str> = data.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["pg-main", "pg-replicas"]);
        assert_eq!(data.hosts.len(), 1);
        assert_eq!(data.hosts[0].vars["weight"], serde_json::json!(1.5));
    }

    #[test]
    fn preserves_vars_key_order() {
        let data = InventoryData::from_yaml_str(INVENTORY).unwrap();
        let tuning = data.groups[0].vars["tuning"].as_object().unwrap();
        let keys: Vec<&String> = tuning.keys().collect();
        assert_eq!(keys, vec!["shared_buffers", "work_mem"]);
    }

    #[test]
    fn empty_document_is_empty_inventory() {
        assert!(InventoryData::from_yaml_str("").unwrap().is_empty());
    }

    #[test]
    fn non_finite_number_is_rejected_with_record_name() {
        let content = "hosts:\n  - name: web01\n    vars: {ratio: .nan}\n";
        let error = InventoryData::from_yaml_str(content).unwrap_err();
        match error {
            InventoryError::Decode { record, .. } => assert_eq!(record, "host \"web01\""),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_string_key_is_rejected() {
        let content = "groups:\n  - name: g\n    vars: {1: one}\n";
        assert!(matches!(
            InventoryData::from_yaml_str(content),
            Err(InventoryError::Decode { .. })
        ));
    }

    #[test]
    fn record_without_name_is_labelled_by_index() {
        let content = "groups:\n  - name: ok\n  - datacenter: dc1\n";
        match InventoryData::from_yaml_str(content).unwrap_err() {
            InventoryError::Decode { record, .. } => assert_eq!(record, "group #1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
