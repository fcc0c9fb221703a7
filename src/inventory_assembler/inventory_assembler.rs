use crate::inventory::Vars;
use crate::inventory::group::Group;
use crate::inventory::host_vars::HostVars;
use crate::inventory::inventory_data::InventoryData;
use crate::shared::inventory_error::{InventoryError, Result};
use serde_json::{Map, Value};

/// Reserved top level key holding per host variables.
pub const META_KEY: &str = "_meta";
pub const HOSTVARS_KEY: &str = "hostvars";

/// Builds the `--list` document for `data`.
///
/// Groups and hosts are emitted in input order. `children`, `hosts` and `vars`
/// appear only when non-empty; `datacenter` is always present. A later group
/// or host with an already used name replaces the earlier value in place.
pub fn generate(data: &InventoryData) -> Result<Vec<u8>> {
    let document = build_document(data)?;
    encode(&document, META_KEY)
}

/// Builds the `--host <name>` document: the host's vars, or `{}` when unknown.
pub fn generate_host(host: Option<&HostVars>) -> Result<Vec<u8>> {
    match host {
        Some(host) => {
            let vars = vars_value(&host.name, &host.vars)?;
            encode(&vars, &host.name)
        }
        None => encode(&Value::Object(Map::new()), "unknown host"),
    }
}

pub fn build_document(data: &InventoryData) -> Result<Value> {
    let mut document = Map::with_capacity(data.groups.len() + 1);
    for group in &data.groups {
        document.insert(group.name.clone(), group_block(group)?);
    }

    let mut hostvars = Map::with_capacity(data.hosts.len());
    for host in &data.hosts {
        hostvars.insert(host.name.clone(), vars_value(&host.name, &host.vars)?);
    }

    let mut meta = Map::with_capacity(1);
    meta.insert(HOSTVARS_KEY.to_string(), Value::Object(hostvars));
    document.insert(META_KEY.to_string(), Value::Object(meta));

    Ok(Value::Object(document))
}

fn group_block(group: &Group) -> Result<Value> {
    let mut block = Map::with_capacity(4);
    if !group.children.is_empty() {
        block.insert("children".to_string(), Value::from(group.children.clone()));
    }
    if !group.hosts.is_empty() {
        block.insert("hosts".to_string(), Value::from(group.hosts.clone()));
    }
    if !group.vars.is_empty() {
        block.insert("vars".to_string(), vars_value(&group.name, &group.vars)?);
    }
    block.insert(
        "datacenter".to_string(),
        Value::String(group.datacenter.clone()),
    );
    Ok(Value::Object(block))
}

fn vars_value(name: &str, vars: &Vars) -> Result<Value> {
    serde_json::to_value(vars).map_err(|source| InventoryError::Serialization {
        name: name.to_string(),
        source,
    })
}

fn encode(document: &Value, name: &str) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(|source| InventoryError::Serialization {
        name: name.to_string(),
        source,
    })
}
