//! Inventory records and the file-backed store.
//!
//! `Group`, `HostVars` and `InventoryData` are what the assembler consumes.
//! `InventoryManager` loads and saves them as a YAML inventory file.

pub mod group;
pub mod host_vars;
pub mod inventory_data;
pub mod inventory_manager;

use serde::{Deserialize, Deserializer};

/// Free-form variable bag; key order is preserved as stored.
pub type Vars = serde_json::Map<String, serde_json::Value>;

/// Document stores write `null` for sections that were never set.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
