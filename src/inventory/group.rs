use crate::inventory::{Vars, null_as_default};
use serde::{Deserialize, Serialize};

/// A named node of the inventory graph. `children` refers to other groups by
/// name only; cycles are not checked here.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct Group {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub datacenter: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vars::is_empty"
    )]
    pub vars: Vars,
}

impl Group {
    pub fn new(name: &str, datacenter: &str) -> Self {
        Self {
            name: name.to_string(),
            datacenter: datacenter.to_string(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: &[&str]) -> Self {
        self.children = children.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_hosts(mut self, hosts: &[&str]) -> Self {
        self.hosts = hosts.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }
}
