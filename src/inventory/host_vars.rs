use crate::inventory::{Vars, null_as_default};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct HostVars {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vars: Vars,
}

impl HostVars {
    pub fn new(name: &str, vars: Vars) -> Self {
        Self {
            name: name.to_string(),
            vars,
        }
    }
}
