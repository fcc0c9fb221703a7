use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Dynamic inventory for Ansible backed by a document store")]
pub struct Args {
    /// Print the whole inventory (the default when nothing else is asked)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,
    /// Print the variables of a single host
    #[arg(long)]
    pub host: Option<String>,
    /// Only include the group with this exact name
    #[arg(long, conflicts_with = "match_host")]
    pub group: Option<String>,
    /// Only include groups with a host matching this pattern (case-insensitive)
    #[arg(long)]
    pub match_host: Option<String>,
    /// Read records from a YAML inventory file instead of the document store
    #[arg(long, short, global = true)]
    pub inventory_file: Option<String>,
    /// Settings file for the document store connection
    #[arg(long, global = true)]
    pub settings: Option<String>,
    /// Secrets file holding the document store password
    #[arg(long, global = true)]
    pub secrets: Option<String>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve host names to the cluster key they share
    Normalize {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
    /// List the hosts of a group in one datacenter
    Hosts {
        #[arg(long)]
        group: String,
        #[arg(long)]
        datacenter: String,
    },
    /// Show stored groups
    Groups,
    /// Write the selected source to a YAML inventory file
    Snapshot {
        #[arg(long, short)]
        output: String,
    },
}
