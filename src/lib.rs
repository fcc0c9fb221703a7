//! Dynamic inventory generation for Ansible style automation.
//!
//! Records are read from a document store (or a YAML file), assembled into the
//! `--list` JSON document and written out in one piece.

pub mod group_repository;
pub mod identifier_normalizer;
pub mod inventory;
pub mod inventory_assembler;
pub mod secrets;
pub mod settings;
pub mod shared;

pub use identifier_normalizer::identifier_normalizer::normalize;
pub use inventory::group::Group;
pub use inventory::host_vars::HostVars;
pub use inventory::inventory_data::InventoryData;
pub use inventory_assembler::inventory_assembler::{generate, generate_host};
pub use shared::inventory_error::InventoryError;
