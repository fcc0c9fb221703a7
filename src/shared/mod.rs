pub mod inventory_error;
