pub mod inventory_assembler;
