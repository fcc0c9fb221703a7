pub mod settings_manager;
