pub mod client_config;
pub mod one_connection;
pub mod vm;
pub mod vm_fact;
pub mod vm_selector;
pub mod vm_state;
