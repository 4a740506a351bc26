pub mod vm_facts_service;
