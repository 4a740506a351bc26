pub mod vm_facts_response;
