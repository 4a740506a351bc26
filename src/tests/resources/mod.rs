mod vm_facts_tests;
