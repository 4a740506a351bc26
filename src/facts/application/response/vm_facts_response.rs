use crate::core::domain::model::vm_fact::VmFact;
use serde::Serialize;

/// Successful output: the facts, in selection order, under a single `vms` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmFactsResponse {
    pub vms: Vec<VmFact>,
}

/// Failed output: one human-readable message and no VM list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResponse {
    pub failed: bool,
    pub msg: String,
}

impl FailureResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
        }
    }
}
