use crate::core::domain::{
    error::OneResult,
    model::vm::{VmDetail, VmPoolEntry},
};
use async_trait::async_trait;

/// The two read operations the fact pipeline consumes from the endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VmInventory: Send + Sync {
    /// Lists every VM the caller may use, in server order.
    async fn list_all_vms(&self) -> OneResult<Vec<VmPoolEntry>>;

    /// Fetches the full detail document of one VM.
    async fn fetch_detail(&self, id: u32) -> OneResult<VmDetail>;
}
