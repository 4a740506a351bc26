use crate::{
    core::domain::{
        error::OneResult,
        inventory::VmInventory,
        model::{client_config::ClientConfig, vm_fact::VmFact, vm_selector::VmSelector},
    },
    facts::application::response::vm_facts_response::VmFactsResponse,
};
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

/// Runs the list -> select -> fetch detail -> project pipeline once.
pub struct VmFactsService {
    detail_concurrency: usize,
}

impl VmFactsService {
    /// Takes the detail fan-out bound from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`OneError::Configuration`](crate::OneError::Configuration) if
    /// `config` does not validate, including a zero `detail_concurrency`.
    pub fn new(config: &ClientConfig) -> OneResult<Self> {
        config.validate()?;
        Ok(Self {
            detail_concurrency: config.detail_concurrency,
        })
    }

    /// Collects facts for the VMs chosen by `selector`, using the current time
    /// as the uptime reference.
    ///
    /// # Errors
    ///
    /// The first error of any stage ends the invocation; no partial list is returned.
    pub async fn execute(
        &self,
        inventory: &dyn VmInventory,
        selector: &VmSelector,
    ) -> OneResult<VmFactsResponse> {
        self.execute_at(inventory, selector, Utc::now()).await
    }

    /// Same as [`execute`](Self::execute) with an explicit reference time.
    pub async fn execute_at(
        &self,
        inventory: &dyn VmInventory,
        selector: &VmSelector,
        now: DateTime<Utc>,
    ) -> OneResult<VmFactsResponse> {
        let pool = inventory.list_all_vms().await?;
        let pool_size = pool.len();
        let selected = selector.select(pool)?;

        // `buffered` yields results in input order regardless of completion order.
        let vms: Vec<VmFact> = stream::iter(selected)
            .map(|vm| async move {
                debug!(id = vm.id, name = %vm.name, "fetching VM detail");
                let detail = inventory.fetch_detail(vm.id).await?;
                VmFact::from_detail(&detail, now)
            })
            .buffered(self.detail_concurrency)
            .try_collect()
            .await?;

        info!(pool = pool_size, collected = vms.len(), "collected VM facts");
        Ok(VmFactsResponse { vms })
    }
}

impl Default for VmFactsService {
    fn default() -> Self {
        Self {
            detail_concurrency: ClientConfig::default().detail_concurrency,
        }
    }
}
