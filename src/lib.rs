mod core;
mod facts;

#[cfg(test)]
mod tests;

pub use crate::core::domain::error::{OneError, OneResult, ValidationError};
pub use crate::core::domain::inventory::VmInventory;
pub use crate::core::domain::model::client_config::{ClientConfig, RateLimitConfig};
pub use crate::core::domain::model::one_connection::{
    ConnectionParams, ENV_PASSWORD, ENV_URL, ENV_USERNAME, OneConnection,
};
pub use crate::core::domain::model::vm::{
    DiskInfo, NicInfo, PermissionBits, PermissionSet, UserTemplate, VmDetail, VmPoolEntry,
    VmTemplate,
};
pub use crate::core::domain::model::vm_fact::{NetworkFact, VmFact};
pub use crate::core::domain::model::vm_selector::VmSelector;
pub use crate::core::domain::model::vm_state::{ACTIVE, LCM_STATES, VM_STATES};
pub use crate::core::domain::value_object::{OnePassword, OneSession, OneUrl, OneUsername};
pub use crate::facts::application::response::vm_facts_response::{
    FailureResponse, VmFactsResponse,
};

use crate::{
    core::infrastructure::api_client::ApiClient,
    facts::application::service::vm_facts_service::VmFactsService,
};
use tracing::debug;

/// A read-only client for OpenNebula virtual machine inventory.
///
/// The client resolves its connection once, then collects normalized facts
/// for the whole pool, a list of ids, an exact name or a name pattern.
///
/// # Examples
///
/// ```no_run
/// use one_vm_facts::{OneClient, OneResult, VmSelector};
///
/// #[tokio::main]
/// async fn main() -> OneResult<()> {
///     let client = OneClient::builder()
///         .api_url("https://one.example.com:2633/RPC2")
///         .credentials("oneadmin", "opennebula")
///         .build()?;
///
///     let selector = VmSelector::from_params(None, Some("~*web-.*".to_string()))?;
///     let facts = client.vm_facts(&selector).await?;
///     println!("{}", serde_json::to_string_pretty(&facts).unwrap());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct OneClient {
    api_client: ApiClient,
    config: ClientConfig,
}

/// Builder for OneClient configuration
///
/// Any connection value left unset falls back to `ONE_URL`, `ONE_USERNAME`
/// or `ONE_PASSWORD` when [`build`](Self::build) runs.
#[derive(Debug, Default)]
pub struct OneClientBuilder {
    params: ConnectionParams,
    config: ClientConfig,
}

impl OneClientBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.params.api_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.params.api_username = Some(username.into());
        self.params.api_password = Some(password.into());
        self
    }

    /// Replaces all connection values at once; `None` entries use the environment.
    pub fn connection_params(mut self, params: ConnectionParams) -> Self {
        self.params = params;
        self
    }

    pub fn detail_concurrency(mut self, concurrency: usize) -> Self {
        self.config.detail_concurrency = concurrency;
        self
    }

    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves the connection from the builder and the process environment.
    ///
    /// # Errors
    ///
    /// * [`OneError::Configuration`] if a connection value is missing or the
    ///   client configuration is invalid
    /// * [`OneError::Validation`] if a connection value is malformed
    pub fn build(self) -> OneResult<OneClient> {
        let connection = OneConnection::from_env(self.params)?;
        OneClient::with_connection(connection, self.config)
    }
}

impl OneClient {
    /// Creates a new builder for OneClient configuration
    pub fn builder() -> OneClientBuilder {
        OneClientBuilder::default()
    }

    /// Creates a client for an already resolved connection.
    pub fn with_connection(connection: OneConnection, config: ClientConfig) -> OneResult<Self> {
        debug!(
            url = %connection.url().as_str(),
            username = %connection.username().as_str(),
            "creating OpenNebula client"
        );
        let api_client = ApiClient::new(connection, &config)?;
        Ok(Self { api_client, config })
    }

    /// Returns the resolved connection.
    pub fn connection(&self) -> &OneConnection {
        self.api_client.connection()
    }

    /// Lists every VM the caller may use.
    ///
    /// # Errors
    ///
    /// Returns [`OneError::RemoteService`] or [`OneError::Parse`] when the pool
    /// call fails or its document is malformed.
    pub async fn vms(&self) -> OneResult<Vec<VmPoolEntry>> {
        self.api_client.list_all_vms().await
    }

    /// Fetches the detail document of a single VM.
    pub async fn vm_detail(&self, id: u32) -> OneResult<VmDetail> {
        self.api_client.fetch_detail(id).await
    }

    /// Collects facts for the VMs chosen by `selector`.
    ///
    /// This method:
    /// - Lists the pool of VMs the caller may use
    /// - Narrows it with the selector
    /// - Fetches each selected VM's detail document
    /// - Projects every document into a [`VmFact`], keeping selection order
    ///
    /// # Errors
    ///
    /// Any failure ends the call with no partial result:
    /// - [`OneError::Configuration`] for an invalid client configuration
    /// - [`OneError::NotFound`] for unmatched ids or an unmatched exact name
    /// - [`OneError::RemoteService`] for transport or RPC failures
    /// - [`OneError::Parse`] for malformed documents or unknown state codes
    pub async fn vm_facts(&self, selector: &VmSelector) -> OneResult<VmFactsResponse> {
        VmFactsService::new(&self.config)?
            .execute(&self.api_client, selector)
            .await
    }
}
