//! Internal XML-RPC client for the OpenNebula API.

use crate::core::domain::{
    error::{OneError, OneResult},
    inventory::VmInventory,
    model::{
        client_config::ClientConfig,
        one_connection::OneConnection,
        vm::{VmDetail, VmPoolEntry},
    },
    value_object::OneSession,
};
use crate::core::infrastructure::xmlrpc::{self, RpcParam};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderValue},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// `one.vmpool.info` filter: every VM the caller may use.
const POOL_FILTER_ALL_USABLE: i32 = -2;
/// `one.vmpool.info` range bound meaning "no bound".
const POOL_RANGE_UNBOUNDED: i32 = -1;
/// `one.vmpool.info` state filter: any state except DONE.
const POOL_STATE_ANY: i32 = -1;

/// Internal HTTP client that sends XML-RPC calls with the session string.
///
/// Every call is a single POST; failures are reported immediately and never retried.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<OneConnection>,
    session: OneSession,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `OneError::Configuration` if the config is invalid or the HTTP
    /// client cannot be built.
    pub fn new(connection: OneConnection, config: &ClientConfig) -> OneResult<Self> {
        config.validate()?;

        let mut builder = Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| OneError::Configuration(format!("Cannot build HTTP client: {}", e)))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    OneError::Configuration("requests_per_second must be at least 1".to_string())
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    OneError::Configuration("burst_size must be at least 1".to_string())
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        let session = connection.session();
        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            session,
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &OneConnection {
        &self.connection
    }

    /// Calls `method` with the session string prepended and returns the
    /// document body of a successful `[true, body, code]` response.
    async fn call(&self, method: &str, params: &[RpcParam<'_>]) -> OneResult<String> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(RpcParam::Str(self.session.as_str()));
        all_params.extend_from_slice(params);
        let body = xmlrpc::encode_call(method, &all_params);

        debug!(method, url = %self.connection.url().as_str(), "sending XML-RPC call");

        let response = self
            .http_client
            .post(self.connection.url().as_url().clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("text/xml"))
            .body(body)
            .send()
            .await
            .map_err(|e| OneError::RemoteService(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OneError::RemoteService(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(OneError::RemoteService(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let value = xmlrpc::decode_response(&text)?;
        xmlrpc::into_one_body(method, value)
    }
}

#[async_trait]
impl VmInventory for ApiClient {
    async fn list_all_vms(&self) -> OneResult<Vec<VmPoolEntry>> {
        let xml = self
            .call(
                "one.vmpool.info",
                &[
                    RpcParam::Int(POOL_FILTER_ALL_USABLE),
                    RpcParam::Int(POOL_RANGE_UNBOUNDED),
                    RpcParam::Int(POOL_RANGE_UNBOUNDED),
                    RpcParam::Int(POOL_STATE_ANY),
                ],
            )
            .await?;
        let pool = VmPoolEntry::list_from_xml(&xml)?;
        debug!(count = pool.len(), "listed VM pool");
        Ok(pool)
    }

    async fn fetch_detail(&self, id: u32) -> OneResult<VmDetail> {
        let id = i32::try_from(id)
            .map_err(|_| OneError::Parse(format!("VM id {} exceeds the XML-RPC int range", id)))?;
        let xml = self.call("one.vm.info", &[RpcParam::Int(id)]).await?;
        VmDetail::from_xml(&xml)
    }
}
