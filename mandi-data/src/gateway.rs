use crate::{
    config::ApiConfig,
    error::GatewayError,
    model::{InsightSummary, PriceSubmission, SavingsSummary},
    normalize,
    query::{Endpoint, RequestDescriptor},
    transport::{HttpTransport, Transport},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes [`RequestDescriptor`]s and decodes typed results.
///
/// Failures are reported immediately and never retried; retry policy belongs to the caller.
#[derive(Clone)]
pub struct DataGateway {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for DataGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGateway").finish_non_exhaustive()
    }
}

impl DataGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Gateway over [`HttpTransport`] for the configured base URL.
    pub fn http(config: &ApiConfig) -> Self {
        Self::new(Arc::new(HttpTransport::new(config)))
    }

    /// Fetch a list endpoint, unwrapping a paginated `results` envelope if present.
    pub async fn fetch_list<T>(&self, request: &RequestDescriptor) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch_body(request).await?;
        normalize::decode_list(&body).map_err(|error| {
            warn!(endpoint = %request.endpoint, %error, "undecodable list response");
            GatewayError::decode(request.endpoint, error)
        })
    }

    /// Dashboard use of `GET /insights`: an object shaped like [`SavingsSummary`].
    ///
    /// A sequence body carries no summary fields and yields [`SavingsSummary::default`].
    pub async fn fetch_savings_summary(
        &self,
        request: &RequestDescriptor,
    ) -> Result<SavingsSummary, GatewayError> {
        let body = self.fetch_body(request).await?;
        let value = serde_json::from_str::<Value>(&body)
            .map_err(|error| GatewayError::decode(request.endpoint, error))?;

        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|error| GatewayError::decode(request.endpoint, error)),
            _ => {
                debug!(endpoint = %request.endpoint, "savings body is not an object, using zero summary");
                Ok(SavingsSummary::default())
            }
        }
    }

    /// Insights page use of `GET /insights`: a sequence of [`InsightSummary`].
    pub async fn fetch_insight_list(
        &self,
        request: &RequestDescriptor,
    ) -> Result<Vec<InsightSummary>, GatewayError> {
        self.fetch_list(request).await
    }

    /// `POST /submit-price/`. Any 2xx status is success.
    pub async fn submit_price(&self, submission: &PriceSubmission) -> Result<(), GatewayError> {
        let body = serde_json::to_value(submission)
            .map_err(|error| GatewayError::decode(Endpoint::SubmitPrice, error))?;

        let response = self
            .transport
            .post_json(Endpoint::SubmitPrice, &body)
            .await
            .inspect_err(|error| warn!(%error, "price submission failed to send"))?;

        response
            .into_success()
            .map(|_| ())
            .inspect_err(|error| warn!(%error, "price submission rejected"))
    }

    async fn fetch_body(&self, request: &RequestDescriptor) -> Result<String, GatewayError> {
        debug!(
            endpoint = %request.endpoint,
            query = %request.query_string(),
            "fetching"
        );

        let response = self
            .transport
            .get(request)
            .await
            .inspect_err(|error| warn!(endpoint = %request.endpoint, %error, "request failed"))?;

        response
            .into_success()
            .inspect_err(|error| warn!(endpoint = %request.endpoint, %error, "request rejected"))
    }
}
