use crate::{
    config::ApiConfig,
    error::{GENERIC_HTTP_MESSAGE, GatewayError},
    normalize,
    query::{Endpoint, RequestDescriptor},
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response, otherwise a [`GatewayError::Http`] carrying the server message.
    pub fn into_success(self) -> Result<String, GatewayError> {
        if self.is_success() {
            return Ok(self.body);
        }

        let message = normalize::error_message(&self.body)
            .unwrap_or_else(|| GENERIC_HTTP_MESSAGE.to_string());

        Err(GatewayError::Http {
            status: self.status,
            message,
        })
    }
}

/// Request/response seam between the [`DataGateway`](crate::gateway::DataGateway) and the network.
///
/// Implementations return `Ok` for every received response, including non-2xx statuses, and
/// reserve `Err` for requests that produced no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &RequestDescriptor) -> Result<RawResponse, GatewayError>;

    async fn post_json(&self, endpoint: Endpoint, body: &Value)
    -> Result<RawResponse, GatewayError>;
}

/// [`Transport`] over HTTP using a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Absolute URL for an endpoint, with the descriptor's parameters appended when present.
pub fn request_url(base_url: &str, request: &RequestDescriptor) -> Result<Url, GatewayError> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        request.endpoint.path()
    );

    let mut url = Url::parse(&raw).map_err(|error| GatewayError::InvalidUrl {
        url: raw.clone(),
        message: error.to_string(),
    })?;

    if !request.params.is_empty() {
        url.query_pairs_mut().extend_pairs(
            request
                .params
                .iter()
                .map(|(key, value)| (*key, value.as_str())),
        );
    }

    Ok(url)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &RequestDescriptor) -> Result<RawResponse, GatewayError> {
        let url = request_url(&self.base_url, request)?;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GatewayError::network)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(GatewayError::network)?;

        Ok(RawResponse { status, body })
    }

    async fn post_json(
        &self,
        endpoint: Endpoint,
        body: &Value,
    ) -> Result<RawResponse, GatewayError> {
        let url = request_url(&self.base_url, &RequestDescriptor::new(endpoint))?;
        debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(GatewayError::network)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(GatewayError::network)?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        struct TestCase {
            base_url: &'static str,
            input: RequestDescriptor,
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: no params, no trailing `?`
                base_url: "http://localhost:8000/api",
                input: RequestDescriptor::new(Endpoint::Vegetables),
                expected: "http://localhost:8000/api/vegetables",
            },
            TestCase {
                // TC1: trailing slash on base is tolerated
                base_url: "http://localhost:8000/api/",
                input: RequestDescriptor::new(Endpoint::CurrentPrices).param("city", "Pune"),
                expected: "http://localhost:8000/api/current-prices?city=Pune",
            },
            TestCase {
                // TC2: values are form encoded
                base_url: "https://prices.example.com/api",
                input: RequestDescriptor::new(Endpoint::Comparison)
                    .param("item", "Lady Finger")
                    .param("city", "Navi Mumbai"),
                expected: "https://prices.example.com/api/comparison?item=Lady+Finger&city=Navi+Mumbai",
            },
            TestCase {
                // TC3: submission path keeps its trailing slash
                base_url: "http://localhost:8000/api",
                input: RequestDescriptor::new(Endpoint::SubmitPrice),
                expected: "http://localhost:8000/api/submit-price/",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = request_url(test.base_url, &test.input).unwrap();
            assert_eq!(actual.as_str(), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_request_url_invalid_base() {
        let actual = request_url("not a url", &RequestDescriptor::new(Endpoint::Cities));
        assert!(matches!(actual, Err(GatewayError::InvalidUrl { .. })));
    }

    #[test]
    fn test_raw_response_into_success() {
        struct TestCase {
            input: RawResponse,
            expected: Result<&'static str, GatewayError>,
        }

        let tests = vec![
            TestCase {
                // TC0: 200 returns the body
                input: RawResponse::new(200, "[]"),
                expected: Ok("[]"),
            },
            TestCase {
                // TC1: 201 is success
                input: RawResponse::new(201, "{}"),
                expected: Ok("{}"),
            },
            TestCase {
                // TC2: 404 with error field
                input: RawResponse::new(404, r#"{"error": "Vegetable not found"}"#),
                expected: Err(GatewayError::Http {
                    status: 404,
                    message: "Vegetable not found".to_string(),
                }),
            },
            TestCase {
                // TC3: 502 with html body falls back to the generic message
                input: RawResponse::new(502, "<html>Bad Gateway</html>"),
                expected: Err(GatewayError::Http {
                    status: 502,
                    message: GENERIC_HTTP_MESSAGE.to_string(),
                }),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.into_success();
            let expected = test.expected.map(str::to_string);
            assert_eq!(actual, expected, "TC{} failed", index);
        }
    }
}
