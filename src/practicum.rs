use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::PracticumConfig;
use crate::error::HomeworkError;

const WRONG_STATUS_MESSAGE: &str = "Ответ от API не содержит статус 200";

/// Source of homework status payloads.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch every status change since `from_date` (Unix seconds).
    /// The payload is returned undecoded beyond JSON.
    async fn fetch(&self, from_date: i64) -> Result<Value, HomeworkError>;
}

pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(config: &PracticumConfig, token: impl Into<String>) -> anyhow::Result<Self> {
        // A stalled endpoint must fail the cycle instead of blocking the loop.
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, HomeworkError> {
        debug!("Requesting homework statuses from {} (from_date={})", self.endpoint, from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                error!("Homework API request failed: {}", e);
                HomeworkError::WrongResponseStatus {
                    message: WRONG_STATUS_MESSAGE.to_string(),
                    source: Some(e),
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Homework API returned {}", status);
            return Err(HomeworkError::WrongResponseStatus {
                message: format!("{} (получен {})", WRONG_STATUS_MESSAGE, status.as_u16()),
                source: None,
            });
        }

        response.json().await.map_err(HomeworkError::InvalidJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STATUSES_PATH: &str = "/api/user_api/homework_statuses/";

    fn client_for(server: &MockServer) -> PracticumClient {
        let config = PracticumConfig {
            endpoint: format!("{}{}", server.uri(), STATUSES_PATH),
            request_timeout_secs: 1,
        };
        PracticumClient::new(&config, "secret-token").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_payload_verbatim() {
        let server = MockServer::start().await;
        let body = json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        });
        Mock::given(method("GET"))
            .and(path(STATUSES_PATH))
            .and(query_param("from_date", "123"))
            .and(header("authorization", "OAuth secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client_for(&server).fetch(123).await.unwrap();
        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_fetch_does_not_validate_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let payload = client_for(&server).fetch(0).await.unwrap();
        assert_eq!(payload, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_non_200_is_wrong_response_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch(0).await.unwrap_err();
        match err {
            HomeworkError::WrongResponseStatus { message, source } => {
                assert!(message.contains("503"));
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_wrong_response_status() {
        // Bind and drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = PracticumConfig {
            endpoint: format!("http://{}/", addr),
            request_timeout_secs: 1,
        };
        let client = PracticumClient::new(&config, "secret-token").unwrap();
        let err = client.fetch(0).await.unwrap_err();
        match err {
            HomeworkError::WrongResponseStatus { source, .. } => assert!(source.is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stalled_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"homeworks": [], "current_date": 1}))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch(0).await.unwrap_err();
        match err {
            HomeworkError::WrongResponseStatus { source, .. } => {
                assert!(source.map(|e| e.is_timeout()).unwrap_or(false));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch(0).await.unwrap_err();
        assert!(matches!(err, HomeworkError::InvalidJson(_)));
    }
}
